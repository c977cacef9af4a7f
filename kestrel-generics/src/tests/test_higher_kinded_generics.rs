use super::{context_with, standard_traits};
use crate::{
    GenericContext, GenericDeclaration, GenericErrorKind, GenericParameter, Kind, NoSubtyping,
    SubtypeOracle, Type, Variance,
};
use pretty_assertions::assert_eq;

/// `Cat <: Animal`, nothing else beyond reflexivity
struct CatsAreAnimals;

impl SubtypeOracle for CatsAreAnimals {
    fn is_subtype(&self, sub: &Type, sup: &Type) -> bool {
        sub == sup || (*sub == Type::named("Cat") && *sup == Type::named("Animal"))
    }
}

fn functor_context() -> GenericContext {
    let mut context = context_with(standard_traits());
    let mut builder = GenericDeclaration::builder("Functor");
    builder
        .add_parameter(GenericParameter::new("F").with_kind(Kind::constructor(1)))
        .with_signature(Type::function(
            vec![Type::applied(Type::param("F"), vec![Type::int()])],
            Type::applied(Type::param("F"), vec![Type::string()]),
        ));
    context.register(builder.build().expect("valid")).expect("registered");
    context
}

#[test]
fn test_constructor_argument_of_matching_kind() {
    let mut context = functor_context();
    context
        .instantiate("Functor", vec![Type::constructor("List", 1)], None)
        .expect("List has kind * -> *");

    context.monomorphize_all();
    let artifact = context.artifact("Functor:ctor(List/1)").expect("produced");
    assert_eq!(
        artifact.signature(),
        Some(&Type::function(
            vec![Type::generic("List", vec![Type::int()])],
            Type::generic("List", vec![Type::string()]),
        ))
    );
}

#[test]
fn test_argument_of_wrong_kind_is_rejected() {
    let mut context = functor_context();

    let concrete = context
        .instantiate("Functor", vec![Type::int()], None)
        .unwrap_err();
    let binary = context
        .instantiate("Functor", vec![Type::constructor("Map", 2)], None)
        .unwrap_err();

    assert_eq!(concrete.kind(), GenericErrorKind::InvalidTypeArg);
    assert_eq!(binary.kind(), GenericErrorKind::InvalidTypeArg);
    assert!(concrete.to_string().contains("Functor"));
    assert!(context.instantiations().is_empty());
}

#[test]
fn test_partially_applied_constructor_has_reduced_kind() {
    let mut context = functor_context();
    context
        .instantiate(
            "Functor",
            vec![Type::applied(Type::constructor("Map", 2), vec![Type::string()])],
            None,
        )
        .expect("Map<string> has kind * -> *");
    assert_eq!(context.instantiations().len(), 1);

    let produced = context.monomorphize_all();
    assert_eq!(produced.len(), 1);
    assert_eq!(
        produced[0].signature(),
        Some(&Type::function(
            vec![Type::generic("Map", vec![Type::string(), Type::int()])],
            Type::generic("Map", vec![Type::string(), Type::string()]),
        ))
    );
}

fn variance_context() -> GenericContext {
    let mut context = context_with(standard_traits());
    for (name, variance) in [
        ("Source", Some(Variance::Covariant)),
        ("Sink", Some(Variance::Contravariant)),
        ("Cell", None),
    ] {
        let mut parameter = GenericParameter::new("T");
        if let Some(variance) = variance {
            parameter = parameter.with_variance(variance);
        }
        let mut builder = GenericDeclaration::builder(name);
        builder.add_parameter(parameter);
        context.register(builder.build().expect("valid")).expect("registered");
    }
    context
}

#[test]
fn test_substitutability_follows_declared_variance() {
    let mut context = variance_context();
    let mut pair = |name: &str| {
        let cat = context
            .instantiate(name, vec![Type::named("Cat")], None)
            .expect("valid");
        let animal = context
            .instantiate(name, vec![Type::named("Animal")], None)
            .expect("valid");
        (cat, animal)
    };
    let source = pair("Source");
    let sink = pair("Sink");
    let cell = pair("Cell");

    let oracle = CatsAreAnimals;
    assert!(context.is_substitutable(source.0, source.1, &oracle));
    assert!(!context.is_substitutable(source.1, source.0, &oracle));

    assert!(context.is_substitutable(sink.1, sink.0, &oracle));
    assert!(!context.is_substitutable(sink.0, sink.1, &oracle));

    // Unannotated parameters are invariant
    assert!(!context.is_substitutable(cell.0, cell.1, &oracle));
    assert!(!context.is_substitutable(cell.1, cell.0, &oracle));
    assert!(context.is_substitutable(cell.0, cell.0, &NoSubtyping));
}

#[test]
fn test_different_declarations_are_never_substitutable() {
    let mut context = variance_context();
    let source = context
        .instantiate("Source", vec![Type::named("Cat")], None)
        .expect("valid");
    let sink = context
        .instantiate("Sink", vec![Type::named("Cat")], None)
        .expect("valid");

    assert!(!context.is_substitutable(source, sink, &CatsAreAnimals));
}

#[test]
fn test_variance_composes_through_nested_positions() {
    let mut context = variance_context();
    let handler = |param: &str| Type::function(vec![Type::named(param)], Type::void());
    let animal_handler = context
        .instantiate("Source", vec![handler("Animal")], None)
        .expect("valid");
    let cat_handler = context
        .instantiate("Source", vec![handler("Cat")], None)
        .expect("valid");
    let cat_cell = context
        .instantiate("Source", vec![Type::mut_pointer(Type::named("Cat"))], None)
        .expect("valid");
    let animal_cell = context
        .instantiate("Source", vec![Type::mut_pointer(Type::named("Animal"))], None)
        .expect("valid");

    let oracle = CatsAreAnimals;
    // A handler of any animal can stand in for a handler of cats, not the other way around
    assert!(context.is_substitutable(animal_handler, cat_handler, &oracle));
    assert!(!context.is_substitutable(cat_handler, animal_handler, &oracle));
    // Mutable pointees stay invariant even in a covariant position
    assert!(!context.is_substitutable(cat_cell, animal_cell, &oracle));
}
