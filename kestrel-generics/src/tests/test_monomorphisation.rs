use super::{box_declaration, container_declaration, context_with, standard_traits};
use crate::{GenericContext, GenericDeclaration, GenericParameter, MonomorphizedArtifact, Type};
use pretty_assertions::assert_eq;

fn artifact_names(artifacts: &[MonomorphizedArtifact]) -> Vec<String> {
    artifacts.iter().map(|a| a.name().to_string()).collect()
}

fn populated_context() -> GenericContext {
    let mut context = context_with(standard_traits());
    context.register(container_declaration()).expect("registered");
    context.register(box_declaration()).expect("registered");
    context
        .instantiate("Container", vec![Type::int()], None)
        .expect("valid");
    context
        .instantiate("Box", vec![Type::generic("List", vec![Type::string()])], None)
        .expect("valid");
    context
        .instantiate("Container", vec![Type::int()], None)
        .expect("valid");
    context
}

#[test]
fn test_one_artifact_per_unique_instantiation() {
    let mut context = populated_context();

    let produced = artifact_names(context.monomorphize_all());

    assert_eq!(produced, vec!["Container:int", "Box:List[string]"]);
    let container = context.artifact("Container:int").expect("produced");
    assert_eq!(container.declaration(), "Container");
    assert_eq!(container.type_arguments(), &[Type::int()]);
    assert!(context.instantiations().iter().all(|i| i.is_monomorphized()));
}

#[test]
fn test_second_sweep_produces_nothing() {
    let mut context = populated_context();
    context.monomorphize_all();

    assert!(context.monomorphize_all().is_empty());
    assert_eq!(context.artifacts().len(), 2);
}

#[test]
fn test_names_are_stable_across_fresh_contexts() {
    let first = artifact_names(populated_context().monomorphize_all());
    let second = artifact_names(populated_context().monomorphize_all());

    assert_eq!(first, second);
}

#[test]
fn test_requests_after_a_sweep_are_picked_up_next_time() {
    let mut context = populated_context();
    context.monomorphize_all();

    context
        .instantiate("Container", vec![Type::string()], None)
        .expect("valid");
    context
        .instantiate("Container", vec![Type::int()], None)
        .expect("valid");

    assert_eq!(
        artifact_names(context.monomorphize_all()),
        vec!["Container:string"]
    );
}

#[test]
fn test_zero_parameter_generic_is_named_after_declaration() {
    let mut context = context_with(standard_traits());
    context
        .register(GenericDeclaration::builder("Unit").build().expect("valid"))
        .expect("registered");
    context.instantiate("Unit", vec![], None).expect("valid");

    assert_eq!(artifact_names(context.monomorphize_all()), vec!["Unit"]);
}

#[test]
fn test_signature_is_fully_concrete() {
    let mut context = context_with(standard_traits());
    let mut builder = GenericDeclaration::builder("swap");
    builder
        .add_parameter(GenericParameter::new("A"))
        .add_parameter(GenericParameter::new("B"))
        .with_signature(Type::function(
            vec![Type::tuple(vec![Type::param("A"), Type::param("B")])],
            Type::tuple(vec![Type::param("B"), Type::param("A")]),
        ));
    context.register(builder.build().expect("valid")).expect("registered");
    context
        .instantiate("swap", vec![Type::int(), Type::pointer(Type::char())], None)
        .expect("valid");

    context.monomorphize_all();
    let artifact = context.artifact("swap:int:ptr(char)").expect("produced");
    let signature = artifact.signature().expect("declaration has a signature");

    assert!(!signature.has_params());
    assert_eq!(signature.to_string(), "fn((int, *char)) -> (*char, int)");
}

#[test]
fn test_handed_off_artifacts_are_not_rebuilt() {
    let mut context = populated_context();
    context.monomorphize_all();

    let handed_off = context.take_artifacts();
    assert_eq!(handed_off.len(), 2);
    assert!(context.artifacts().is_empty());
    assert!(context.monomorphize_all().is_empty());
}

#[test]
fn test_emission_order_puts_callees_first() {
    let mut context = context_with(standard_traits());
    context.register(box_declaration()).expect("registered");
    let mut builder = GenericDeclaration::builder("Outer");
    builder.add_parameter(GenericParameter::new("T"));
    context.register(builder.build().expect("valid")).expect("registered");

    let outer = context
        .instantiate("Outer", vec![Type::int()], None)
        .expect("valid");
    context
        .instantiate_nested(outer, "Box", vec![Type::int()], None)
        .expect("valid");
    context.monomorphize_all();

    assert_eq!(
        context.emission_order(),
        vec![vec!["Box:int".to_string()], vec!["Outer:int".to_string()]]
    );
}

#[test]
fn test_lookalike_instantiations_each_get_an_artifact() {
    let mut context = context_with(standard_traits());
    for name in ["Pair", "Pair:a"] {
        let mut builder = GenericDeclaration::builder(name);
        builder.add_parameter(GenericParameter::new("T"));
        context.register(builder.build().expect("valid")).expect("registered");
    }
    context
        .instantiate("Pair", vec![Type::named("a:int")], None)
        .expect("valid");
    context
        .instantiate("Pair:a", vec![Type::int()], None)
        .expect("valid");

    let produced = artifact_names(context.monomorphize_all());

    assert_eq!(produced.len(), 2);
    assert_ne!(produced[0], produced[1]);
    assert!(context.instantiations().iter().all(|i| i.is_monomorphized()));
}
