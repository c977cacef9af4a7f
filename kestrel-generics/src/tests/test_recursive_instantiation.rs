use super::{context_with, context_with_config, standard_traits};
use crate::{GenericDeclaration, GenericError, GenericErrorKind, GenericParameter, GenericsConfig, Type};
use pretty_assertions::assert_eq;

fn single_parameter(name: &str) -> GenericDeclaration {
    let mut builder = GenericDeclaration::builder(name);
    builder.add_parameter(GenericParameter::new("T"));
    builder.build().expect("valid declaration")
}

#[test]
fn test_growing_expansion_hits_depth_limit() {
    let config = GenericsConfig {
        max_expansion_depth: 4,
        ..GenericsConfig::default()
    };
    let mut context = context_with_config(standard_traits(), config);
    context.register(single_parameter("Nest")).expect("registered");

    // Expanding Nest<T> requests Nest<List<T>>, which never bottoms out
    let mut argument = Type::int();
    let mut current = context
        .instantiate("Nest", vec![argument.clone()], None)
        .expect("root request");
    let error = loop {
        argument = Type::generic("List", vec![argument]);
        match context.instantiate_nested(current, "Nest", vec![argument.clone()], None) {
            Ok(next) => current = next,
            Err(error) => break error,
        }
    };

    match error {
        GenericError::RecursiveInstantiation {
            declaration, limit, ..
        } => {
            assert_eq!(declaration, "Nest");
            assert_eq!(limit, 4);
        }
        other => panic!("expected RecursiveInstantiation, got {other:?}"),
    }
    // Depths 0 through 4 were accepted
    assert_eq!(context.instantiations().len(), 5);
    assert_eq!(
        context.instantiations().last().map(|i| i.depth()),
        Some(4)
    );
    assert_eq!(context.errors().len(), 1);
}

#[test]
fn test_self_reference_with_same_arguments_terminates() {
    let mut context = context_with(standard_traits());
    context.register(single_parameter("Tree")).expect("registered");

    let tree = context
        .instantiate("Tree", vec![Type::int()], None)
        .expect("valid");
    let child = context
        .instantiate_nested(tree, "Tree", vec![Type::int()], None)
        .expect("interned");

    assert_eq!(tree, child);
    assert_eq!(context.instantiations().len(), 1);
    assert!(!context.has_errors());
    assert_eq!(
        context.resolver().expansion_children(tree),
        vec![tree]
    );
}

#[test]
fn test_mutual_recursion_shares_an_emission_group() {
    let mut context = context_with(standard_traits());
    context.register(single_parameter("Even")).expect("registered");
    context.register(single_parameter("Odd")).expect("registered");

    let even = context
        .instantiate("Even", vec![Type::bool()], None)
        .expect("valid");
    let odd = context
        .instantiate_nested(even, "Odd", vec![Type::bool()], None)
        .expect("valid");
    let back = context
        .instantiate_nested(odd, "Even", vec![Type::bool()], None)
        .expect("interned");

    assert_eq!(back, even);
    assert_eq!(context.instantiation(odd).and_then(|i| i.requested_by()), Some(even));

    context.monomorphize_all();
    assert_eq!(
        context.emission_order(),
        vec![vec!["Even:bool".to_string(), "Odd:bool".to_string()]]
    );
}

#[test]
fn test_interned_requests_do_not_count_against_depth() {
    let config = GenericsConfig {
        max_expansion_depth: 0,
        ..GenericsConfig::default()
    };
    let mut context = context_with_config(standard_traits(), config);
    context.register(single_parameter("Leaf")).expect("registered");

    let root = context
        .instantiate("Leaf", vec![Type::int()], None)
        .expect("depth 0 is allowed");
    assert_eq!(
        context.instantiate_nested(root, "Leaf", vec![Type::int()], None),
        Ok(root)
    );

    let error = context
        .instantiate_nested(root, "Leaf", vec![Type::string()], None)
        .unwrap_err();
    assert_eq!(error.kind(), GenericErrorKind::RecursiveInstantiation);
}
