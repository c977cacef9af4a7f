//! Scenario tests for the generics engine
//!
//! Each module drives a `GenericContext` the way the type checker does during a
//! compilation pass: register declarations, resolve requests, sweep artifacts.

use crate::{
    GenericContext, GenericDeclaration, GenericParameter, GenericsConfig, TraitBound, TraitTable,
    Type,
};
use std::sync::Arc;

mod test_higher_kinded_generics;
mod test_monomorphisation;
mod test_recursive_instantiation;

/// Trait table used by most scenarios: int, string and bool are Printable, float is not
pub(crate) fn standard_traits() -> TraitTable {
    let mut table = TraitTable::new();
    table
        .implement(Type::int(), "Printable")
        .implement(Type::string(), "Printable")
        .implement(Type::bool(), "Printable")
        .implement(Type::int(), "Hash")
        .implement(Type::string(), "Hash")
        .implement_when_args_implement("List", "Printable");
    table
}

pub(crate) fn context_with(traits: TraitTable) -> GenericContext {
    GenericContext::new(Arc::new(traits))
}

pub(crate) fn context_with_config(traits: TraitTable, config: GenericsConfig) -> GenericContext {
    GenericContext::with_config(Arc::new(traits), config)
}

/// `Container<T: Printable>`
pub(crate) fn container_declaration() -> GenericDeclaration {
    let mut builder = GenericDeclaration::builder("Container");
    builder
        .add_parameter(GenericParameter::new("T"))
        .add_bound("T", TraitBound::new("Printable"));
    builder.build().expect("valid declaration")
}

/// `Box<T>`
pub(crate) fn box_declaration() -> GenericDeclaration {
    let mut builder = GenericDeclaration::builder("Box");
    builder
        .add_parameter(GenericParameter::new("T"))
        .with_signature(Type::generic("Box", vec![Type::param("T")]));
    builder.build().expect("valid declaration")
}
