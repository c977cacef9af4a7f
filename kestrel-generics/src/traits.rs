//! Interfaces to the trait system and the subtype relation
//!
//! The generics engine never decides bound satisfaction itself. It asks a
//! [`TraitOracle`] and treats the answer as a plain boolean. [`TraitTable`] is a
//! small deterministic oracle for embedders that keep implementations in memory.

use crate::registry::TraitBound;
use crate::types::Type;
use indexmap::{IndexMap, IndexSet};

/// Trait system collaborator. Implementations must not mutate generics state.
pub trait TraitOracle {
    /// Does `ty` satisfy every bound in `bounds`?
    fn check_trait_bounds(&self, ty: &Type, bounds: &[TraitBound]) -> bool {
        bounds
            .iter()
            .all(|bound| self.implements_trait(ty, &bound.trait_name))
    }

    /// Does `ty` implement the trait named `trait_name`?
    fn implements_trait(&self, ty: &Type, trait_name: &str) -> bool;
}

/// Type checker collaborator answering subtype questions for variance checks
pub trait SubtypeOracle {
    fn is_subtype(&self, sub: &Type, sup: &Type) -> bool;
}

/// Subtyping that only relates a type to itself
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSubtyping;

impl SubtypeOracle for NoSubtyping {
    fn is_subtype(&self, sub: &Type, sup: &Type) -> bool {
        sub == sup
    }
}

/// How an implementation registered against a type constructor applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConstructorImpl {
    /// impl Trait for List<T>
    Unconditional,
    /// impl Trait for List<T> when T: Trait
    WhenArgsImplement,
}

/// In-memory trait implementation table
#[derive(Debug, Clone, Default)]
pub struct TraitTable {
    /// Implementations for one exact type
    implementations: IndexMap<Type, IndexSet<String>>,
    /// Implementations for every application of a nominal type constructor
    constructor_impls: IndexMap<String, IndexMap<String, ConstructorImpl>>,
}

impl TraitTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `impl trait_name for ty`
    pub fn implement(&mut self, ty: Type, trait_name: impl Into<String>) -> &mut Self {
        self.implementations
            .entry(ty)
            .or_default()
            .insert(trait_name.into());
        self
    }

    /// Record `impl trait_name for constructor<..>` for any type arguments
    pub fn implement_for_constructor(
        &mut self,
        constructor: impl Into<String>,
        trait_name: impl Into<String>,
    ) -> &mut Self {
        self.constructor_impls
            .entry(constructor.into())
            .or_default()
            .insert(trait_name.into(), ConstructorImpl::Unconditional);
        self
    }

    /// Record `impl trait_name for constructor<..>` holding only when every type argument
    /// implements `trait_name` as well
    pub fn implement_when_args_implement(
        &mut self,
        constructor: impl Into<String>,
        trait_name: impl Into<String>,
    ) -> &mut Self {
        self.constructor_impls
            .entry(constructor.into())
            .or_default()
            .insert(trait_name.into(), ConstructorImpl::WhenArgsImplement);
        self
    }

    pub fn implementation_count(&self) -> usize {
        self.implementations.values().map(IndexSet::len).sum::<usize>()
            + self.constructor_impls.values().map(IndexMap::len).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.implementation_count() == 0
    }
}

impl TraitOracle for TraitTable {
    fn implements_trait(&self, ty: &Type, trait_name: &str) -> bool {
        if self
            .implementations
            .get(ty)
            .is_some_and(|traits| traits.contains(trait_name))
        {
            return true;
        }

        let Type::Named { name, args } = ty else {
            return false;
        };

        match self
            .constructor_impls
            .get(name)
            .and_then(|traits| traits.get(trait_name))
        {
            Some(ConstructorImpl::Unconditional) => true,
            Some(ConstructorImpl::WhenArgsImplement) => {
                args.iter().all(|arg| self.implements_trait(arg, trait_name))
            }
            None => false,
        }
    }
}
