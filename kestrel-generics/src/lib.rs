//! Kestrel Generics
//!
//! Generic resolution and monomorphization for the Kestrel compiler's type layer.
//!
//! ## Architecture
//!
//! - **Declaration Registry**: generic templates with parameters, bounds and where clauses
//! - **Type Substitution**: structural parameter replacement with cheap no-op detection
//! - **Instantiation Resolver**: bound and where-clause checking against a trait oracle,
//!   interning of structurally identical requests, and batched error accumulation
//! - **Monomorphization Engine**: one deterministically named artifact per unique instantiation
//! - **Kind / Variance Model**: higher-kinded parameters and use-site compatibility
//!
//! ## Integration
//!
//! The trait system and the subtype relation are external collaborators reached through
//! [`TraitOracle`] and [`SubtypeOracle`]. Code generation consumes
//! [`MonomorphizedArtifact`] values produced by [`GenericContext::monomorphize_all`].

#![allow(clippy::uninlined_format_args)]

pub mod config;
pub mod context;
pub mod error;
pub mod kinds;
pub mod monomorphize;
pub mod naming;
pub mod registry;
pub mod resolver;
pub mod span;
pub mod substitution;
pub mod traits;
pub mod types;

// Re-export public API
pub use config::GenericsConfig;
pub use context::{GenericContext, SharedGenericContext};
pub use error::{ConfigError, GenericError, GenericErrorKind};
pub use kinds::{Kind, Variance};
pub use monomorphize::{MonomorphizedArtifact, Monomorphizer};
pub use naming::{canonical_token, monomorphized_name};
pub use registry::{
    DeclarationBuilder, GenericDeclaration, GenericParameter, GenericRegistry, TraitBound,
    WhereClause,
};
pub use resolver::{GenericInstantiation, InstantiationId, InstantiationResolver};
pub use span::Span;
pub use substitution::{substitute, Substitution};
pub use traits::{NoSubtyping, SubtypeOracle, TraitOracle, TraitTable};
pub use types::{PrimitiveType, Type};

#[cfg(test)]
mod tests;
