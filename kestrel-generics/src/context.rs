//! Per-compilation-unit generics context
//!
//! `GenericContext` owns the declaration registry, the instantiation resolver (with its
//! error list) and the monomorphization engine, and is passed explicitly to whoever
//! needs it. There is no process-wide state: independent contexts never interact
//! unless merged.

use crate::config::GenericsConfig;
use crate::error::GenericError;
use crate::monomorphize::{MonomorphizedArtifact, Monomorphizer};
use crate::registry::{GenericDeclaration, GenericRegistry};
use crate::resolver::{GenericInstantiation, InstantiationId, InstantiationResolver};
use crate::span::Span;
use crate::traits::{SubtypeOracle, TraitOracle};
use crate::types::Type;
use indexmap::IndexSet;
use miette::{NamedSource, Report};
use parking_lot::Mutex;
use std::sync::Arc;

pub struct GenericContext {
    registry: GenericRegistry,
    resolver: InstantiationResolver,
    monomorphizer: Monomorphizer,
    oracle: Arc<dyn TraitOracle + Send + Sync>,
}

impl GenericContext {
    pub fn new(oracle: Arc<dyn TraitOracle + Send + Sync>) -> Self {
        Self::with_config(oracle, GenericsConfig::default())
    }

    pub fn with_config(oracle: Arc<dyn TraitOracle + Send + Sync>, config: GenericsConfig) -> Self {
        Self {
            registry: GenericRegistry::new(),
            resolver: InstantiationResolver::new(config),
            monomorphizer: Monomorphizer::new(),
            oracle,
        }
    }

    pub fn config(&self) -> &GenericsConfig {
        self.resolver.config()
    }

    pub fn registry(&self) -> &GenericRegistry {
        &self.registry
    }

    pub fn resolver(&self) -> &InstantiationResolver {
        &self.resolver
    }

    pub fn monomorphizer(&self) -> &Monomorphizer {
        &self.monomorphizer
    }

    /// Register a declaration; a duplicate name is returned and recorded
    pub fn register(
        &mut self,
        declaration: GenericDeclaration,
    ) -> Result<Arc<GenericDeclaration>, GenericError> {
        self.registry
            .register(declaration)
            .map_err(|error| self.resolver.record(error))
    }

    /// Register a declaration another unit already registered, keeping the same `Arc`
    /// so that a later `merge` recognizes it
    pub fn register_shared(
        &mut self,
        declaration: Arc<GenericDeclaration>,
    ) -> Result<Arc<GenericDeclaration>, GenericError> {
        self.registry
            .register_shared(declaration)
            .map_err(|error| self.resolver.record(error))
    }

    pub fn lookup(&self, name: &str) -> Option<&Arc<GenericDeclaration>> {
        self.registry.lookup(name)
    }

    pub fn instantiate(
        &mut self,
        declaration: &str,
        type_arguments: Vec<Type>,
        span: Option<Span>,
    ) -> Result<InstantiationId, GenericError> {
        self.resolver.instantiate(
            &self.registry,
            self.oracle.as_ref(),
            declaration,
            type_arguments,
            span,
        )
    }

    pub fn instantiate_nested(
        &mut self,
        parent: InstantiationId,
        declaration: &str,
        type_arguments: Vec<Type>,
        span: Option<Span>,
    ) -> Result<InstantiationId, GenericError> {
        self.resolver.instantiate_nested(
            &self.registry,
            self.oracle.as_ref(),
            parent,
            declaration,
            type_arguments,
            span,
        )
    }

    pub fn instantiate_with_defaults(
        &mut self,
        declaration: &str,
        type_arguments: Vec<Type>,
        span: Option<Span>,
    ) -> Result<InstantiationId, GenericError> {
        self.resolver.instantiate_with_defaults(
            &self.registry,
            self.oracle.as_ref(),
            declaration,
            type_arguments,
            span,
        )
    }

    pub fn instantiation(&self, id: InstantiationId) -> Option<&GenericInstantiation> {
        self.resolver.instantiation(id)
    }

    pub fn instantiations(&self) -> &[GenericInstantiation] {
        self.resolver.instantiations()
    }

    pub fn is_substitutable(
        &self,
        actual: InstantiationId,
        expected: InstantiationId,
        subtypes: &dyn SubtypeOracle,
    ) -> bool {
        self.resolver
            .is_substitutable(&self.registry, actual, expected, subtypes)
    }

    pub fn monomorphize_all(&mut self) -> &[MonomorphizedArtifact] {
        self.monomorphizer
            .monomorphize_all(&self.registry, &mut self.resolver)
    }

    pub fn artifacts(&self) -> &[MonomorphizedArtifact] {
        self.monomorphizer.artifacts()
    }

    pub fn artifact(&self, name: &str) -> Option<&MonomorphizedArtifact> {
        self.monomorphizer.artifact(name)
    }

    pub fn take_artifacts(&mut self) -> Vec<MonomorphizedArtifact> {
        self.monomorphizer.take_artifacts()
    }

    /// Artifact names grouped in emission order, callees first.
    /// Instantiations without an artifact yet are skipped.
    pub fn emission_order(&self) -> Vec<Vec<String>> {
        self.resolver
            .emission_order()
            .into_iter()
            .map(|group| {
                group
                    .into_iter()
                    .filter_map(|id| {
                        self.artifacts()
                            .iter()
                            .find(|artifact| artifact.instantiation() == id)
                            .map(|artifact| artifact.name().to_string())
                    })
                    .collect::<Vec<_>>()
            })
            .filter(|group| !group.is_empty())
            .collect()
    }

    pub fn errors(&self) -> &[GenericError] {
        self.resolver.errors()
    }

    pub fn has_errors(&self) -> bool {
        self.resolver.has_errors()
    }

    pub fn take_errors(&mut self) -> Vec<GenericError> {
        self.resolver.take_errors()
    }

    /// Render accumulated errors as miette reports. `source` is `(file name, text)`.
    pub fn reports(&self, source: Option<(&str, &str)>) -> Vec<Report> {
        self.errors()
            .iter()
            .map(|error| {
                let report = Report::new(error.clone());
                match source {
                    Some((name, text)) => {
                        report.with_source_code(NamedSource::new(name, text.to_string()))
                    }
                    None => report,
                }
            })
            .collect()
    }

    /// Fold another translation unit's context into this one.
    ///
    /// Declarations are re-registered (duplicates are recorded as errors), errors are
    /// appended, instantiations are re-interned and artifacts are carried over so that
    /// each unique instantiation still has at most one artifact. Instantiations of a
    /// declaration that conflicts with one registered here are dropped, since they were
    /// never validated against it.
    pub fn merge(&mut self, other: GenericContext) {
        let GenericContext {
            registry,
            resolver,
            monomorphizer,
            ..
        } = other;

        let mut accepted: IndexSet<String> = IndexSet::new();
        for declaration in registry.iter() {
            // Units that were seeded from the same shared declarations agree trivially
            if self
                .registry
                .lookup(declaration.name())
                .is_some_and(|existing| Arc::ptr_eq(existing, declaration))
            {
                accepted.insert(declaration.name().to_string());
                continue;
            }
            match self.registry.register_shared(Arc::clone(declaration)) {
                Ok(_) => {
                    accepted.insert(declaration.name().to_string());
                }
                Err(error) => {
                    self.resolver.record(error);
                }
            }
        }

        let monomorphized: Vec<bool> = resolver
            .instantiations()
            .iter()
            .map(GenericInstantiation::is_monomorphized)
            .collect();
        let remap = self
            .resolver
            .absorb(resolver, |name| accepted.contains(name));
        for (id, done) in remap.iter().zip(monomorphized) {
            if let (Some(id), true) = (id, done) {
                self.resolver.mark_monomorphized(*id);
            }
        }
        self.monomorphizer.absorb(monomorphizer, &remap);
    }
}

impl std::fmt::Debug for GenericContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenericContext")
            .field("registry", &self.registry)
            .field("resolver", &self.resolver)
            .field("monomorphizer", &self.monomorphizer)
            .finish_non_exhaustive()
    }
}

/// A context guarded by one exclusive lock, for translation units processed on
/// several threads
#[derive(Debug, Clone)]
pub struct SharedGenericContext {
    inner: Arc<Mutex<GenericContext>>,
}

impl SharedGenericContext {
    pub fn new(context: GenericContext) -> Self {
        Self {
            inner: Arc::new(Mutex::new(context)),
        }
    }

    /// Run `f` with exclusive access to the context
    pub fn with<R>(&self, f: impl FnOnce(&mut GenericContext) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut *guard)
    }

    /// Recover the context once every other handle has been dropped
    pub fn into_inner(self) -> Result<GenericContext, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { inner })
    }
}
