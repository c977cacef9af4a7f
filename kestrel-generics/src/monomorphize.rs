//! Monomorphization engine
//!
//! Sweeps the resolver's instantiations and produces one named, concrete artifact
//! per instantiation that does not have one yet. Sweeps are incremental: each call
//! only sees instantiations created since the previous call.

use crate::naming::monomorphized_name;
use crate::registry::GenericRegistry;
use crate::resolver::{InstantiationId, InstantiationResolver};
use crate::span::Span;
use crate::substitution::substitute;
use crate::types::Type;
use indexmap::{IndexMap, IndexSet};
use tracing::{debug, trace};

/// A concrete, non-generic artifact handed to code generation
#[derive(Debug, Clone, PartialEq)]
pub struct MonomorphizedArtifact {
    name: String,
    declaration: String,
    type_arguments: Vec<Type>,
    span: Option<Span>,
    instantiation: InstantiationId,
    signature: Option<Type>,
}

impl MonomorphizedArtifact {
    /// Stable symbol name, e.g. `Container:int`
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn declaration(&self) -> &str {
        &self.declaration
    }

    pub fn type_arguments(&self) -> &[Type] {
        &self.type_arguments
    }

    pub fn span(&self) -> Option<Span> {
        self.span
    }

    pub fn instantiation(&self) -> InstantiationId {
        self.instantiation
    }

    /// The declaration's signature with every parameter replaced
    pub fn signature(&self) -> Option<&Type> {
        self.signature.as_ref()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Monomorphizer {
    artifacts: Vec<MonomorphizedArtifact>,
    /// Artifact name -> index into `artifacts`
    by_name: IndexMap<String, usize>,
    /// Every name ever produced, including artifacts already handed off
    produced: IndexSet<String>,
}

impl Monomorphizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce artifacts for every instantiation not yet monomorphized.
    ///
    /// Returns only the artifacts created by this call; a repeat call with no new
    /// instantiations returns an empty slice.
    pub fn monomorphize_all(
        &mut self,
        registry: &GenericRegistry,
        resolver: &mut InstantiationResolver,
    ) -> &[MonomorphizedArtifact] {
        let start = self.artifacts.len();

        for id in resolver.pending() {
            let Some(instantiation) = resolver.instantiation(id) else {
                continue;
            };
            let name = monomorphized_name(instantiation.declaration(), instantiation.type_arguments());

            if self.produced.contains(&name) {
                trace!(artifact = %name, "artifact already produced");
                resolver.mark_monomorphized(id);
                continue;
            }

            let signature = registry.lookup(instantiation.declaration()).and_then(|declaration| {
                let parameters = declaration.parameter_names();
                declaration.signature().map(|signature| {
                    substitute(signature, &parameters[..], instantiation.type_arguments()).into_owned()
                })
            });

            let artifact = MonomorphizedArtifact {
                name,
                declaration: instantiation.declaration().to_string(),
                type_arguments: instantiation.type_arguments().to_vec(),
                span: instantiation.span(),
                instantiation: id,
                signature,
            };
            debug!(artifact = %artifact.name, "monomorphized instantiation");

            resolver.mark_monomorphized(id);
            self.push(artifact);
        }

        &self.artifacts[start..]
    }

    fn push(&mut self, artifact: MonomorphizedArtifact) {
        self.produced.insert(artifact.name.clone());
        self.by_name.insert(artifact.name.clone(), self.artifacts.len());
        self.artifacts.push(artifact);
    }

    /// Every artifact produced and not yet handed off, in production order
    pub fn artifacts(&self) -> &[MonomorphizedArtifact] {
        &self.artifacts
    }

    pub fn artifact(&self, name: &str) -> Option<&MonomorphizedArtifact> {
        self.by_name.get(name).map(|&index| &self.artifacts[index])
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Transfer ownership of the produced artifacts to the code generator.
    /// The instantiations stay marked and their names stay reserved, so they are never
    /// produced again, not even when a merged unit carries the same artifact.
    pub fn take_artifacts(&mut self) -> Vec<MonomorphizedArtifact> {
        self.by_name.clear();
        std::mem::take(&mut self.artifacts)
    }

    /// Take over another engine's artifacts, renumbering their instantiations with `remap`.
    /// Artifacts of dropped instantiations, and names already produced here, are skipped.
    pub(crate) fn absorb(&mut self, other: Monomorphizer, remap: &[Option<InstantiationId>]) {
        for mut artifact in other.artifacts {
            let Some(&Some(id)) = remap.get(artifact.instantiation.index()) else {
                continue;
            };
            if self.produced.contains(&artifact.name) {
                continue;
            }
            artifact.instantiation = id;
            self.push(artifact);
        }
    }
}
