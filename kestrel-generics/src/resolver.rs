//! Instantiation resolver
//!
//! Validates instantiation requests against their declarations, interns structurally
//! identical requests, and accumulates every failure so a single pass can report all
//! independent generic errors at once.
//!
//! Validation order for `instantiate(name, args)`:
//! 1. the declaration exists
//! 2. the argument count matches the parameter count
//! 3. each argument is well formed (concrete, and of the declared kind)
//! 4. each parameter's bounds hold, stopping at the first failure
//! 5. each where clause holds once the parameters are substituted
//!
//! Only then is the request interned or recorded as a new instantiation.

use crate::config::GenericsConfig;
use crate::error::{to_source_span, GenericError};
use crate::kinds::Kind;
use crate::registry::{GenericDeclaration, GenericRegistry};
use crate::span::Span;
use crate::substitution::substitute;
use crate::traits::{SubtypeOracle, TraitOracle};
use crate::types::Type;
use indexmap::IndexMap;
use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Identity of an interned instantiation. Equal ids mean the same instantiation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstantiationId(usize);

impl InstantiationId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A validated binding of a declaration's parameters to concrete types
#[derive(Debug, Clone, PartialEq)]
pub struct GenericInstantiation {
    id: InstantiationId,
    declaration: String,
    type_arguments: Vec<Type>,
    monomorphized: bool,
    span: Option<Span>,
    depth: usize,
    requested_by: Option<InstantiationId>,
}

impl GenericInstantiation {
    pub fn id(&self) -> InstantiationId {
        self.id
    }

    pub fn declaration(&self) -> &str {
        &self.declaration
    }

    pub fn type_arguments(&self) -> &[Type] {
        &self.type_arguments
    }

    /// Set once an artifact has been produced for this instantiation; never cleared
    pub fn is_monomorphized(&self) -> bool {
        self.monomorphized
    }

    pub fn span(&self) -> Option<Span> {
        self.span
    }

    /// Number of nested expansion steps between a root request and this instantiation
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The instantiation whose expansion first requested this one
    pub fn requested_by(&self) -> Option<InstantiationId> {
        self.requested_by
    }
}

#[derive(Debug, Clone)]
pub struct InstantiationResolver {
    config: GenericsConfig,
    instantiations: Vec<GenericInstantiation>,
    /// Declaration name -> its instantiations, scanned for interning
    by_declaration: IndexMap<String, Vec<InstantiationId>>,
    errors: Vec<GenericError>,
    /// parent -> child edges: expanding parent needs child
    expansion_graph: DiGraph<InstantiationId, ()>,
    nodes: Vec<NodeIndex>,
}

impl InstantiationResolver {
    pub fn new(config: GenericsConfig) -> Self {
        Self {
            config,
            instantiations: Vec::new(),
            by_declaration: IndexMap::new(),
            errors: Vec::new(),
            expansion_graph: DiGraph::new(),
            nodes: Vec::new(),
        }
    }

    pub fn config(&self) -> &GenericsConfig {
        &self.config
    }

    /// Resolve a root instantiation request
    pub fn instantiate(
        &mut self,
        registry: &GenericRegistry,
        oracle: &dyn TraitOracle,
        declaration: &str,
        type_arguments: Vec<Type>,
        span: Option<Span>,
    ) -> Result<InstantiationId, GenericError> {
        self.resolve(registry, oracle, declaration, type_arguments, span, None)
    }

    /// Resolve a request made while expanding `parent`
    pub fn instantiate_nested(
        &mut self,
        registry: &GenericRegistry,
        oracle: &dyn TraitOracle,
        parent: InstantiationId,
        declaration: &str,
        type_arguments: Vec<Type>,
        span: Option<Span>,
    ) -> Result<InstantiationId, GenericError> {
        self.resolve(registry, oracle, declaration, type_arguments, span, Some(parent))
    }

    /// Like [`instantiate`](Self::instantiate), but trailing parameters with defaults may be omitted.
    /// Defaults may mention earlier parameters; they are substituted before use.
    pub fn instantiate_with_defaults(
        &mut self,
        registry: &GenericRegistry,
        oracle: &dyn TraitOracle,
        declaration: &str,
        mut type_arguments: Vec<Type>,
        span: Option<Span>,
    ) -> Result<InstantiationId, GenericError> {
        if let Some(generic) = registry.lookup(declaration) {
            let names = generic.parameter_names();
            for parameter in generic.parameters().iter().skip(type_arguments.len()) {
                let Some(default) = &parameter.default else {
                    break;
                };
                let filled = substitute(default, &names[..type_arguments.len()], &type_arguments)
                    .into_owned();
                type_arguments.push(filled);
            }
        }
        self.instantiate(registry, oracle, declaration, type_arguments, span)
    }

    fn resolve(
        &mut self,
        registry: &GenericRegistry,
        oracle: &dyn TraitOracle,
        declaration: &str,
        type_arguments: Vec<Type>,
        span: Option<Span>,
        parent: Option<InstantiationId>,
    ) -> Result<InstantiationId, GenericError> {
        if let Err(error) = self.validate(registry, oracle, declaration, &type_arguments, span) {
            return Err(self.record(error));
        }

        if let Some(existing) = self.find_interned(declaration, &type_arguments) {
            trace!(generic = declaration, id = existing.0, "reusing interned instantiation");
            if let Some(parent) = parent {
                self.add_expansion_edge(parent, existing);
            }
            return Ok(existing);
        }

        let depth = parent
            .and_then(|parent| self.instantiation(parent))
            .map_or(0, |parent| parent.depth + 1);
        if depth > self.config.max_expansion_depth {
            let error = GenericError::RecursiveInstantiation {
                declaration: declaration.to_string(),
                type_arguments,
                limit: self.config.max_expansion_depth,
                span: to_source_span(span),
            };
            return Err(self.record(error));
        }

        let id = InstantiationId(self.instantiations.len());
        debug!(
            generic = declaration,
            id = id.0,
            depth,
            "created instantiation"
        );
        self.push_instantiation(GenericInstantiation {
            id,
            declaration: declaration.to_string(),
            type_arguments,
            monomorphized: false,
            span,
            depth,
            requested_by: parent,
        });
        if let Some(parent) = parent {
            self.add_expansion_edge(parent, id);
        }
        Ok(id)
    }

    fn validate(
        &self,
        registry: &GenericRegistry,
        oracle: &dyn TraitOracle,
        name: &str,
        type_arguments: &[Type],
        span: Option<Span>,
    ) -> Result<Arc<GenericDeclaration>, GenericError> {
        let declaration = registry
            .lookup(name)
            .cloned()
            .ok_or_else(|| GenericError::UnknownGeneric {
                name: name.to_string(),
                span: to_source_span(span),
            })?;

        if type_arguments.len() != declaration.arity() {
            return Err(GenericError::WrongNumberOfTypeArgs {
                name: name.to_string(),
                expected: declaration.arity(),
                actual: type_arguments.len(),
                span: to_source_span(span),
            });
        }

        for (parameter, argument) in declaration.parameters().iter().zip(type_arguments) {
            let invalid = |reason: String| GenericError::InvalidTypeArg {
                declaration: name.to_string(),
                parameter: parameter.name.clone(),
                argument: argument.clone(),
                reason,
                span: to_source_span(span),
            };

            if self.config.reject_open_arguments && argument.has_params() {
                return Err(invalid(
                    "type arguments must be concrete to be instantiated".to_string(),
                ));
            }

            if self.config.check_kinds {
                if let (Some(expected), Some(found)) = (&parameter.kind, Kind::of(argument)) {
                    if *expected != found {
                        return Err(invalid(format!(
                            "expected a type of kind {expected}, found kind {found}"
                        )));
                    }
                }
            }
        }

        for (parameter, argument) in declaration.parameters().iter().zip(type_arguments) {
            for bound in &parameter.bounds {
                if !oracle.check_trait_bounds(argument, std::slice::from_ref(bound)) {
                    return Err(GenericError::UnsatisfiedBound {
                        declaration: name.to_string(),
                        parameter: parameter.name.clone(),
                        argument: argument.clone(),
                        bound: bound.trait_name.clone(),
                        span: to_source_span(span.or(bound.span)),
                    });
                }
            }
        }

        let names = declaration.parameter_names();
        for clause in declaration.where_clauses() {
            let subject = substitute(&clause.subject, &names[..], type_arguments);
            for trait_name in &clause.traits {
                if !oracle.implements_trait(&subject, trait_name) {
                    return Err(GenericError::UnsatisfiedWhereClause {
                        declaration: name.to_string(),
                        clause: subject.into_owned(),
                        trait_name: trait_name.clone(),
                        span: to_source_span(span.or(clause.span)),
                    });
                }
            }
        }

        Ok(declaration)
    }

    fn find_interned(&self, declaration: &str, type_arguments: &[Type]) -> Option<InstantiationId> {
        self.by_declaration
            .get(declaration)?
            .iter()
            .copied()
            .find(|id| self.instantiations[id.0].type_arguments == type_arguments)
    }

    fn push_instantiation(&mut self, instantiation: GenericInstantiation) {
        let id = instantiation.id;
        self.by_declaration
            .entry(instantiation.declaration.clone())
            .or_default()
            .push(id);
        self.nodes.push(self.expansion_graph.add_node(id));
        self.instantiations.push(instantiation);
    }

    fn add_expansion_edge(&mut self, parent: InstantiationId, child: InstantiationId) {
        let (Some(&from), Some(&to)) = (self.nodes.get(parent.0), self.nodes.get(child.0)) else {
            return;
        };
        if self.expansion_graph.find_edge(from, to).is_none() {
            self.expansion_graph.add_edge(from, to, ());
        }
    }

    /// Append an error to the accumulated list and hand it back to the caller
    pub(crate) fn record(&mut self, error: GenericError) -> GenericError {
        warn!(kind = ?error.kind(), "{error}");
        self.errors.push(error.clone());
        error
    }

    /// Use-site compatibility: may `actual` stand in where `expected` is required?
    ///
    /// Both must instantiate the same declaration; each position is compared under its
    /// parameter's variance, with unannotated parameters treated as invariant.
    pub fn is_substitutable(
        &self,
        registry: &GenericRegistry,
        actual: InstantiationId,
        expected: InstantiationId,
        subtypes: &dyn SubtypeOracle,
    ) -> bool {
        if actual == expected {
            return true;
        }
        let (Some(actual), Some(expected)) = (self.instantiation(actual), self.instantiation(expected))
        else {
            return false;
        };
        if actual.declaration != expected.declaration {
            return false;
        }
        let Some(declaration) = registry.lookup(&actual.declaration) else {
            return false;
        };

        declaration
            .parameters()
            .iter()
            .zip(actual.type_arguments.iter().zip(&expected.type_arguments))
            .all(|(parameter, (actual, expected))| {
                parameter
                    .effective_variance()
                    .allows(actual, expected, subtypes)
            })
    }

    /// Groups of instantiations in the order code generation should emit them.
    ///
    /// Every group comes after the groups its members expand into. Instantiations that
    /// need each other share a group. Ids inside a group are ascending.
    pub fn emission_order(&self) -> Vec<Vec<InstantiationId>> {
        algo::tarjan_scc(&self.expansion_graph)
            .into_iter()
            .map(|component| {
                let mut ids: Vec<InstantiationId> = component
                    .into_iter()
                    .map(|node| self.expansion_graph[node])
                    .collect();
                ids.sort();
                ids
            })
            .collect()
    }

    /// Direct expansion dependencies of an instantiation
    pub fn expansion_children(&self, id: InstantiationId) -> Vec<InstantiationId> {
        let Some(&node) = self.nodes.get(id.0) else {
            return Vec::new();
        };
        let mut children: Vec<InstantiationId> = self
            .expansion_graph
            .neighbors(node)
            .map(|child| self.expansion_graph[child])
            .collect();
        children.sort();
        children
    }

    pub fn instantiation(&self, id: InstantiationId) -> Option<&GenericInstantiation> {
        self.instantiations.get(id.0)
    }

    /// All instantiations in creation order
    pub fn instantiations(&self) -> &[GenericInstantiation] {
        &self.instantiations
    }

    pub fn instantiations_of<'a>(
        &'a self,
        declaration: &str,
    ) -> impl Iterator<Item = &'a GenericInstantiation> + 'a {
        self.by_declaration
            .get(declaration)
            .into_iter()
            .flatten()
            .map(|id| &self.instantiations[id.0])
    }

    pub fn len(&self) -> usize {
        self.instantiations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instantiations.is_empty()
    }

    pub fn errors(&self) -> &[GenericError] {
        &self.errors
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Drain the accumulated errors, e.g. at the end of a compilation pass
    pub fn take_errors(&mut self) -> Vec<GenericError> {
        std::mem::take(&mut self.errors)
    }

    /// Instantiations still waiting for an artifact, in creation order
    pub(crate) fn pending(&self) -> Vec<InstantiationId> {
        self.instantiations
            .iter()
            .filter(|instantiation| !instantiation.monomorphized)
            .map(|instantiation| instantiation.id)
            .collect()
    }

    pub(crate) fn mark_monomorphized(&mut self, id: InstantiationId) {
        if let Some(instantiation) = self.instantiations.get_mut(id.0) {
            instantiation.monomorphized = true;
        }
    }

    /// Fold another resolver's instantiations and errors into this one.
    ///
    /// Only instantiations whose declaration passes `accepts` are taken over; the others
    /// were validated against a declaration this resolver does not know. Returns, for each
    /// of `other`'s instantiations by index, the id it now has here, if any. Flags and
    /// depths travel with the instantiation; one that already exists here keeps its own flag.
    pub(crate) fn absorb(
        &mut self,
        other: InstantiationResolver,
        accepts: impl Fn(&str) -> bool,
    ) -> Vec<Option<InstantiationId>> {
        let mut remap: Vec<Option<InstantiationId>> = Vec::with_capacity(other.instantiations.len());

        for instantiation in &other.instantiations {
            if !accepts(&instantiation.declaration) {
                debug!(
                    generic = %instantiation.declaration,
                    "dropping instantiation of a conflicting declaration"
                );
                remap.push(None);
                continue;
            }
            let id = match self.find_interned(&instantiation.declaration, &instantiation.type_arguments) {
                Some(existing) => existing,
                None => {
                    let id = InstantiationId(self.instantiations.len());
                    self.push_instantiation(GenericInstantiation {
                        id,
                        requested_by: instantiation
                            .requested_by
                            .and_then(|parent| remap.get(parent.0).copied().flatten()),
                        ..instantiation.clone()
                    });
                    id
                }
            };
            remap.push(Some(id));
        }

        for edge in other.expansion_graph.raw_edges() {
            let parent = other.expansion_graph[edge.source()];
            let child = other.expansion_graph[edge.target()];
            if let (Some(parent), Some(child)) = (remap[parent.0], remap[child.0]) {
                self.add_expansion_edge(parent, child);
            }
        }

        self.errors.extend(other.errors);
        remap
    }
}

impl Default for InstantiationResolver {
    fn default() -> Self {
        Self::new(GenericsConfig::default())
    }
}
