//! Generic declaration registry
//!
//! Declarations are assembled with a [`DeclarationBuilder`], frozen by `build()`, and
//! then stored behind `Arc` in a [`GenericRegistry`]. Once registered, a declaration is
//! shared read-only with every instantiation request that names it.

use crate::error::{to_source_span, GenericError};
use crate::kinds::{Kind, Variance};
use crate::span::Span;
use crate::types::Type;
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::debug;

/// A trait a generic parameter's argument must implement: `T: Printable`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TraitBound {
    pub trait_name: String,
    pub span: Option<Span>,
}

impl TraitBound {
    pub fn new(trait_name: impl Into<String>) -> Self {
        Self {
            trait_name: trait_name.into(),
            span: None,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenericParameter {
    pub name: String,
    pub bounds: Vec<TraitBound>,
    pub default: Option<Type>,
    pub span: Option<Span>,
    pub variance: Option<Variance>,
    pub kind: Option<Kind>,
}

impl GenericParameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bounds: Vec::new(),
            default: None,
            span: None,
            variance: None,
            kind: None,
        }
    }

    pub fn with_bound(mut self, bound: TraitBound) -> Self {
        self.bounds.push(bound);
        self
    }

    pub fn with_default(mut self, default: Type) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    pub fn with_variance(mut self, variance: Variance) -> Self {
        self.variance = Some(variance);
        self
    }

    pub fn with_kind(mut self, kind: Kind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Variance used for compatibility checks; unannotated parameters are invariant
    pub fn effective_variance(&self) -> Variance {
        self.variance.unwrap_or_default()
    }
}

/// `where List<T>: Printable + Hash`
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    pub subject: Type,
    pub traits: Vec<String>,
    pub span: Option<Span>,
}

impl WhereClause {
    pub fn new<I, S>(subject: Type, traits: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            subject,
            traits: traits.into_iter().map(Into::into).collect(),
            span: None,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}

/// A generic function or type template. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct GenericDeclaration {
    name: String,
    parameters: Vec<GenericParameter>,
    where_clauses: Vec<WhereClause>,
    signature: Option<Type>,
    span: Option<Span>,
}

impl GenericDeclaration {
    pub fn builder(name: impl Into<String>) -> DeclarationBuilder {
        DeclarationBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parameters in declaration order; position matches type argument position
    pub fn parameters(&self) -> &[GenericParameter] {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&GenericParameter> {
        self.parameters.iter().find(|parameter| parameter.name == name)
    }

    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters
            .iter()
            .map(|parameter| parameter.name.as_str())
            .collect()
    }

    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    pub fn where_clauses(&self) -> &[WhereClause] {
        &self.where_clauses
    }

    /// The declaration's shape in terms of its parameters, e.g. `fn(T) -> List<T>`
    pub fn signature(&self) -> Option<&Type> {
        self.signature.as_ref()
    }

    pub fn span(&self) -> Option<Span> {
        self.span
    }
}

/// Accumulates parameters, bounds and where clauses before a declaration is frozen
#[derive(Debug, Clone)]
pub struct DeclarationBuilder {
    declaration: GenericDeclaration,
    problems: Vec<GenericError>,
}

impl DeclarationBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            declaration: GenericDeclaration {
                name: name.into(),
                parameters: Vec::new(),
                where_clauses: Vec::new(),
                signature: None,
                span: None,
            },
            problems: Vec::new(),
        }
    }

    pub fn span(&mut self, span: Span) -> &mut Self {
        self.declaration.span = Some(span);
        self
    }

    pub fn add_parameter(&mut self, parameter: GenericParameter) -> &mut Self {
        if self.declaration.parameter(&parameter.name).is_some() {
            self.problems.push(GenericError::DuplicateParameter {
                declaration: self.declaration.name.clone(),
                parameter: parameter.name.clone(),
                span: to_source_span(parameter.span),
            });
            return self;
        }
        self.declaration.parameters.push(parameter);
        self
    }

    /// Append a bound to an already-added parameter
    pub fn add_bound(&mut self, parameter: &str, bound: TraitBound) -> &mut Self {
        match self
            .declaration
            .parameters
            .iter_mut()
            .find(|candidate| candidate.name == parameter)
        {
            Some(target) => target.bounds.push(bound),
            None => self.problems.push(GenericError::UnknownParameter {
                declaration: self.declaration.name.clone(),
                parameter: parameter.to_string(),
                span: to_source_span(bound.span),
            }),
        }
        self
    }

    pub fn add_where_clause(&mut self, clause: WhereClause) -> &mut Self {
        self.declaration.where_clauses.push(clause);
        self
    }

    pub fn with_signature(&mut self, signature: Type) -> &mut Self {
        self.declaration.signature = Some(signature);
        self
    }

    /// Freeze the declaration, reporting the first construction problem if any
    pub fn build(self) -> Result<GenericDeclaration, GenericError> {
        match self.problems.into_iter().next() {
            Some(problem) => Err(problem),
            None => Ok(self.declaration),
        }
    }
}

/// Name -> declaration store for one compilation unit
#[derive(Debug, Clone, Default)]
pub struct GenericRegistry {
    declarations: IndexMap<String, Arc<GenericDeclaration>>,
}

impl GenericRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a declaration. The first declaration of a name wins.
    pub fn register(
        &mut self,
        declaration: GenericDeclaration,
    ) -> Result<Arc<GenericDeclaration>, GenericError> {
        self.register_shared(Arc::new(declaration))
    }

    /// Register a declaration that is already shared with another registry
    pub fn register_shared(
        &mut self,
        declaration: Arc<GenericDeclaration>,
    ) -> Result<Arc<GenericDeclaration>, GenericError> {
        if let Some(existing) = self.declarations.get(declaration.name()) {
            return Err(GenericError::DuplicateGeneric {
                name: declaration.name().to_string(),
                span: to_source_span(declaration.span()),
                previous_span: to_source_span(existing.span()),
            });
        }

        debug!(
            generic = declaration.name(),
            arity = declaration.arity(),
            "registered generic declaration"
        );
        self.declarations
            .insert(declaration.name().to_string(), Arc::clone(&declaration));
        Ok(declaration)
    }

    pub fn lookup(&self, name: &str) -> Option<&Arc<GenericDeclaration>> {
        self.declarations.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.declarations.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Declarations in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Arc<GenericDeclaration>> {
        self.declarations.values()
    }
}
