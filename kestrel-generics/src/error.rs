//! Error types for generic resolution and monomorphization
//!
//! Every error is a value: it is returned to the caller and also accumulated in the
//! owning context so one pass can surface many independent problems.

use crate::span::Span;
use crate::types::Type;
use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Discriminant of [`GenericError`], handy for matching and counting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenericErrorKind {
    DuplicateGeneric,
    UnknownGeneric,
    WrongNumberOfTypeArgs,
    UnsatisfiedBound,
    UnsatisfiedWhereClause,
    InvalidTypeArg,
    RecursiveInstantiation,
    DuplicateParameter,
    UnknownParameter,
}

#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum GenericError {
    #[error("Generic `{name}` is already declared")]
    #[diagnostic(
        code(kestrel::generics::duplicate_generic),
        help("Rename one of the declarations; generic names are unique per compilation unit")
    )]
    DuplicateGeneric {
        name: String,
        #[label("redeclared here")]
        span: Option<SourceSpan>,
        #[label("first declared here")]
        previous_span: Option<SourceSpan>,
    },

    #[error("Unknown generic `{name}`")]
    #[diagnostic(
        code(kestrel::generics::unknown_generic),
        help("Declare `{name}` before instantiating it")
    )]
    UnknownGeneric {
        name: String,
        #[label("not a registered generic")]
        span: Option<SourceSpan>,
    },

    #[error("Wrong number of type arguments for `{name}`: expected {expected}, got {actual}")]
    #[diagnostic(
        code(kestrel::generics::wrong_number_of_type_args),
        help("`{name}` takes exactly {expected} type argument(s)")
    )]
    WrongNumberOfTypeArgs {
        name: String,
        expected: usize,
        actual: usize,
        #[label("expected {expected} type argument(s), got {actual}")]
        span: Option<SourceSpan>,
    },

    #[error("Type `{argument}` does not satisfy bound `{parameter}: {bound}` of `{declaration}`")]
    #[diagnostic(
        code(kestrel::generics::unsatisfied_bound),
        help("Implement {bound} for {argument}, or pick a different type argument")
    )]
    UnsatisfiedBound {
        declaration: String,
        parameter: String,
        argument: Type,
        bound: String,
        #[label("`{argument}` does not implement {bound}")]
        span: Option<SourceSpan>,
    },

    #[error("Where clause `{clause}: {trait_name}` of `{declaration}` is not satisfied")]
    #[diagnostic(
        code(kestrel::generics::unsatisfied_where_clause),
        help("Implement {trait_name} for {clause}")
    )]
    UnsatisfiedWhereClause {
        declaration: String,
        /// The clause subject after substitution
        clause: Type,
        trait_name: String,
        #[label("required by a where clause on `{declaration}`")]
        span: Option<SourceSpan>,
    },

    #[error("Invalid type argument `{argument}` for parameter `{parameter}` of `{declaration}`: {reason}")]
    #[diagnostic(code(kestrel::generics::invalid_type_arg))]
    InvalidTypeArg {
        declaration: String,
        parameter: String,
        argument: Type,
        reason: String,
        #[label("{reason}")]
        span: Option<SourceSpan>,
    },

    #[error("Instantiating `{declaration}` exceeds the expansion depth limit of {limit}")]
    #[diagnostic(
        code(kestrel::generics::recursive_instantiation),
        help("This usually means a generic instantiates itself with ever-growing type arguments")
    )]
    RecursiveInstantiation {
        declaration: String,
        type_arguments: Vec<Type>,
        limit: usize,
        #[label("expansion does not terminate")]
        span: Option<SourceSpan>,
    },

    #[error("Generic parameter `{parameter}` is declared more than once on `{declaration}`")]
    #[diagnostic(code(kestrel::generics::duplicate_parameter))]
    DuplicateParameter {
        declaration: String,
        parameter: String,
        #[label("duplicate parameter")]
        span: Option<SourceSpan>,
    },

    #[error("`{declaration}` has no generic parameter named `{parameter}`")]
    #[diagnostic(code(kestrel::generics::unknown_parameter))]
    UnknownParameter {
        declaration: String,
        parameter: String,
        #[label("unknown parameter")]
        span: Option<SourceSpan>,
    },
}

impl GenericError {
    pub fn kind(&self) -> GenericErrorKind {
        match self {
            Self::DuplicateGeneric { .. } => GenericErrorKind::DuplicateGeneric,
            Self::UnknownGeneric { .. } => GenericErrorKind::UnknownGeneric,
            Self::WrongNumberOfTypeArgs { .. } => GenericErrorKind::WrongNumberOfTypeArgs,
            Self::UnsatisfiedBound { .. } => GenericErrorKind::UnsatisfiedBound,
            Self::UnsatisfiedWhereClause { .. } => GenericErrorKind::UnsatisfiedWhereClause,
            Self::InvalidTypeArg { .. } => GenericErrorKind::InvalidTypeArg,
            Self::RecursiveInstantiation { .. } => GenericErrorKind::RecursiveInstantiation,
            Self::DuplicateParameter { .. } => GenericErrorKind::DuplicateParameter,
            Self::UnknownParameter { .. } => GenericErrorKind::UnknownParameter,
        }
    }

    /// Primary location of the error, if the front end supplied one
    pub fn span(&self) -> Option<SourceSpan> {
        match self {
            Self::DuplicateGeneric { span, .. }
            | Self::UnknownGeneric { span, .. }
            | Self::WrongNumberOfTypeArgs { span, .. }
            | Self::UnsatisfiedBound { span, .. }
            | Self::UnsatisfiedWhereClause { span, .. }
            | Self::InvalidTypeArg { span, .. }
            | Self::RecursiveInstantiation { span, .. }
            | Self::DuplicateParameter { span, .. }
            | Self::UnknownParameter { span, .. } => *span,
        }
    }
}

/// Configuration loading errors
#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("Failed to parse generics configuration: {0}")]
    #[diagnostic(code(kestrel::generics::config))]
    Parse(#[from] toml::de::Error),
}

/// Helper for creating source spans from optional spans
pub fn to_source_span(span: Option<Span>) -> Option<SourceSpan> {
    span.map(|s| SourceSpan::new(s.start.into(), s.len()))
}
