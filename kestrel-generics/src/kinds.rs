//! Kinds and variance for generic parameters
//!
//! Kinds say whether a parameter stands for a type (`*`) or a type constructor
//! (`* -> *`, ...). Variance says in which direction a parameter position may be
//! substituted at a use site. Neither affects substitution itself.

use crate::traits::SubtypeOracle;
use crate::types::Type;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Kind {
    /// An ordinary concrete type
    Star,
    /// A type constructor taking `from` and producing `to`
    Arrow(Box<Kind>, Box<Kind>),
}

impl Kind {
    pub fn arrow(from: Kind, to: Kind) -> Self {
        Kind::Arrow(Box::new(from), Box::new(to))
    }

    /// Kind of a constructor taking `arity` concrete type arguments: `* -> ... -> *`
    pub fn constructor(arity: usize) -> Self {
        (0..arity).fold(Kind::Star, |acc, _| Kind::arrow(Kind::Star, acc))
    }

    /// Number of arguments that must be applied before reaching `*`
    pub fn arity(&self) -> usize {
        match self {
            Kind::Star => 0,
            Kind::Arrow(_, to) => 1 + to.arity(),
        }
    }

    pub fn is_star(&self) -> bool {
        matches!(self, Kind::Star)
    }

    /// Infer the kind of a type argument. Parameter references have no known kind.
    pub fn of(ty: &Type) -> Option<Kind> {
        match ty {
            Type::Param { .. } => None,
            Type::Constructor { arity, .. } => Some(Kind::constructor(*arity)),
            Type::Applied { head, args } => match Kind::of(head)? {
                // Partial application of a constructor leaves a smaller constructor
                kind if kind.arity() >= args.len() => Some(Kind::constructor(kind.arity() - args.len())),
                _ => None,
            },
            Type::Primitive(_)
            | Type::Named { .. }
            | Type::Function { .. }
            | Type::Pointer { .. }
            | Type::Array { .. }
            | Type::Tuple(_) => Some(Kind::Star),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Star => write!(f, "*"),
            Kind::Arrow(from, to) if from.is_star() => write!(f, "* -> {to}"),
            Kind::Arrow(from, to) => write!(f, "({from}) -> {to}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Variance {
    /// A subtype may stand in for the expected type
    Covariant,
    /// A supertype may stand in for the expected type
    Contravariant,
    /// Only the exact type is accepted
    #[default]
    Invariant,
    /// Either direction is accepted
    Bivariant,
}

impl Variance {
    /// Swap co- and contravariance, as happens in argument positions of function types
    pub fn flip(self) -> Self {
        match self {
            Variance::Covariant => Variance::Contravariant,
            Variance::Contravariant => Variance::Covariant,
            other => other,
        }
    }

    /// Variance of a position nested `inner` inside a position of variance `self`
    pub fn compose(self, inner: Variance) -> Self {
        match (self, inner) {
            (Variance::Invariant, _) | (_, Variance::Invariant) => Variance::Invariant,
            (Variance::Bivariant, _) | (_, Variance::Bivariant) => Variance::Bivariant,
            (Variance::Covariant, inner) => inner,
            (Variance::Contravariant, inner) => inner.flip(),
        }
    }

    /// Whether `actual` may be used where `expected` is required in a position of this variance.
    ///
    /// Structural types are compared position by position: function parameters flip the
    /// variance, mutable pointees are invariant, and everything else keeps it. Any other
    /// pair of types is handed to the subtype oracle as a whole.
    pub fn allows(self, actual: &Type, expected: &Type, subtypes: &dyn SubtypeOracle) -> bool {
        if actual == expected {
            return true;
        }
        if self == Variance::Invariant {
            return false;
        }
        match (actual, expected) {
            (
                Type::Function {
                    params: actual_params,
                    return_type: actual_return,
                },
                Type::Function {
                    params: expected_params,
                    return_type: expected_return,
                },
            ) if actual_params.len() == expected_params.len() => {
                let parameters = self.compose(Variance::Contravariant);
                actual_params
                    .iter()
                    .zip(expected_params)
                    .all(|(actual, expected)| parameters.allows(actual, expected, subtypes))
                    && self.allows(actual_return, expected_return, subtypes)
            }
            (Type::Tuple(actual), Type::Tuple(expected)) if actual.len() == expected.len() => actual
                .iter()
                .zip(expected)
                .all(|(actual, expected)| self.allows(actual, expected, subtypes)),
            (
                Type::Pointer {
                    pointee: actual,
                    mutable: actual_mutable,
                },
                Type::Pointer {
                    pointee: expected,
                    mutable: expected_mutable,
                },
            ) if actual_mutable == expected_mutable => {
                let pointee = if *actual_mutable {
                    self.compose(Variance::Invariant)
                } else {
                    self
                };
                pointee.allows(actual, expected, subtypes)
            }
            (
                Type::Array {
                    element: actual,
                    length: actual_length,
                },
                Type::Array {
                    element: expected,
                    length: expected_length,
                },
            ) if actual_length == expected_length => self.allows(actual, expected, subtypes),
            _ => self.allows_whole(actual, expected, subtypes),
        }
    }

    fn allows_whole(self, actual: &Type, expected: &Type, subtypes: &dyn SubtypeOracle) -> bool {
        match self {
            Variance::Covariant => subtypes.is_subtype(actual, expected),
            Variance::Contravariant => subtypes.is_subtype(expected, actual),
            Variance::Invariant => false,
            Variance::Bivariant => {
                subtypes.is_subtype(actual, expected) || subtypes.is_subtype(expected, actual)
            }
        }
    }
}

impl fmt::Display for Variance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Variance::Covariant => "covariant",
            Variance::Contravariant => "contravariant",
            Variance::Invariant => "invariant",
            Variance::Bivariant => "bivariant",
        };
        write!(f, "{label}")
    }
}
