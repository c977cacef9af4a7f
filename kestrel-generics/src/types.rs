//! Structural type representation consumed by the generics engine
//!
//! Types carry no source locations so that derived equality is structural equality,
//! which is exactly what instantiation interning relies on.

use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt;

/// Built-in scalar types with fixed canonical keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveType {
    Int,
    Float,
    Bool,
    Char,
    String,
    Void,
}

lazy_static! {
    /// Keyword -> primitive lookup, shared by naming and by embedders converting surface names
    pub static ref PRIMITIVE_KEYWORDS: HashMap<&'static str, PrimitiveType> = {
        PrimitiveType::ALL
            .iter()
            .map(|primitive| (primitive.keyword(), *primitive))
            .collect()
    };
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 6] = [
        PrimitiveType::Int,
        PrimitiveType::Float,
        PrimitiveType::Bool,
        PrimitiveType::Char,
        PrimitiveType::String,
        PrimitiveType::Void,
    ];

    /// The canonical keyword used in monomorphized names
    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveType::Int => "int",
            PrimitiveType::Float => "float",
            PrimitiveType::Bool => "bool",
            PrimitiveType::Char => "char",
            PrimitiveType::String => "string",
            PrimitiveType::Void => "void",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        PRIMITIVE_KEYWORDS.get(keyword).copied()
    }
}

/// Closed set of type shapes. Every traversal matches this exhaustively.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
    /// int, float, bool, ...
    Primitive(PrimitiveType),

    /// Nominal types, optionally applied: User, List<int>, Map<string, T>
    Named { name: String, args: Vec<Type> },

    /// Reference to a generic parameter of the enclosing declaration: T
    Param { name: String },

    /// An unapplied type constructor passed to a higher-kinded parameter: List (arity 1)
    Constructor { name: String, arity: usize },

    /// Application whose head is not nominal yet, typically a higher-kinded parameter: F<T>
    Applied { head: Box<Type>, args: Vec<Type> },

    /// Function types: fn(int, T) -> T
    Function {
        params: Vec<Type>,
        return_type: Box<Type>,
    },

    /// *T / *mut T
    Pointer { pointee: Box<Type>, mutable: bool },

    /// [T; 4] when the length is known, [T] otherwise
    Array {
        element: Box<Type>,
        length: Option<usize>,
    },

    /// (A, B)
    Tuple(Vec<Type>),
}

impl Type {
    pub fn int() -> Self {
        Self::Primitive(PrimitiveType::Int)
    }

    pub fn float() -> Self {
        Self::Primitive(PrimitiveType::Float)
    }

    pub fn bool() -> Self {
        Self::Primitive(PrimitiveType::Bool)
    }

    pub fn char() -> Self {
        Self::Primitive(PrimitiveType::Char)
    }

    pub fn string() -> Self {
        Self::Primitive(PrimitiveType::String)
    }

    pub fn void() -> Self {
        Self::Primitive(PrimitiveType::Void)
    }

    /// Create a nominal type with no type arguments
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Create an applied nominal type (e.g., List<T>)
    pub fn generic(name: impl Into<String>, args: Vec<Type>) -> Self {
        Self::Named {
            name: name.into(),
            args,
        }
    }

    /// Create a generic parameter reference
    pub fn param(name: impl Into<String>) -> Self {
        Self::Param { name: name.into() }
    }

    pub fn constructor(name: impl Into<String>, arity: usize) -> Self {
        Self::Constructor {
            name: name.into(),
            arity,
        }
    }

    pub fn applied(head: Type, args: Vec<Type>) -> Self {
        Self::Applied {
            head: Box::new(head),
            args,
        }
    }

    pub fn function(params: Vec<Type>, return_type: Type) -> Self {
        Self::Function {
            params,
            return_type: Box::new(return_type),
        }
    }

    pub fn pointer(pointee: Type) -> Self {
        Self::Pointer {
            pointee: Box::new(pointee),
            mutable: false,
        }
    }

    pub fn mut_pointer(pointee: Type) -> Self {
        Self::Pointer {
            pointee: Box::new(pointee),
            mutable: true,
        }
    }

    pub fn array(element: Type, length: usize) -> Self {
        Self::Array {
            element: Box::new(element),
            length: Some(length),
        }
    }

    pub fn slice(element: Type) -> Self {
        Self::Array {
            element: Box::new(element),
            length: None,
        }
    }

    pub fn tuple(elements: Vec<Type>) -> Self {
        Self::Tuple(elements)
    }

    /// Check whether any generic parameter reference remains inside this type
    pub fn has_params(&self) -> bool {
        match self {
            Self::Param { .. } => true,
            Self::Primitive(_) | Self::Constructor { .. } => false,
            Self::Named { args, .. } | Self::Tuple(args) => args.iter().any(Type::has_params),
            Self::Applied { head, args } => head.has_params() || args.iter().any(Type::has_params),
            Self::Function {
                params,
                return_type,
            } => params.iter().any(Type::has_params) || return_type.has_params(),
            Self::Pointer { pointee, .. } => pointee.has_params(),
            Self::Array { element, .. } => element.has_params(),
        }
    }

    /// Collect the names of all parameter references, in first-occurrence order
    pub fn param_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_param_names(&mut names);
        names
    }

    fn collect_param_names<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Self::Param { name } => {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
            Self::Primitive(_) | Self::Constructor { .. } => {}
            Self::Named { args, .. } | Self::Tuple(args) => {
                args.iter().for_each(|arg| arg.collect_param_names(names))
            }
            Self::Applied { head, args } => {
                head.collect_param_names(names);
                args.iter().for_each(|arg| arg.collect_param_names(names));
            }
            Self::Function {
                params,
                return_type,
            } => {
                params.iter().for_each(|param| param.collect_param_names(names));
                return_type.collect_param_names(names);
            }
            Self::Pointer { pointee, .. } => pointee.collect_param_names(names),
            Self::Array { element, .. } => element.collect_param_names(names),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Type]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// Display implementation for types (for error messages)
impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(primitive) => write!(f, "{}", primitive.keyword()),
            Self::Named { name, args } => {
                write!(f, "{name}")?;
                if !args.is_empty() {
                    write!(f, "<")?;
                    write_list(f, args)?;
                    write!(f, ">")?;
                }
                Ok(())
            }
            Self::Param { name } => write!(f, "{name}"),
            Self::Constructor { name, .. } => write!(f, "{name}"),
            Self::Applied { head, args } => {
                write!(f, "{head}<")?;
                write_list(f, args)?;
                write!(f, ">")
            }
            Self::Function {
                params,
                return_type,
            } => {
                write!(f, "fn(")?;
                write_list(f, params)?;
                write!(f, ") -> {return_type}")
            }
            Self::Pointer { pointee, mutable } => {
                if *mutable {
                    write!(f, "*mut {pointee}")
                } else {
                    write!(f, "*{pointee}")
                }
            }
            Self::Array { element, length } => match length {
                Some(length) => write!(f, "[{element}; {length}]"),
                None => write!(f, "[{element}]"),
            },
            Self::Tuple(elements) => {
                write!(f, "(")?;
                write_list(f, elements)?;
                write!(f, ")")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primitive_keywords_round_trip_through_table() {
        for primitive in PrimitiveType::ALL {
            assert_eq!(PrimitiveType::from_keyword(primitive.keyword()), Some(primitive));
        }
        assert_eq!(PrimitiveType::from_keyword("Integer"), None);
    }

    #[test]
    fn test_display_formats() {
        let map = Type::generic("Map", vec![Type::string(), Type::param("V")]);
        assert_eq!(map.to_string(), "Map<string, V>");

        let callback = Type::function(vec![Type::int(), Type::mut_pointer(Type::char())], Type::void());
        assert_eq!(callback.to_string(), "fn(int, *mut char) -> void");

        let hkt = Type::applied(Type::param("F"), vec![Type::array(Type::bool(), 4)]);
        assert_eq!(hkt.to_string(), "F<[bool; 4]>");

        assert_eq!(Type::tuple(vec![Type::float(), Type::slice(Type::int())]).to_string(), "(float, [int])");
    }

    #[test]
    fn test_param_detection() {
        let nested = Type::generic(
            "Pair",
            vec![Type::pointer(Type::param("A")), Type::function(vec![], Type::param("B"))],
        );
        assert!(nested.has_params());
        assert_eq!(nested.param_names(), vec!["A", "B"]);

        let concrete = Type::generic("List", vec![Type::int()]);
        assert!(!concrete.has_params());
        assert!(concrete.param_names().is_empty());
    }

    #[test]
    fn test_structural_equality_ignores_construction_path() {
        let a = Type::generic("List", vec![Type::int()]);
        let b = Type::Named {
            name: "List".to_string(),
            args: vec![Type::Primitive(PrimitiveType::Int)],
        };
        assert_eq!(a, b);
        assert_ne!(a, Type::generic("List", vec![Type::float()]));
    }
}
