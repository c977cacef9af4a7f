//! Structural substitution of generic parameter references
//!
//! Substitution never fails and never mutates its input. When no parameter
//! reference inside a type matches, the input is handed back as `Cow::Borrowed`,
//! so callers can detect a no-op without comparing whole trees.

use crate::types::Type;
use indexmap::IndexMap;
use std::borrow::Cow;

/// Replace every reference to `parameters[i]` in `ty` with `arguments[i]`.
///
/// Names not listed in `parameters` (or listed past the end of `arguments`) are left
/// untouched, which makes partial substitution of nested generics possible.
pub fn substitute<'a, P: AsRef<str>>(
    ty: &'a Type,
    parameters: &[P],
    arguments: &[Type],
) -> Cow<'a, Type> {
    let lookup = |name: &str| {
        parameters
            .iter()
            .position(|parameter| parameter.as_ref() == name)
            .and_then(|index| arguments.get(index))
    };
    substitute_with(ty, &lookup)
}

fn substitute_with<'a, 'm>(
    ty: &'a Type,
    lookup: &dyn Fn(&str) -> Option<&'m Type>,
) -> Cow<'a, Type> {
    match ty {
        Type::Param { name } => match lookup(name) {
            Some(replacement) => Cow::Owned(replacement.clone()),
            None => Cow::Borrowed(ty),
        },
        Type::Primitive(_) | Type::Constructor { .. } => Cow::Borrowed(ty),
        Type::Named { name, args } => match substitute_all(args, lookup) {
            Some(args) => Cow::Owned(Type::Named {
                name: name.clone(),
                args,
            }),
            None => Cow::Borrowed(ty),
        },
        Type::Tuple(elements) => match substitute_all(elements, lookup) {
            Some(elements) => Cow::Owned(Type::Tuple(elements)),
            None => Cow::Borrowed(ty),
        },
        Type::Applied { head, args } => {
            let new_head = substitute_with(head, lookup);
            let new_args = substitute_all(args, lookup);
            if matches!(new_head, Cow::Borrowed(_)) && new_args.is_none() {
                return Cow::Borrowed(ty);
            }
            let args = new_args.unwrap_or_else(|| args.clone());
            Cow::Owned(apply_constructor(new_head.into_owned(), args))
        }
        Type::Function {
            params,
            return_type,
        } => {
            let new_params = substitute_all(params, lookup);
            let new_return = substitute_with(return_type, lookup);
            if new_params.is_none() && matches!(new_return, Cow::Borrowed(_)) {
                return Cow::Borrowed(ty);
            }
            Cow::Owned(Type::Function {
                params: new_params.unwrap_or_else(|| params.clone()),
                return_type: Box::new(new_return.into_owned()),
            })
        }
        Type::Pointer { pointee, mutable } => match substitute_with(pointee, lookup) {
            Cow::Owned(pointee) => Cow::Owned(Type::Pointer {
                pointee: Box::new(pointee),
                mutable: *mutable,
            }),
            Cow::Borrowed(_) => Cow::Borrowed(ty),
        },
        Type::Array { element, length } => match substitute_with(element, lookup) {
            Cow::Owned(element) => Cow::Owned(Type::Array {
                element: Box::new(element),
                length: *length,
            }),
            Cow::Borrowed(_) => Cow::Borrowed(ty),
        },
    }
}

/// Substitute each item; `None` means no item changed
fn substitute_all<'m>(
    items: &[Type],
    lookup: &dyn Fn(&str) -> Option<&'m Type>,
) -> Option<Vec<Type>> {
    let mut changed: Option<Vec<Type>> = None;
    for (index, item) in items.iter().enumerate() {
        match substitute_with(item, lookup) {
            Cow::Owned(new_item) => changed
                .get_or_insert_with(|| items[..index].to_vec())
                .push(new_item),
            Cow::Borrowed(item) => {
                if let Some(changed) = changed.as_mut() {
                    changed.push(item.clone());
                }
            }
        }
    }
    changed
}

/// Normalise an application once its head has become nominal
fn apply_constructor(head: Type, args: Vec<Type>) -> Type {
    match head {
        Type::Constructor { name, .. } => Type::Named { name, args },
        Type::Named {
            name,
            args: mut applied,
        } => {
            applied.extend(args);
            Type::Named {
                name,
                args: applied,
            }
        }
        // F := Map<string> applied to int is Map<string, int>
        Type::Applied {
            head,
            args: mut applied,
        } => {
            applied.extend(args);
            apply_constructor(*head, applied)
        }
        head => Type::Applied {
            head: Box::new(head),
            args,
        },
    }
}

/// Reusable mapping from parameter names to types
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Substitution {
    mappings: IndexMap<String, Type>,
}

impl Substitution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair parameter names with arguments positionally; extra names stay unmapped
    pub fn from_parameters<P: AsRef<str>>(parameters: &[P], arguments: &[Type]) -> Self {
        Self {
            mappings: parameters
                .iter()
                .zip(arguments)
                .map(|(parameter, argument)| (parameter.as_ref().to_string(), argument.clone()))
                .collect(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, ty: Type) {
        self.mappings.insert(name.into(), ty);
    }

    pub fn get(&self, name: &str) -> Option<&Type> {
        self.mappings.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Type)> {
        self.mappings.iter().map(|(name, ty)| (name.as_str(), ty))
    }

    /// Apply this substitution to a type
    pub fn apply<'a>(&self, ty: &'a Type) -> Cow<'a, Type> {
        substitute_with(ty, &|name: &str| self.mappings.get(name))
    }

    /// Compose this substitution with another (self applied first)
    pub fn compose(&self, other: &Substitution) -> Substitution {
        let mut result = Substitution::new();

        for (name, ty) in &self.mappings {
            result.insert(name.clone(), other.apply(ty).into_owned());
        }

        for (name, ty) in &other.mappings {
            if !result.mappings.contains_key(name) {
                result.insert(name.clone(), ty.clone());
            }
        }

        result
    }
}
