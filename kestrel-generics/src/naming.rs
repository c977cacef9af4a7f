//! Deterministic names for monomorphized artifacts
//!
//! Names depend only on the declaration name and the structure of the type
//! arguments, so they are stable across runs and usable as cache keys. The token
//! grammar brackets every composite and escapes structural characters inside
//! identifiers, so distinct instantiations never share a name.

use crate::types::{PrimitiveType, Type};

/// Characters that carry structure in a name and are escaped inside identifiers
const RESERVED: [char; 9] = ['\\', ':', '[', ']', '(', ')', ',', ';', '/'];

/// Canonical, content-based token for one type argument
pub fn canonical_token(ty: &Type) -> String {
    let mut token = String::new();
    write_token(ty, &mut token);
    token
}

/// `Container:int`, `Map:string:List[int]`, or just `Unit` for zero-parameter generics
pub fn monomorphized_name(declaration: &str, type_arguments: &[Type]) -> String {
    let mut name = String::new();
    write_ident(declaration, &mut name);
    for argument in type_arguments {
        name.push(':');
        write_token(argument, &mut name);
    }
    name
}

fn write_token(ty: &Type, out: &mut String) {
    match ty {
        Type::Primitive(primitive) => out.push_str(primitive.keyword()),
        Type::Named { name, args } => {
            write_ident(name, out);
            if !args.is_empty() {
                out.push('[');
                write_tokens(args, out);
                out.push(']');
            }
        }
        Type::Param { name } => {
            out.push_str("param(");
            write_ident(name, out);
            out.push(')');
        }
        Type::Constructor { name, arity } => {
            out.push_str("ctor(");
            write_ident(name, out);
            out.push('/');
            out.push_str(&arity.to_string());
            out.push(')');
        }
        Type::Applied { head, args } => {
            out.push_str("app(");
            write_token(head, out);
            out.push(';');
            write_tokens(args, out);
            out.push(')');
        }
        Type::Function {
            params,
            return_type,
        } => {
            out.push_str("fn(");
            write_tokens(params, out);
            out.push_str(")->");
            write_token(return_type, out);
        }
        Type::Pointer { pointee, mutable } => {
            out.push_str(if *mutable { "mutptr(" } else { "ptr(" });
            write_token(pointee, out);
            out.push(')');
        }
        Type::Array { element, length } => match length {
            Some(length) => {
                out.push_str("array(");
                write_token(element, out);
                out.push(';');
                out.push_str(&length.to_string());
                out.push(')');
            }
            None => {
                out.push_str("slice(");
                write_token(element, out);
                out.push(')');
            }
        },
        Type::Tuple(elements) => {
            out.push_str("tuple(");
            write_tokens(elements, out);
            out.push(')');
        }
    }
}

fn write_ident(ident: &str, out: &mut String) {
    // `\~` marks identifiers that would otherwise read as a keyword or as nothing
    if ident.is_empty() || PrimitiveType::from_keyword(ident).is_some() {
        out.push_str("\\~");
    }
    for c in ident.chars() {
        if RESERVED.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
}

fn write_tokens(types: &[Type], out: &mut String) {
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_token(ty, out);
    }
}
