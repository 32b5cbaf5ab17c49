//! Type naming and coarse shape classification.

use msgtools_schema::prelude::*;
use quote::ToTokens;
use std::collections::HashSet;
use syn::{GenericArgument, PathArguments, Type, TypeParamBound};

const PRIMITIVES: [&str; 16] = [
    "bool", "char", "f32", "f64", "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32",
    "u64", "u128", "usize",
];

const COLLECTIONS: [&str; 7] = [
    "Vec",
    "VecDeque",
    "LinkedList",
    "BinaryHeap",
    "HashSet",
    "BTreeSet",
    "IndexSet",
];

const MAPS: [&str; 3] = ["HashMap", "BTreeMap", "IndexMap"];

/// Source-like spelling of a type, e.g. `Box<dyn std::error::Error + Send>`.
#[must_use]
pub fn type_name(ty: &Type) -> String {
    let raw = ty.to_token_stream().to_string();
    let mut out = String::with_capacity(raw.len());

    for part in raw.split(' ') {
        if let (Some(prev), Some(next)) = (out.chars().last(), part.chars().next()) {
            let spaced = (is_word(prev) && is_word(next))
                || matches!(prev, ',' | ';' | '+' | '=')
                || matches!(next, '+' | '=');
            if spaced {
                out.push(' ');
            }
        }
        out.push_str(part);
    }

    out
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '\''
}

// Last path segment and its generic arguments.
fn last_segment(ty: &Type) -> Option<(String, Vec<&Type>)> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    let args = match &segment.arguments {
        PathArguments::AngleBracketed(args) => args
            .args
            .iter()
            .filter_map(|a| match a {
                GenericArgument::Type(t) => Some(t),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    };

    Some((segment.ident.to_string(), args))
}

/// Simple name a type is looked up by, without module path or generics.
#[must_use]
pub fn simple_name(name: &str) -> &str {
    let base = name.split('<').next().unwrap_or(name);
    base.rsplit("::").next().unwrap_or(base).trim()
}

///
/// Classifier
/// needs the throwable types of the scanned sources to recognise cause-like values
///

#[derive(Clone, Debug, Default)]
pub struct Classifier {
    throwables: HashSet<String>,
}

impl Classifier {
    #[must_use]
    pub const fn new(throwables: HashSet<String>) -> Self {
        Self { throwables }
    }

    #[must_use]
    pub fn is_throwable(&self, name: &str) -> bool {
        self.throwables.contains(simple_name(name))
    }

    #[must_use]
    pub fn type_ref(&self, ty: &Type) -> TypeRef {
        TypeRef::new(type_name(ty), self.shape(ty))
    }

    #[must_use]
    pub fn shape(&self, ty: &Type) -> TypeShape {
        match ty {
            Type::Tuple(t) if t.elems.is_empty() => TypeShape::Unit,
            Type::Paren(t) => self.shape(&t.elem),
            Type::Group(t) => self.shape(&t.elem),
            Type::Array(_) | Type::Slice(_) => TypeShape::Array,
            Type::Reference(r) => match &*r.elem {
                Type::Path(p) if p.path.is_ident("str") => TypeShape::Str,
                elem => self.shape(elem),
            },
            Type::TraitObject(t) => Self::bounds_shape(t.bounds.iter()),
            Type::ImplTrait(t) => Self::bounds_shape(t.bounds.iter()),
            Type::Path(_) => self.path_shape(ty),
            _ => TypeShape::Other,
        }
    }

    fn path_shape(&self, ty: &Type) -> TypeShape {
        let Some((name, args)) = last_segment(ty) else {
            return TypeShape::Other;
        };

        match name.as_str() {
            "String" | "str" => TypeShape::Str,
            "Cow" if args.first().is_some_and(|t| matches!(t, Type::Path(p) if p.path.is_ident("str"))) => {
                TypeShape::Str
            }
            n if PRIMITIVES.contains(&n) => TypeShape::Primitive,
            n if COLLECTIONS.contains(&n) => TypeShape::Collection,
            n if MAPS.contains(&n) => TypeShape::Map,
            "Box" | "Arc" | "Rc" | "Option" => match args.first().map(|t| self.shape(t)) {
                Some(TypeShape::Cause) => TypeShape::Cause,
                Some(TypeShape::Str) if name == "Box" => TypeShape::Str,
                _ => TypeShape::Other,
            },
            n if self.throwables.contains(n) => TypeShape::Cause,
            _ => TypeShape::Other,
        }
    }

    // `dyn Error + Send`, `impl Into<String>`, `impl Display`
    fn bounds_shape<'a>(bounds: impl Iterator<Item = &'a TypeParamBound>) -> TypeShape {
        for bound in bounds {
            let TypeParamBound::Trait(t) = bound else {
                continue;
            };
            let Some(segment) = t.path.segments.last() else {
                continue;
            };

            match segment.ident.to_string().as_str() {
                "Error" => return TypeShape::Cause,
                "Into" | "AsRef" if Self::first_arg_is_string(&segment.arguments) => {
                    return TypeShape::Str;
                }
                _ => {}
            }
        }

        TypeShape::Other
    }

    fn first_arg_is_string(args: &PathArguments) -> bool {
        let PathArguments::AngleBracketed(args) = args else {
            return false;
        };

        matches!(
            args.args.first(),
            Some(GenericArgument::Type(Type::Path(p))) if p.path.is_ident("String") || p.path.is_ident("str")
        )
    }
}
