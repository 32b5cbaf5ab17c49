use crate::prelude::*;
use darling::FromMeta;
use derive_more::{Display, FromStr};
use proc_macro2::TokenStream;
use quote::{ToTokens, format_ident};

///
/// InterfaceKind
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
pub enum InterfaceKind {
    Bundle,
    Logger,
    #[default]
    None,
}

impl InterfaceKind {
    /// Suffix appended to the interface name for the generated implementation.
    #[must_use]
    pub const fn impl_suffix(self) -> &'static str {
        match self {
            Self::Bundle => "$bundle",
            Self::Logger => "$logger",
            Self::None => "",
        }
    }
}

///
/// Level
///

#[derive(
    Clone, Copy, Debug, Default, Deserialize, Display, Eq, FromStr, Hash, PartialEq, Serialize,
)]
#[remain::sorted]
pub enum Level {
    Debug,
    Error,
    Fatal,
    #[default]
    Info,
    Trace,
    Warn,
}

impl FromMeta for Level {
    fn from_string(s: &str) -> Result<Self, darling::Error> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "error" => Ok(Self::Error),
            "fatal" => Ok(Self::Fatal),
            "info" => Ok(Self::Info),
            "trace" => Ok(Self::Trace),
            "warn" | "warning" => Ok(Self::Warn),
            _ => Err(darling::Error::unknown_value(s)),
        }
    }
}

impl ToTokens for Level {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        format_ident!("{self}").to_tokens(tokens);
    }
}

///
/// FormatKind
/// message format dialect
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
pub enum FormatKind {
    /// `{0}` style placeholders addressed by argument index.
    Indexed,
    /// Literal text, no placeholders.
    None,
    #[default]
    Printf,
}

impl FormatKind {
    /// Logger dispatch function for this dialect.
    #[must_use]
    pub const fn log_fn(self) -> &'static str {
        match self {
            Self::Indexed => "logv",
            Self::None => "log",
            Self::Printf => "logf",
        }
    }
}

impl FromMeta for FormatKind {
    fn from_string(s: &str) -> Result<Self, darling::Error> {
        match s.to_ascii_lowercase().as_str() {
            "indexed" | "message_format" => Ok(Self::Indexed),
            "none" | "no_format" => Ok(Self::None),
            "printf" => Ok(Self::Printf),
            _ => Err(darling::Error::unknown_value(s)),
        }
    }
}

///
/// ParamRole
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
#[remain::sorted]
pub enum ParamRole {
    Cause,
    Construction,
    Field,
    #[default]
    Format,
    /// Replaces the generated class constant as the logging context token.
    Fqcn,
    /// Synthetic slot for the formatted message within a construction signature.
    Message,
    Positional,
    Property,
    Transform,
}

impl ParamRole {
    /// Whether a parameter with this role is a message format argument.
    #[must_use]
    pub const fn is_format_arg(self) -> bool {
        matches!(self, Self::Format | Self::Positional | Self::Transform)
    }
}

///
/// Transform
///

#[derive(
    Clone, Copy, Debug, Deserialize, Display, Eq, FromStr, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
#[remain::sorted]
pub enum Transform {
    GetClass,
    HashCode,
    IdentityHashCode,
    Size,
}

impl Transform {
    /// Suffix used for the generated temporary holding the transformed value.
    #[must_use]
    pub const fn var_suffix(self) -> &'static str {
        match self {
            Self::GetClass => "class",
            Self::HashCode | Self::IdentityHashCode => "hash_code",
            Self::Size => "size",
        }
    }
}

impl FromMeta for Transform {
    fn from_string(s: &str) -> Result<Self, darling::Error> {
        match s {
            "get_class" => Ok(Self::GetClass),
            "hash_code" => Ok(Self::HashCode),
            "identity_hash_code" => Ok(Self::IdentityHashCode),
            "size" => Ok(Self::Size),
            _ => Err(darling::Error::unknown_value(s)),
        }
    }
}

///
/// TypeShape
/// coarse classification of a reflected type
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
pub enum TypeShape {
    Array,
    /// Cause-like: boxed or borrowed error trait objects and throwable types.
    Cause,
    Collection,
    Map,
    #[default]
    Other,
    Primitive,
    Str,
    Unit,
}

impl TypeShape {
    /// Whether a SIZE transform can be applied to this shape.
    #[must_use]
    pub const fn is_sized_container(self) -> bool {
        matches!(self, Self::Array | Self::Collection | Self::Map | Self::Str)
    }
}

///
/// TypeRef
///

#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct TypeRef {
    pub name: String,
    pub shape: TypeShape,
}

impl TypeRef {
    #[must_use]
    pub fn new(name: impl Into<String>, shape: TypeShape) -> Self {
        Self {
            name: name.into(),
            shape,
        }
    }

    #[must_use]
    pub fn unit() -> Self {
        Self::new("()", TypeShape::Unit)
    }

    #[must_use]
    pub fn string() -> Self {
        Self::new("String", TypeShape::Str)
    }

    #[must_use]
    pub const fn is_unit(&self) -> bool {
        matches!(self.shape, TypeShape::Unit)
    }

    #[must_use]
    pub const fn is_primitive(&self) -> bool {
        matches!(self.shape, TypeShape::Primitive)
    }

    /// `Option<..>` slots accept an absent value.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        let name = self.name.replace(' ', "");
        let name = name.trim_start_matches("::");
        let name = name
            .strip_prefix("std::option::")
            .or_else(|| name.strip_prefix("core::option::"))
            .unwrap_or(name);

        name.starts_with("Option<")
    }
}

impl std::fmt::Display for TypeRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}
