//! Attribute arguments, parsed with darling.

use darling::{Error as DarlingError, FromMeta, ast::NestedMeta, util::Flag};
use msgtools_schema::prelude::*;
use syn::{Attribute, Expr, ExprLit, ExprUnary, Lit, Meta, UnOp};

pub const MESSAGE_BUNDLE: &str = "message_bundle";
pub const MESSAGE_LOGGER: &str = "message_logger";
pub const VALID_ID_RANGE: &str = "valid_id_range";
pub const MESSAGE: &str = "message";
pub const LOG_MESSAGE: &str = "log_message";
pub const ONCE: &str = "once";
pub const THROWS: &str = "throws";

/// Whether an attribute's path ends in `name`.
#[must_use]
pub fn is(attr: &Attribute, name: &str) -> bool {
    attr.path().segments.last().is_some_and(|s| s.ident == name)
}

#[must_use]
pub fn find<'a>(attrs: &'a [Attribute], name: &str) -> Option<&'a Attribute> {
    attrs.iter().find(|a| is(a, name))
}

// A bare `#[attr]` takes every default.
fn parse_or_default<T: FromMeta + Default>(attr: &Attribute) -> Result<T, DarlingError> {
    match &attr.meta {
        Meta::Path(_) => Ok(T::default()),
        meta => T::from_meta(meta),
    }
}

// Integer literal, optionally negated.
fn int_value(expr: &Expr) -> Result<i64, DarlingError> {
    match expr {
        Expr::Lit(ExprLit {
            lit: Lit::Int(int), ..
        }) => int.base10_parse().map_err(DarlingError::from),
        Expr::Unary(ExprUnary {
            op: UnOp::Neg(_),
            expr,
            ..
        }) => int_value(expr).map(|v| -v),
        Expr::Group(group) => int_value(&group.expr),
        other => Err(DarlingError::unexpected_expr_type(other)),
    }
}

///
/// InterfaceArgs
/// `#[message_logger(..)]` / `#[message_bundle(..)]`
///

#[derive(Clone, Debug, Default, FromMeta)]
pub struct InterfaceArgs {
    #[darling(default)]
    pub project_code: String,

    #[darling(default)]
    pub length: Option<u8>,

    #[darling(default)]
    pub root_locale: Option<String>,
}

impl InterfaceArgs {
    pub fn parse(attr: &Attribute) -> Result<Self, DarlingError> {
        parse_or_default(attr)
    }
}

///
/// IdRangeArgs
///

#[derive(Clone, Copy, Debug, FromMeta)]
pub struct IdRangeArgs {
    pub min: i64,
    pub max: i64,
}

impl From<IdRangeArgs> for IdRange {
    fn from(args: IdRangeArgs) -> Self {
        Self::new(args.min, args.max)
    }
}

///
/// MessageArgs
///

#[derive(Clone, Debug, FromMeta)]
pub struct MessageArgs {
    #[darling(default)]
    pub id: Option<Expr>,

    pub text: String,

    #[darling(default)]
    pub format: Option<FormatKind>,

    /// Same as `id = -1`.
    #[darling(default)]
    pub inherit_id: Flag,
}

impl MessageArgs {
    pub fn into_decl(self) -> Result<MessageDecl, DarlingError> {
        let id = if self.inherit_id.is_present() {
            MessageId::INHERIT
        } else {
            self.id.as_ref().map_or(Ok(MessageId::NONE), int_value)?
        };

        Ok(MessageDecl::new(
            id,
            self.text,
            self.format.unwrap_or_default(),
        ))
    }
}

///
/// LogMessageArgs
///

#[derive(Clone, Debug, Default, FromMeta)]
pub struct LogMessageArgs {
    #[darling(default)]
    pub level: Option<Level>,
}

impl LogMessageArgs {
    pub fn parse(attr: &Attribute) -> Result<Self, DarlingError> {
        parse_or_default(attr)
    }
}

///
/// TargetArgs
/// `#[field]`, `#[field(name = "x")]` and the property equivalents
///

#[derive(Clone, Debug, Default, FromMeta)]
pub struct TargetArgs {
    #[darling(default)]
    pub name: Option<String>,
}

impl TargetArgs {
    pub fn parse(attr: &Attribute) -> Result<Self, DarlingError> {
        parse_or_default(attr)
    }
}

///
/// TransformList
///

#[derive(Clone, Debug, Default)]
pub struct TransformList(pub Vec<Transform>);

impl FromMeta for TransformList {
    fn from_list(items: &[NestedMeta]) -> Result<Self, DarlingError> {
        let mut transforms = Vec::with_capacity(items.len());

        for item in items {
            match item {
                NestedMeta::Meta(Meta::Path(path)) => {
                    let ident = path
                        .get_ident()
                        .ok_or_else(|| DarlingError::unsupported_format("path").with_span(path))?;
                    transforms.push(Transform::from_string(&ident.to_string())?);
                }
                NestedMeta::Lit(Lit::Str(s)) => transforms.push(Transform::from_string(&s.value())?),
                other => return Err(DarlingError::unsupported_format("transform").with_span(other)),
            }
        }

        Ok(Self(transforms))
    }
}

///
/// PositionList
/// `#[pos(1, 2)]`
///

#[derive(Clone, Debug, Default)]
pub struct PositionList(pub Vec<u32>);

impl FromMeta for PositionList {
    fn from_list(items: &[NestedMeta]) -> Result<Self, DarlingError> {
        items
            .iter()
            .map(|item| match item {
                NestedMeta::Lit(Lit::Int(int)) => int.base10_parse().map_err(DarlingError::from),
                other => Err(DarlingError::unexpected_type("non-integer").with_span(other)),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}
