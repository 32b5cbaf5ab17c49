use crate::prelude::*;

///
/// MessageId
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum MessageId {
    #[default]
    None,
    /// Adopt the id of any same-named method that owns one.
    Inherit,
    Value(i64),
}

impl MessageId {
    pub const NONE: i64 = 0;
    pub const INHERIT: i64 = -1;

    /// Map a raw attribute value onto the sentinel-aware id.
    #[must_use]
    pub const fn from_raw(raw: i64) -> Self {
        match raw {
            Self::NONE => Self::None,
            Self::INHERIT => Self::Inherit,
            id => Self::Value(id),
        }
    }

    #[must_use]
    pub const fn value(self) -> Option<i64> {
        match self {
            Self::Value(id) => Some(id),
            _ => None,
        }
    }

    /// True for a concrete id; sentinels are excluded from uniqueness and range checks.
    #[must_use]
    pub const fn has_id(self) -> bool {
        matches!(self, Self::Value(_))
    }
}

///
/// MessageDecl
/// a message declared directly on a method
///

#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct MessageDecl {
    pub id: MessageId,
    pub text: String,
    pub format: FormatKind,
}

impl MessageDecl {
    #[must_use]
    pub fn new(id: i64, text: impl Into<String>, format: FormatKind) -> Self {
        Self {
            id: MessageId::from_raw(id),
            text: text.into(),
            format,
        }
    }
}

///
/// Message
/// the message resolved for a method family
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    pub format: FormatKind,
    pub id_inherited: bool,
}

impl Message {
    #[must_use]
    pub fn from_decl(decl: &MessageDecl) -> Self {
        Self {
            id: decl.id,
            text: decl.text.clone(),
            format: decl.format,
            id_inherited: false,
        }
    }

    #[must_use]
    pub const fn has_id(&self) -> bool {
        self.id.has_id()
    }
}
