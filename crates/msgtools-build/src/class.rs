//! Synthetic class description handed to the source renderer.

use crate::prelude::*;

/// Suffix of the generated accessor trait shared by a primary class and its translations.
pub const MESSAGES_SUFFIX: &str = "$messages";

///
/// ClassDef
/// one generated implementation per (interface, locale)
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ClassDef {
    /// Generated name, e.g. `AppLogger$logger` or `AppLogger$logger_de_DE`.
    pub name: String,

    /// Primary implementation name; equal to `name` for the primary class.
    pub primary: String,

    /// Qualified path of the annotated interface.
    pub interface: String,
    pub kind: InterfaceKind,

    /// Locale tag exposed as the class locale constant; empty when unset.
    pub locale: String,

    /// Class whose accessors are delegated to when not overridden.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,

    /// Interfaces implemented by the class, the annotated interface first.
    pub implements: Vec<String>,

    pub accessors: Vec<AccessorDef>,
    pub methods: Vec<MethodDef>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub guards: Vec<GuardDef>,

    /// Also implement the base logger by delegating to the wrapped logger.
    #[serde(default)]
    pub delegates_basic_logger: bool,
}

impl ClassDef {
    #[must_use]
    pub fn is_translation(&self) -> bool {
        self.parent.is_some()
    }

    /// Name of the accessor trait.
    #[must_use]
    pub fn messages_trait(&self) -> String {
        format!("{}{MESSAGES_SUFFIX}", self.primary)
    }

    /// Module part of the interface path.
    #[must_use]
    pub fn module_path(&self) -> &str {
        self.interface
            .rsplit_once("::")
            .map_or("", |(module, _)| module)
    }

    #[must_use]
    pub fn accessor(&self, name: &str) -> Option<&AccessorDef> {
        self.accessors.iter().find(|a| a.name == name)
    }

    #[must_use]
    pub fn method(&self, name: &str) -> Option<&MethodDef> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// Methods declared by one implemented interface.
    pub fn methods_of<'a>(&'a self, interface: &'a str) -> impl Iterator<Item = &'a MethodDef> {
        self.methods.iter().filter(move |m| m.interface == interface)
    }
}

///
/// AccessorDef
/// private accessor returning one message literal
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct AccessorDef {
    pub name: String,
    pub key: String,

    /// Project code and padded id, e.g. `EX000100: `.
    pub prefix: String,
    pub body: AccessorBody,
}

impl AccessorDef {
    /// Full literal including the id prefix, or None when delegated.
    #[must_use]
    pub fn literal(&self) -> Option<String> {
        match &self.body {
            AccessorBody::Literal(text) => Some(format!("{}{text}", self.prefix)),
            AccessorBody::Inherited => None,
        }
    }
}

///
/// AccessorBody
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum AccessorBody {
    Literal(String),
    /// Delegate to the parent class.
    Inherited,
}

///
/// GuardDef
/// process-wide flag for a log-once method name
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct GuardDef {
    pub name: String,
    pub method: String,
}

///
/// MethodDef
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct MethodDef {
    pub name: String,

    /// Interface that declares the method.
    pub interface: String,
    pub params: Vec<ParamDef>,

    /// None for unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<String>,

    pub body: Vec<Stmt>,
}

///
/// ParamDef
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ParamDef {
    pub name: String,
    pub ty: String,
}

///
/// Stmt
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Stmt {
    Let {
        name: String,
        mutable: bool,
        value: Expr,
    },
    Assign {
        target: Expr,
        value: Expr,
    },
    Expr(Expr),
    If {
        cond: Expr,
        body: Vec<Self>,
    },
    /// Tail expression.
    Return(Expr),
}

impl Stmt {
    #[must_use]
    pub fn let_(name: impl Into<String>, value: Expr) -> Self {
        Self::Let {
            name: name.into(),
            mutable: false,
            value,
        }
    }

    #[must_use]
    pub fn let_mut(name: impl Into<String>, value: Expr) -> Self {
        Self::Let {
            name: name.into(),
            mutable: true,
            value,
        }
    }
}

///
/// Expr
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Expr {
    Var(String),
    /// Absolute or scoped path, e.g. a constant or a unit value.
    Path(String),
    Str(String),
    Int(i64),
    Bool(bool),
    Level(Level),
    None,
    Some(Box<Self>),
    Ref(Box<Self>),
    RefMut(Box<Self>),
    /// `&value as &dyn Display`
    Display(Box<Self>),
    /// `&[..]`
    Slice(Vec<Self>),
    Field(Box<Self>, String),
    Call {
        callee: Callee,
        args: Vec<Self>,
    },
    Method {
        receiver: Box<Self>,
        name: String,
        args: Vec<Self>,
    },
    /// Message accessor dispatched through the accessor trait.
    Accessor(String),
    /// Wrapped logger of the current class.
    Logger,
    /// Default logging context of the current class.
    Fqcn,
    /// String view of a string-like value.
    AsStr(Box<Self>),
    Into(Box<Self>),
    Not(Box<Self>),
    And(Box<Self>, Box<Self>),
}

impl Expr {
    #[must_use]
    pub fn var(name: impl Into<String>) -> Self {
        Self::Var(name.into())
    }

    #[must_use]
    pub fn reference(self) -> Self {
        Self::Ref(Box::new(self))
    }

    #[must_use]
    pub fn display(self) -> Self {
        Self::Display(Box::new(self))
    }

    #[must_use]
    pub fn some(self) -> Self {
        Self::Some(Box::new(self))
    }

    #[must_use]
    pub fn runtime(path: impl Into<String>, args: Vec<Self>) -> Self {
        Self::Call {
            callee: Callee::Runtime(path.into()),
            args,
        }
    }

    #[must_use]
    pub fn call(path: impl Into<String>, args: Vec<Self>) -> Self {
        Self::Call {
            callee: Callee::Path(path.into()),
            args,
        }
    }

    #[must_use]
    pub fn method(self, name: impl Into<String>, args: Vec<Self>) -> Self {
        Self::Method {
            receiver: Box::new(self),
            name: name.into(),
            args,
        }
    }
}

///
/// Callee
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Callee {
    /// Path relative to the configured runtime crate.
    Runtime(String),
    Path(String),
}
