use crate::prelude::*;
use derive_more::{Deref, Display, IntoIterator};
use std::fmt;

///
/// Severity
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Severity {
    #[display("ERROR")]
    Error,
    #[display("WARNING")]
    Warning,
}

///
/// Origin
/// the declaration a diagnostic is keyed to
///

#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Origin {
    pub interface: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
}

impl Origin {
    #[must_use]
    pub fn interface(path: impl Into<String>) -> Self {
        Self {
            interface: path.into(),
            method: None,
            param: None,
        }
    }

    #[must_use]
    pub fn method(path: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            interface: path.into(),
            method: Some(method.into()),
            param: None,
        }
    }

    #[must_use]
    pub fn with_param(&self, param: impl Into<String>) -> Self {
        Self {
            param: Some(param.into()),
            ..self.clone()
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.interface)?;
        if let Some(method) = &self.method {
            write!(f, "::{method}")?;
        }
        if let Some(param) = &self.param {
            write!(f, "({param})")?;
        }

        Ok(())
    }
}

///
/// Diagnostic
///

#[derive(Clone, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
#[display("{severity}: {origin}: {message}")]
pub struct Diagnostic {
    pub severity: Severity,
    pub origin: Origin,
    pub message: String,
}

impl Diagnostic {
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }
}

///
/// Diagnostics
/// collecting sink shared by resolution and validation
///

#[derive(Clone, Debug, Default, Deref, Deserialize, IntoIterator, Serialize)]
pub struct Diagnostics {
    #[into_iterator(owned, ref)]
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    pub fn error(&mut self, origin: &Origin, message: impl Into<String>) {
        self.push(Diagnostic {
            severity: Severity::Error,
            origin: origin.clone(),
            message: message.into(),
        });
    }

    pub fn warning(&mut self, origin: &Origin, message: impl Into<String>) {
        self.push(Diagnostic {
            severity: Severity::Warning,
            origin: origin.clone(),
            message: message.into(),
        });
    }

    pub fn merge(&mut self, other: Self) {
        self.items.extend(other.items);
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.items.iter().any(Diagnostic::is_error)
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| d.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter().filter(|d| !d.is_error())
    }

    /// Ok when no ERROR-severity diagnostic was collected.
    pub fn result(self) -> Result<Self, Self> {
        if self.has_errors() { Err(self) } else { Ok(self) }
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diagnostic) in self.items.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{diagnostic}")?;
        }

        Ok(())
    }
}

impl std::error::Error for Diagnostics {}

///
/// err!
///

#[macro_export]
macro_rules! err {
    ($diags:expr, $origin:expr, $($arg:tt)*) => {{
        $diags.error(&$origin, format!($($arg)*));
    }};
}

///
/// warning!
///

#[macro_export]
macro_rules! warning {
    ($diags:expr, $origin:expr, $($arg:tt)*) => {{
        $diags.warning(&$origin, format!($($arg)*));
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_fails_only_on_errors() {
        let origin = Origin::method("app::Log", "hello");
        let mut diags = Diagnostics::new();
        warning!(diags, origin, "soft {}", 1);
        assert!(diags.clone().result().is_ok());

        err!(diags, origin, "hard {}", 2);
        let failed = diags.result().expect_err("errors should fail the result");
        assert_eq!(failed.error_count(), 1);
        assert_eq!(failed.warning_count(), 1);
    }

    #[test]
    fn origin_renders_route() {
        let origin = Origin::method("app::Log", "hello").with_param("name");
        assert_eq!(origin.to_string(), "app::Log::hello(name)");

        let mut diags = Diagnostics::new();
        err!(diags, origin, "bad");
        assert_eq!(diags.to_string(), "ERROR: app::Log::hello(name): bad");
    }
}
