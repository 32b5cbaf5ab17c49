use crate::prelude::*;

/// Id padding lengths accepted besides 0 (off).
pub const ID_LENGTH_RANGE: std::ops::RangeInclusive<u8> = 3..=8;

/// Default id padding length.
pub const DEFAULT_ID_LENGTH: u8 = 6;

///
/// IdRange
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct IdRange {
    pub min: i64,
    pub max: i64,
}

impl IdRange {
    #[must_use]
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub const fn contains(&self, id: i64) -> bool {
        id >= self.min && id <= self.max
    }

    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.min <= other.max && other.min <= self.max
    }
}

impl std::fmt::Display for IdRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

///
/// InterfaceDescriptor
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct InterfaceDescriptor {
    /// Qualified path, e.g. `app::log::AppLogger`.
    pub path: String,
    pub kind: InterfaceKind,

    /// False when the annotated item is not a trait.
    pub is_interface: bool,
    pub is_public: bool,

    #[serde(default)]
    pub project_code: String,

    /// Id padding width; 0 disables padding.
    pub id_length: u8,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_locale: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub valid_id_ranges: Vec<IdRange>,

    /// Paths of directly extended annotated interfaces.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extends: Vec<String>,

    /// Extends the base logging-capability interface.
    #[serde(default)]
    pub extends_basic_logger: bool,

    pub methods: Vec<MethodDecl>,
}

impl InterfaceDescriptor {
    #[must_use]
    pub fn new(path: impl Into<String>, kind: InterfaceKind) -> Self {
        Self {
            path: path.into(),
            kind,
            is_interface: true,
            is_public: true,
            id_length: DEFAULT_ID_LENGTH,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_project_code(mut self, code: impl Into<String>) -> Self {
        self.project_code = code.into();
        self
    }

    #[must_use]
    pub const fn with_id_length(mut self, length: u8) -> Self {
        self.id_length = length;
        self
    }

    #[must_use]
    pub fn with_method(mut self, method: MethodDecl) -> Self {
        self.methods.push(method);
        self
    }

    #[must_use]
    pub fn extending(mut self, path: impl Into<String>) -> Self {
        self.extends.push(path.into());
        self
    }

    /// Simple (unqualified) name.
    #[must_use]
    pub fn ident(&self) -> &str {
        self.path.rsplit("::").next().unwrap_or(&self.path)
    }

    /// Module part of the path, empty for a root-level item.
    #[must_use]
    pub fn module_path(&self) -> &str {
        self.path
            .rsplit_once("::")
            .map_or("", |(module, _)| module)
    }

    /// Name of the generated primary implementation.
    #[must_use]
    pub fn impl_name(&self) -> String {
        format!("{}{}", self.ident(), self.kind.impl_suffix())
    }

    #[must_use]
    pub fn origin(&self) -> Origin {
        Origin::interface(self.path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_derive_from_path() {
        let iface = InterfaceDescriptor::new("app::log::AppLogger", InterfaceKind::Logger);
        assert_eq!(iface.ident(), "AppLogger");
        assert_eq!(iface.module_path(), "app::log");
        assert_eq!(iface.impl_name(), "AppLogger$logger");

        let root = InterfaceDescriptor::new("Messages", InterfaceKind::Bundle);
        assert_eq!(root.module_path(), "");
        assert_eq!(root.impl_name(), "Messages$bundle");
    }

    #[test]
    fn ranges_overlap_inclusively() {
        let a = IdRange::new(1, 10);
        assert!(a.overlaps(&IdRange::new(10, 20)));
        assert!(!a.overlaps(&IdRange::new(11, 20)));
        assert!(a.contains(1) && a.contains(10) && !a.contains(11));
    }
}
