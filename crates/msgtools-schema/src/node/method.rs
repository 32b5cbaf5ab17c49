use crate::prelude::*;

///
/// MethodDecl
/// a method as declared on one interface
///

#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct MethodDecl {
    pub name: String,
    pub params: Vec<Parameter>,
    pub return_type: TypeRef,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<MessageDecl>,

    /// Present on logging methods.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<Level>,

    #[serde(default)]
    pub once: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub thrown: Vec<TypeRef>,
}

impl MethodDecl {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            return_type: TypeRef::unit(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_message(mut self, id: i64, text: impl Into<String>) -> Self {
        self.message = Some(MessageDecl::new(id, text, FormatKind::Printf));
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: FormatKind) -> Self {
        if let Some(message) = &mut self.message {
            message.format = format;
        }
        self
    }

    #[must_use]
    pub const fn with_level(mut self, level: Level) -> Self {
        self.level = Some(level);
        self
    }

    #[must_use]
    pub fn with_param(mut self, param: Parameter) -> Self {
        self.params.push(param);
        self
    }

    #[must_use]
    pub fn returning(mut self, ty: TypeRef) -> Self {
        self.return_type = ty;
        self
    }

    #[must_use]
    pub const fn is_logging(&self) -> bool {
        self.level.is_some()
    }

    /// Parameter count after excluding roles that are not message format arguments.
    #[must_use]
    pub fn format_param_count(&self) -> usize {
        self.params.iter().map(Parameter::format_slots).sum()
    }

    /// Signature identity used to deduplicate methods reached through several paths.
    #[must_use]
    pub fn signature(&self) -> (String, Vec<String>) {
        (
            self.name.clone(),
            self.params.iter().map(|p| p.ty.name.clone()).collect(),
        )
    }

    pub fn params_with(&self, role: ParamRole) -> impl Iterator<Item = &Parameter> {
        self.params.iter().filter(move |p| p.role == role)
    }

    #[must_use]
    pub fn cause(&self) -> Option<&Parameter> {
        self.params_with(ParamRole::Cause).next()
    }
}
