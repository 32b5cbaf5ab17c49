use crate::prelude::*;

///
/// Parameter
///

#[derive(Clone, Debug, Default, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeRef,
    pub role: ParamRole,

    /// Roles from additional marker attributes that conflict with `role`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conflicts: Vec<ParamRole>,

    /// Target field or property name; defaults to the parameter name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transforms: Vec<Transform>,

    /// 1-based format argument positions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub positions: Vec<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatter: Option<String>,
}

impl Parameter {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: TypeRef, role: ParamRole) -> Self {
        Self {
            name: name.into(),
            ty,
            role,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn format(name: impl Into<String>, ty: TypeRef) -> Self {
        Self::new(name, ty, ParamRole::Format)
    }

    #[must_use]
    pub fn cause(name: impl Into<String>) -> Self {
        Self::new(
            name,
            TypeRef::new("Box<dyn std::error::Error + Send + Sync>", TypeShape::Cause),
            ParamRole::Cause,
        )
    }

    #[must_use]
    pub fn with_transforms(mut self, transforms: &[Transform]) -> Self {
        self.role = ParamRole::Transform;
        self.transforms = transforms.to_vec();
        self
    }

    #[must_use]
    pub fn with_positions(mut self, positions: &[u32]) -> Self {
        self.role = ParamRole::Positional;
        self.positions = positions.to_vec();
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Field or property name this parameter is assigned to.
    #[must_use]
    pub fn target_name(&self) -> &str {
        self.target.as_deref().unwrap_or(&self.name)
    }

    /// Number of format argument slots this parameter fills.
    #[must_use]
    pub fn format_slots(&self) -> usize {
        if !self.role.is_format_arg() {
            0
        } else if self.positions.is_empty() {
            1
        } else {
            self.positions.len()
        }
    }

    #[must_use]
    pub fn is(&self, role: ParamRole) -> bool {
        self.role == role
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_parameter_fills_every_listed_slot() {
        let p = Parameter::format("value", TypeRef::string()).with_positions(&[1, 3]);
        assert_eq!(p.format_slots(), 2);

        let cause = Parameter::cause("cause");
        assert_eq!(cause.format_slots(), 0);
    }

    #[test]
    fn target_defaults_to_parameter_name() {
        let p = Parameter::new("code", TypeRef::string(), ParamRole::Field);
        assert_eq!(p.target_name(), "code");
        assert_eq!(p.with_target("error_code").target_name(), "error_code");
    }
}
