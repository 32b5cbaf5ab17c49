use crate::prelude::*;
use derive_more::Display;

///
/// ConstructorShape
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
pub enum ConstructorShape {
    CauseAndMessage,
    CauseOnly,
    DefaultOnly,
    MessageAndCause,
    MessageOnly,
    /// Any other parameter list; only usable through construction parameters.
    Other,
}

///
/// Constructor
/// an associated function returning the type
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct Constructor {
    pub name: String,
    pub params: Vec<TypeRef>,
}

impl Constructor {
    #[must_use]
    pub fn new(name: impl Into<String>, params: Vec<TypeRef>) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    #[must_use]
    pub fn shape(&self) -> ConstructorShape {
        let shapes: Vec<TypeShape> = self.params.iter().map(|p| p.shape).collect();

        match shapes.as_slice() {
            [] => ConstructorShape::DefaultOnly,
            [TypeShape::Str] => ConstructorShape::MessageOnly,
            [TypeShape::Cause] => ConstructorShape::CauseOnly,
            [TypeShape::Str, TypeShape::Cause] => ConstructorShape::MessageAndCause,
            [TypeShape::Cause, TypeShape::Str] => ConstructorShape::CauseAndMessage,
            _ => ConstructorShape::Other,
        }
    }
}

///
/// FieldTarget
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct FieldTarget {
    pub name: String,
    pub ty: TypeRef,
    pub public: bool,
}

///
/// SetterTarget
/// `set_<property>(&mut self, value)`
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct SetterTarget {
    pub property: String,
    pub param: TypeRef,
    pub public: bool,
}

impl SetterTarget {
    #[must_use]
    pub fn method_name(&self) -> String {
        setter_name(&self.property)
    }
}

/// Setter method name for a property.
#[must_use]
pub fn setter_name(property: &str) -> String {
    format!("set_{property}")
}

///
/// ReturnTypeDescriptor
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ReturnTypeDescriptor {
    pub name: String,
    pub throwable: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constructors: Vec<Constructor>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldTarget>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub setters: Vec<SetterTarget>,

    /// `&mut self` method attaching a cause after construction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause_setter: Option<String>,
}

impl ReturnTypeDescriptor {
    #[must_use]
    pub fn opaque(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn throwable(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            throwable: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_constructor(mut self, ctor: Constructor) -> Self {
        self.constructors.push(ctor);
        self
    }

    #[must_use]
    pub fn with_cause_setter(mut self, name: impl Into<String>) -> Self {
        self.cause_setter = Some(name.into());
        self
    }

    #[must_use]
    pub fn shapes(&self) -> Vec<ConstructorShape> {
        self.constructors.iter().map(Constructor::shape).collect()
    }

    #[must_use]
    pub fn constructor(&self, shape: ConstructorShape) -> Option<&Constructor> {
        self.constructors.iter().find(|c| c.shape() == shape)
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldTarget> {
        self.fields.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn setter(&self, property: &str) -> Option<&SetterTarget> {
        self.setters.iter().find(|s| s.property == property)
    }

    ///
    /// construction
    /// picks the construction strategy for a bundle method, in fixed priority order
    ///

    #[must_use]
    pub fn construction(&self, method: &MethodDecl) -> Option<Construction> {
        let has_cause = method.cause().is_some();
        let construction_params: Vec<&Parameter> =
            method.params_with(ParamRole::Construction).collect();

        if !construction_params.is_empty() {
            return self.construction_with_params(&construction_params, has_cause);
        }

        let candidates = if has_cause {
            vec![
                ConstructionKind::MessageAndCause,
                ConstructionKind::CauseAndMessage,
                ConstructionKind::Message,
                ConstructionKind::Cause,
                ConstructionKind::Default,
            ]
        } else {
            vec![
                ConstructionKind::Message,
                ConstructionKind::MessageAndNone,
                ConstructionKind::NoneAndMessage,
                ConstructionKind::Default,
            ]
        };

        candidates
            .into_iter()
            .find_map(|kind| self.try_construction(kind, has_cause))
    }

    fn try_construction(&self, kind: ConstructionKind, has_cause: bool) -> Option<Construction> {
        let (shape, args) = match kind {
            ConstructionKind::MessageAndCause => (
                ConstructorShape::MessageAndCause,
                vec![CtorArg::Message, CtorArg::Cause],
            ),
            ConstructionKind::CauseAndMessage => (
                ConstructorShape::CauseAndMessage,
                vec![CtorArg::Cause, CtorArg::Message],
            ),
            ConstructionKind::Message => (ConstructorShape::MessageOnly, vec![CtorArg::Message]),
            ConstructionKind::Cause => (ConstructorShape::CauseOnly, vec![CtorArg::Cause]),
            ConstructionKind::MessageAndNone => (
                ConstructorShape::MessageAndCause,
                vec![CtorArg::Message, CtorArg::NoCause],
            ),
            ConstructionKind::NoneAndMessage => (
                ConstructorShape::CauseAndMessage,
                vec![CtorArg::NoCause, CtorArg::Message],
            ),
            ConstructionKind::Default => (ConstructorShape::DefaultOnly, vec![]),
            ConstructionKind::Params => return None,
        };

        let ctor = self.constructor(shape)?;

        // an absent cause can only be passed to an optional slot
        if args.contains(&CtorArg::NoCause) && !ctor.params.iter().any(TypeRef::is_optional) {
            return None;
        }

        let set_cause = has_cause && !args.contains(&CtorArg::Cause);
        if set_cause && self.cause_setter.is_none() {
            return None;
        }

        Some(Construction {
            kind,
            ctor: ctor.clone(),
            drops_message: !args.contains(&CtorArg::Message),
            args,
            set_cause,
        })
    }

    // Match construction parameters in declaration order, allowing one message
    // slot and one cause slot anywhere in the constructor signature.
    fn construction_with_params(
        &self,
        params: &[&Parameter],
        has_cause: bool,
    ) -> Option<Construction> {
        let matched: Vec<Construction> = self
            .constructors
            .iter()
            .filter_map(|ctor| {
                let mut args = Vec::with_capacity(ctor.params.len());
                let mut remaining = params.iter().peekable();
                let (mut message, mut cause) = (false, false);

                for slot in &ctor.params {
                    if remaining.peek().is_some_and(|p| p.ty.name == slot.name) {
                        let p = remaining.next()?;
                        args.push(CtorArg::Param(p.name.clone()));
                    } else if slot.shape == TypeShape::Str && !message {
                        message = true;
                        args.push(CtorArg::Message);
                    } else if slot.shape == TypeShape::Cause && has_cause && !cause {
                        cause = true;
                        args.push(CtorArg::Cause);
                    } else {
                        return None;
                    }
                }

                if remaining.next().is_some() {
                    return None;
                }

                let set_cause = has_cause && !cause;
                if set_cause && self.cause_setter.is_none() {
                    return None;
                }

                Some(Construction {
                    kind: ConstructionKind::Params,
                    ctor: ctor.clone(),
                    drops_message: !message,
                    args,
                    set_cause,
                })
            })
            .collect();

        let with_message = matched.iter().position(|c| !c.drops_message);

        match with_message {
            Some(i) => matched.into_iter().nth(i),
            None => matched.into_iter().next(),
        }
    }
}

///
/// ConstructionKind
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, PartialEq, Serialize)]
pub enum ConstructionKind {
    /// Constructor matched against construction parameters.
    Params,
    MessageAndCause,
    CauseAndMessage,
    /// Message-only constructor; a cause is attached afterwards.
    Message,
    /// Cause-only constructor; the message is dropped.
    Cause,
    /// Message-and-cause constructor with an absent cause.
    MessageAndNone,
    /// Cause-and-message constructor with an absent cause.
    NoneAndMessage,
    /// Default construction; the message is dropped.
    Default,
}

///
/// CtorArg
///

#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum CtorArg {
    Message,
    Cause,
    NoCause,
    Param(String),
}

///
/// Construction
/// the winning construction strategy for a throwable return type
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Construction {
    pub kind: ConstructionKind,
    pub ctor: Constructor,
    pub args: Vec<CtorArg>,

    /// Attach the cause through the cause setter after construction.
    pub set_cause: bool,
    pub drops_message: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg() -> TypeRef {
        TypeRef::string()
    }

    fn cause() -> TypeRef {
        TypeRef::new("Box<dyn Error + Send + Sync>", TypeShape::Cause)
    }

    fn method_with_cause() -> MethodDecl {
        MethodDecl::new("failed")
            .with_message(1, "failed")
            .with_param(Parameter::cause("cause"))
    }

    #[test]
    fn shapes_classify_by_parameter_kind() {
        assert_eq!(
            Constructor::new("new", vec![msg(), cause()]).shape(),
            ConstructorShape::MessageAndCause
        );
        assert_eq!(
            Constructor::new("with_cause", vec![cause(), msg()]).shape(),
            ConstructorShape::CauseAndMessage
        );
        assert_eq!(
            Constructor::new("default", vec![]).shape(),
            ConstructorShape::DefaultOnly
        );
        assert_eq!(
            Constructor::new("odd", vec![msg(), msg()]).shape(),
            ConstructorShape::Other
        );
    }

    #[test]
    fn message_and_cause_wins_over_cause_and_message() {
        let ty = ReturnTypeDescriptor::throwable("app::Failure")
            .with_constructor(Constructor::new("from_parts", vec![cause(), msg()]))
            .with_constructor(Constructor::new("new", vec![msg(), cause()]));

        let c = ty.construction(&method_with_cause()).unwrap();
        assert_eq!(c.kind, ConstructionKind::MessageAndCause);
        assert_eq!(c.ctor.name, "new");
        assert!(!c.set_cause && !c.drops_message);
    }

    #[test]
    fn message_only_requires_cause_setter_when_cause_present() {
        let ty = ReturnTypeDescriptor::throwable("app::Failure")
            .with_constructor(Constructor::new("new", vec![msg()]));
        assert!(ty.construction(&method_with_cause()).is_none());

        let ty = ty.with_cause_setter("set_source");
        let c = ty.construction(&method_with_cause()).unwrap();
        assert_eq!(c.kind, ConstructionKind::Message);
        assert!(c.set_cause);
    }

    #[test]
    fn default_only_drops_message_and_sets_cause() {
        let ty = ReturnTypeDescriptor::throwable("app::Failure")
            .with_constructor(Constructor::new("default", vec![]))
            .with_cause_setter("init_cause");

        let c = ty.construction(&method_with_cause()).unwrap();
        assert_eq!(c.kind, ConstructionKind::Default);
        assert!(c.drops_message && c.set_cause);
    }

    #[test]
    fn absent_cause_needs_optional_slot() {
        let method = MethodDecl::new("failed").with_message(1, "failed");
        let strict = ReturnTypeDescriptor::throwable("app::Failure")
            .with_constructor(Constructor::new("new", vec![msg(), cause()]));
        assert!(strict.construction(&method).is_none());

        let optional = ReturnTypeDescriptor::throwable("app::Failure").with_constructor(
            Constructor::new(
                "new",
                vec![
                    msg(),
                    TypeRef::new("Option<Box<dyn Error>>", TypeShape::Cause),
                ],
            ),
        );
        let c = optional.construction(&method).unwrap();
        assert_eq!(c.kind, ConstructionKind::MessageAndNone);
        assert_eq!(c.args, vec![CtorArg::Message, CtorArg::NoCause]);
    }

    #[test]
    fn construction_params_match_in_order_with_message_slot() {
        let code = TypeRef::new("u32", TypeShape::Primitive);
        let method = MethodDecl::new("failed")
            .with_message(1, "failed")
            .with_param(Parameter::new("code", code.clone(), ParamRole::Construction));
        let ty = ReturnTypeDescriptor::throwable("app::Failure")
            .with_constructor(Constructor::new("from_code", vec![code.clone()]))
            .with_constructor(Constructor::new("new", vec![code, msg()]));

        let c = ty.construction(&method).unwrap();
        assert_eq!(c.kind, ConstructionKind::Params);
        assert_eq!(c.ctor.name, "new");
        assert_eq!(
            c.args,
            vec![CtorArg::Param("code".to_string()), CtorArg::Message]
        );
    }
}
