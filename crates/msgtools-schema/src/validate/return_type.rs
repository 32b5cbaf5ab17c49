use crate::{prelude::*, resolve::ResolvedMethod};

/// Bundle methods return a string or a constructible throwable.
pub fn validate_bundle_return(m: &ResolvedMethod, catalog: &TypeCatalog<'_>, errs: &mut Diagnostics) {
    let origin = m.origin();
    let ret = &m.decl.return_type;

    if ret.is_unit() || ret.is_primitive() {
        err!(
            errs,
            origin,
            "Message bundle method '{}' has an invalid return type {ret}. Cannot be void or a primitive.",
            m.name()
        );
        return;
    }

    let targets: Vec<&Parameter> = m
        .decl
        .params
        .iter()
        .filter(|p| {
            matches!(
                p.role,
                ParamRole::Field | ParamRole::Property | ParamRole::Construction
            )
        })
        .collect();

    if ret.shape == TypeShape::Str {
        for p in targets {
            err!(
                errs,
                origin.with_param(&p.name),
                "Parameter '{}' is marked as {} but the return type {ret} is not an error type.",
                p.name,
                p.role
            );
        }
        return;
    }

    let descriptor = catalog.describe(ret);
    if !descriptor.throwable {
        err!(
            errs,
            origin,
            "Message bundle method '{}' has an invalid return type {ret}. Must be a string or an error type.",
            m.name()
        );
        return;
    }

    match descriptor.construction(&m.decl) {
        None => err!(
            errs,
            origin,
            "Message bundle method '{}' does not have an usable constructor for the return type {ret}.",
            m.name()
        ),
        Some(construction) if construction.drops_message => warning!(
            errs,
            origin,
            "The message cannot be set via the throwable constructor and will be ignored."
        ),
        Some(_) => {}
    }

    validate_targets(m, &descriptor, errs);
}

// FIELD and PROPERTY parameters need a public member with a matching type.
fn validate_targets(m: &ResolvedMethod, descriptor: &ReturnTypeDescriptor, errs: &mut Diagnostics) {
    let origin = m.origin();

    for p in m.decl.params_with(ParamRole::Field) {
        let name = p.target_name();
        let found = descriptor
            .field(name)
            .is_some_and(|f| f.public && f.ty.name == p.ty.name);

        if !found {
            err!(
                errs,
                origin.with_param(&p.name),
                "No target field found in {} with name {name} with type {}.",
                descriptor.name,
                p.ty
            );
        }
    }

    for p in m.decl.params_with(ParamRole::Property) {
        let name = p.target_name();
        let found = descriptor
            .setter(name)
            .is_some_and(|s| s.public && s.param.name == p.ty.name);

        if !found {
            err!(
                errs,
                origin.with_param(&p.name),
                "No method found in {} with signature {}({}).",
                descriptor.name,
                setter_name(name),
                p.ty
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{prelude::*, registry::IdRegistry, validate::tests::run};

    fn bundle(method: MethodDecl, ty: ReturnTypeDescriptor) -> Schema {
        Schema::new()
            .with_interface(
                InterfaceDescriptor::new("app::Messages", InterfaceKind::Bundle).with_method(method),
            )
            .with_type(ty)
    }

    fn failure() -> TypeRef {
        TypeRef::new("app::Failure", TypeShape::Other)
    }

    #[test]
    fn default_constructed_throwable_warns_once() {
        let ty = ReturnTypeDescriptor::throwable("app::Failure")
            .with_constructor(Constructor::new("default", vec![]))
            .with_cause_setter("set_source");
        let method = MethodDecl::new("failed")
            .with_message(1, "failed")
            .with_param(Parameter::cause("cause"))
            .returning(failure());

        let errs = run(&bundle(method, ty), "app::Messages", &IdRegistry::new());
        assert_eq!(errs.error_count(), 0, "{errs}");
        assert_eq!(errs.warning_count(), 1, "{errs}");
        assert!(errs.to_string().contains("will be ignored"));
    }

    #[test]
    fn unusable_constructor_is_an_error() {
        let ty = ReturnTypeDescriptor::throwable("app::Failure").with_constructor(
            Constructor::new("new", vec![TypeRef::new("u8", TypeShape::Primitive)]),
        );
        let method = MethodDecl::new("failed")
            .with_message(1, "failed")
            .returning(failure());

        let errs = run(&bundle(method, ty), "app::Messages", &IdRegistry::new());
        assert_eq!(errs.error_count(), 1, "{errs}");
        assert!(errs.to_string().contains("usable constructor"));
    }

    #[test]
    fn unit_and_opaque_returns_are_rejected() {
        let method = MethodDecl::new("failed").with_message(1, "failed");
        let errs = run(
            &bundle(method, ReturnTypeDescriptor::opaque("unused")),
            "app::Messages",
            &IdRegistry::new(),
        );
        assert!(errs.to_string().contains("Cannot be void"), "{errs}");

        let method = MethodDecl::new("failed")
            .with_message(1, "failed")
            .returning(TypeRef::new("app::Plain", TypeShape::Other));
        let errs = run(
            &bundle(method, ReturnTypeDescriptor::opaque("app::Plain")),
            "app::Messages",
            &IdRegistry::new(),
        );
        assert!(errs.to_string().contains("Must be a string"), "{errs}");
    }

    #[test]
    fn field_and_property_targets_must_exist() {
        let code = TypeRef::new("u32", TypeShape::Primitive);
        let mut ty = ReturnTypeDescriptor::throwable("app::Failure")
            .with_constructor(Constructor::new("new", vec![TypeRef::string()]));
        ty.fields.push(FieldTarget {
            name: "code".to_string(),
            ty: code.clone(),
            public: true,
        });

        let method = MethodDecl::new("failed")
            .with_message(1, "failed")
            .with_param(Parameter::new("code", code.clone(), ParamRole::Field))
            .with_param(Parameter::new("detail", TypeRef::string(), ParamRole::Property))
            .returning(failure());

        let errs = run(&bundle(method, ty), "app::Messages", &IdRegistry::new());
        assert_eq!(errs.error_count(), 1, "{errs}");
        assert!(
            errs.to_string()
                .contains("No method found in app::Failure with signature set_detail(String)"),
            "{errs}"
        );
    }
}
