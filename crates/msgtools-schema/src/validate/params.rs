use crate::{prelude::*, resolve::ResolvedMethod};
use std::collections::BTreeSet;

/// Parameter role rules: multiplicity, transforms and positions.
pub fn validate_params(m: &ResolvedMethod, errs: &mut Diagnostics) {
    let origin = m.origin();

    for param in &m.decl.params {
        if !param.conflicts.is_empty() {
            let roles: Vec<String> = param.conflicts.iter().map(ToString::to_string).collect();
            err!(
                errs,
                origin.with_param(&param.name),
                "Parameter '{}' is marked as {} and cannot also be {}.",
                param.name,
                param.role,
                roles.join(", ")
            );
        }
    }

    // cause
    let causes: Vec<&Parameter> = m.decl.params_with(ParamRole::Cause).collect();
    if causes.len() > 1 {
        err!(
            errs,
            origin,
            "Only one cause parameter is allowed; found {}.",
            causes.len()
        );
    }
    for cause in causes {
        if cause.ty.shape != TypeShape::Cause {
            err!(
                errs,
                origin.with_param(&cause.name),
                "Cause parameter '{}' must be an error type, found {}.",
                cause.name,
                cause.ty
            );
        }
    }

    // logging context
    let contexts: Vec<&Parameter> = m.decl.params_with(ParamRole::Fqcn).collect();
    if contexts.len() > 1 {
        err!(
            errs,
            origin,
            "Only one logging class parameter is allowed; found {}.",
            contexts.len()
        );
    }
    for context in contexts {
        if !m.is_logging() {
            err!(
                errs,
                origin.with_param(&context.name),
                "Logging class parameter '{}' is only allowed on logging methods.",
                context.name
            );
        } else if context.ty.shape != TypeShape::Str {
            err!(
                errs,
                origin.with_param(&context.name),
                "Logging class parameter '{}' must be a type name string, found {}.",
                context.name,
                context.ty
            );
        }
    }

    for param in m.decl.params_with(ParamRole::Transform) {
        validate_transform(param, &origin.with_param(&param.name), errs);
    }

    validate_positions(m, errs);
}

///
/// validate_transform
/// SIZE never combines; HASH_CODE and IDENTITY_HASH_CODE exclude each other
///

pub fn validate_transform(param: &Parameter, origin: &Origin, errs: &mut Diagnostics) {
    if param.ty.is_primitive() {
        err!(
            errs,
            origin,
            "Parameter '{}' annotated with #[transform] cannot be a primitive type.",
            param.name
        );
        return;
    }

    if let Err(message) = check_transform_combination(&param.transforms) {
        err!(errs, origin, "{message}");
        return;
    }

    if param.transforms.contains(&Transform::Size) && !param.ty.shape.is_sized_container() {
        err!(
            errs,
            origin,
            "Invalid type ({}) for parameter '{}'. Type must be a string, slice, collection or map when using a size transform.",
            param.ty,
            param.name
        );
    }
}

/// Reject combinations that have no meaningful synthesized expression.
pub fn check_transform_combination(transforms: &[Transform]) -> Result<(), String> {
    let set: BTreeSet<Transform> = transforms.iter().copied().collect();

    if set.is_empty() {
        return Err("A transform parameter needs at least one transform.".to_string());
    }
    if set.len() != transforms.len() {
        return Err("A transform may only be listed once.".to_string());
    }
    if set.contains(&Transform::Size) && set.len() > 1 {
        return Err(format!(
            "Invalid transform combination {set:?}: SIZE cannot be combined with other transforms."
        ));
    }
    if set.contains(&Transform::HashCode) && set.contains(&Transform::IdentityHashCode) {
        return Err(format!(
            "Invalid transform combination {set:?}: HASH_CODE and IDENTITY_HASH_CODE are mutually exclusive."
        ));
    }

    Ok(())
}

// Every position 1..=count must be supplied exactly once when positions are used.
fn validate_positions(m: &ResolvedMethod, errs: &mut Diagnostics) {
    let origin = m.origin();
    let positional: Vec<&Parameter> = m
        .decl
        .params
        .iter()
        .filter(|p| !p.positions.is_empty())
        .collect();

    if positional.is_empty() {
        return;
    }

    let count = m.format_param_count;
    let mut seen = BTreeSet::new();

    for param in &positional {
        let porigin = origin.with_param(&param.name);
        for &pos in &param.positions {
            if pos == 0 || pos as usize > count {
                err!(
                    errs,
                    porigin,
                    "Position {pos} of parameter '{}' is out of range 1-{count}.",
                    param.name
                );
            } else if !seen.insert(pos) {
                err!(
                    errs,
                    porigin,
                    "Position {pos} of parameter '{}' is already used.",
                    param.name
                );
            }
        }
    }

    let has_plain_args = m
        .decl
        .params
        .iter()
        .any(|p| p.role.is_format_arg() && p.positions.is_empty());
    if has_plain_args {
        err!(
            errs,
            origin,
            "Format parameters of '{}' must all declare positions once any parameter does.",
            m.name()
        );
        return;
    }

    let missing: Vec<String> = (1..=count)
        .filter(|pos| !seen.contains(&u32::try_from(*pos).unwrap_or(u32::MAX)))
        .map(|pos| pos.to_string())
        .collect();
    if !missing.is_empty() {
        err!(
            errs,
            origin,
            "Positions {} of '{}' are not supplied by any parameter.",
            missing.join(", "),
            m.name()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{registry::IdRegistry, validate::tests::run};

    #[test]
    fn get_class_composes_with_hashes() {
        assert!(check_transform_combination(&[Transform::GetClass, Transform::HashCode]).is_ok());
        assert!(
            check_transform_combination(&[Transform::GetClass, Transform::IdentityHashCode])
                .is_ok()
        );
        assert!(check_transform_combination(&[Transform::Size]).is_ok());
    }

    #[test]
    fn size_never_combines() {
        for other in [
            Transform::GetClass,
            Transform::HashCode,
            Transform::IdentityHashCode,
        ] {
            let err = check_transform_combination(&[Transform::Size, other]).unwrap_err();
            assert!(err.contains("SIZE cannot be combined"), "{err}");
        }

        let err = check_transform_combination(&[Transform::HashCode, Transform::IdentityHashCode])
            .unwrap_err();
        assert!(err.contains("mutually exclusive"), "{err}");
    }

    fn logger(method: MethodDecl) -> Schema {
        Schema::new().with_interface(
            InterfaceDescriptor::new("app::Log", InterfaceKind::Logger)
                .with_method(method.with_level(Level::Info)),
        )
    }

    #[test]
    fn size_requires_a_container() {
        let schema = logger(
            MethodDecl::new("count")
                .with_message(1, "count %d")
                .with_param(
                    Parameter::format("value", TypeRef::new("app::Thing", TypeShape::Other))
                        .with_transforms(&[Transform::Size]),
                ),
        );

        let errs = run(&schema, "app::Log", &IdRegistry::new());
        assert_eq!(errs.error_count(), 1, "{errs}");
        assert!(errs.to_string().contains("size transform"), "{errs}");
    }

    #[test]
    fn primitives_cannot_be_transformed() {
        let schema = logger(
            MethodDecl::new("count")
                .with_message(1, "count %d")
                .with_param(
                    Parameter::format("value", TypeRef::new("u32", TypeShape::Primitive))
                        .with_transforms(&[Transform::HashCode]),
                ),
        );

        let errs = run(&schema, "app::Log", &IdRegistry::new());
        assert!(errs.to_string().contains("cannot be a primitive"), "{errs}");
    }

    #[test]
    fn positions_must_cover_every_slot_once() {
        let ok = logger(
            MethodDecl::new("pair")
                .with_message(1, "%1$s %2$s")
                .with_param(Parameter::format("second", TypeRef::string()).with_positions(&[2]))
                .with_param(Parameter::format("first", TypeRef::string()).with_positions(&[1])),
        );
        let errs = run(&ok, "app::Log", &IdRegistry::new());
        assert_eq!(errs.error_count(), 0, "{errs}");

        let dup = logger(
            MethodDecl::new("pair")
                .with_message(1, "%1$s %2$s")
                .with_param(Parameter::format("a", TypeRef::string()).with_positions(&[1]))
                .with_param(Parameter::format("b", TypeRef::string()).with_positions(&[1])),
        );
        let errs = run(&dup, "app::Log", &IdRegistry::new());
        assert!(errs.to_string().contains("already used"), "{errs}");
        assert!(errs.to_string().contains("Positions 2"), "{errs}");
    }

    #[test]
    fn conflicting_markers_are_rejected() {
        let mut param = Parameter::cause("cause");
        param.conflicts.push(ParamRole::Field);
        let schema = logger(
            MethodDecl::new("failed")
                .with_message(1, "failed")
                .with_param(param),
        );

        let errs = run(&schema, "app::Log", &IdRegistry::new());
        assert_eq!(errs.error_count(), 1, "{errs}");
        assert!(errs.to_string().contains("cannot also be Field"), "{errs}");
    }
}
