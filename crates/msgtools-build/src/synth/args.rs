use crate::{SynthError, prelude::*};
use msgtools_schema::{resolve::ResolvedMethod, validate::params::check_transform_combination};
use std::collections::BTreeMap;

///
/// FormatArgs
/// message arguments of one method, plus the temporaries they read from
///

pub struct FormatArgs {
    pub prelude: Vec<Stmt>,
    pub args: Vec<Expr>,
    pub has_transforms: bool,
}

/// Arguments in declaration order, or in position order once positions are declared.
pub fn format_args(m: &ResolvedMethod) -> Result<FormatArgs, SynthError> {
    let mut prelude = Vec::new();
    let mut ordered = Vec::new();
    let mut positioned = BTreeMap::new();

    for param in &m.decl.params {
        let arg = match param.role {
            ParamRole::Transform => {
                let (var, value) =
                    transform(param).map_err(|message| SynthError::InvalidTransform {
                        origin: m.origin().with_param(&param.name),
                        message,
                    })?;
                prelude.push(Stmt::let_(var.clone(), value));
                Expr::var(var).display()
            }
            ParamRole::Format | ParamRole::Positional => argument(param),
            _ => continue,
        };

        if param.positions.is_empty() {
            ordered.push(arg);
        } else {
            for &pos in &param.positions {
                positioned.insert(pos, arg.clone());
            }
        }
    }

    let has_transforms = !prelude.is_empty();
    let args = if positioned.is_empty() {
        ordered
    } else {
        positioned.into_values().collect()
    };

    Ok(FormatArgs {
        prelude,
        args,
        has_transforms,
    })
}

// Custom formatters wrap the value; sequences render as a list.
fn argument(param: &Parameter) -> Expr {
    let value = Expr::var(&param.name).reference();

    if let Some(formatter) = &param.formatter {
        return Expr::call(format!("{formatter}::new"), vec![value]).display();
    }

    match param.ty.shape {
        TypeShape::Array | TypeShape::Collection => {
            Expr::runtime("format::Listed", vec![value]).display()
        }
        _ => Expr::var(&param.name).display(),
    }
}

/// Temporary name and value for a transformed parameter.
pub fn transform(param: &Parameter) -> Result<(String, Expr), String> {
    check_transform_combination(&param.transforms)?;

    let has = |t: Transform| param.transforms.contains(&t);
    let value = Expr::var(&param.name);

    if has(Transform::Size) {
        return Ok((
            temp_name(param, Transform::Size),
            value.method("len", vec![]),
        ));
    }

    let class_of = || Expr::runtime("transform::type_name_of", vec![Expr::var(&param.name).reference()]);
    let hashed = |func: &str| {
        let target = if has(Transform::GetClass) {
            class_of()
        } else {
            Expr::var(&param.name)
        };
        Expr::runtime(format!("transform::{func}"), vec![target.reference()])
    };

    let made = if has(Transform::HashCode) {
        (temp_name(param, Transform::HashCode), hashed("hash_code"))
    } else if has(Transform::IdentityHashCode) {
        (
            temp_name(param, Transform::IdentityHashCode),
            hashed("identity_hash_code"),
        )
    } else {
        (temp_name(param, Transform::GetClass), class_of())
    };

    Ok(made)
}

fn temp_name(param: &Parameter, transform: Transform) -> String {
    format!("{}_{}", param.name, transform.var_suffix())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(decl: MethodDecl) -> ResolvedMethod {
        ResolvedMethod {
            interface: "app::Log".to_string(),
            format_param_count: decl.format_param_count(),
            decl,
            message: None,
            message_key: None,
            inherits_message: false,
            overloaded: false,
        }
    }

    #[test]
    fn positions_reorder_arguments() {
        let m = resolved(
            MethodDecl::new("pair")
                .with_param(Parameter::format("b", TypeRef::string()).with_positions(&[2]))
                .with_param(Parameter::format("a", TypeRef::string()).with_positions(&[1])),
        );

        let args = format_args(&m).unwrap().args;
        assert_eq!(
            args,
            vec![Expr::var("a").display(), Expr::var("b").display()]
        );
    }

    #[test]
    fn causes_and_targets_are_not_arguments() {
        let m = resolved(
            MethodDecl::new("failed")
                .with_param(Parameter::cause("cause"))
                .with_param(Parameter::format("path", TypeRef::string()))
                .with_param(Parameter::new("code", TypeRef::string(), ParamRole::Field)),
        );

        let args = format_args(&m).unwrap();
        assert_eq!(args.args, vec![Expr::var("path").display()]);
        assert!(!args.has_transforms);
    }

    #[test]
    fn class_hash_composes() {
        let param = Parameter::format("value", TypeRef::new("app::Thing", TypeShape::Other))
            .with_transforms(&[Transform::GetClass, Transform::HashCode]);

        let (var, value) = transform(&param).unwrap();
        assert_eq!(var, "value_hash_code");
        assert_eq!(
            value,
            Expr::runtime(
                "transform::hash_code",
                vec![
                    Expr::runtime(
                        "transform::type_name_of",
                        vec![Expr::var("value").reference()]
                    )
                    .reference()
                ],
            )
        );
    }

    #[test]
    fn size_reads_length() {
        let param = Parameter::format("items", TypeRef::new("Vec<u8>", TypeShape::Collection))
            .with_transforms(&[Transform::Size]);

        let (var, value) = transform(&param).unwrap();
        assert_eq!(var, "items_size");
        assert_eq!(value, Expr::var("items").method("len", vec![]));
    }

    #[test]
    fn size_with_another_transform_is_refused() {
        let param = Parameter::format("items", TypeRef::new("Vec<u8>", TypeShape::Collection))
            .with_transforms(&[Transform::Size, Transform::GetClass]);

        let err = transform(&param).unwrap_err();
        assert!(err.contains("SIZE cannot be combined"), "{err}");

        let m = resolved(MethodDecl::new("count").with_param(param));
        let Err(SynthError::InvalidTransform { origin, message }) = format_args(&m) else {
            panic!("expected an invalid transform");
        };
        assert_eq!(origin.to_string(), "app::Log::count(items)");
        assert!(message.contains("SIZE cannot be combined"), "{message}");
    }
}
