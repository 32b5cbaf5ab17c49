use super::{ImplBuilder, args::format_args};
use crate::{SynthError, prelude::*};
use msgtools_schema::resolve::ResolvedMethod;

const RESULT: &str = "result";
const MESSAGE: &str = "message";

/// Format the message, then either return it or build the returned error value.
pub fn body(builder: &ImplBuilder<'_>, m: &ResolvedMethod) -> Result<Vec<Stmt>, SynthError> {
    let ret = &m.decl.return_type;
    let args = format_args(m)?;
    let mut stmts = args.prelude;

    let accessor = Expr::Accessor(m.accessor_name());
    let dialect = m.message.as_ref().map_or(FormatKind::None, |msg| msg.format);
    let formatted = match dialect {
        FormatKind::Indexed => {
            Expr::runtime("format::indexed", vec![accessor, Expr::Slice(args.args)])
        }
        FormatKind::None => accessor.method("to_string", vec![]),
        FormatKind::Printf => {
            Expr::runtime("format::printf", vec![accessor, Expr::Slice(args.args)])
        }
    };

    if ret.shape == TypeShape::Str {
        let value = if ret.name == "String" {
            formatted
        } else {
            Expr::Into(Box::new(formatted))
        };
        stmts.push(Stmt::let_(RESULT, value));
        stmts.push(Stmt::Return(Expr::var(RESULT)));

        return Ok(stmts);
    }

    let descriptor = builder.catalog.describe(ret);
    let construction = descriptor.construction(&m.decl);

    // falls through to default construction; validation already reported it
    let (init, set_cause, drops_message) = match &construction {
        Some(c) => (
            Expr::call(
                format!("{}::{}", ret.name, c.ctor.name),
                c.args
                    .iter()
                    .zip(&c.ctor.params)
                    .map(|(arg, slot)| ctor_arg(arg, slot, m))
                    .collect(),
            ),
            c.set_cause,
            c.drops_message,
        ),
        None => (
            Expr::call(
                format!("<{} as ::core::default::Default>::default", ret.name),
                vec![],
            ),
            m.decl.cause().is_some(),
            true,
        ),
    };

    if !drops_message {
        stmts.push(Stmt::let_(MESSAGE, formatted));
    }
    stmts.push(Stmt::let_mut(RESULT, init));

    if set_cause
        && let (Some(setter), Some(cause)) = (&descriptor.cause_setter, m.decl.cause())
    {
        stmts.push(Stmt::Expr(
            Expr::var(RESULT).method(setter, vec![Expr::var(&cause.name)]),
        ));
    }

    // drop the factory frame so the trace starts at the caller
    stmts.push(Stmt::Expr(Expr::runtime(
        "trim_frames",
        vec![Expr::RefMut(Box::new(Expr::var(RESULT))), Expr::Int(1)],
    )));

    for p in m.decl.params_with(ParamRole::Field) {
        stmts.push(Stmt::Assign {
            target: Expr::Field(Box::new(Expr::var(RESULT)), p.target_name().to_string()),
            value: Expr::var(&p.name),
        });
    }
    for p in m.decl.params_with(ParamRole::Property) {
        stmts.push(Stmt::Expr(Expr::var(RESULT).method(
            setter_name(p.target_name()),
            vec![Expr::var(&p.name)],
        )));
    }

    stmts.push(Stmt::Return(Expr::var(RESULT)));

    Ok(stmts)
}

// Adapt the formatted message or the cause to the constructor slot type.
fn ctor_arg(arg: &CtorArg, slot: &TypeRef, m: &ResolvedMethod) -> Expr {
    match arg {
        CtorArg::Message => {
            let message = Expr::var(MESSAGE);
            if slot.name.starts_with('&') {
                message.reference()
            } else if slot.name == "String" || slot.name.starts_with("impl ") {
                message
            } else {
                Expr::Into(Box::new(message))
            }
        }
        CtorArg::Cause => {
            let cause = m
                .decl
                .cause()
                .map_or(Expr::None, |p| Expr::var(&p.name));
            if slot.is_optional() {
                cause.some()
            } else {
                cause
            }
        }
        CtorArg::NoCause => Expr::None,
        CtorArg::Param(name) => Expr::var(name),
    }
}
