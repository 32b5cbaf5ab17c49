use super::{ImplBuilder, args::format_args};
use crate::{SynthError, prelude::*};
use msgtools_schema::resolve::ResolvedMethod;

const RELAXED: &str = "::core::sync::atomic::Ordering::Relaxed";

/// Dispatch to the wrapped logger with a level- and dialect-specific call.
pub fn body(builder: &ImplBuilder<'_>, m: &ResolvedMethod) -> Result<Vec<Stmt>, SynthError> {
    let level = m.decl.level.unwrap_or_default();
    let dialect = m.message.as_ref().map_or(FormatKind::None, |msg| msg.format);
    let args = format_args(m)?;

    // an explicit logging-class parameter replaces the class constant
    let fqcn = m
        .decl
        .params_with(ParamRole::Fqcn)
        .next()
        .map_or(Expr::Fqcn, |p| Expr::AsStr(Box::new(Expr::var(&p.name))));

    let cause = m.decl.cause().map_or(Expr::None, |p| {
        Expr::runtime("cause", vec![Expr::var(&p.name).reference()]).some()
    });

    let call = Expr::Logger.method(
        dialect.log_fn(),
        vec![
            fqcn,
            Expr::Level(level),
            cause,
            Expr::Accessor(m.accessor_name()),
            Expr::Slice(args.args),
        ],
    );

    let mut stmts = args.prelude;
    stmts.push(Stmt::Expr(call));

    let enabled = Expr::Logger.method("is_enabled", vec![Expr::Level(level)]);

    let body = if m.decl.once {
        let guard = Expr::Path(builder.guard_name(m.name())).method(
            "swap",
            vec![Expr::Bool(true), Expr::Path(RELAXED.to_string())],
        );
        let cond = Expr::And(Box::new(enabled), Box::new(Expr::Not(Box::new(guard))));

        vec![Stmt::If { cond, body: stmts }]
    } else if args.has_transforms {
        vec![Stmt::If {
            cond: enabled,
            body: stmts,
        }]
    } else {
        stmts
    };

    Ok(body)
}
