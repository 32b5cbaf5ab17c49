use super::{params, return_type};
use crate::{format, prelude::*, resolve::ResolvedMethod};

/// Validate one resolved method against its interface.
pub fn validate_method(
    iface: &InterfaceDescriptor,
    m: &ResolvedMethod,
    catalog: &TypeCatalog<'_>,
    errs: &mut Diagnostics,
) {
    let origin = m.origin();

    for thrown in &m.decl.thrown {
        if !catalog.describe(thrown).throwable {
            err!(
                errs,
                origin,
                "Declared thrown type {thrown} is not an error type."
            );
        }
    }

    if m.decl.once && !m.is_logging() {
        err!(
            errs,
            origin,
            "#[once] is only allowed on logging methods; '{}' has no log level.",
            m.name()
        );
    }

    if m.is_logging() && iface.kind == InterfaceKind::Bundle {
        err!(
            errs,
            origin,
            "Message bundle method '{}' cannot declare a log level.",
            m.name()
        );
    }

    validate_message(m, errs);
    params::validate_params(m, errs);

    if m.is_logging() {
        if !m.decl.return_type.is_unit() {
            err!(
                errs,
                origin,
                "Message logger methods can only have a void return type; '{}' returns {}.",
                m.name(),
                m.decl.return_type
            );
        }
    } else {
        return_type::validate_bundle_return(m, catalog, errs);
    }
}

fn validate_message(m: &ResolvedMethod, errs: &mut Diagnostics) {
    let origin = m.origin();

    let Some(message) = &m.message else {
        err!(
            errs,
            origin,
            "All message bundles and message logger message methods must have or inherit a message."
        );
        return;
    };

    // id and format defects are reported on the declaring method only
    if !m.inherits_message
        && let MessageId::Value(id) = message.id
        && id < 0
    {
        err!(
            errs,
            origin,
            "Message id {id} is invalid. Must be greater than 0 or inherit another valid id."
        );
    }

    let parsed = match format::validate(message.format, &message.text) {
        Ok(parsed) => parsed,
        Err(e) => {
            if !m.inherits_message {
                err!(errs, origin, "{e}");
            }
            return;
        }
    };

    let provided = m.format_param_count;
    let required = parsed.argument_count;

    // a borrowed message may leave trailing arguments unused
    let matches = if m.borrows_message() {
        required <= provided
    } else {
        required == provided
    };

    if !matches {
        err!(
            errs,
            origin,
            "Parameter count does not match for format '{}'. Required: {required} Provided: {provided}",
            message.text
        );
    }
}
