//! `${key}` / `${key:default}` expressions in message text.

use msgtools_build::translate::Properties;
use msgtools_frontend::SourceSet;
use regex::{Captures, Regex};
use std::{env, sync::LazyLock};

static EXPRESSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}:]+)(?::([^}]*))?\}").expect("expression pattern"));

/// Keys with this prefix read the process environment.
const ENV_PREFIX: &str = "env.";

/// Replace every expression in `text`; unresolved expressions without a default stay as written.
#[must_use]
pub fn resolve(properties: &Properties, text: &str) -> String {
    EXPRESSION
        .replace_all(text, |caps: &Captures| {
            let key = &caps[1];
            let value = match key.strip_prefix(ENV_PREFIX) {
                Some(var) => env::var(var).ok(),
                None => properties.get(key).map(ToString::to_string),
            };

            value
                .or_else(|| caps.get(2).map(|d| d.as_str().to_string()))
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Substitute expressions in every declared message; returns the number of texts changed.
pub fn substitute(source: &mut SourceSet, properties: &Properties) -> usize {
    let mut changed = 0;

    for iface in source.interfaces_mut() {
        for message in iface.methods.iter_mut().filter_map(|m| m.message.as_mut()) {
            let resolved = resolve(properties, &message.text);
            if resolved != message.text {
                message.text = resolved;
                changed += 1;
            }
        }
    }

    tracing::debug!(target: "msgtools", stage = "expressions", changed);

    changed
}
