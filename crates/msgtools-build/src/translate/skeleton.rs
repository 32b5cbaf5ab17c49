use crate::prelude::*;
use msgtools_schema::{format, resolve::ResolvedInterface};
use std::{collections::HashSet, fmt::Write};

/// Properties text listing every translation key with its primary message,
/// ready to be copied to `<Interface>.i18n_<locale>.properties`.
#[must_use]
pub fn skeleton(resolved: &ResolvedInterface) -> String {
    let mut out = String::new();
    let mut seen = HashSet::new();

    for m in &resolved.methods {
        let Some(message) = &m.message else {
            continue;
        };
        let key = m.translation_key();
        if !seen.insert(key.clone()) {
            continue;
        }

        // printf entries get explicit indexes so translators can reorder arguments
        let text = match message.format {
            FormatKind::Printf => format::validate(FormatKind::Printf, &message.text)
                .map_or_else(|_| message.text.clone(), |p| p.with_explicit_indexes()),
            _ => message.text.clone(),
        };

        let _ = writeln!(
            out,
            "# Id: {}",
            message
                .id
                .value()
                .map_or_else(|| "none".to_string(), |id| id.to_string())
        );
        if let Some(level) = m.decl.level {
            let _ = writeln!(out, "# Level: {}", level.to_string().to_uppercase());
        }
        let _ = writeln!(out, "# Message: {}", message.text);

        for (i, p) in m
            .decl
            .params
            .iter()
            .filter(|p| p.role.is_format_arg())
            .enumerate()
        {
            let _ = write!(out, "# @param {}: {}", i + 1, p.name);
            if !p.transforms.is_empty() {
                let transforms: Vec<String> = p.transforms.iter().map(ToString::to_string).collect();
                let _ = write!(out, " ({})", transforms.join(", "));
            }
            out.push('\n');
        }

        let _ = writeln!(out, "{}={}\n", escape(&key, true), escape(&text, false));
    }

    out
}

fn escape(text: &str, is_key: bool) -> String {
    let mut out = String::with_capacity(text.len());

    for (i, c) in text.chars().enumerate() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '=' | ':' | ' ' if is_key => {
                out.push('\\');
                out.push(c);
            }
            ' ' if i == 0 => out.push_str("\\ "),
            '#' | '!' if i == 0 => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translate::Properties;
    use msgtools_schema::resolve::resolve;

    #[test]
    fn skeleton_lists_keys_with_comments() {
        let schema = Schema::new().with_interface(
            InterfaceDescriptor::new("app::AppLogger", InterfaceKind::Logger)
                .with_method(
                    MethodDecl::new("greet")
                        .with_message(5, "Hi")
                        .with_level(Level::Info),
                )
                .with_method(
                    MethodDecl::new("greet")
                        .with_message(0, "Hi %s, %s")
                        .with_level(Level::Info)
                        .with_param(Parameter::format("first", TypeRef::string()))
                        .with_param(Parameter::format("last", TypeRef::string())),
                ),
        );
        let index = MethodIndex::new(&schema);
        let mut errs = Diagnostics::new();
        let resolved = resolve(&index, "app::AppLogger", &mut errs).unwrap();

        let text = skeleton(&resolved);
        assert!(text.contains("# Id: 5\n# Level: INFO\n# Message: Hi\ngreet.0=Hi\n"));
        assert!(text.contains("# Id: none\n"));
        assert!(text.contains("# @param 1: first\n# @param 2: last\n"));

        let props = Properties::parse(&text).unwrap();
        assert_eq!(props.get("greet.2"), Some("Hi %1$s, %2$s"));
        assert_eq!(props.len(), 2);
    }

    #[test]
    fn values_are_escaped() {
        assert_eq!(escape("a=b c", true), "a\\=b\\ c");
        assert_eq!(escape(" #x\\y\n", false), "\\ #x\\\\y\\n");
        assert_eq!(escape("#x", false), "\\#x");
    }
}
