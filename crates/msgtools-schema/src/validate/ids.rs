use crate::{
    prelude::*,
    registry::{IdOwner, IdRegistry},
    resolve::ResolvedInterface,
};

/// Padding length, id ranges and per-project id uniqueness.
pub fn validate_ids(resolved: &ResolvedInterface, registry: &IdRegistry, errs: &mut Diagnostics) {
    let iface = &resolved.descriptor;
    let origin = iface.origin();
    let code = iface.project_code.as_str();

    // length
    if iface.id_length != 0 && !ID_LENGTH_RANGE.contains(&iface.id_length) {
        err!(
            errs,
            origin,
            "Invalid id length {}. Must be 0 (off) or between {} and {}.",
            iface.id_length,
            ID_LENGTH_RANGE.start(),
            ID_LENGTH_RANGE.end()
        );
    } else if !code.is_empty()
        && let Err((length, other)) = registry.claim_length(code, iface.id_length, &iface.path)
    {
        err!(
            errs,
            origin,
            "Project code '{code}' uses id length {length} in {other}; {} declares {}.",
            iface.path,
            iface.id_length
        );
    }

    // ranges
    let mut ranges = Vec::with_capacity(iface.valid_id_ranges.len());
    for range in &iface.valid_id_ranges {
        if range.min > range.max {
            err!(
                errs,
                origin,
                "Invalid id range {range}: the minimum is greater than the maximum."
            );
        } else {
            ranges.push(*range);
        }
    }
    if !code.is_empty() {
        for (range, claim) in registry.claim_ranges(code, &ranges, &iface.path) {
            err!(
                errs,
                origin,
                "Id range {range} overlaps range {} of {} for project code '{code}'.",
                claim.range,
                claim.interface
            );
        }
    }

    for m in &resolved.methods {
        if m.inherits_message {
            continue;
        }
        let Some(message) = &m.message else { continue };
        let Some(id) = message.id.value() else { continue };
        if message.id_inherited || id < 0 {
            continue;
        }

        // declared ranges bind only the interface's own methods
        if m.interface == iface.path
            && !ranges.is_empty()
            && !ranges.iter().any(|r| r.contains(id))
        {
            let listed: Vec<String> = ranges.iter().map(ToString::to_string).collect();
            err!(
                errs,
                m.origin(),
                "Message id {id} is outside the valid range(s) {}.",
                listed.join(", ")
            );
        }

        if code.is_empty() {
            continue;
        }

        let owner = IdOwner {
            interface: m.interface.clone(),
            method: m.name().to_string(),
        };
        if let Err(existing) = registry.claim_id(code, id, owner) {
            err!(
                errs,
                m.origin(),
                "Message id {code}{id} is not unique; it is also used by {}.",
                existing.origin()
            );
            // the earlier owner may belong to an already validated interface;
            // its half of the report still lands in the current sink
            err!(
                errs,
                existing.origin(),
                "Message id {code}{id} is not unique; it is also used by {}.",
                m.origin()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{prelude::*, registry::IdRegistry, validate::tests::run};

    fn logger(path: &str) -> InterfaceDescriptor {
        InterfaceDescriptor::new(path, InterfaceKind::Logger).with_project_code("EX")
    }

    fn info(name: &str, id: i64) -> MethodDecl {
        MethodDecl::new(name)
            .with_message(id, name.to_string())
            .with_level(Level::Info)
    }

    #[test]
    fn duplicate_across_interfaces_names_the_earlier_owner() {
        let schema = Schema::new()
            .with_interface(logger("app::First").with_method(info("started", 7)))
            .with_interface(logger("app::Second").with_method(info("stopped", 7)));
        let registry = IdRegistry::new();

        let first = run(&schema, "app::First", &registry);
        assert!(first.is_empty(), "{first}");

        let second = run(&schema, "app::Second", &registry);
        assert_eq!(second.error_count(), 2, "{second}");
        assert!(second.iter().any(|d| d.origin.interface == "app::First"));
        assert!(second.iter().any(|d| d.origin.interface == "app::Second"));
    }

    #[test]
    fn duplicate_ids_report_both_owners() {
        let schema = Schema::new().with_interface(
            logger("app::Log")
                .with_method(info("started", 7))
                .with_method(info("stopped", 7)),
        );

        let errs = run(&schema, "app::Log", &IdRegistry::new());
        assert_eq!(errs.error_count(), 2, "{errs}");
        assert!(errs.iter().any(|d| d.origin.method.as_deref() == Some("started")));
        assert!(errs.iter().any(|d| d.origin.method.as_deref() == Some("stopped")));
    }

    #[test]
    fn ids_collide_across_interfaces_sharing_a_registry() {
        let registry = IdRegistry::new();
        let first = Schema::new().with_interface(logger("a::Log").with_method(info("started", 3)));
        let second = Schema::new().with_interface(logger("b::Log").with_method(info("other", 3)));

        assert_eq!(run(&first, "a::Log", &registry).error_count(), 0);
        let errs = run(&second, "b::Log", &registry);
        assert_eq!(errs.error_count(), 2, "{errs}");
    }

    #[test]
    fn length_must_be_off_or_in_range() {
        let schema =
            Schema::new().with_interface(logger("app::Log").with_id_length(2).with_method(info("a", 1)));
        let errs = run(&schema, "app::Log", &IdRegistry::new());
        assert!(errs.to_string().contains("Invalid id length 2"), "{errs}");

        let off =
            Schema::new().with_interface(logger("app::Log").with_id_length(0).with_method(info("a", 1)));
        assert_eq!(run(&off, "app::Log", &IdRegistry::new()).error_count(), 0);
    }

    #[test]
    fn ids_must_fall_inside_declared_ranges() {
        let mut iface = logger("app::Log")
            .with_method(info("inside", 10))
            .with_method(info("outside", 200));
        iface.valid_id_ranges = vec![IdRange::new(1, 99), IdRange::new(50, 10)];

        let errs = run(&Schema::new().with_interface(iface), "app::Log", &IdRegistry::new());
        assert_eq!(errs.error_count(), 2, "{errs}");
        assert!(errs.to_string().contains("minimum is greater"));
        assert!(errs.to_string().contains("outside the valid range(s) 1-99"));
    }
}
