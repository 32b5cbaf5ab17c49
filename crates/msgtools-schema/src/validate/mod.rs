//! Validation orchestration over a resolved interface.

pub mod ids;
pub mod locale;
pub mod method;
pub mod params;
pub mod return_type;

use crate::{prelude::*, registry::IdRegistry, resolve::ResolvedInterface};

///
/// Validator
///

pub struct Validator<'a> {
    catalog: &'a TypeCatalog<'a>,
    registry: IdRegistry,
}

impl<'a> Validator<'a> {
    #[must_use]
    pub const fn new(catalog: &'a TypeCatalog<'a>, registry: IdRegistry) -> Self {
        Self { catalog, registry }
    }

    /// Run every rule in a staged, deterministic order; rules never mutate the model.
    pub fn validate(&self, resolved: &ResolvedInterface, errs: &mut Diagnostics) {
        // Phase 1: interface shape.
        validate_interface(&resolved.descriptor, errs);

        // Phase 2: each method (message, format, parameters, return type).
        for m in &resolved.methods {
            method::validate_method(&resolved.descriptor, m, self.catalog, errs);
        }

        // Phase 3: run-wide id invariants through the shared registry.
        ids::validate_ids(resolved, &self.registry, errs);

        tracing::debug!(
            target: "msgtools",
            stage = "validate",
            interface = %resolved.descriptor.path,
            errors = errs.error_count(),
            warnings = errs.warning_count(),
        );
    }
}

fn validate_interface(iface: &InterfaceDescriptor, errs: &mut Diagnostics) {
    let origin = iface.origin();

    if iface.kind == InterfaceKind::None {
        err!(
            errs,
            origin,
            "'{}' must be declared as a message bundle or a message logger",
            iface.path
        );
    }

    if let Some(locale) = &iface.root_locale {
        locale::validate_root_locale(locale, &origin, errs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::resolve;

    pub(crate) fn run(schema: &Schema, path: &str, registry: &IdRegistry) -> Diagnostics {
        let index = MethodIndex::new(schema);
        let catalog = TypeCatalog::new(schema);
        let mut errs = Diagnostics::new();
        let resolved = resolve(&index, path, &mut errs).expect("interface should resolve");
        Validator::new(&catalog, registry.clone()).validate(&resolved, &mut errs);

        errs
    }

    fn logger() -> InterfaceDescriptor {
        InterfaceDescriptor::new("app::Log", InterfaceKind::Logger).with_project_code("EX")
    }

    #[test]
    fn greet_overload_inherits_without_errors() {
        let iface = logger()
            .with_method(
                MethodDecl::new("greet")
                    .with_message(5, "Hi")
                    .with_level(Level::Info),
            )
            .with_method(
                MethodDecl::new("greet")
                    .with_level(Level::Info)
                    .with_param(Parameter::format("name", TypeRef::string())),
            );
        let schema = Schema::new().with_interface(iface);

        let errs = run(&schema, "app::Log", &IdRegistry::new());
        assert_eq!(errs.error_count(), 0, "{errs}");
    }

    #[test]
    fn two_causes_produce_exactly_one_error() {
        let iface = logger().with_method(
            MethodDecl::new("failed")
                .with_message(9, "failed")
                .with_level(Level::Error)
                .with_param(Parameter::cause("first"))
                .with_param(Parameter::cause("second")),
        );
        let schema = Schema::new().with_interface(iface);

        let errs = run(&schema, "app::Log", &IdRegistry::new());
        assert_eq!(errs.error_count(), 1, "{errs}");
        assert!(errs.to_string().contains("Only one cause parameter is allowed"));
    }

    #[test]
    fn missing_message_is_an_error_per_method() {
        let iface = logger()
            .with_method(MethodDecl::new("first").with_level(Level::Info))
            .with_method(MethodDecl::new("second").with_level(Level::Info));
        let schema = Schema::new().with_interface(iface);

        let errs = run(&schema, "app::Log", &IdRegistry::new());
        assert_eq!(errs.error_count(), 2, "{errs}");
        assert!(
            errs.iter()
                .all(|d| d.message.contains("must have or inherit a message"))
        );
    }

    #[test]
    fn undeclared_kind_is_rejected() {
        let iface = InterfaceDescriptor::new("app::Plain", InterfaceKind::None);
        let schema = Schema::new().with_interface(iface);

        let errs = run(&schema, "app::Plain", &IdRegistry::new());
        assert!(errs.to_string().contains("message bundle or a message logger"));
    }
}
