//! Code synthesis: one synthetic class per validated interface.

pub mod args;
mod bundle;
mod logger;

use crate::{SynthError, prelude::*};
use convert_case::{Case, Casing};
use msgtools_schema::resolve::{ResolvedInterface, ResolvedMethod};
use std::collections::HashSet;

/// Literal prefix for a message id, e.g. `EX000100: `.
#[must_use]
pub fn id_prefix(project_code: &str, id_length: u8, id: MessageId) -> String {
    match id.value() {
        Some(id) if !project_code.is_empty() => {
            let width = usize::from(id_length);
            format!("{project_code}{id:0>width$}: ")
        }
        _ => String::new(),
    }
}

///
/// ImplBuilder
///

pub struct ImplBuilder<'a> {
    pub(crate) resolved: &'a ResolvedInterface,
    pub(crate) catalog: &'a TypeCatalog<'a>,
}

impl<'a> ImplBuilder<'a> {
    #[must_use]
    pub const fn new(resolved: &'a ResolvedInterface, catalog: &'a TypeCatalog<'a>) -> Self {
        Self { resolved, catalog }
    }

    /// Build the primary implementation; single pass, no back-tracking per method.
    pub fn build(&self) -> Result<ClassDef, SynthError> {
        let iface = &self.resolved.descriptor;
        let implements = self.implements();
        let name = iface.impl_name();
        let methods = self
            .resolved
            .methods
            .iter()
            .map(|m| self.method(m))
            .collect::<Result<Vec<_>, _>>()?;

        let class = ClassDef {
            primary: name.clone(),
            name,
            interface: iface.path.clone(),
            kind: iface.kind,
            locale: iface.root_locale.clone().unwrap_or_default(),
            parent: None,
            delegates_basic_logger: iface.kind == InterfaceKind::Logger
                && self.extends_basic_logger(&implements),
            implements,
            accessors: self.accessors(),
            methods,
            guards: self.guards(),
        };

        tracing::debug!(
            target: "msgtools",
            stage = "synthesize",
            interface = %class.interface,
            class = %class.name,
            methods = class.methods.len(),
            accessors = class.accessors.len(),
        );

        Ok(class)
    }

    /// Name of the log-once flag shared by every overload of `method`.
    #[must_use]
    pub fn guard_name(&self, method: &str) -> String {
        let class = self.resolved.descriptor.impl_name().replace('$', "_");

        format!("{class}_{method}_once").to_case(Case::Constant)
    }

    // annotated interface first, then ancestors depth-first
    fn implements(&self) -> Vec<String> {
        let source = self.catalog.source();
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        let mut stack = vec![self.resolved.path().to_string()];

        while let Some(path) = stack.pop() {
            if !seen.insert(path.clone()) {
                continue;
            }
            if let Some(iface) = source.interface(&path) {
                stack.extend(
                    iface
                        .extends
                        .iter()
                        .rev()
                        .filter(|p| !is_basic_logger(p))
                        .cloned(),
                );
            }
            out.push(path);
        }

        out
    }

    fn extends_basic_logger(&self, implements: &[String]) -> bool {
        let source = self.catalog.source();

        implements.iter().any(|path| {
            source.interface(path).is_some_and(|iface| {
                iface.extends_basic_logger || iface.extends.iter().any(|p| is_basic_logger(p))
            })
        })
    }

    // one accessor per message literal, shared across a family
    fn accessors(&self) -> Vec<AccessorDef> {
        let iface = &self.resolved.descriptor;
        let mut seen = HashSet::new();

        self.resolved
            .methods
            .iter()
            .filter_map(|m| {
                let message = m.message.as_ref()?;
                let name = m.accessor_name();
                if !seen.insert(name.clone()) {
                    return None;
                }

                Some(AccessorDef {
                    name,
                    key: m.translation_key(),
                    prefix: id_prefix(&iface.project_code, iface.id_length, message.id),
                    body: AccessorBody::Literal(message.text.clone()),
                })
            })
            .collect()
    }

    fn guards(&self) -> Vec<GuardDef> {
        let mut seen = HashSet::new();

        self.resolved
            .methods
            .iter()
            .filter(|m| m.decl.once && m.is_logging() && seen.insert(m.name().to_string()))
            .map(|m| GuardDef {
                name: self.guard_name(m.name()),
                method: m.name().to_string(),
            })
            .collect()
    }

    fn method(&self, m: &ResolvedMethod) -> Result<MethodDef, SynthError> {
        let ret = &m.decl.return_type;
        let body = if m.is_logging() {
            logger::body(self, m)?
        } else {
            bundle::body(self, m)?
        };

        Ok(MethodDef {
            name: m.name().to_string(),
            interface: m.interface.clone(),
            params: m
                .decl
                .params
                .iter()
                .map(|p| ParamDef {
                    name: p.name.clone(),
                    ty: p.ty.name.clone(),
                })
                .collect(),
            return_type: (!ret.is_unit()).then(|| ret.name.clone()),
            body,
        })
    }
}

fn is_basic_logger(path: &str) -> bool {
    path.rsplit("::").next() == Some(BASIC_LOGGER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use msgtools_schema::resolve::resolve;

    fn build(schema: &Schema, path: &str) -> ClassDef {
        let index = MethodIndex::new(schema);
        let catalog = TypeCatalog::new(schema);
        let mut errs = Diagnostics::new();
        let resolved = resolve(&index, path, &mut errs).expect("resolves");
        assert!(!errs.has_errors(), "{errs}");

        ImplBuilder::new(&resolved, &catalog).build().unwrap()
    }

    fn logger() -> InterfaceDescriptor {
        InterfaceDescriptor::new("app::AppLogger", InterfaceKind::Logger).with_project_code("EX")
    }

    #[test]
    fn prefixes_pad_to_the_configured_length() {
        assert_eq!(id_prefix("EX", 6, MessageId::Value(100)), "EX000100: ");
        assert_eq!(id_prefix("EX", 0, MessageId::Value(100)), "EX100: ");
        assert_eq!(id_prefix("", 6, MessageId::Value(100)), "");
        assert_eq!(id_prefix("EX", 6, MessageId::None), "");
    }

    #[test]
    fn logger_method_passes_prefixed_message_and_one_argument() {
        let schema = Schema::new().with_interface(
            logger().with_method(
                MethodDecl::new("hello")
                    .with_message(100, "hello, %s")
                    .with_level(Level::Info)
                    .with_param(Parameter::format("name", TypeRef::string())),
            ),
        );
        let class = build(&schema, "app::AppLogger");

        let accessor = class.accessor("hello$str").expect("accessor");
        assert_eq!(accessor.literal().as_deref(), Some("EX000100: hello, %s"));

        let hello = class.method("hello").expect("method");
        assert_eq!(
            hello.body,
            vec![Stmt::Expr(Expr::Logger.method(
                "logf",
                vec![
                    Expr::Fqcn,
                    Expr::Level(Level::Info),
                    Expr::None,
                    Expr::Accessor("hello$str".to_string()),
                    Expr::Slice(vec![Expr::var("name").display()]),
                ],
            ))]
        );
    }

    #[test]
    fn overloads_share_one_accessor() {
        let schema = Schema::new().with_interface(
            logger()
                .with_method(
                    MethodDecl::new("greet")
                        .with_message(5, "Hi")
                        .with_level(Level::Info),
                )
                .with_method(
                    MethodDecl::new("greet")
                        .with_level(Level::Info)
                        .with_param(Parameter::format("name", TypeRef::string())),
                ),
        );
        let class = build(&schema, "app::AppLogger");

        assert_eq!(class.accessors.len(), 1);
        assert_eq!(class.accessors[0].name, "greet0$str");
        assert_eq!(class.methods.len(), 2);
        assert!(class.methods.iter().all(|m| matches!(
            &m.body[0],
            Stmt::Expr(Expr::Method { args, .. }) if args[3] == Expr::Accessor("greet0$str".to_string())
        )));
    }

    #[test]
    fn once_guards_the_call() {
        let mut method = MethodDecl::new("started")
            .with_message(1, "started")
            .with_level(Level::Warn);
        method.once = true;
        let schema = Schema::new().with_interface(logger().with_method(method));
        let class = build(&schema, "app::AppLogger");

        assert_eq!(class.guards.len(), 1);
        assert_eq!(class.guards[0].name, "APP_LOGGER_LOGGER_STARTED_ONCE");
        assert!(matches!(&class.methods[0].body[..], [Stmt::If { cond: Expr::And(..), body }] if body.len() == 1));
    }

    #[test]
    fn transforms_are_checked_for_enabled_level() {
        let schema = Schema::new().with_interface(
            logger().with_method(
                MethodDecl::new("sized")
                    .with_message(2, "size %d")
                    .with_level(Level::Debug)
                    .with_param(
                        Parameter::format("items", TypeRef::new("Vec<u8>", TypeShape::Collection))
                            .with_transforms(&[Transform::Size]),
                    ),
            ),
        );
        let class = build(&schema, "app::AppLogger");

        let Stmt::If { cond, body } = &class.methods[0].body[0] else {
            panic!("expected an enabled check");
        };
        assert_eq!(
            cond,
            &Expr::Logger.method("is_enabled", vec![Expr::Level(Level::Debug)])
        );
        assert!(matches!(&body[0], Stmt::Let { name, .. } if name == "items_size"));
    }

    #[test]
    fn default_constructed_error_sets_cause_and_trims_frames() {
        let failure = TypeRef::new("Failure", TypeShape::Other);
        let schema = Schema::new()
            .with_interface(
                InterfaceDescriptor::new("app::Messages", InterfaceKind::Bundle).with_method(
                    MethodDecl::new("failed")
                        .with_message(3, "failed")
                        .with_param(Parameter::cause("cause"))
                        .returning(failure),
                ),
            )
            .with_type(
                ReturnTypeDescriptor::throwable("Failure")
                    .with_constructor(Constructor::new("default", vec![]))
                    .with_cause_setter("set_source"),
            );
        let class = build(&schema, "app::Messages");

        assert_eq!(
            class.method("failed").expect("method").body,
            vec![
                Stmt::let_mut("result", Expr::call("Failure::default", vec![])),
                Stmt::Expr(Expr::var("result").method("set_source", vec![Expr::var("cause")])),
                Stmt::Expr(Expr::runtime(
                    "trim_frames",
                    vec![Expr::RefMut(Box::new(Expr::var("result"))), Expr::Int(1)],
                )),
                Stmt::Return(Expr::var("result")),
            ]
        );
    }

    #[test]
    fn conflicting_transforms_stop_synthesis() {
        let schema = Schema::new().with_interface(
            logger().with_method(
                MethodDecl::new("count")
                    .with_message(3, "%s items")
                    .with_level(Level::Info)
                    .with_param(
                        Parameter::format("items", TypeRef::new("Vec<u8>", TypeShape::Collection))
                            .with_transforms(&[Transform::Size, Transform::HashCode]),
                    ),
            ),
        );
        let index = MethodIndex::new(&schema);
        let catalog = TypeCatalog::new(&schema);
        let mut errs = Diagnostics::new();
        let resolved = resolve(&index, "app::AppLogger", &mut errs).expect("resolves");

        let err = ImplBuilder::new(&resolved, &catalog)
            .build()
            .expect_err("size cannot combine");
        assert!(err.to_string().starts_with("app::AppLogger::count(items)"), "{err}");
    }

    #[test]
    fn basic_logger_is_detected_through_ancestors() {
        let schema = Schema::new()
            .with_interface(
                InterfaceDescriptor::new("app::Base", InterfaceKind::Logger).extending("BasicLogger"),
            )
            .with_interface(logger().extending("app::Base"));
        let class = build(&schema, "app::AppLogger");

        assert_eq!(class.implements, vec!["app::AppLogger", "app::Base"]);
        assert!(class.delegates_basic_logger);
    }
}
