use super::{BASIC_LOGGER, DeclarationSource};
use crate::prelude::*;
use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    rc::Rc,
};

///
/// ScopedMethod
/// a method paired with the interface that declares it
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ScopedMethod {
    pub interface: String,
    pub decl: MethodDecl,
}

impl ScopedMethod {
    #[must_use]
    pub fn origin(&self) -> Origin {
        Origin::method(self.interface.clone(), self.decl.name.clone())
    }
}

///
/// MethodIndex
/// memoized per-interface method sets over the extension DAG
///

pub struct MethodIndex<'a> {
    source: &'a dyn DeclarationSource,
    memo: RefCell<HashMap<String, Rc<[ScopedMethod]>>>,
}

impl<'a> MethodIndex<'a> {
    #[must_use]
    pub fn new(source: &'a dyn DeclarationSource) -> Self {
        Self {
            source,
            memo: RefCell::default(),
        }
    }

    #[must_use]
    pub const fn source(&self) -> &'a dyn DeclarationSource {
        self.source
    }

    ///
    /// methods_of
    /// local methods first, then every ancestor in extension order, deduplicated by signature
    ///

    pub fn methods_of(&self, path: &str) -> Result<Rc<[ScopedMethod]>, Diagnostic> {
        self.collect(path, &mut HashSet::new())
    }

    fn collect(
        &self,
        path: &str,
        visiting: &mut HashSet<String>,
    ) -> Result<Rc<[ScopedMethod]>, Diagnostic> {
        if let Some(found) = self.memo.borrow().get(path) {
            return Ok(Rc::clone(found));
        }

        let iface = self.source.interface(path).ok_or_else(|| Diagnostic {
            severity: Severity::Error,
            origin: Origin::interface(path),
            message: format!("interface '{path}' could not be found"),
        })?;

        check_interface_like(iface)?;

        if !visiting.insert(path.to_string()) {
            return Err(Diagnostic {
                severity: Severity::Error,
                origin: iface.origin(),
                message: format!("interface '{path}' extends itself"),
            });
        }

        let mut seen = HashSet::new();
        let mut methods: Vec<ScopedMethod> = Vec::new();

        for decl in &iface.methods {
            if seen.insert(decl.signature()) {
                methods.push(ScopedMethod {
                    interface: iface.path.clone(),
                    decl: decl.clone(),
                });
            }
        }

        for parent in &iface.extends {
            if is_basic_logger(parent) {
                continue;
            }
            for inherited in self.collect(parent, visiting)?.iter() {
                if seen.insert(inherited.decl.signature())
                    || is_message_collision(&methods, inherited)
                {
                    methods.push(inherited.clone());
                }
            }
        }

        visiting.remove(path);

        let methods: Rc<[ScopedMethod]> = methods.into();
        self.memo
            .borrow_mut()
            .insert(path.to_string(), Rc::clone(&methods));

        Ok(methods)
    }
}

// A redeclared signature where both sides own a message is kept twice so that
// resolution reports both owners.
fn is_message_collision(methods: &[ScopedMethod], inherited: &ScopedMethod) -> bool {
    if inherited.decl.message.is_none() {
        return false;
    }
    let signature = inherited.decl.signature();
    let same: Vec<_> = methods
        .iter()
        .filter(|m| m.decl.signature() == signature)
        .collect();

    same.iter().any(|m| m.decl.message.is_some())
        && !same.iter().any(|m| m.interface == inherited.interface)
}

fn is_basic_logger(path: &str) -> bool {
    path.rsplit("::").next() == Some(BASIC_LOGGER)
}

// Bundle and logger kinds require a public trait.
fn check_interface_like(iface: &InterfaceDescriptor) -> Result<(), Diagnostic> {
    let problem = if !iface.is_interface {
        Some("is not a trait")
    } else if !iface.is_public {
        Some("must be public")
    } else {
        None
    };

    match problem {
        Some(problem) => Err(Diagnostic {
            severity: Severity::Error,
            origin: iface.origin(),
            message: format!(
                "{} '{}' {problem}",
                match iface.kind {
                    InterfaceKind::Bundle => "message bundle",
                    InterfaceKind::Logger => "message logger",
                    InterfaceKind::None => "interface",
                },
                iface.path
            ),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        let base = InterfaceDescriptor::new("app::Base", InterfaceKind::Logger)
            .with_method(MethodDecl::new("hello").with_message(1, "hello"))
            .with_method(MethodDecl::new("bye").with_message(2, "bye"));
        let child = InterfaceDescriptor::new("app::Child", InterfaceKind::Logger)
            .extending("app::Base")
            .extending("rt::BasicLogger")
            .with_method(MethodDecl::new("hello").with_message(3, "hi"));

        Schema::new().with_interface(base).with_interface(child)
    }

    #[test]
    fn local_methods_shadow_ancestors_by_signature() {
        let base = InterfaceDescriptor::new("app::Base", InterfaceKind::Logger)
            .with_method(MethodDecl::new("hello"))
            .with_method(MethodDecl::new("bye").with_message(2, "bye"));
        let child = InterfaceDescriptor::new("app::Child", InterfaceKind::Logger)
            .extending("app::Base")
            .with_method(MethodDecl::new("hello").with_message(3, "hi"));
        let schema = Schema::new().with_interface(base).with_interface(child);

        let index = MethodIndex::new(&schema);
        let methods = index.methods_of("app::Child").unwrap();

        let names: Vec<_> = methods
            .iter()
            .map(|m| (m.interface.as_str(), m.decl.name.as_str()))
            .collect();
        assert_eq!(names, vec![("app::Child", "hello"), ("app::Base", "bye")]);
    }

    #[test]
    fn redeclared_messages_are_both_kept() {
        let schema = schema();
        let index = MethodIndex::new(&schema);
        let methods = index.methods_of("app::Child").unwrap();

        let names: Vec<_> = methods
            .iter()
            .map(|m| (m.interface.as_str(), m.decl.name.as_str()))
            .collect();
        assert_eq!(
            names,
            vec![
                ("app::Child", "hello"),
                ("app::Base", "hello"),
                ("app::Base", "bye")
            ]
        );
    }

    #[test]
    fn diamond_ancestors_are_listed_once() {
        let root = InterfaceDescriptor::new("app::Root", InterfaceKind::Logger)
            .with_method(MethodDecl::new("hello").with_message(1, "hello"));
        let left = InterfaceDescriptor::new("app::Left", InterfaceKind::Logger).extending("app::Root");
        let right = InterfaceDescriptor::new("app::Right", InterfaceKind::Logger).extending("app::Root");
        let leaf = InterfaceDescriptor::new("app::Leaf", InterfaceKind::Logger)
            .extending("app::Left")
            .extending("app::Right");
        let schema = Schema::new()
            .with_interface(root)
            .with_interface(left)
            .with_interface(right)
            .with_interface(leaf);

        let methods = MethodIndex::new(&schema).methods_of("app::Leaf").unwrap();
        assert_eq!(methods.len(), 1);
    }

    #[test]
    fn method_sets_are_memoized() {
        let schema = schema();
        let index = MethodIndex::new(&schema);
        let first = index.methods_of("app::Base").unwrap();
        let second = index.methods_of("app::Base").unwrap();
        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn non_trait_interfaces_are_rejected() {
        let mut iface = InterfaceDescriptor::new("app::Concrete", InterfaceKind::Bundle);
        iface.is_interface = false;
        let schema = Schema::new().with_interface(iface);

        let err = MethodIndex::new(&schema)
            .methods_of("app::Concrete")
            .expect_err("struct should be rejected");
        assert!(err.message.contains("is not a trait"), "{err}");
    }

    #[test]
    fn cycles_are_reported() {
        let a = InterfaceDescriptor::new("app::A", InterfaceKind::Logger).extending("app::B");
        let b = InterfaceDescriptor::new("app::B", InterfaceKind::Logger).extending("app::A");
        let schema = Schema::new().with_interface(a).with_interface(b);

        let err = MethodIndex::new(&schema)
            .methods_of("app::A")
            .expect_err("cycle should fail");
        assert!(err.message.contains("extends itself"), "{err}");
    }
}
