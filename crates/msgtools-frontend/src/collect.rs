//! Item collection over parsed source files.

use crate::attr;
use std::collections::HashMap;
use syn::{
    Attribute, FnArg, ImplItem, Item, ItemImpl, ItemStruct, ItemTrait, Path, ReturnType, Token,
    Type, Visibility, punctuated::Punctuated,
};

///
/// RawInterface
/// an annotated item, or a trait carrying message methods, before conversion
///

#[derive(Clone, Debug)]
pub struct RawInterface {
    pub module: String,
    pub ident: String,
    pub attrs: Vec<Attribute>,
    pub is_public: bool,

    /// None for an annotated struct or enum.
    pub item: Option<ItemTrait>,
}

impl RawInterface {
    #[must_use]
    pub fn path(&self) -> String {
        join(&self.module, &self.ident)
    }
}

///
/// TypeInfo
/// members of one named type gathered across every impl block
///

#[derive(Clone, Debug, Default)]
pub struct TypeInfo {
    pub throwable: bool,
    pub default: bool,
    pub constructors: Vec<(String, Vec<Type>)>,
    pub fields: Vec<(String, Type, bool)>,

    /// `&mut self` methods with one argument.
    pub mut_methods: Vec<(String, Type, bool)>,
}

///
/// Collector
///

#[derive(Debug, Default)]
pub struct Collector {
    pub interfaces: Vec<RawInterface>,
    pub types: HashMap<String, TypeInfo>,
}

impl Collector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(&mut self, module: &str, file: &syn::File) {
        self.items(module, &file.items);
    }

    fn items(&mut self, module: &str, items: &[Item]) {
        for item in items {
            match item {
                Item::Trait(t) => self.item_trait(module, t),
                Item::Struct(s) => self.item_struct(module, s),
                Item::Enum(e) => {
                    self.annotated_non_trait(module, &e.ident.to_string(), &e.attrs, &e.vis);
                    self.derives(&e.ident.to_string(), &e.attrs);
                }
                Item::Impl(i) => self.item_impl(i),
                Item::Mod(m) => {
                    if let Some((_, content)) = &m.content {
                        self.items(&join(module, &m.ident.to_string()), content);
                    }
                }
                _ => {}
            }
        }
    }

    fn item_trait(&mut self, module: &str, t: &ItemTrait) {
        let annotated = is_annotated(&t.attrs);
        let has_messages = t.items.iter().any(|item| match item {
            syn::TraitItem::Fn(f) => attr::find(&f.attrs, attr::MESSAGE).is_some(),
            _ => false,
        });

        if annotated || has_messages {
            self.interfaces.push(RawInterface {
                module: module.to_string(),
                ident: t.ident.to_string(),
                attrs: t.attrs.clone(),
                is_public: is_public(&t.vis),
                item: Some(t.clone()),
            });
        }
    }

    fn item_struct(&mut self, module: &str, s: &ItemStruct) {
        let ident = s.ident.to_string();
        self.annotated_non_trait(module, &ident, &s.attrs, &s.vis);
        self.derives(&ident, &s.attrs);

        let info = self.types.entry(ident).or_default();
        for field in &s.fields {
            if let Some(name) = &field.ident {
                info.fields
                    .push((name.to_string(), field.ty.clone(), is_public(&field.vis)));
            }
        }
    }

    fn annotated_non_trait(&mut self, module: &str, ident: &str, attrs: &[Attribute], vis: &Visibility) {
        if is_annotated(attrs) {
            self.interfaces.push(RawInterface {
                module: module.to_string(),
                ident: ident.to_string(),
                attrs: attrs.to_vec(),
                is_public: is_public(vis),
                item: None,
            });
        }
    }

    // `#[derive(Default)]` and `#[derive(Error)]` / `#[derive(thiserror::Error)]`
    fn derives(&mut self, ident: &str, attrs: &[Attribute]) {
        for attr in attrs.iter().filter(|a| a.path().is_ident("derive")) {
            let Ok(paths) = attr.parse_args_with(Punctuated::<Path, Token![,]>::parse_terminated)
            else {
                continue;
            };

            for path in paths {
                let Some(last) = path.segments.last() else {
                    continue;
                };
                let info = self.types.entry(ident.to_string()).or_default();
                match last.ident.to_string().as_str() {
                    "Default" => info.default = true,
                    "Error" | "ThisError" => info.throwable = true,
                    _ => {}
                }
            }
        }
    }

    fn item_impl(&mut self, i: &ItemImpl) {
        let Type::Path(self_ty) = &*i.self_ty else {
            return;
        };
        let Some(segment) = self_ty.path.segments.last() else {
            return;
        };
        let ident = segment.ident.to_string();

        if let Some((_, trait_path, _)) = &i.trait_ {
            let info = self.types.entry(ident).or_default();
            match trait_path.segments.last().map(|s| s.ident.to_string()).as_deref() {
                Some("Error") => info.throwable = true,
                Some("Default") => info.default = true,
                _ => {}
            }
            return;
        }

        let mut constructors = Vec::new();
        let mut mut_methods = Vec::new();

        for item in &i.items {
            let ImplItem::Fn(f) = item else {
                continue;
            };
            let name = f.sig.ident.to_string();
            let public = is_public(&f.vis);
            let args: Vec<Type> = f
                .sig
                .inputs
                .iter()
                .filter_map(|arg| match arg {
                    FnArg::Typed(pat) => Some((*pat.ty).clone()),
                    FnArg::Receiver(_) => None,
                })
                .collect();

            match f.sig.receiver() {
                None if returns_self(&f.sig.output, &ident) => constructors.push((name, args)),
                Some(r) if r.reference.is_some() && r.mutability.is_some() && args.len() == 1 => {
                    mut_methods.push((name, args[0].clone(), public));
                }
                _ => {}
            }
        }

        let info = self.types.entry(ident).or_default();
        info.constructors.extend(constructors);
        info.mut_methods.extend(mut_methods);
    }
}

/// `a::b` + `C` → `a::b::C`
#[must_use]
pub fn join(module: &str, ident: &str) -> String {
    if module.is_empty() {
        ident.to_string()
    } else {
        format!("{module}::{ident}")
    }
}

fn is_annotated(attrs: &[Attribute]) -> bool {
    attrs
        .iter()
        .any(|a| attr::is(a, attr::MESSAGE_BUNDLE) || attr::is(a, attr::MESSAGE_LOGGER))
}

// Private items are visible only inside their module.
const fn is_public(vis: &Visibility) -> bool {
    !matches!(vis, Visibility::Inherited)
}

fn returns_self(output: &ReturnType, ident: &str) -> bool {
    let ReturnType::Type(_, ty) = output else {
        return false;
    };
    let Type::Path(path) = &**ty else {
        return false;
    };

    path.path.is_ident("Self")
        || path
            .path
            .segments
            .last()
            .is_some_and(|s| s.ident == ident && s.arguments.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(source: &str) -> Collector {
        let file = syn::parse_file(source).unwrap();
        let mut collector = Collector::new();
        collector.file("app", &file);
        collector
    }

    #[test]
    fn gathers_annotated_traits_in_nested_modules() {
        let c = collect(
            r#"
            pub mod log {
                #[message_logger(project_code = "EX")]
                pub trait AppLogger {}

                trait Plain { fn x(&self); }
            }
            "#,
        );

        assert_eq!(c.interfaces.len(), 1);
        assert_eq!(c.interfaces[0].path(), "app::log::AppLogger");
        assert!(c.interfaces[0].is_public);
    }

    #[test]
    fn reflects_constructors_members_and_error_impls() {
        let c = collect(
            r#"
            #[derive(Debug, Default)]
            pub struct Failure { pub code: u32, detail: String }

            impl Failure {
                pub fn new(message: String) -> Self { todo!() }
                pub fn with_code(code: u32, message: &str) -> Failure { todo!() }
                pub fn set_detail(&mut self, detail: String) {}
                fn describe(&self) -> String { todo!() }
            }

            impl std::error::Error for Failure {}
            "#,
        );

        let info = &c.types["Failure"];
        assert!(info.throwable && info.default);
        let ctors: Vec<&str> = info.constructors.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(ctors, vec!["new", "with_code"]);
        assert_eq!(info.fields.len(), 2);
        assert!(info.fields[0].2 && !info.fields[1].2);
        assert_eq!(info.mut_methods[0].0, "set_detail");
    }
}
