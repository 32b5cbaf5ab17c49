//! Rust source rendering of synthetic classes.
//!
//! The output is meant to be `include!`d into the module that declares the
//! annotated trait, so sibling traits are referenced by ident.

use crate::{RenderError, prelude::*};
use proc_macro2::{Ident, Literal, TokenStream};
use quote::{format_ident, quote};
use syn::{ExprPath, Path, Type, parse_str};

/// Logging backend crate referenced by generated code.
pub const DEFAULT_RUNTIME_CRATE: &str = "msgtools_runtime";

///
/// RenderOptions
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct RenderOptions {
    pub runtime_crate: String,

    /// Emit a doc comment marking the struct as generated.
    pub header: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            runtime_crate: DEFAULT_RUNTIME_CRATE.to_string(),
            header: true,
        }
    }
}

// render
/// Render one class (primary or translation) as Rust items.
pub fn render(class: &ClassDef, options: &RenderOptions) -> Result<String, RenderError> {
    let tokens = Renderer::new(class, options)?.generate()?;

    Ok(tokens.to_string())
}

/// Rust ident for a generated name; `$` separators become `_`.
#[must_use]
pub fn rust_ident(name: &str) -> Ident {
    format_ident!("{}", name.replace('$', "_"))
}

fn parse_path(path: &str) -> Result<Path, RenderError> {
    parse_str(path).map_err(|source| RenderError::InvalidPath {
        path: path.to_string(),
        source,
    })
}

fn parse_expr_path(path: &str) -> Result<ExprPath, RenderError> {
    parse_str(path).map_err(|source| RenderError::InvalidPath {
        path: path.to_string(),
        source,
    })
}

fn parse_type(ty: &str) -> Result<Type, RenderError> {
    parse_str(ty).map_err(|source| RenderError::InvalidType {
        ty: ty.to_string(),
        source,
    })
}

///
/// Renderer
///

struct Renderer<'a> {
    class: &'a ClassDef,
    options: &'a RenderOptions,
    rt: Path,
    ident: Ident,
    messages: Ident,
}

impl<'a> Renderer<'a> {
    fn new(class: &'a ClassDef, options: &'a RenderOptions) -> Result<Self, RenderError> {
        // a bare crate name is anchored at the extern prelude
        let rt = match options.runtime_crate.as_str() {
            name if name.contains("::") || matches!(name, "crate" | "self" | "super") => {
                name.to_string()
            }
            name => format!("::{name}"),
        };

        Ok(Self {
            class,
            options,
            rt: parse_path(&rt)?,
            ident: rust_ident(&class.name),
            messages: rust_ident(&class.messages_trait()),
        })
    }

    fn generate(&self) -> Result<TokenStream, RenderError> {
        let mut tokens = quote!();

        if !self.class.is_translation() {
            tokens.extend(self.messages_trait());
            tokens.extend(self.guards());
        }
        tokens.extend(self.struct_def());
        tokens.extend(self.messages_impl());
        tokens.extend(self.interface_impls()?);

        if self.class.delegates_basic_logger {
            tokens.extend(self.basic_logger_impl());
        }

        Ok(tokens)
    }

    fn is_logger(&self) -> bool {
        self.class.kind == InterfaceKind::Logger
    }

    // -------------------------
    // Items
    // -------------------------

    fn messages_trait(&self) -> TokenStream {
        let Self { rt, messages, .. } = self;
        let accessors = self.class.accessors.iter().map(|a| {
            let ident = rust_ident(&a.name);
            quote!(fn #ident(&self) -> &'static str;)
        });
        let logger = self
            .is_logger()
            .then(|| quote!(fn logger(&self) -> &#rt::Logger;));

        quote! {
            #[allow(non_camel_case_types)]
            #[doc(hidden)]
            pub trait #messages {
                const FQCN: &'static str;
                const LOCALE: &'static str;
                #logger
                #(#accessors)*
            }
        }
    }

    fn guards(&self) -> TokenStream {
        let guards = self.class.guards.iter().map(|g| {
            let ident = format_ident!("{}", g.name);
            quote! {
                static #ident: ::core::sync::atomic::AtomicBool =
                    ::core::sync::atomic::AtomicBool::new(false);
            }
        });

        quote!(#(#guards)*)
    }

    fn struct_def(&self) -> TokenStream {
        let Self { rt, ident, .. } = self;
        let doc = self.options.header.then(|| {
            let kind = if self.is_logger() {
                "Message logger"
            } else {
                "Message bundle"
            };
            let text = format!(
                " {kind} implementation of `{}` generated by msgtools.",
                self.class.interface
            );
            quote!(#[doc = #text])
        });

        let parent = self.class.parent.as_deref().map(rust_ident);

        match (&parent, self.is_logger()) {
            (None, true) => quote! {
                #doc
                #[allow(non_camel_case_types)]
                pub struct #ident {
                    logger: #rt::Logger,
                }

                impl #ident {
                    #[must_use]
                    pub const fn new(logger: #rt::Logger) -> Self {
                        Self { logger }
                    }
                }
            },
            (None, false) => quote! {
                #doc
                #[allow(non_camel_case_types)]
                pub struct #ident;

                impl #ident {
                    pub const INSTANCE: Self = Self;
                }
            },
            (Some(parent), true) => quote! {
                #doc
                #[allow(non_camel_case_types)]
                pub struct #ident {
                    parent: #parent,
                }

                impl #ident {
                    #[must_use]
                    pub const fn new(logger: #rt::Logger) -> Self {
                        Self {
                            parent: #parent::new(logger),
                        }
                    }
                }
            },
            (Some(parent), false) => quote! {
                #doc
                #[allow(non_camel_case_types)]
                pub struct #ident {
                    parent: #parent,
                }

                impl #ident {
                    pub const INSTANCE: Self = Self {
                        parent: #parent::INSTANCE,
                    };
                }
            },
        }
    }

    fn messages_impl(&self) -> TokenStream {
        let Self {
            rt,
            ident,
            messages,
            ..
        } = self;

        let module = self.class.module_path();
        let fqcn = if module.is_empty() {
            ident.to_string()
        } else {
            format!("{module}::{ident}")
        };
        let locale = &self.class.locale;

        let logger = self.is_logger().then(|| {
            let body = if self.class.is_translation() {
                quote!(#messages::logger(&self.parent))
            } else {
                quote!(&self.logger)
            };
            quote! {
                fn logger(&self) -> &#rt::Logger {
                    #body
                }
            }
        });

        let accessors = self.class.accessors.iter().map(|a| {
            let name = rust_ident(&a.name);
            let body = match a.literal() {
                Some(text) => quote!(#text),
                None => quote!(#messages::#name(&self.parent)),
            };
            quote! {
                fn #name(&self) -> &'static str {
                    #body
                }
            }
        });

        quote! {
            impl #messages for #ident {
                const FQCN: &'static str = #fqcn;
                const LOCALE: &'static str = #locale;
                #logger
                #(#accessors)*
            }
        }
    }

    fn interface_impls(&self) -> Result<TokenStream, RenderError> {
        let ident = &self.ident;
        let mut tokens = quote!();

        for iface in &self.class.implements {
            let path = self.interface_path(iface)?;
            let methods = self
                .class
                .methods_of(iface)
                .map(|m| self.method(m))
                .collect::<Result<Vec<_>, _>>()?;

            tokens.extend(quote! {
                #[allow(unused_variables)]
                #[allow(clippy::let_and_return)]
                impl #path for #ident {
                    #(#methods)*
                }
            });
        }

        Ok(tokens)
    }

    fn basic_logger_impl(&self) -> TokenStream {
        let Self {
            rt,
            ident,
            messages,
            ..
        } = self;

        quote! {
            impl #rt::BasicLogger for #ident {
                fn logger(&self) -> &#rt::Logger {
                    #messages::logger(self)
                }
            }
        }
    }

    // same module as the generated file: ident; otherwise crate-relative
    fn interface_path(&self, iface: &str) -> Result<Path, RenderError> {
        let (module, name) = iface.rsplit_once("::").unwrap_or(("", iface));

        if module == self.class.module_path() {
            parse_path(name)
        } else {
            parse_path(&format!("crate::{iface}"))
        }
    }

    // -------------------------
    // Methods
    // -------------------------

    fn method(&self, m: &MethodDef) -> Result<TokenStream, RenderError> {
        let name = format_ident!("{}", m.name);
        let params = m
            .params
            .iter()
            .map(|p| {
                let name = format_ident!("{}", p.name);
                let ty = parse_type(&p.ty)?;
                Ok(quote!(#name: #ty))
            })
            .collect::<Result<Vec<_>, RenderError>>()?;
        let ret = m
            .return_type
            .as_deref()
            .map(parse_type)
            .transpose()?
            .map(|ty| quote!(-> #ty));
        let body = self.stmts(&m.body)?;

        Ok(quote! {
            fn #name(&self, #(#params),*) #ret {
                #body
            }
        })
    }

    fn stmts(&self, stmts: &[Stmt]) -> Result<TokenStream, RenderError> {
        let mut tokens = quote!();
        for stmt in stmts {
            tokens.extend(self.stmt(stmt)?);
        }

        Ok(tokens)
    }

    fn stmt(&self, stmt: &Stmt) -> Result<TokenStream, RenderError> {
        let tokens = match stmt {
            Stmt::Let {
                name,
                mutable,
                value,
            } => {
                let name = format_ident!("{}", name);
                let value = self.expr(value)?;
                let mutability = mutable.then(|| quote!(mut));
                quote!(let #mutability #name = #value;)
            }
            Stmt::Assign { target, value } => {
                let target = self.expr(target)?;
                let value = self.expr(value)?;
                quote!(#target = #value;)
            }
            Stmt::Expr(expr) => {
                let expr = self.expr(expr)?;
                quote!(#expr;)
            }
            Stmt::If { cond, body } => {
                let cond = self.expr(cond)?;
                let body = self.stmts(body)?;
                quote!(if #cond { #body })
            }
            Stmt::Return(expr) => self.expr(expr)?,
        };

        Ok(tokens)
    }

    fn exprs(&self, exprs: &[Expr]) -> Result<Vec<TokenStream>, RenderError> {
        exprs.iter().map(|e| self.expr(e)).collect()
    }

    fn expr(&self, expr: &Expr) -> Result<TokenStream, RenderError> {
        let Self { rt, messages, .. } = self;

        let tokens = match expr {
            Expr::Var(name) => {
                let ident = format_ident!("{}", name);
                quote!(#ident)
            }
            Expr::Path(path) => {
                let path = parse_expr_path(path)?;
                quote!(#path)
            }
            Expr::Str(text) => quote!(#text),
            Expr::Int(value) => {
                let lit = Literal::i64_unsuffixed(*value);
                quote!(#lit)
            }
            Expr::Bool(value) => quote!(#value),
            Expr::Level(level) => quote!(#rt::Level::#level),
            Expr::None => quote!(::core::option::Option::None),
            Expr::Some(inner) => {
                let inner = self.expr(inner)?;
                quote!(::core::option::Option::Some(#inner))
            }
            Expr::Ref(inner) => {
                let inner = self.expr(inner)?;
                quote!(&#inner)
            }
            Expr::RefMut(inner) => {
                let inner = self.expr(inner)?;
                quote!(&mut #inner)
            }
            Expr::Display(inner) => {
                let inner = self.expr(inner)?;
                quote!(&#inner as &dyn ::core::fmt::Display)
            }
            Expr::Slice(items) => {
                let items = self.exprs(items)?;
                quote!(&[#(#items),*])
            }
            Expr::Field(base, field) => {
                let base = self.expr(base)?;
                let field = format_ident!("{}", field);
                quote!(#base.#field)
            }
            Expr::Call { callee, args } => {
                let callee = match callee {
                    Callee::Runtime(path) => {
                        let path = parse_path(path)?;
                        quote!(#rt::#path)
                    }
                    Callee::Path(path) => {
                        let path = parse_expr_path(path)?;
                        quote!(#path)
                    }
                };
                let args = self.exprs(args)?;
                quote!(#callee(#(#args),*))
            }
            Expr::Method {
                receiver,
                name,
                args,
            } => {
                let receiver = self.expr(receiver)?;
                let name = format_ident!("{}", name);
                let args = self.exprs(args)?;
                quote!(#receiver.#name(#(#args),*))
            }
            Expr::Accessor(name) => {
                let accessor = rust_ident(name);
                quote!(#messages::#accessor(self))
            }
            Expr::Logger => quote!(#messages::logger(self)),
            Expr::Fqcn => quote!(<Self as #messages>::FQCN),
            Expr::AsStr(inner) => {
                let inner = self.expr(inner)?;
                quote!(::core::convert::AsRef::<str>::as_ref(&#inner))
            }
            Expr::Into(inner) => {
                let inner = self.expr(inner)?;
                quote!(::core::convert::Into::into(#inner))
            }
            Expr::Not(inner) => {
                let inner = self.expr(inner)?;
                quote!(!#inner)
            }
            Expr::And(lhs, rhs) => {
                let lhs = self.expr(lhs)?;
                let rhs = self.expr(rhs)?;
                quote!(#lhs && #rhs)
            }
        };

        Ok(tokens)
    }
}
