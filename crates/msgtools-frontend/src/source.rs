//! Declarations reflected from Rust sources.

use crate::{
    FrontendError,
    attr::{self, IdRangeArgs, InterfaceArgs, LogMessageArgs, MessageArgs, PositionList, TargetArgs, TransformList},
    collect::{Collector, RawInterface, TypeInfo, join},
    shape::{Classifier, simple_name},
};
use darling::FromMeta;
use msgtools_schema::prelude::*;
use std::collections::{BTreeMap, HashMap};
use syn::{
    Attribute, FnArg, Pat, ReturnType, Token, TraitItem, TraitItemFn, Type, TypeParamBound,
    punctuated::Punctuated,
};

/// Cause setter names, in lookup order.
const CAUSE_SETTERS: [&str; 3] = ["init_cause", "set_cause", "set_source"];

///
/// SourceSet
/// interfaces converted eagerly, return types reflected on demand
///

#[derive(Debug, Default)]
pub struct SourceSet {
    interfaces: BTreeMap<String, InterfaceDescriptor>,
    order: Vec<String>,
    types: HashMap<String, TypeInfo>,
    classifier: Classifier,
}

impl SourceSet {
    pub fn from_collector(collector: Collector) -> Result<Self, FrontendError> {
        let throwables = collector
            .types
            .iter()
            .filter(|(_, info)| info.throwable)
            .map(|(name, _)| name.clone())
            .collect();
        let classifier = Classifier::new(throwables);

        let mut set = Self {
            classifier,
            types: collector.types,
            ..Self::default()
        };

        let mut supertraits = Vec::new();
        for raw in &collector.interfaces {
            let descriptor = set.interface_descriptor(raw)?;
            supertraits.push((descriptor.path.clone(), raw.module.clone(), bounds(raw)));
            set.order.push(descriptor.path.clone());
            set.interfaces.insert(descriptor.path.clone(), descriptor);
        }

        // extension edges once every interface is known
        for (path, module, bounds) in supertraits {
            let mut extends = Vec::new();
            let mut basic = false;

            for bound in bounds {
                if simple_name(&bound) == BASIC_LOGGER {
                    basic = true;
                    extends.push(BASIC_LOGGER.to_string());
                } else if let Some(found) = set.resolve_trait(&module, &bound) {
                    extends.push(found);
                }
            }

            if let Some(iface) = set.interfaces.get_mut(&path) {
                iface.extends = extends;
                iface.extends_basic_logger = basic;
            }
        }

        tracing::debug!(
            target: "msgtools",
            stage = "discover",
            interfaces = set.order.len(),
            types = set.types.len(),
        );

        Ok(set)
    }

    #[must_use]
    pub const fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Mutable access for pre-resolution rewrites such as expression substitution.
    pub fn interfaces_mut(&mut self) -> impl Iterator<Item = &mut InterfaceDescriptor> {
        self.interfaces.values_mut()
    }

    // `crate::a::B`, `self::B`, `super::B`, or a bare name in scope
    fn resolve_trait(&self, module: &str, bound: &str) -> Option<String> {
        let candidate = if let Some(rest) = bound.strip_prefix("crate::") {
            rest.to_string()
        } else if let Some(rest) = bound.strip_prefix("self::") {
            join(module, rest)
        } else if let Some(rest) = bound.strip_prefix("super::") {
            let parent = module.rsplit_once("::").map_or("", |(p, _)| p);
            join(parent, rest)
        } else {
            join(module, bound)
        };

        if self.interfaces.contains_key(&candidate) {
            return Some(candidate);
        }

        // imported by name: accept a unique match
        let ident = simple_name(bound);
        let mut matches = self
            .interfaces
            .values()
            .filter(|i| i.ident() == ident)
            .map(|i| i.path.clone());

        match (matches.next(), matches.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        }
    }

    fn interface_descriptor(&self, raw: &RawInterface) -> Result<InterfaceDescriptor, FrontendError> {
        let path = raw.path();
        let wrap = |source: darling::Error| FrontendError::Attribute {
            item: path.clone(),
            source,
        };

        let (kind, args) = if let Some(a) = attr::find(&raw.attrs, attr::MESSAGE_LOGGER) {
            (InterfaceKind::Logger, InterfaceArgs::parse(a).map_err(wrap)?)
        } else if let Some(a) = attr::find(&raw.attrs, attr::MESSAGE_BUNDLE) {
            (InterfaceKind::Bundle, InterfaceArgs::parse(a).map_err(wrap)?)
        } else {
            (InterfaceKind::None, InterfaceArgs::default())
        };

        let valid_id_ranges = raw
            .attrs
            .iter()
            .filter(|a| attr::is(a, attr::VALID_ID_RANGE))
            .map(|a| IdRangeArgs::from_meta(&a.meta).map(IdRange::from))
            .collect::<Result<Vec<_>, _>>()
            .map_err(wrap)?;

        let methods = match &raw.item {
            Some(item) => item
                .items
                .iter()
                .filter_map(|i| match i {
                    TraitItem::Fn(f) => Some(f),
                    _ => None,
                })
                .map(|f| self.method(&path, f))
                .collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };

        Ok(InterfaceDescriptor {
            path: path.clone(),
            kind,
            is_interface: raw.item.is_some(),
            is_public: raw.is_public,
            project_code: args.project_code,
            id_length: args.length.unwrap_or(DEFAULT_ID_LENGTH),
            root_locale: args.root_locale,
            valid_id_ranges,
            extends: Vec::new(),
            extends_basic_logger: false,
            methods,
        })
    }

    fn method(&self, iface: &str, f: &TraitItemFn) -> Result<MethodDecl, FrontendError> {
        let name = f.sig.ident.to_string();
        let wrap = |source: darling::Error| FrontendError::Attribute {
            item: format!("{iface}::{name}"),
            source,
        };

        let message = attr::find(&f.attrs, attr::MESSAGE)
            .map(|a| MessageArgs::from_meta(&a.meta).and_then(MessageArgs::into_decl))
            .transpose()
            .map_err(wrap)?;

        let level = attr::find(&f.attrs, attr::LOG_MESSAGE)
            .map(|a| LogMessageArgs::parse(a).map(|args| args.level.unwrap_or_default()))
            .transpose()
            .map_err(wrap)?;

        let thrown = match attr::find(&f.attrs, attr::THROWS) {
            Some(a) => a
                .parse_args_with(Punctuated::<Type, Token![,]>::parse_terminated)
                .map_err(|e| wrap(darling::Error::from(e)))?
                .iter()
                .map(|t| self.classifier.type_ref(t))
                .collect(),
            None => Vec::new(),
        };

        let mut params = Vec::new();
        for (i, input) in f.sig.inputs.iter().enumerate() {
            let FnArg::Typed(pat) = input else {
                continue;
            };
            let param_name = match &*pat.pat {
                Pat::Ident(ident) => ident.ident.to_string(),
                _ => format!("arg{i}"),
            };
            let ty = self.classifier.type_ref(&pat.ty);
            params.push(parameter(param_name, ty, &pat.attrs).map_err(wrap)?);
        }

        let return_type = match &f.sig.output {
            ReturnType::Default => TypeRef::unit(),
            ReturnType::Type(_, ty) => self.classifier.type_ref(ty),
        };

        Ok(MethodDecl {
            name,
            params,
            return_type,
            message,
            level,
            once: attr::find(&f.attrs, attr::ONCE).is_some(),
            thrown,
        })
    }
}

// Role markers in declaration order; the first wins, later ones are recorded as conflicts.
fn parameter(name: String, ty: TypeRef, attrs: &[Attribute]) -> Result<Parameter, darling::Error> {
    let mut roles = Vec::new();
    let mut param = Parameter::new(name, ty, ParamRole::Format);

    for a in attrs {
        let Some(ident) = a.path().get_ident().map(ToString::to_string) else {
            continue;
        };
        let role = match ident.as_str() {
            "cause" => ParamRole::Cause,
            "field" => {
                param.target = TargetArgs::parse(a)?.name;
                ParamRole::Field
            }
            "property" => {
                param.target = TargetArgs::parse(a)?.name;
                ParamRole::Property
            }
            "param" => ParamRole::Construction,
            "logging_class" => ParamRole::Fqcn,
            "transform" => {
                param.transforms = TransformList::from_meta(&a.meta)?.0;
                ParamRole::Transform
            }
            "pos" => {
                param.positions = PositionList::from_meta(&a.meta)?.0;
                ParamRole::Positional
            }
            "format_with" => {
                let path: syn::Path = a.parse_args()?;
                param.formatter = Some(quote::ToTokens::to_token_stream(&path).to_string().replace(' ', ""));
                continue;
            }
            _ => continue,
        };
        roles.push(role);
    }

    if let Some((&first, rest)) = roles.split_first() {
        param.role = first;
        param.conflicts = rest.to_vec();
    }

    Ok(param)
}

// Supertrait paths as written.
fn bounds(raw: &RawInterface) -> Vec<String> {
    let Some(item) = &raw.item else {
        return Vec::new();
    };

    item.supertraits
        .iter()
        .filter_map(|b| match b {
            TypeParamBound::Trait(t) => Some(
                quote::ToTokens::to_token_stream(&t.path)
                    .to_string()
                    .replace(' ', ""),
            ),
            _ => None,
        })
        .collect()
}

impl DeclarationSource for SourceSet {
    fn interface(&self, path: &str) -> Option<&InterfaceDescriptor> {
        self.interfaces.get(path)
    }

    fn interfaces(&self) -> Vec<&InterfaceDescriptor> {
        self.order
            .iter()
            .filter_map(|p| self.interfaces.get(p))
            .filter(|i| i.kind != InterfaceKind::None)
            .collect()
    }

    fn reflect_type(&self, ty: &TypeRef) -> ReturnTypeDescriptor {
        let Some(info) = self.types.get(simple_name(&ty.name)) else {
            return ReturnTypeDescriptor::opaque(ty.name.clone());
        };
        let classify = |t: &Type| self.classifier.type_ref(t);

        let mut constructors: Vec<Constructor> = info
            .constructors
            .iter()
            .map(|(name, params)| Constructor::new(name.clone(), params.iter().map(classify).collect()))
            .collect();
        if info.default && !constructors.iter().any(|c| c.params.is_empty()) {
            constructors.push(Constructor::new("default", Vec::new()));
        }

        let fields = info
            .fields
            .iter()
            .map(|(name, t, public)| FieldTarget {
                name: name.clone(),
                ty: classify(t),
                public: *public,
            })
            .collect();

        let setters = info
            .mut_methods
            .iter()
            .filter_map(|(name, t, public)| {
                Some(SetterTarget {
                    property: name.strip_prefix("set_")?.to_string(),
                    param: classify(t),
                    public: *public,
                })
            })
            .collect();

        let cause_setter = CAUSE_SETTERS.iter().find_map(|setter| {
            info.mut_methods
                .iter()
                .find(|(name, t, _)| name == *setter && self.classifier.shape(t) == TypeShape::Cause)
                .map(|(name, _, _)| name.clone())
        });

        tracing::trace!(target: "msgtools", ty = %ty.name, "reflected return type");

        ReturnTypeDescriptor {
            name: ty.name.clone(),
            throwable: info.throwable,
            constructors,
            fields,
            setters,
            cause_setter,
        }
    }
}
