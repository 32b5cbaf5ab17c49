mod index;
mod interface;
mod message;
mod method;
mod parameter;
mod return_type;

pub use index::*;
pub use interface::*;
pub use message::*;
pub use method::*;
pub use parameter::*;
pub use return_type::*;

use crate::prelude::*;
use std::{cell::RefCell, collections::BTreeMap, collections::HashMap, rc::Rc};

/// Simple name of the base logging-capability interface.
pub const BASIC_LOGGER: &str = "BasicLogger";

///
/// DeclarationSource
/// read-only access to reflected declarations
///

pub trait DeclarationSource {
    /// Look up an interface by qualified path.
    fn interface(&self, path: &str) -> Option<&InterfaceDescriptor>;

    /// Annotated interfaces in discovery order.
    fn interfaces(&self) -> Vec<&InterfaceDescriptor>;

    /// Reflect over a return type; may be expensive, callers go through a `TypeCatalog`.
    fn reflect_type(&self, ty: &TypeRef) -> ReturnTypeDescriptor;
}

///
/// Schema
/// in-memory declaration store
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Schema {
    interfaces: BTreeMap<String, InterfaceDescriptor>,
    types: BTreeMap<String, ReturnTypeDescriptor>,
}

impl Schema {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            interfaces: BTreeMap::new(),
            types: BTreeMap::new(),
        }
    }

    pub fn insert_interface(&mut self, iface: InterfaceDescriptor) {
        self.interfaces.insert(iface.path.clone(), iface);
    }

    pub fn insert_type(&mut self, ty: ReturnTypeDescriptor) {
        self.types.insert(ty.name.clone(), ty);
    }

    #[must_use]
    pub fn with_interface(mut self, iface: InterfaceDescriptor) -> Self {
        self.insert_interface(iface);
        self
    }

    #[must_use]
    pub fn with_type(mut self, ty: ReturnTypeDescriptor) -> Self {
        self.insert_type(ty);
        self
    }
}

impl DeclarationSource for Schema {
    fn interface(&self, path: &str) -> Option<&InterfaceDescriptor> {
        self.interfaces.get(path)
    }

    fn interfaces(&self) -> Vec<&InterfaceDescriptor> {
        self.interfaces.values().collect()
    }

    fn reflect_type(&self, ty: &TypeRef) -> ReturnTypeDescriptor {
        self.types
            .get(&ty.name)
            .cloned()
            .unwrap_or_else(|| ReturnTypeDescriptor::opaque(ty.name.clone()))
    }
}

///
/// TypeCatalog
/// lazily reflected return types, cached for the rest of the run
///

pub struct TypeCatalog<'a> {
    source: &'a dyn DeclarationSource,
    cache: RefCell<HashMap<String, Rc<ReturnTypeDescriptor>>>,
}

impl<'a> TypeCatalog<'a> {
    #[must_use]
    pub fn new(source: &'a dyn DeclarationSource) -> Self {
        Self {
            source,
            cache: RefCell::default(),
        }
    }

    #[must_use]
    pub const fn source(&self) -> &'a dyn DeclarationSource {
        self.source
    }

    #[must_use]
    pub fn describe(&self, ty: &TypeRef) -> Rc<ReturnTypeDescriptor> {
        if let Some(found) = self.cache.borrow().get(&ty.name) {
            return Rc::clone(found);
        }

        let described = Rc::new(self.source.reflect_type(ty));
        self.cache
            .borrow_mut()
            .insert(ty.name.clone(), Rc::clone(&described));

        described
    }

    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache.borrow().len()
    }
}
