//! Value types with reflected properties but no identity

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

use super::store_field;
use crate::meta::{MetaObject, PropertyHost, TypeMetadata};
use crate::value::Value;

/// A lightweight reflected value.
///
/// Gadgets carry type metadata and property storage like an [`Object`](super::Object)
/// but have no identity: they cannot emit signals and have no destruction
/// event. Cloning copies the stored fields.
#[derive(Clone)]
pub struct Gadget {
    meta: Rc<MetaObject>,
    fields: RefCell<IndexMap<String, Value>>,
}

impl Gadget {
    /// Create a gadget of type `meta` with all fields unset.
    pub fn new(meta: Rc<MetaObject>) -> Self {
        Self {
            meta,
            fields: RefCell::new(IndexMap::new()),
        }
    }

    /// Set a property and return `self` (builder pattern)
    pub fn with_property(self, name: &str, value: Value) -> Self {
        self.write_property(name, value);
        self
    }

    /// Class name of the gadget's type
    pub fn class_name(&self) -> &str {
        self.meta.class_name()
    }
}

impl PropertyHost for Gadget {
    fn meta_object(&self) -> &Rc<MetaObject> {
        &self.meta
    }

    fn field(&self, name: &str) -> Value {
        self.fields.borrow().get(name).cloned().unwrap_or_default()
    }

    fn set_field(&self, name: &str, value: Value) -> bool {
        store_field(&self.fields, name, value)
    }
}

impl fmt::Debug for Gadget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(self.class_name())
            .field("fields", &self.fields.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::{MetaObjectBuilder, PropertyBuilder};

    fn size() -> Rc<MetaObject> {
        MetaObjectBuilder::gadget("Size")
            .property(PropertyBuilder::new("width", "u32").writable())
            .property(PropertyBuilder::new("height", "u32").writable())
            .build()
            .unwrap()
    }

    #[test]
    fn test_gadget_has_no_root_class() {
        let gadget = Gadget::new(size());
        assert_eq!(gadget.meta_object().property_count(), 2);
        assert!(!gadget.meta_object().inherits("Object"));
    }

    #[test]
    fn test_clone_copies_fields() {
        let a = Gadget::new(size()).with_property("width", Value::U32(4));
        let b = a.clone();
        b.write_property("width", Value::U32(8));
        assert_eq!(a.read_property("width"), Value::U32(4));
        assert_eq!(b.read_property("width"), Value::U32(8));
    }
}
