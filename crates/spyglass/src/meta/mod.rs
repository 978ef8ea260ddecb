//! Runtime type metadata
//!
//! A [`MetaObject`] describes one type: its class name, its superclass, and
//! the properties and methods it adds. Property and method indices are
//! global across the inheritance chain, base class first, so index `i` on a
//! subclass names the same descriptor as index `i` on its superclass.

mod builder;
mod method;
mod property;

pub use builder::{MetaObjectBuilder, PropertyBuilder};
pub use method::{normalize_signature, InvokeFn, MetaMethod, MethodKind};
pub use property::{
    MetaProperty, PredicateFn, PropertyFlags, PropertyHost, PropertyTrait, ReadFn, ResetFn,
    WriteFn,
};

use std::fmt;
use std::rc::Rc;

use crate::value::Value;

/// Signature of the root class's destruction signal
pub const DESTROYED_SIGNATURE: &str = "destroyed()";

/// Signature of the root class's name-change signal
pub const OBJECT_NAME_CHANGED_SIGNATURE: &str = "objectNameChanged()";

/// Name of the root class's name property
pub const OBJECT_NAME_PROPERTY: &str = "objectName";

/// Capability interface over a type's reflected description.
///
/// The property adaptor and connection model only ever talk to type
/// metadata through this trait.
pub trait TypeMetadata {
    /// Name of the described class
    fn class_name(&self) -> &str;

    /// Direct superclass, if any
    fn super_class(&self) -> Option<&Self>;

    /// Index of the first property this class declares itself
    fn property_offset(&self) -> usize;

    /// Number of properties including inherited ones
    fn property_count(&self) -> usize;

    /// Property by global index
    fn property_at(&self, index: usize) -> Option<&MetaProperty>;

    /// Index of the first method this class declares itself
    fn method_offset(&self) -> usize;

    /// Number of methods including inherited ones
    fn method_count(&self) -> usize;

    /// Method by global index
    fn method_at(&self, index: usize) -> Option<&MetaMethod>;

    /// The class in the chain that declares property `index`.
    ///
    /// Walks from the most-derived class towards the root until reaching
    /// the first class whose own range starts at or below `index`.
    fn declaring_class(&self, index: usize) -> Option<&Self>
    where
        Self: Sized,
    {
        if index >= self.property_count() {
            return None;
        }
        let mut current = self;
        while current.property_offset() > index {
            current = current.super_class()?;
        }
        Some(current)
    }
}

/// Reflected description of a type.
pub struct MetaObject {
    class_name: String,
    super_class: Option<Rc<MetaObject>>,
    properties: Vec<MetaProperty>,
    methods: Vec<MetaMethod>,
    property_offset: usize,
    method_offset: usize,
}

thread_local! {
    static OBJECT_META: Rc<MetaObject> = build_object_meta();
}

fn build_object_meta() -> Rc<MetaObject> {
    let built = MetaObjectBuilder::root("Object")
        .signal(DESTROYED_SIGNATURE)
        .signal(OBJECT_NAME_CHANGED_SIGNATURE)
        .property(
            PropertyBuilder::new(OBJECT_NAME_PROPERTY, "String")
                .writable()
                .default_value(Value::string(""))
                .notify(OBJECT_NAME_CHANGED_SIGNATURE),
        )
        .build();
    match built {
        Ok(meta) => meta,
        // The root class only references its own signals
        Err(e) => unreachable!("root metadata failed to build: {e}"),
    }
}

impl MetaObject {
    /// Metadata of the root `Object` class every connectable type derives from.
    pub fn object() -> Rc<MetaObject> {
        OBJECT_META.with(Rc::clone)
    }

    /// Properties this class declares itself
    pub fn own_properties(&self) -> &[MetaProperty] {
        &self.properties
    }

    /// Methods this class declares itself
    pub fn own_methods(&self) -> &[MetaMethod] {
        &self.methods
    }

    /// Iterate all properties, inherited first.
    pub fn properties(&self) -> impl Iterator<Item = &MetaProperty> {
        (0..self.property_count()).filter_map(move |i| self.property_at(i))
    }

    /// Iterate all methods, inherited first.
    pub fn methods(&self) -> impl Iterator<Item = &MetaMethod> {
        (0..self.method_count()).filter_map(move |i| self.method_at(i))
    }

    /// Global index of the property called `name`.
    ///
    /// The most-derived declaration wins when a subclass shadows a name.
    pub fn index_of_property(&self, name: &str) -> Option<usize> {
        self.properties
            .iter()
            .rev()
            .find(|p| p.name == name)
            .map(|p| p.index)
            .or_else(|| self.super_class.as_ref()?.index_of_property(name))
    }

    /// Global index of the method with `signature`.
    pub fn index_of_method(&self, signature: &str) -> Option<usize> {
        let normalized = normalize_signature(signature);
        self.find_method(&normalized)
    }

    /// Global index of the signal with `signature`.
    pub fn index_of_signal(&self, signature: &str) -> Option<usize> {
        self.index_of_method(signature)
            .filter(|&i| self.method_at(i).is_some_and(MetaMethod::is_signal))
    }

    fn find_method(&self, normalized: &str) -> Option<usize> {
        self.methods
            .iter()
            .find(|m| m.signature == normalized)
            .map(|m| m.index)
            .or_else(|| self.super_class.as_ref()?.find_method(normalized))
    }

    /// Check if this class is, or derives from, `class_name`.
    pub fn inherits(&self, class_name: &str) -> bool {
        let mut current = Some(self);
        while let Some(meta) = current {
            if meta.class_name == class_name {
                return true;
            }
            current = meta.super_class.as_deref();
        }
        false
    }
}

impl TypeMetadata for MetaObject {
    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn super_class(&self) -> Option<&Self> {
        self.super_class.as_deref()
    }

    fn property_offset(&self) -> usize {
        self.property_offset
    }

    fn property_count(&self) -> usize {
        self.property_offset + self.properties.len()
    }

    fn property_at(&self, index: usize) -> Option<&MetaProperty> {
        if index < self.property_offset {
            self.super_class.as_ref()?.property_at(index)
        } else {
            self.properties.get(index - self.property_offset)
        }
    }

    fn method_offset(&self) -> usize {
        self.method_offset
    }

    fn method_count(&self) -> usize {
        self.method_offset + self.methods.len()
    }

    fn method_at(&self, index: usize) -> Option<&MetaMethod> {
        if index < self.method_offset {
            self.super_class.as_ref()?.method_at(index)
        } else {
            self.methods.get(index - self.method_offset)
        }
    }
}

impl fmt::Debug for MetaObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetaObject")
            .field("class_name", &self.class_name)
            .field(
                "super_class",
                &self.super_class.as_ref().map(|s| s.class_name.as_str()),
            )
            .field("properties", &self.properties)
            .field("methods", &self.methods)
            .finish()
    }
}
