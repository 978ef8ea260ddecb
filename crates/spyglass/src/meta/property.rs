//! Property descriptors

use std::fmt;
use std::rc::Rc;

use bitflags::bitflags;

use super::{MetaObject, TypeMetadata};
use crate::value::Value;

/// Getter invoked against a live host
pub type ReadFn = Rc<dyn Fn(&dyn PropertyHost) -> Value>;

/// Setter; returns `false` when the host refused the value
pub type WriteFn = Rc<dyn Fn(&dyn PropertyHost, Value) -> bool>;

/// Reset to the type's default; returns `false` when nothing was reset
pub type ResetFn = Rc<dyn Fn(&dyn PropertyHost) -> bool>;

/// Per-instance capability query
pub type PredicateFn = Rc<dyn Fn(&dyn PropertyHost) -> bool>;

/// Storage and signalling surface that property accessors run against.
///
/// Implemented by [`Object`](crate::Object) and [`Gadget`](crate::Gadget).
pub trait PropertyHost {
    /// Metadata of the host's concrete type.
    fn meta_object(&self) -> &Rc<MetaObject>;

    /// Current raw field value, `Value::Invalid` when unset.
    fn field(&self, name: &str) -> Value;

    /// Store a raw field value. Returns `true` if the stored value changed.
    fn set_field(&self, name: &str, value: Value) -> bool;

    /// Emit a signal by global method index. Value types cannot emit.
    fn notify(&self, _signal_index: usize) {}

    /// Read a property by name through its accessor.
    fn read_property(&self, name: &str) -> Value
    where
        Self: Sized,
    {
        let meta = Rc::clone(self.meta_object());
        match meta.index_of_property(name).and_then(|i| meta.property_at(i)) {
            Some(prop) => prop.read(self),
            None => Value::Invalid,
        }
    }

    /// Write a property by name through its accessor.
    fn write_property(&self, name: &str, value: Value) -> bool
    where
        Self: Sized,
    {
        let meta = Rc::clone(self.meta_object());
        match meta.index_of_property(name).and_then(|i| meta.property_at(i)) {
            Some(prop) => prop.write(self, value),
            None => false,
        }
    }
}

bitflags! {
    /// Capability flags of a property as seen on a particular instance.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PropertyFlags: u16 {
        /// Value never changes for the lifetime of the object
        const CONSTANT   = 1 << 0;
        /// Visible in design tools
        const DESIGNABLE = 1 << 1;
        /// Cannot be overridden by subclasses
        const FINAL      = 1 << 2;
        /// Can be reset to a default
        const RESETTABLE = 1 << 3;
        /// Accessible from scripting layers
        const SCRIPTABLE = 1 << 4;
        /// Persisted when the object state is saved
        const STORED     = 1 << 5;
        /// The user-facing property of its type
        const USER       = 1 << 6;
        /// Has a setter
        const WRITABLE   = 1 << 7;
        /// Has a change-notification signal
        const NOTIFY     = 1 << 8;
    }
}

/// A boolean trait that is either fixed per type or computed per instance.
#[derive(Clone)]
pub enum PropertyTrait {
    /// Same answer for every instance
    Static(bool),
    /// Asked of each instance
    Dynamic(PredicateFn),
}

impl PropertyTrait {
    /// Evaluate against a host.
    pub fn eval(&self, host: &dyn PropertyHost) -> bool {
        match self {
            PropertyTrait::Static(b) => *b,
            PropertyTrait::Dynamic(f) => f(host),
        }
    }
}

impl fmt::Debug for PropertyTrait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyTrait::Static(b) => write!(f, "{}", b),
            PropertyTrait::Dynamic(_) => write!(f, "<dynamic>"),
        }
    }
}

/// Static descriptor for one property of a type.
///
/// Built through [`PropertyBuilder`](super::PropertyBuilder); immutable once
/// its [`MetaObject`] exists.
#[derive(Clone)]
pub struct MetaProperty {
    pub(super) name: String,
    pub(super) type_name: String,
    pub(super) index: usize,
    pub(super) constant: bool,
    pub(super) is_final: bool,
    pub(super) designable: PropertyTrait,
    pub(super) scriptable: PropertyTrait,
    pub(super) stored: PropertyTrait,
    pub(super) user: PropertyTrait,
    pub(super) revision: u32,
    pub(super) notify_signal: Option<usize>,
    pub(super) notify_signature: Option<String>,
    pub(super) default_value: Option<Value>,
    pub(super) read: ReadFn,
    pub(super) write: Option<WriteFn>,
    pub(super) reset: Option<ResetFn>,
}

impl MetaProperty {
    /// Property name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type name
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Global index across the inheritance chain
    pub fn index(&self) -> usize {
        self.index
    }

    /// Revision the property was introduced in, 0 if unversioned
    pub fn revision(&self) -> u32 {
        self.revision
    }

    /// Default value used by the generated reset, if any
    pub fn default_value(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }

    /// Check if the property is constant
    pub fn is_constant(&self) -> bool {
        self.constant
    }

    /// Check if the property is final
    pub fn is_final(&self) -> bool {
        self.is_final
    }

    /// Check if the property has a setter
    pub fn is_writable(&self) -> bool {
        self.write.is_some()
    }

    /// Check if the property can be reset
    pub fn is_resettable(&self) -> bool {
        self.reset.is_some()
    }

    /// Check if the property is designable on this host
    pub fn is_designable(&self, host: &dyn PropertyHost) -> bool {
        self.designable.eval(host)
    }

    /// Check if the property is scriptable on this host
    pub fn is_scriptable(&self, host: &dyn PropertyHost) -> bool {
        self.scriptable.eval(host)
    }

    /// Check if the property is stored on this host
    pub fn is_stored(&self, host: &dyn PropertyHost) -> bool {
        self.stored.eval(host)
    }

    /// Check if the property is the user property on this host
    pub fn is_user(&self, host: &dyn PropertyHost) -> bool {
        self.user.eval(host)
    }

    /// Check if the property has a change-notification signal
    pub fn has_notify_signal(&self) -> bool {
        self.notify_signal.is_some()
    }

    /// Global method index of the notify signal
    pub fn notify_signal_index(&self) -> Option<usize> {
        self.notify_signal
    }

    /// Signature of the notify signal
    pub fn notify_signature(&self) -> Option<&str> {
        self.notify_signature.as_deref()
    }

    /// All capability flags, querying dynamic traits against `host`.
    pub fn flags(&self, host: &dyn PropertyHost) -> PropertyFlags {
        let mut flags = PropertyFlags::empty();
        flags.set(PropertyFlags::CONSTANT, self.is_constant());
        flags.set(PropertyFlags::DESIGNABLE, self.is_designable(host));
        flags.set(PropertyFlags::FINAL, self.is_final());
        flags.set(PropertyFlags::RESETTABLE, self.is_resettable());
        flags.set(PropertyFlags::SCRIPTABLE, self.is_scriptable(host));
        flags.set(PropertyFlags::STORED, self.is_stored(host));
        flags.set(PropertyFlags::USER, self.is_user(host));
        flags.set(PropertyFlags::WRITABLE, self.is_writable());
        flags.set(PropertyFlags::NOTIFY, self.has_notify_signal());
        flags
    }

    /// Read the current value from `host`.
    pub fn read(&self, host: &dyn PropertyHost) -> Value {
        (self.read)(host)
    }

    /// Write `value` into `host`. Returns `false` for read-only properties.
    pub fn write(&self, host: &dyn PropertyHost, value: Value) -> bool {
        match &self.write {
            Some(write) => write(host, value),
            None => false,
        }
    }

    /// Reset the property on `host`. Returns `false` if not resettable.
    pub fn reset(&self, host: &dyn PropertyHost) -> bool {
        match &self.reset {
            Some(reset) => reset(host),
            None => false,
        }
    }
}

impl fmt::Debug for MetaProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetaProperty")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("index", &self.index)
            .field("writable", &self.is_writable())
            .field("resettable", &self.is_resettable())
            .field("notify", &self.notify_signature)
            .finish()
    }
}
