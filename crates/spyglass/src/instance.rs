//! Reflected object handles

use std::rc::{Rc, Weak};

use crate::meta::{MetaObject, PropertyHost};
use crate::object::{Gadget, Object, WeakObject};

/// Which kind of backing object a handle refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceKind {
    /// No object bound
    Invalid,
    /// Identity-bearing object with signals and a destruction event
    Object,
    /// Shared value with its own metadata
    GadgetValue,
    /// Pointer to a value owned elsewhere
    GadgetPointer,
}

/// A handle to something the inspector can reflect over.
///
/// Pointer kinds never keep their target alive.
#[derive(Debug, Clone, Default)]
pub enum ObjectInstance {
    /// No object bound
    #[default]
    Invalid,
    /// Non-owning reference to an object
    Object(WeakObject),
    /// A reflected value
    GadgetValue(Rc<Gadget>),
    /// Non-owning reference to a value owned elsewhere
    GadgetPointer(Weak<Gadget>),
}

impl ObjectInstance {
    /// Handle for a live object
    pub fn from_object(object: &Object) -> Self {
        ObjectInstance::Object(object.downgrade())
    }

    /// Handle sharing a value
    pub fn from_gadget(gadget: Gadget) -> Self {
        ObjectInstance::GadgetValue(Rc::new(gadget))
    }

    /// Handle pointing at a value owned elsewhere
    pub fn from_gadget_ptr(gadget: &Rc<Gadget>) -> Self {
        ObjectInstance::GadgetPointer(Rc::downgrade(gadget))
    }

    /// Active kind
    pub fn kind(&self) -> InstanceKind {
        match self {
            ObjectInstance::Invalid => InstanceKind::Invalid,
            ObjectInstance::Object(_) => InstanceKind::Object,
            ObjectInstance::GadgetValue(_) => InstanceKind::GadgetValue,
            ObjectInstance::GadgetPointer(_) => InstanceKind::GadgetPointer,
        }
    }

    /// Check whether the handle currently reaches a live target.
    pub fn is_valid(&self) -> bool {
        match self {
            ObjectInstance::Invalid => false,
            ObjectInstance::Object(obj) => obj.is_alive(),
            ObjectInstance::GadgetValue(_) => true,
            ObjectInstance::GadgetPointer(ptr) => ptr.strong_count() > 0,
        }
    }

    /// Live object, for the `Object` kind only
    pub fn object(&self) -> Option<Object> {
        match self {
            ObjectInstance::Object(obj) => obj.upgrade(),
            _ => None,
        }
    }

    /// Live value, for the gadget kinds only
    pub fn gadget(&self) -> Option<Rc<Gadget>> {
        match self {
            ObjectInstance::GadgetValue(gadget) => Some(Rc::clone(gadget)),
            ObjectInstance::GadgetPointer(ptr) => ptr.upgrade(),
            _ => None,
        }
    }

    /// Type metadata of the target, if it is still reachable
    pub fn meta_object(&self) -> Option<Rc<MetaObject>> {
        self.with_host(|host| Rc::clone(host.meta_object()))
    }

    /// Run `f` against the live target, dispatching on the handle kind.
    ///
    /// Returns `None` without calling `f` when the handle is invalid or the
    /// target is gone.
    pub fn with_host<R>(&self, f: impl FnOnce(&dyn PropertyHost) -> R) -> Option<R> {
        match self {
            ObjectInstance::Invalid => None,
            ObjectInstance::Object(obj) => obj.upgrade().map(|live| f(&live)),
            ObjectInstance::GadgetValue(gadget) => Some(f(gadget.as_ref())),
            ObjectInstance::GadgetPointer(ptr) => ptr.upgrade().map(|live| f(live.as_ref())),
        }
    }
}

impl From<&Object> for ObjectInstance {
    fn from(object: &Object) -> Self {
        Self::from_object(object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::{MetaObjectBuilder, TypeMetadata};

    #[test]
    fn test_invalid_has_nothing() {
        let instance = ObjectInstance::default();
        assert_eq!(instance.kind(), InstanceKind::Invalid);
        assert!(!instance.is_valid());
        assert!(instance.meta_object().is_none());
    }

    #[test]
    fn test_object_handle_does_not_own() {
        let obj = Object::new(MetaObject::object());
        let instance = ObjectInstance::from_object(&obj);
        assert!(instance.is_valid());
        assert_eq!(instance.meta_object().unwrap().class_name(), "Object");

        drop(obj);
        assert_eq!(instance.kind(), InstanceKind::Object);
        assert!(!instance.is_valid());
        assert!(instance.object().is_none());
        assert!(instance.with_host(|_| ()).is_none());
    }

    #[test]
    fn test_gadget_pointer_follows_owner() {
        let meta = MetaObjectBuilder::gadget("Margins").build().unwrap();
        let owned = Rc::new(Gadget::new(meta));
        let instance = ObjectInstance::from_gadget_ptr(&owned);
        assert!(instance.gadget().is_some());

        drop(owned);
        assert!(!instance.is_valid());
    }
}
