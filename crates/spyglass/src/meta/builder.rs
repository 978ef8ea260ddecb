//! Explicit registration of type metadata

use std::rc::Rc;

use tracing::trace;

use super::method::{normalize_signature, InvokeFn, MetaMethod, MethodKind};
use super::property::{
    MetaProperty, PropertyHost, PropertyTrait, ReadFn, ResetFn, WriteFn,
};
use super::{MetaObject, TypeMetadata};
use crate::error::MetaError;
use crate::value::Value;

/// Builder for a [`MetaObject`].
///
/// # Example
///
/// ```
/// use spyglass::{MetaObjectBuilder, PropertyBuilder, TypeMetadata};
///
/// let meta = MetaObjectBuilder::new("Slider")
///     .signal("valueChanged()")
///     .property(
///         PropertyBuilder::new("value", "i64")
///             .writable()
///             .notify("valueChanged()"),
///     )
///     .build()
///     .unwrap();
///
/// assert_eq!(meta.class_name(), "Slider");
/// assert!(meta.index_of_property("value").is_some());
/// ```
pub struct MetaObjectBuilder {
    class_name: String,
    super_class: Option<Rc<MetaObject>>,
    methods: Vec<(String, MethodKind, Option<InvokeFn>)>,
    properties: Vec<PropertyBuilder>,
}

impl MetaObjectBuilder {
    /// Start a class deriving from the root `Object` class.
    pub fn new(class_name: impl Into<String>) -> Self {
        Self::root(class_name).inherits(MetaObject::object())
    }

    /// Start a value type with no superclass and no destruction signal.
    pub fn gadget(class_name: impl Into<String>) -> Self {
        Self::root(class_name)
    }

    pub(super) fn root(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            super_class: None,
            methods: Vec::new(),
            properties: Vec::new(),
        }
    }

    /// Set the superclass.
    pub fn inherits(mut self, super_class: Rc<MetaObject>) -> Self {
        self.super_class = Some(super_class);
        self
    }

    /// Declare a signal.
    pub fn signal(mut self, signature: &str) -> Self {
        self.methods
            .push((normalize_signature(signature), MethodKind::Signal, None));
        self
    }

    /// Declare a slot with a native body.
    pub fn slot<F>(mut self, signature: &str, body: F) -> Self
    where
        F: Fn(&crate::Object, &[Value]) + 'static,
    {
        self.methods.push((
            normalize_signature(signature),
            MethodKind::Slot,
            Some(Rc::new(body) as InvokeFn),
        ));
        self
    }

    /// Declare a plain invokable method.
    pub fn method<F>(mut self, signature: &str, body: F) -> Self
    where
        F: Fn(&crate::Object, &[Value]) + 'static,
    {
        self.methods.push((
            normalize_signature(signature),
            MethodKind::Method,
            Some(Rc::new(body) as InvokeFn),
        ));
        self
    }

    /// Declare a property.
    pub fn property(mut self, property: PropertyBuilder) -> Self {
        self.properties.push(property);
        self
    }

    /// Assign global indices and resolve notify signals.
    ///
    /// # Errors
    ///
    /// `UnknownSignal` if a property names a notify signal that neither this
    /// class nor any superclass declares.
    pub fn build(self) -> Result<Rc<MetaObject>, MetaError> {
        let property_offset = self.super_class.as_ref().map_or(0, |s| s.property_count());
        let method_offset = self.super_class.as_ref().map_or(0, |s| s.method_count());

        let methods: Vec<MetaMethod> = self
            .methods
            .into_iter()
            .enumerate()
            .map(|(i, (signature, kind, invoker))| MetaMethod {
                signature,
                kind,
                index: method_offset + i,
                invoker,
            })
            .collect();

        let mut properties = Vec::with_capacity(self.properties.len());
        for (i, spec) in self.properties.into_iter().enumerate() {
            let notify = match &spec.notify {
                Some(signature) => {
                    let normalized = normalize_signature(signature);
                    let index = methods
                        .iter()
                        .find(|m| m.is_signal() && m.signature == normalized)
                        .map(|m| m.index)
                        .or_else(|| self.super_class.as_ref()?.index_of_signal(&normalized));
                    match index {
                        Some(index) => Some((index, normalized)),
                        None => {
                            return Err(MetaError::UnknownSignal {
                                class: self.class_name,
                                signature: normalized,
                            })
                        }
                    }
                }
                None => None,
            };
            properties.push(spec.into_property(property_offset + i, notify));
        }

        trace!(
            class = %self.class_name,
            properties = properties.len(),
            methods = methods.len(),
            "built metadata"
        );

        Ok(Rc::new(MetaObject {
            class_name: self.class_name,
            super_class: self.super_class,
            properties,
            methods,
            property_offset,
            method_offset,
        }))
    }
}

/// Builder for one property of a [`MetaObjectBuilder`].
///
/// Without custom accessors the property is backed by a host field of the
/// same name: writes emit the notify signal when the stored value changes,
/// and reset restores the default value.
pub struct PropertyBuilder {
    name: String,
    type_name: String,
    writable: bool,
    resettable: bool,
    constant: bool,
    is_final: bool,
    designable: PropertyTrait,
    scriptable: PropertyTrait,
    stored: PropertyTrait,
    user: PropertyTrait,
    revision: u32,
    notify: Option<String>,
    default_value: Option<Value>,
    read: Option<ReadFn>,
    write: Option<WriteFn>,
    reset: Option<ResetFn>,
}

impl PropertyBuilder {
    /// Readable, designable, scriptable and stored by default.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            writable: false,
            resettable: false,
            constant: false,
            is_final: false,
            designable: PropertyTrait::Static(true),
            scriptable: PropertyTrait::Static(true),
            stored: PropertyTrait::Static(true),
            user: PropertyTrait::Static(false),
            revision: 0,
            notify: None,
            default_value: None,
            read: None,
            write: None,
            reset: None,
        }
    }

    /// Give the property a field-backed setter.
    pub fn writable(mut self) -> Self {
        self.writable = true;
        self
    }

    /// Give the property a reset that restores the default value.
    pub fn resettable(mut self) -> Self {
        self.resettable = true;
        self
    }

    /// Mark the property constant.
    pub fn constant(mut self) -> Self {
        self.constant = true;
        self
    }

    /// Mark the property final.
    pub fn mark_final(mut self) -> Self {
        self.is_final = true;
        self
    }

    /// Fixed designable trait
    pub fn designable(mut self, designable: bool) -> Self {
        self.designable = PropertyTrait::Static(designable);
        self
    }

    /// Per-instance designable trait
    pub fn designable_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&dyn PropertyHost) -> bool + 'static,
    {
        self.designable = PropertyTrait::Dynamic(Rc::new(f));
        self
    }

    /// Fixed scriptable trait
    pub fn scriptable(mut self, scriptable: bool) -> Self {
        self.scriptable = PropertyTrait::Static(scriptable);
        self
    }

    /// Per-instance scriptable trait
    pub fn scriptable_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&dyn PropertyHost) -> bool + 'static,
    {
        self.scriptable = PropertyTrait::Dynamic(Rc::new(f));
        self
    }

    /// Fixed stored trait
    pub fn stored(mut self, stored: bool) -> Self {
        self.stored = PropertyTrait::Static(stored);
        self
    }

    /// Per-instance stored trait
    pub fn stored_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&dyn PropertyHost) -> bool + 'static,
    {
        self.stored = PropertyTrait::Dynamic(Rc::new(f));
        self
    }

    /// Fixed user trait
    pub fn user(mut self, user: bool) -> Self {
        self.user = PropertyTrait::Static(user);
        self
    }

    /// Per-instance user trait
    pub fn user_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&dyn PropertyHost) -> bool + 'static,
    {
        self.user = PropertyTrait::Dynamic(Rc::new(f));
        self
    }

    /// Revision the property was introduced in.
    pub fn revision(mut self, revision: u32) -> Self {
        self.revision = revision;
        self
    }

    /// Tie the property to a change-notification signal.
    pub fn notify(mut self, signature: &str) -> Self {
        self.notify = Some(signature.to_string());
        self
    }

    /// Value read while the field is unset, and restored by reset.
    pub fn default_value(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Replace the field-backed getter.
    pub fn read_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&dyn PropertyHost) -> Value + 'static,
    {
        self.read = Some(Rc::new(f));
        self
    }

    /// Replace the field-backed setter. Implies writable.
    pub fn write_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&dyn PropertyHost, Value) -> bool + 'static,
    {
        self.write = Some(Rc::new(f));
        self
    }

    /// Replace the default reset. Implies resettable.
    pub fn reset_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&dyn PropertyHost) -> bool + 'static,
    {
        self.reset = Some(Rc::new(f));
        self
    }

    fn into_property(self, index: usize, notify: Option<(usize, String)>) -> MetaProperty {
        let notify_index = notify.as_ref().map(|(i, _)| *i);

        let read = self.read.unwrap_or_else(|| {
            let name = self.name.clone();
            let fallback = self.default_value.clone().unwrap_or_default();
            Rc::new(move |host: &dyn PropertyHost| {
                let value = host.field(&name);
                if value.is_invalid() {
                    fallback.clone()
                } else {
                    value
                }
            }) as ReadFn
        });

        let write = self.write.or_else(|| {
            self.writable.then(|| {
                let name = self.name.clone();
                Rc::new(move |host: &dyn PropertyHost, value: Value| {
                    store_and_notify(host, &name, value, notify_index);
                    true
                }) as WriteFn
            })
        });

        let reset = self.reset.or_else(|| {
            self.resettable.then(|| {
                let name = self.name.clone();
                let fallback = self.default_value.clone().unwrap_or_default();
                Rc::new(move |host: &dyn PropertyHost| {
                    store_and_notify(host, &name, fallback.clone(), notify_index);
                    true
                }) as ResetFn
            })
        });

        let (notify_signal, notify_signature) = match notify {
            Some((i, signature)) => (Some(i), Some(signature)),
            None => (None, None),
        };

        MetaProperty {
            name: self.name,
            type_name: self.type_name,
            index,
            constant: self.constant,
            is_final: self.is_final,
            designable: self.designable,
            scriptable: self.scriptable,
            stored: self.stored,
            user: self.user,
            revision: self.revision,
            notify_signal,
            notify_signature,
            default_value: self.default_value,
            read,
            write,
            reset,
        }
    }
}

fn store_and_notify(host: &dyn PropertyHost, name: &str, value: Value, notify: Option<usize>) {
    if host.set_field(name, value) {
        if let Some(signal) = notify {
            host.notify(signal);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Gadget;

    #[test]
    fn test_unknown_notify_signal_fails() {
        let err = MetaObjectBuilder::new("Broken")
            .property(PropertyBuilder::new("x", "i64").notify("xChanged()"))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            MetaError::UnknownSignal {
                class: "Broken".to_string(),
                signature: "xChanged()".to_string(),
            }
        );
    }

    #[test]
    fn test_notify_resolves_to_inherited_signal() {
        let meta = MetaObjectBuilder::new("Named")
            .property(PropertyBuilder::new("alias", "String").notify("objectNameChanged()"))
            .build()
            .unwrap();
        let alias = meta.property_at(1).unwrap();
        assert_eq!(alias.notify_signal_index(), Some(1));
        assert_eq!(alias.notify_signature(), Some("objectNameChanged()"));
    }

    #[test]
    fn test_field_backed_accessors() {
        let meta = MetaObjectBuilder::gadget("Point")
            .property(
                PropertyBuilder::new("x", "i64")
                    .writable()
                    .resettable()
                    .default_value(Value::I64(0)),
            )
            .build()
            .unwrap();
        let point = Gadget::new(Rc::clone(&meta));
        let x = meta.property_at(0).unwrap();

        assert_eq!(x.read(&point), Value::I64(0));
        assert!(x.write(&point, Value::I64(5)));
        assert_eq!(x.read(&point), Value::I64(5));
        assert!(x.reset(&point));
        assert_eq!(x.read(&point), Value::I64(0));
    }

    #[test]
    fn test_read_only_property_rejects_write() {
        let meta = MetaObjectBuilder::gadget("Fixed")
            .property(PropertyBuilder::new("id", "u64").default_value(Value::U64(9)))
            .build()
            .unwrap();
        let fixed = Gadget::new(Rc::clone(&meta));
        let id = meta.property_at(0).unwrap();

        assert!(!id.is_writable());
        assert!(!id.write(&fixed, Value::U64(1)));
        assert!(!id.reset(&fixed));
        assert_eq!(id.read(&fixed), Value::U64(9));
    }
}
