//! Metadata-backed property adaptor

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use tracing::{debug, trace};

use super::guard::NotifyGuard;
use super::{AccessFlags, AdaptorEvent, PropertyAdaptor, PropertyData};
use crate::config::AdaptorConfig;
use crate::error::{InspectError, Result};
use crate::instance::{InstanceKind, ObjectInstance};
use crate::meta::{MetaProperty, PropertyHost, TypeMetadata};
use crate::notify::Listeners;
use crate::object::{ConnectionId, Object, WeakObject};
use crate::probe::ProbeGuardSuspender;
use crate::value::Value;

/// State shared with the signal handlers installed on the bound object.
///
/// Handlers hold a `Weak` to it, so a handler that outlives its adaptor
/// does nothing.
struct AdaptorState {
    config: AdaptorConfig,
    read_depth: Cell<usize>,
    write_depth: Cell<usize>,
    /// Notify signal index to every property index it announces
    notify_map: RefCell<IndexMap<usize, Vec<usize>>>,
    listeners: Listeners<AdaptorEvent>,
}

impl AdaptorState {
    fn is_suppressed(&self) -> bool {
        self.read_depth.get() > 0
            || (self.config.suppress_during_write && self.write_depth.get() > 0)
    }

    fn property_updated(&self, signal_index: usize) {
        if self.is_suppressed() {
            trace!(signal_index, "change notification suppressed");
            return;
        }
        let indices = self
            .notify_map
            .borrow()
            .get(&signal_index)
            .cloned()
            .unwrap_or_default();
        for index in indices {
            self.listeners.emit(&AdaptorEvent::PropertyChanged {
                first: index,
                last: index,
            });
        }
    }
}

/// Property adaptor driven by [`MetaObject`](crate::meta::MetaObject)
/// descriptors.
///
/// Works with every [`ObjectInstance`] kind. Only the `Object` kind can
/// announce changes on its own; for value kinds every write and reset is
/// followed by a synthesized notification.
pub struct MetaPropertyAdaptor {
    instance: ObjectInstance,
    state: Rc<AdaptorState>,
    subscriptions: Vec<(WeakObject, ConnectionId)>,
}

impl MetaPropertyAdaptor {
    /// Create an unbound adaptor with default settings.
    pub fn new() -> Self {
        Self::with_config(AdaptorConfig::default())
    }

    /// Create an unbound adaptor with a custom notification policy.
    pub fn with_config(config: AdaptorConfig) -> Self {
        Self {
            instance: ObjectInstance::Invalid,
            state: Rc::new(AdaptorState {
                config,
                read_depth: Cell::new(0),
                write_depth: Cell::new(0),
                notify_map: RefCell::new(IndexMap::new()),
                listeners: Listeners::new(),
            }),
            subscriptions: Vec::new(),
        }
    }

    /// Create an adaptor already bound to `instance`.
    pub fn bound_to(instance: ObjectInstance) -> Self {
        let mut adaptor = Self::new();
        adaptor.set_object(instance);
        adaptor
    }

    /// Notification policy
    pub fn config(&self) -> &AdaptorConfig {
        &self.state.config
    }

    /// Check if a property read is in flight.
    pub fn is_reading(&self) -> bool {
        self.state.read_depth.get() > 0
    }

    /// Number of connections held on the bound object
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Property indices announced by the notify signal at `signal_index`
    pub fn notified_properties(&self, signal_index: usize) -> Vec<usize> {
        self.state
            .notify_map
            .borrow()
            .get(&signal_index)
            .cloned()
            .unwrap_or_default()
    }

    fn clear_subscriptions(&mut self) {
        for (sender, id) in self.subscriptions.drain(..) {
            // A dead sender already dropped its connections
            if let Some(sender) = sender.upgrade() {
                sender.disconnect(id);
            }
        }
        self.state.notify_map.borrow_mut().clear();
    }

    fn subscribe_to(&mut self, object: &Object) {
        let meta = Rc::clone(object.meta_object());

        let state = Rc::downgrade(&self.state);
        let id = object.on_destroyed(move |_| {
            if let Some(state) = state.upgrade() {
                state.listeners.emit(&AdaptorEvent::ObjectInvalidated);
            }
        });
        self.subscriptions.push((object.downgrade(), id));

        let mut notify_map: IndexMap<usize, Vec<usize>> = IndexMap::new();
        for index in 0..meta.property_count() {
            if let Some(signal) = meta
                .property_at(index)
                .and_then(MetaProperty::notify_signal_index)
            {
                notify_map.entry(signal).or_default().push(index);
            }
        }

        for &signal in notify_map.keys() {
            let state: Weak<AdaptorState> = Rc::downgrade(&self.state);
            match object.connect(signal, move |emission| {
                if let Some(state) = state.upgrade() {
                    state.property_updated(emission.signal_index);
                }
            }) {
                Ok(id) => self.subscriptions.push((object.downgrade(), id)),
                Err(err) => debug!(%err, signal, "cannot watch notify signal"),
            }
        }

        debug!(
            object = %object.id(),
            class = meta.class_name(),
            properties = meta.property_count(),
            notify_signals = notify_map.len(),
            "bound object"
        );
        *self.state.notify_map.borrow_mut() = notify_map;
    }

    fn checked_count(&self, index: usize) -> Result<usize> {
        let count = self.count();
        if index >= count {
            return Err(InspectError::OutOfRange { index, count });
        }
        Ok(count)
    }

    /// Apply a write or reset and deliver whatever notification the
    /// instance kind and config call for.
    fn modify<F>(&self, index: usize, action: &str, apply: F) -> Result<()>
    where
        F: FnOnce(&MetaProperty, &dyn PropertyHost) -> bool,
    {
        if !self.instance.is_valid() {
            trace!(index, action, "ignored on unbound adaptor");
            return Ok(());
        }
        self.checked_count(index)?;

        let outcome = {
            let _guard = self
                .state
                .config
                .suppress_during_write
                .then(|| NotifyGuard::enter(&self.state.write_depth));
            self.instance
                .with_host(|host| {
                    let meta = Rc::clone(host.meta_object());
                    let property = meta.property_at(index)?;
                    let accepted = apply(property, host);
                    Some((accepted, property.has_notify_signal()))
                })
                .flatten()
        };
        let Some((accepted, has_notify)) = outcome else {
            return Ok(());
        };
        if !accepted {
            debug!(index, action, "property rejected the change");
        }

        let synthesize = self.state.config.suppress_during_write
            || !has_notify
            || self.instance.kind() != InstanceKind::Object;
        if synthesize {
            self.state.listeners.emit(&AdaptorEvent::PropertyChanged {
                first: index,
                last: index,
            });
        }
        Ok(())
    }
}

impl Default for MetaPropertyAdaptor {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyAdaptor for MetaPropertyAdaptor {
    fn object(&self) -> &ObjectInstance {
        &self.instance
    }

    fn set_object(&mut self, instance: ObjectInstance) {
        self.clear_subscriptions();
        self.instance = instance;
        match self.instance.object() {
            Some(object) => self.subscribe_to(&object),
            None => debug!(kind = ?self.instance.kind(), "bound without subscriptions"),
        }
    }

    fn count(&self) -> usize {
        if !self.instance.is_valid() {
            return 0;
        }
        self.instance
            .meta_object()
            .map_or(0, |meta| meta.property_count())
    }

    fn property_data(&self, index: usize) -> Result<PropertyData> {
        let count = self.checked_count(index)?;
        let _reading = NotifyGuard::enter(&self.state.read_depth);

        let data = self.instance.with_host(|host| {
            let meta = Rc::clone(host.meta_object());
            let property = meta.property_at(index);
            debug_assert!(
                property.is_some(),
                "{} reports {} properties but has no descriptor {}",
                meta.class_name(),
                count,
                index
            );
            let property = property?;

            let class_name = meta
                .declaring_class(index)
                .unwrap_or(&meta)
                .class_name()
                .to_string();
            let value = {
                let _suspend = ProbeGuardSuspender::new();
                property.read(host)
            };

            let mut access_flags = AccessFlags::READABLE;
            access_flags.set(AccessFlags::WRITABLE, property.is_writable());
            access_flags.set(AccessFlags::RESETTABLE, property.is_resettable());

            Some(PropertyData {
                name: property.name().to_string(),
                type_name: property.type_name().to_string(),
                class_name,
                value,
                property_flags: property.flags(host),
                access_flags,
                revision: property.revision(),
                notify_signal: property.notify_signature().map(str::to_string),
            })
        });

        data.flatten()
            .ok_or(InspectError::OutOfRange { index, count })
    }

    fn write_property(&self, index: usize, value: Value) -> Result<()> {
        self.modify(index, "write", |property, host| property.write(host, value))
    }

    fn reset_property(&self, index: usize) -> Result<()> {
        self.modify(index, "reset", |property, host| property.reset(host))
    }

    fn listeners(&self) -> &Listeners<AdaptorEvent> {
        &self.state.listeners
    }
}

impl Drop for MetaPropertyAdaptor {
    fn drop(&mut self) {
        self.clear_subscriptions();
    }
}

impl fmt::Debug for MetaPropertyAdaptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetaPropertyAdaptor")
            .field("instance", &self.instance)
            .field("config", &self.state.config)
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::{MetaObject, MetaObjectBuilder, PropertyBuilder};

    fn counter() -> Rc<MetaObject> {
        MetaObjectBuilder::new("Counter")
            .signal("valueChanged()")
            .property(
                PropertyBuilder::new("value", "i64")
                    .writable()
                    .resettable()
                    .default_value(Value::from(0i64))
                    .notify("valueChanged()"),
            )
            .property(
                PropertyBuilder::new("doubled", "i64")
                    .read_with(|host| match host.field("value").as_i64() {
                        Some(v) => Value::from(v * 2),
                        None => Value::from(0i64),
                    })
                    .notify("valueChanged()"),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn test_unbound_adaptor_is_empty() {
        let adaptor = MetaPropertyAdaptor::new();
        assert_eq!(adaptor.count(), 0);
        assert_eq!(
            adaptor.property_data(0),
            Err(InspectError::OutOfRange { index: 0, count: 0 })
        );
        assert_eq!(adaptor.write_property(3, Value::from(1i64)), Ok(()));
        assert_eq!(adaptor.reset_property(3), Ok(()));
    }

    #[test]
    fn test_shared_notify_signal_maps_every_property() {
        let obj = Object::new(counter());
        let adaptor = MetaPropertyAdaptor::bound_to(ObjectInstance::from_object(&obj));
        let signal = obj.meta_object().index_of_signal("valueChanged()").unwrap();

        // Destruction hook, objectNameChanged() and one shared valueChanged()
        assert_eq!(adaptor.subscription_count(), 3);
        let value = obj.meta_object().index_of_property("value").unwrap();
        assert_eq!(adaptor.notified_properties(signal), vec![value, value + 1]);
    }

    #[test]
    fn test_guard_released_after_read() {
        let obj = Object::new(counter());
        let adaptor = MetaPropertyAdaptor::bound_to(ObjectInstance::from_object(&obj));
        adaptor.property_data(0).unwrap();
        assert!(!adaptor.is_reading());
    }

    #[test]
    fn test_drop_disconnects() {
        let obj = Object::new(counter());
        let signal = obj.meta_object().index_of_signal("valueChanged()").unwrap();
        {
            let _adaptor = MetaPropertyAdaptor::bound_to(ObjectInstance::from_object(&obj));
            assert_eq!(obj.receiver_count(signal), 1);
            assert_eq!(obj.destroy_hook_count(), 1);
        }
        assert_eq!(obj.receiver_count(signal), 0);
        assert_eq!(obj.destroy_hook_count(), 0);
    }
}
