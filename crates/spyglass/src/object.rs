//! In-process object runtime: identity, signals and connection bookkeeping
//!
//! An [`Object`] is an owning handle; the object lives until the last
//! `Object` clone is dropped. Everything else that refers to an object,
//! including the inspection layer, holds a [`WeakObject`] and must
//! `upgrade()` before touching it.

mod connection;
mod gadget;

pub use connection::{ConnectionId, Emission, InboundConnection, SignalHandler};
pub use gadget::Gadget;

use connection::{OutboundConnection, SignalFilter, Target};

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::error::MetaError;
use crate::meta::{
    MetaObject, PropertyHost, TypeMetadata, DESTROYED_SIGNATURE, OBJECT_NAME_PROPERTY,
};
use crate::probe::{self, ProbeEvent};
use crate::value::Value;

static NEXT_OBJECT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique object identity. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u64);

impl ObjectId {
    fn next() -> Self {
        Self(NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric identity
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

struct ObjectData {
    id: ObjectId,
    meta: Rc<MetaObject>,
    fields: RefCell<IndexMap<String, Value>>,
    /// Connections this object sends on
    outbound: RefCell<Vec<OutboundConnection>>,
    /// Connections other objects send to this one, oldest first
    inbound: RefCell<Vec<InboundConnection>>,
    /// Run on destruction whatever the type declares
    destroy_hooks: RefCell<Vec<(ConnectionId, DestroyHandler)>>,
}

/// Closure run when an object is destroyed
pub type DestroyHandler = Rc<dyn Fn(ObjectId)>;

/// Owning handle to a live object.
#[derive(Clone)]
pub struct Object {
    data: Rc<ObjectData>,
}

/// Non-owning handle to an object that may already be gone.
#[derive(Clone)]
pub struct WeakObject {
    data: Weak<ObjectData>,
    id: ObjectId,
}

impl WeakObject {
    /// Get an owning handle if the object is still alive.
    pub fn upgrade(&self) -> Option<Object> {
        self.data.upgrade().map(|data| Object { data })
    }

    /// Check whether the object is still alive.
    pub fn is_alive(&self) -> bool {
        self.data.strong_count() > 0
    }

    /// Identity of the referenced object, valid even after destruction.
    pub fn id(&self) -> ObjectId {
        self.id
    }
}

impl fmt::Debug for WeakObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WeakObject({}, alive: {})", self.id, self.is_alive())
    }
}

impl PartialEq for WeakObject {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Object {
    /// Create an object of type `meta` and report it to the probe.
    pub fn new(meta: Rc<MetaObject>) -> Self {
        let object = Self {
            data: Rc::new(ObjectData {
                id: ObjectId::next(),
                meta,
                fields: RefCell::new(IndexMap::new()),
                outbound: RefCell::new(Vec::new()),
                inbound: RefCell::new(Vec::new()),
                destroy_hooks: RefCell::new(Vec::new()),
            }),
        };
        trace!(id = %object.id(), class = object.class_name(), "object created");
        probe::report(&ProbeEvent::Created(&object));
        object
    }

    /// Create an object and set its `objectName`.
    pub fn with_name(meta: Rc<MetaObject>, name: impl Into<String>) -> Self {
        let object = Self::new(meta);
        object.set_object_name(name);
        object
    }

    /// Object identity
    pub fn id(&self) -> ObjectId {
        self.data.id
    }

    /// Type metadata of the most-derived type
    pub fn meta_object(&self) -> &Rc<MetaObject> {
        &self.data.meta
    }

    /// Class name of the most-derived type
    pub fn class_name(&self) -> &str {
        self.data.meta.class_name()
    }

    /// Non-owning handle to this object
    pub fn downgrade(&self) -> WeakObject {
        WeakObject {
            data: Rc::downgrade(&self.data),
            id: self.data.id,
        }
    }

    /// Check whether two handles name the same object.
    pub fn ptr_eq(&self, other: &Object) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }

    /// The `objectName` property, empty when unset
    pub fn object_name(&self) -> String {
        match self.read_property(OBJECT_NAME_PROPERTY) {
            Value::String(name) => name.as_ref().clone(),
            _ => String::new(),
        }
    }

    /// Set `objectName`, emitting `objectNameChanged()` if it changed.
    pub fn set_object_name(&self, name: impl Into<String>) -> bool {
        self.write_property(OBJECT_NAME_PROPERTY, Value::string(name))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Connections
    // ═══════════════════════════════════════════════════════════════════

    /// Attach `handler` to the signal at `signal_index`.
    ///
    /// # Errors
    ///
    /// `InvalidMethodIndex` or `NotASignal` if the index does not name a
    /// signal of this object's type.
    pub fn connect<F>(&self, signal_index: usize, handler: F) -> Result<ConnectionId, MetaError>
    where
        F: Fn(&Emission<'_>) + 'static,
    {
        check_signal(&self.data.meta, signal_index)?;
        let id = ConnectionId::next();
        self.data.outbound.borrow_mut().push(OutboundConnection {
            id,
            filter: SignalFilter::Index(signal_index),
            target: Target::Handler(Rc::new(handler) as SignalHandler),
        });
        Ok(id)
    }

    /// Attach `handler` to the signal named by `signature`.
    pub fn connect_signal<F>(&self, signature: &str, handler: F) -> Result<ConnectionId, MetaError>
    where
        F: Fn(&Emission<'_>) + 'static,
    {
        let index = self.signal_index(signature)?;
        self.connect(index, handler)
    }

    /// Connect a signal of `sender` to a slot of `receiver`.
    ///
    /// The connection is recorded on the receiver and shows up in its
    /// inbound connection list.
    pub fn connect_slot(
        sender: &Object,
        signal_index: usize,
        receiver: &Object,
        slot_index: usize,
    ) -> Result<ConnectionId, MetaError> {
        check_signal(&sender.data.meta, signal_index)?;
        check_method(&receiver.data.meta, slot_index)?;
        Ok(Self::link(
            sender,
            SignalFilter::Index(signal_index),
            receiver,
            slot_index,
        ))
    }

    /// Connect by signatures, e.g. `("clicked()", "refresh()")`.
    pub fn connect_by_signature(
        sender: &Object,
        signal: &str,
        receiver: &Object,
        slot: &str,
    ) -> Result<ConnectionId, MetaError> {
        let signal_index = sender.signal_index(signal)?;
        let slot_index = receiver.method_index(slot)?;
        Self::connect_slot(sender, signal_index, receiver, slot_index)
    }

    /// Relay every signal `sender` emits to a slot of `receiver`.
    ///
    /// The inbound record carries no signal index for such a connection.
    pub fn connect_all_signals(
        sender: &Object,
        receiver: &Object,
        slot_index: usize,
    ) -> Result<ConnectionId, MetaError> {
        check_method(&receiver.data.meta, slot_index)?;
        Ok(Self::link(sender, SignalFilter::Any, receiver, slot_index))
    }

    fn link(
        sender: &Object,
        filter: SignalFilter,
        receiver: &Object,
        slot_index: usize,
    ) -> ConnectionId {
        let id = ConnectionId::next();
        sender.data.outbound.borrow_mut().push(OutboundConnection {
            id,
            filter,
            target: Target::Slot {
                receiver: receiver.downgrade(),
                slot_index,
            },
        });
        receiver.data.inbound.borrow_mut().push(InboundConnection {
            id,
            sender: sender.downgrade(),
            signal_index: filter.index(),
            slot_index,
        });
        trace!(sender = %sender.id(), receiver = %receiver.id(), slot_index, "connected");
        id
    }

    /// Run `handler` when this object is destroyed.
    ///
    /// Unlike a `destroyed()` connection this does not need the type to
    /// declare the signal, so it works for any metadata.
    pub fn on_destroyed<F>(&self, handler: F) -> ConnectionId
    where
        F: Fn(ObjectId) + 'static,
    {
        let id = ConnectionId::next();
        self.data
            .destroy_hooks
            .borrow_mut()
            .push((id, Rc::new(handler) as DestroyHandler));
        id
    }

    /// Number of handlers registered with [`on_destroyed`](Self::on_destroyed)
    pub fn destroy_hook_count(&self) -> usize {
        self.data.destroy_hooks.borrow().len()
    }

    /// Remove a connection or destruction handler. Returns `false` if unknown.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        {
            let mut hooks = self.data.destroy_hooks.borrow_mut();
            if let Some(position) = hooks.iter().position(|(hook_id, _)| *hook_id == id) {
                hooks.remove(position);
                return true;
            }
        }
        let removed = {
            let mut outbound = self.data.outbound.borrow_mut();
            let position = outbound.iter().position(|c| c.id == id);
            position.map(|p| outbound.remove(p))
        };
        match removed {
            Some(conn) => {
                if let Target::Slot { receiver, .. } = &conn.target {
                    if let Some(receiver) = receiver.upgrade() {
                        receiver.data.inbound.borrow_mut().retain(|c| c.id != id);
                    }
                }
                true
            }
            None => false,
        }
    }

    /// Number of connections listening to `signal_index`.
    pub fn receiver_count(&self, signal_index: usize) -> usize {
        self.data
            .outbound
            .borrow()
            .iter()
            .filter(|c| c.filter.matches(signal_index))
            .count()
    }

    /// Visit every inbound connection, most recently connected first.
    ///
    /// The visitor sees a snapshot; connecting or disconnecting from inside
    /// it does not affect the walk.
    pub fn for_each_inbound_connection<F>(&self, mut visit: F)
    where
        F: FnMut(&InboundConnection),
    {
        let snapshot = self.data.inbound.borrow().clone();
        for conn in snapshot.iter().rev() {
            visit(conn);
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Emission and Invocation
    // ═══════════════════════════════════════════════════════════════════

    /// Emit the signal at `signal_index`.
    ///
    /// Handlers run synchronously, in connection order. A handler
    /// disconnected by an earlier handler of the same emission is skipped.
    pub fn emit(&self, signal_index: usize, args: &[Value]) {
        let pending: Vec<(ConnectionId, Target)> = self
            .data
            .outbound
            .borrow()
            .iter()
            .filter(|c| c.filter.matches(signal_index))
            .map(|c| (c.id, c.target.clone()))
            .collect();
        if pending.is_empty() {
            return;
        }

        let emission = Emission {
            sender: self.data.id,
            signal_index,
            args,
        };
        for (id, target) in pending {
            let still_connected = self.data.outbound.borrow().iter().any(|c| c.id == id);
            if still_connected {
                deliver(&target, &emission);
            }
        }
    }

    /// Emit the signal named by `signature`.
    pub fn emit_signal(&self, signature: &str, args: &[Value]) -> Result<(), MetaError> {
        let index = self.signal_index(signature)?;
        self.emit(index, args);
        Ok(())
    }

    /// Invoke the method at `index`. Invoking a signal emits it.
    pub fn invoke_method(&self, index: usize, args: &[Value]) -> Result<(), MetaError> {
        let meta = Rc::clone(&self.data.meta);
        let method = meta
            .method_at(index)
            .ok_or_else(|| invalid_method(&meta, index))?;
        if method.is_signal() {
            self.emit(index, args);
        } else {
            method.invoke(self, args);
        }
        Ok(())
    }

    fn signal_index(&self, signature: &str) -> Result<usize, MetaError> {
        self.data
            .meta
            .index_of_signal(signature)
            .ok_or_else(|| MetaError::UnknownSignal {
                class: self.class_name().to_string(),
                signature: signature.to_string(),
            })
    }

    fn method_index(&self, signature: &str) -> Result<usize, MetaError> {
        self.data
            .meta
            .index_of_method(signature)
            .ok_or_else(|| MetaError::UnknownMethod {
                class: self.class_name().to_string(),
                signature: signature.to_string(),
            })
    }
}

impl PropertyHost for Object {
    fn meta_object(&self) -> &Rc<MetaObject> {
        Object::meta_object(self)
    }

    fn field(&self, name: &str) -> Value {
        self.data
            .fields
            .borrow()
            .get(name)
            .cloned()
            .unwrap_or_default()
    }

    fn set_field(&self, name: &str, value: Value) -> bool {
        store_field(&self.data.fields, name, value)
    }

    fn notify(&self, signal_index: usize) {
        self.emit(signal_index, &[]);
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({})", display_string(self))
    }
}

impl Drop for ObjectData {
    fn drop(&mut self) {
        let outbound = std::mem::take(self.outbound.get_mut());
        let destroy_hooks = std::mem::take(self.destroy_hooks.get_mut());
        for (_, hook) in &destroy_hooks {
            hook(self.id);
        }

        if let Some(destroyed) = self.meta.index_of_signal(DESTROYED_SIGNATURE) {
            let emission = Emission {
                sender: self.id,
                signal_index: destroyed,
                args: &[],
            };
            for conn in outbound.iter().filter(|c| c.filter.matches(destroyed)) {
                deliver(&conn.target, &emission);
            }
        }

        // Receivers must not list a sender that no longer exists
        for conn in &outbound {
            if let Target::Slot { receiver, .. } = &conn.target {
                if let Some(receiver) = receiver.upgrade() {
                    receiver.data.inbound.borrow_mut().retain(|c| c.id != conn.id);
                }
            }
        }
        for conn in self.inbound.get_mut().drain(..) {
            if let Some(sender) = conn.sender.upgrade() {
                sender.data.outbound.borrow_mut().retain(|c| c.id != conn.id);
            }
        }

        trace!(id = %self.id, class = self.meta.class_name(), "object destroyed");
        probe::report(&ProbeEvent::Destroyed(self.id));
    }
}

fn deliver(target: &Target, emission: &Emission<'_>) {
    match target {
        Target::Handler(handler) => handler(emission),
        Target::Slot {
            receiver,
            slot_index,
        } => {
            let Some(receiver) = receiver.upgrade() else {
                return;
            };
            if let Err(e) = receiver.invoke_method(*slot_index, emission.args) {
                debug!(error = %e, "slot invocation failed");
            }
        }
    }
}

fn check_signal(meta: &MetaObject, index: usize) -> Result<(), MetaError> {
    let method = meta
        .method_at(index)
        .ok_or_else(|| invalid_method(meta, index))?;
    if method.is_signal() {
        Ok(())
    } else {
        Err(MetaError::NotASignal {
            class: meta.class_name().to_string(),
            index,
        })
    }
}

fn check_method(meta: &MetaObject, index: usize) -> Result<(), MetaError> {
    meta.method_at(index)
        .map(|_| ())
        .ok_or_else(|| invalid_method(meta, index))
}

fn invalid_method(meta: &MetaObject, index: usize) -> MetaError {
    MetaError::InvalidMethodIndex {
        class: meta.class_name().to_string(),
        index,
        count: meta.method_count(),
    }
}

/// Store a field value; an unset field compares equal to `Value::Invalid`.
pub(crate) fn store_field(
    fields: &RefCell<IndexMap<String, Value>>,
    name: &str,
    value: Value,
) -> bool {
    let mut fields = fields.borrow_mut();
    let unchanged = fields
        .get(name)
        .map_or(value.is_invalid(), |current| *current == value);
    if unchanged {
        return false;
    }
    fields.insert(name.to_string(), value);
    true
}

/// Human-readable label: `name (Class)`, or `0x<id> (Class)` when unnamed.
pub fn display_string(object: &Object) -> String {
    let name = object.object_name();
    if name.is_empty() {
        format!("{} ({})", object.id(), object.class_name())
    } else {
        format!("{} ({})", name, object.class_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::{MetaObjectBuilder, PropertyBuilder};
    use std::cell::Cell;

    fn button() -> Rc<MetaObject> {
        MetaObjectBuilder::new("Button")
            .signal("clicked()")
            .slot("click()", |obj, _| {
                let _ = obj.emit_signal("clicked()", &[]);
            })
            .property(PropertyBuilder::new("text", "String").writable())
            .build()
            .unwrap()
    }

    #[test]
    fn test_weak_handle_outlives_object() {
        let obj = Object::new(button());
        let weak = obj.downgrade();
        assert!(weak.is_alive());
        assert!(weak.upgrade().unwrap().ptr_eq(&obj));

        drop(obj);
        assert!(!weak.is_alive());
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_object_name_roundtrip() {
        let obj = Object::with_name(button(), "ok");
        assert_eq!(obj.object_name(), "ok");
        assert_eq!(display_string(&obj), "ok (Button)");
        assert!(!obj.set_object_name("ok"));
    }

    #[test]
    fn test_unnamed_display_uses_id() {
        let obj = Object::new(button());
        assert_eq!(display_string(&obj), format!("{} (Button)", obj.id()));
    }

    #[test]
    fn test_connect_rejects_non_signal() {
        let obj = Object::new(button());
        let click = obj.meta_object().index_of_method("click()").unwrap();
        assert!(matches!(
            obj.connect(click, |_| {}),
            Err(MetaError::NotASignal { .. })
        ));
        assert!(matches!(
            obj.connect(999, |_| {}),
            Err(MetaError::InvalidMethodIndex { .. })
        ));
    }

    #[test]
    fn test_disconnect_during_emission_skips_handler() {
        let obj = Object::new(button());
        let hits = Rc::new(Cell::new(0));
        let second: Rc<Cell<Option<ConnectionId>>> = Rc::new(Cell::new(None));

        let weak = obj.downgrade();
        let second_id = Rc::clone(&second);
        obj.connect_signal("clicked()", move |_| {
            if let (Some(obj), Some(id)) = (weak.upgrade(), second_id.get()) {
                obj.disconnect(id);
            }
        })
        .unwrap();
        let counter = Rc::clone(&hits);
        let id = obj
            .connect_signal("clicked()", move |_| counter.set(counter.get() + 1))
            .unwrap();
        second.set(Some(id));

        obj.emit_signal("clicked()", &[]).unwrap();
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn test_slot_connection_invokes_receiver() {
        let sender = Object::new(button());
        let receiver = Object::new(button());
        let clicks = Rc::new(Cell::new(0));
        let counter = Rc::clone(&clicks);
        receiver
            .connect_signal("clicked()", move |_| counter.set(counter.get() + 1))
            .unwrap();

        Object::connect_by_signature(&sender, "clicked()", &receiver, "click()").unwrap();
        sender.emit_signal("clicked()", &[]).unwrap();
        assert_eq!(clicks.get(), 1);
    }

    #[test]
    fn test_destroyed_handler_runs_on_drop() {
        let obj = Object::new(button());
        let fired = Rc::new(Cell::new(false));
        let flag = Rc::clone(&fired);
        obj.connect_signal(DESTROYED_SIGNATURE, move |_| flag.set(true))
            .unwrap();
        drop(obj);
        assert!(fired.get());
    }

    #[test]
    fn test_destroyed_sender_pruned_from_inbound() {
        let sender = Object::new(button());
        let receiver = Object::new(button());
        Object::connect_by_signature(&sender, "clicked()", &receiver, "click()").unwrap();
        assert_eq!(receiver.data.inbound.borrow().len(), 1);

        drop(sender);
        assert!(receiver.data.inbound.borrow().is_empty());
    }

    #[test]
    fn test_store_field_treats_unset_as_invalid() {
        let fields = RefCell::new(IndexMap::new());
        assert!(!store_field(&fields, "x", Value::Invalid));
        assert!(store_field(&fields, "x", Value::I64(1)));
        assert!(!store_field(&fields, "x", Value::I64(1)));
    }

    #[test]
    fn test_destroy_hook_runs_without_destroyed_signal() {
        let plain = MetaObjectBuilder::gadget("Plain").build().unwrap();
        assert!(plain.index_of_signal(DESTROYED_SIGNATURE).is_none());

        let obj = Object::new(plain);
        let expected = obj.id();
        let seen = Rc::new(Cell::new(None));
        let sink = Rc::clone(&seen);
        obj.on_destroyed(move |id| sink.set(Some(id)));

        drop(obj);
        assert_eq!(seen.get(), Some(expected));
    }

    #[test]
    fn test_disconnect_removes_destroy_hook() {
        let obj = Object::new(button());
        let fired = Rc::new(Cell::new(false));
        let flag = Rc::clone(&fired);
        let id = obj.on_destroyed(move |_| flag.set(true));

        assert!(obj.disconnect(id));
        assert!(!obj.disconnect(id));
        assert_eq!(obj.destroy_hook_count(), 0);
        drop(obj);
        assert!(!fired.get());
    }
}
