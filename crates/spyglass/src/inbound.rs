//! Inbound connection table
//!
//! Lists every connection whose receiver is the inspected object as a
//! three-column table: the sending object, the signal, and the slot on the
//! inspected object. The row set is captured once per [`set_object`] call;
//! cell text is rendered on every query so a sender destroyed after the
//! snapshot shows up as destroyed.
//!
//! [`set_object`]: InboundConnectionsModel::set_object

use std::fmt;

use tracing::debug;

use crate::config::ConnectionsModelConfig;
use crate::meta::{MetaMethod, TypeMetadata};
use crate::notify::{ListenerId, Listeners};
use crate::object::{display_string, InboundConnection, Object, WeakObject};

/// Column of the inbound connection table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    /// Object whose signal triggers the slot
    Sender,
    /// Signal on the sender
    Signal,
    /// Slot on the inspected object
    Slot,
}

impl Column {
    /// All columns, in display order
    pub const ALL: [Column; 3] = [Column::Sender, Column::Signal, Column::Slot];

    /// Column at `index`, if any
    pub fn from_index(index: usize) -> Option<Column> {
        Self::ALL.get(index).copied()
    }

    /// Header text
    pub fn label(self) -> &'static str {
        match self {
            Column::Sender => "Sender",
            Column::Signal => "Signal",
            Column::Slot => "Slot",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Structure notifications from the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelEvent {
    /// The row set is about to be replaced
    AboutToReset,
    /// The row set was replaced
    Reset,
}

/// Table of the connections targeting one object.
#[derive(Default)]
pub struct InboundConnectionsModel {
    object: Option<WeakObject>,
    connections: Vec<InboundConnection>,
    config: ConnectionsModelConfig,
    listeners: Listeners<ModelEvent>,
}

impl InboundConnectionsModel {
    /// Create an empty table with default labels.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty table with custom labels.
    pub fn with_config(config: ConnectionsModelConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Label settings
    pub fn config(&self) -> &ConnectionsModelConfig {
        &self.config
    }

    /// Replace the rows with a snapshot of `object`'s inbound connections.
    ///
    /// `None` leaves the table empty. Rows appear in the runtime's
    /// enumeration order, most recently connected first.
    pub fn set_object(&mut self, object: Option<&Object>) {
        self.listeners.emit(&ModelEvent::AboutToReset);

        self.connections.clear();
        self.object = object.map(Object::downgrade);
        if let Some(object) = object {
            let connections = &mut self.connections;
            object.for_each_inbound_connection(|conn| connections.push(conn.clone()));
            debug!(
                object = %object.id(),
                rows = self.connections.len(),
                "captured inbound connections"
            );
        }

        self.listeners.emit(&ModelEvent::Reset);
    }

    /// Inspected object, if it is still alive
    pub fn object(&self) -> Option<Object> {
        self.object.as_ref().and_then(WeakObject::upgrade)
    }

    /// Number of captured connections
    pub fn row_count(&self) -> usize {
        self.connections.len()
    }

    /// Always three, even for an empty table.
    pub fn column_count(&self) -> usize {
        Column::ALL.len()
    }

    /// Header text for `section`
    pub fn header_data(&self, section: usize) -> Option<&'static str> {
        Column::from_index(section).map(Column::label)
    }

    /// Raw record at `row`
    pub fn connection(&self, row: usize) -> Option<&InboundConnection> {
        self.connections.get(row)
    }

    /// Display text for a cell.
    ///
    /// `None` when the row or column is out of range or the inspected
    /// object has been destroyed.
    pub fn data(&self, row: usize, column: usize) -> Option<String> {
        let receiver = self.object()?;
        let conn = self.connections.get(row)?;
        let column = Column::from_index(column)?;

        let text = match column {
            Column::Sender => match conn.sender.upgrade() {
                Some(sender) => display_string(&sender),
                None => self.config.destroyed_label.clone(),
            },
            Column::Signal => match conn.sender.upgrade() {
                None => self.config.destroyed_label.clone(),
                Some(sender) => conn
                    .signal_index
                    .and_then(|index| method_signature(&sender, index))
                    .unwrap_or_else(|| self.config.unknown_label.clone()),
            },
            Column::Slot => method_signature(&receiver, conn.slot_index)
                .unwrap_or_else(|| self.config.unknown_label.clone()),
        };
        Some(text)
    }

    /// Subscribe to reset notifications.
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&ModelEvent) + 'static,
    {
        self.listeners.subscribe(listener)
    }

    /// Remove a listener. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.listeners.unsubscribe(id)
    }
}

impl fmt::Debug for InboundConnectionsModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InboundConnectionsModel")
            .field("object", &self.object)
            .field("rows", &self.connections.len())
            .field("config", &self.config)
            .finish()
    }
}

fn method_signature(object: &Object, index: usize) -> Option<String> {
    object
        .meta_object()
        .method_at(index)
        .map(MetaMethod::signature)
        .map(str::to_string)
}
