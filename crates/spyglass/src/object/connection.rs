//! Connection bookkeeping between objects

use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{ObjectId, WeakObject};
use crate::value::Value;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one connection, used to disconnect it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub(crate) fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A signal being delivered to a handler.
#[derive(Debug)]
pub struct Emission<'a> {
    /// Object that emitted
    pub sender: ObjectId,
    /// Global method index of the signal on the sender's type
    pub signal_index: usize,
    /// Signal arguments
    pub args: &'a [Value],
}

/// Closure attached to a signal
pub type SignalHandler = Rc<dyn Fn(&Emission<'_>)>;

/// Which signals a connection listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SignalFilter {
    Index(usize),
    Any,
}

impl SignalFilter {
    pub(crate) fn matches(self, signal_index: usize) -> bool {
        match self {
            SignalFilter::Index(i) => i == signal_index,
            SignalFilter::Any => true,
        }
    }

    pub(crate) fn index(self) -> Option<usize> {
        match self {
            SignalFilter::Index(i) => Some(i),
            SignalFilter::Any => None,
        }
    }
}

#[derive(Clone)]
pub(crate) enum Target {
    Handler(SignalHandler),
    Slot {
        receiver: WeakObject,
        slot_index: usize,
    },
}

/// A connection as owned by its sender.
#[derive(Clone)]
pub(crate) struct OutboundConnection {
    pub(crate) id: ConnectionId,
    pub(crate) filter: SignalFilter,
    pub(crate) target: Target,
}

/// A connection as recorded on its receiver.
///
/// Frozen once handed out: it does not track later disconnection.
#[derive(Clone)]
pub struct InboundConnection {
    /// Connection identity
    pub id: ConnectionId,
    /// Object whose signal triggers the slot
    pub sender: WeakObject,
    /// Signal index on the sender's type, `None` when every signal is relayed
    pub signal_index: Option<usize>,
    /// Slot index on the receiver's type
    pub slot_index: usize,
}

impl fmt::Debug for InboundConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InboundConnection")
            .field("id", &self.id)
            .field("sender", &self.sender.id())
            .field("signal_index", &self.signal_index)
            .field("slot_index", &self.slot_index)
            .finish()
    }
}
