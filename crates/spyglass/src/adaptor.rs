//! Property adaptor: a uniform property view over one reflected instance
//!
//! An adaptor binds to an [`ObjectInstance`], reports how many properties
//! it has, produces a fresh [`PropertyData`] snapshot per index, writes and
//! resets values, and pushes [`AdaptorEvent`]s when the bound object
//! reports a change.
//!
//! Reading a property may run arbitrary getter code on the target. A getter
//! that emits a change notification while it is being read would make a
//! display layer re-read the property, so notifications raised during a
//! read are dropped.

mod guard;
mod meta_adaptor;
mod property_data;

pub use meta_adaptor::MetaPropertyAdaptor;
pub use property_data::{AccessFlags, PropertyData};

use crate::error::Result;
use crate::instance::ObjectInstance;
use crate::notify::{ListenerId, Listeners};
use crate::value::Value;

/// Push notification from an adaptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdaptorEvent {
    /// Properties `first..=last` changed and should be re-read
    PropertyChanged {
        /// First changed property index
        first: usize,
        /// Last changed property index, inclusive
        last: usize,
    },
    /// The bound object was destroyed
    ObjectInvalidated,
}

/// Property view over a bound instance.
pub trait PropertyAdaptor {
    /// Currently bound handle
    fn object(&self) -> &ObjectInstance;

    /// Bind to `instance`, dropping every subscription of the previous
    /// binding first.
    fn set_object(&mut self, instance: ObjectInstance);

    /// Number of properties on the bound instance, 0 if unbound or gone.
    fn count(&self) -> usize;

    /// Snapshot of the property at `index`.
    ///
    /// # Errors
    ///
    /// `OutOfRange` if `index >= count()`.
    fn property_data(&self, index: usize) -> Result<PropertyData>;

    /// Write `value` to the property at `index`.
    ///
    /// # Errors
    ///
    /// `OutOfRange` if the instance is bound and `index >= count()`.
    fn write_property(&self, index: usize, value: Value) -> Result<()>;

    /// Reset the property at `index` to its default.
    ///
    /// # Errors
    ///
    /// `OutOfRange` if the instance is bound and `index >= count()`.
    fn reset_property(&self, index: usize) -> Result<()>;

    /// Listener list for this adaptor's events
    fn listeners(&self) -> &Listeners<AdaptorEvent>;

    /// Subscribe to change and invalidation events.
    fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&AdaptorEvent) + 'static,
        Self: Sized,
    {
        self.listeners().subscribe(listener)
    }

    /// Remove a listener. Returns `false` if it was not subscribed.
    fn unsubscribe(&self, id: ListenerId) -> bool {
        self.listeners().unsubscribe(id)
    }

    /// Snapshot every property, in index order.
    fn snapshot(&self) -> Vec<PropertyData> {
        (0..self.count())
            .filter_map(|index| self.property_data(index).ok())
            .collect()
    }
}
