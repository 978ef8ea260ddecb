//! # Spyglass
//!
//! Live object introspection for an in-process object runtime.
//!
//! Spyglass lets an inspector look inside running objects without the
//! objects knowing about it. It has two views:
//!
//! - **Property adaptor** ([`adaptor`]): binds to one reflected instance and
//!   exposes its properties as a uniform list that can be read, written and
//!   reset, with push notifications when values change.
//! - **Inbound connections** ([`inbound`]): a three-column table of every
//!   signal/slot connection that targets an object.
//!
//! Both sit on a small single-threaded object runtime ([`object`], [`meta`])
//! with runtime type metadata, signals, and weak handles. Inspection never
//! keeps a target alive.
//!
//! ## Example
//!
//! ```
//! use spyglass::{
//!     MetaObjectBuilder, MetaPropertyAdaptor, Object, ObjectInstance, PropertyAdaptor,
//!     PropertyBuilder, Value,
//! };
//!
//! let meta = MetaObjectBuilder::new("Slider")
//!     .signal("valueChanged()")
//!     .property(
//!         PropertyBuilder::new("value", "i64")
//!             .writable()
//!             .notify("valueChanged()"),
//!     )
//!     .build()
//!     .unwrap();
//! let slider = Object::with_name(meta, "volume");
//!
//! let adaptor = MetaPropertyAdaptor::bound_to(ObjectInstance::from_object(&slider));
//! let value = slider.meta_object().index_of_property("value").unwrap();
//! adaptor.write_property(value, Value::from(11i64)).unwrap();
//!
//! let data = adaptor.property_data(value).unwrap();
//! assert_eq!(data.class_name, "Slider");
//! assert_eq!(data.value, Value::from(11i64));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adaptor;
pub mod config;
pub mod error;
pub mod inbound;
pub mod instance;
pub mod meta;
pub mod notify;
pub mod object;
pub mod probe;
pub mod value;

// Re-export main types
pub use adaptor::{AccessFlags, AdaptorEvent, MetaPropertyAdaptor, PropertyAdaptor, PropertyData};
pub use config::{AdaptorConfig, ConnectionsModelConfig};
pub use error::{InspectError, MetaError, Result};
pub use inbound::{Column, InboundConnectionsModel, ModelEvent};
pub use instance::{InstanceKind, ObjectInstance};
pub use meta::{
    MetaMethod, MetaObject, MetaObjectBuilder, MetaProperty, MethodKind, PropertyBuilder,
    PropertyFlags, PropertyHost, TypeMetadata,
};
pub use notify::{ListenerId, Listeners};
pub use object::{
    display_string, ConnectionId, Emission, Gadget, InboundConnection, Object, ObjectId,
    WeakObject,
};
pub use probe::{ProbeEvent, ProbeGuardSuspender};
pub use value::Value;

/// Spyglass version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }
}
