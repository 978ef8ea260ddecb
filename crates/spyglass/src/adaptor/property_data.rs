//! Point-in-time property snapshots

use bitflags::bitflags;

use crate::meta::PropertyFlags;
use crate::value::Value;

bitflags! {
    /// What the inspector may do with a property right now.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct AccessFlags: u8 {
        /// Value can be read
        const READABLE   = 1 << 0;
        /// Value can be written
        const WRITABLE   = 1 << 1;
        /// Value can be reset
        const RESETTABLE = 1 << 2;
    }
}

/// One property of a bound object, as read at a single moment.
///
/// Built fresh on every query; the adaptor never caches it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PropertyData {
    /// Property name
    pub name: String,

    /// Declared type name
    pub type_name: String,

    /// Class in the inheritance chain that declares the property
    pub class_name: String,

    /// Current value, `Value::Invalid` if it could not be read
    pub value: Value,

    /// Capability flags evaluated against the bound instance
    pub property_flags: PropertyFlags,

    /// What the inspector may do with the property
    pub access_flags: AccessFlags,

    /// Revision the property was introduced in
    pub revision: u32,

    /// Signature of the change-notification signal, if any
    pub notify_signal: Option<String>,
}

impl PropertyData {
    /// Check if the property can be written
    pub fn is_writable(&self) -> bool {
        self.access_flags.contains(AccessFlags::WRITABLE)
    }

    /// Check if the property can be reset
    pub fn is_resettable(&self) -> bool {
        self.access_flags.contains(AccessFlags::RESETTABLE)
    }
}
