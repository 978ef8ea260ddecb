//! Configuration for adaptors and connection models

/// Notification policy for a property adaptor.
///
/// Notifications raised while the adaptor reads a property are always
/// dropped; only the write side is configurable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdaptorConfig {
    /// Also drop change notifications raised by the adaptor's own writes and
    /// resets, and synthesize exactly one notification afterwards instead
    pub suppress_during_write: bool,
}

impl AdaptorConfig {
    /// Create a config with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config that also guards writes and resets.
    pub fn with_write_suppression() -> Self {
        Self {
            suppress_during_write: true,
            ..Default::default()
        }
    }
}

/// Display labels for the inbound connections table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionsModelConfig {
    /// Shown for a sender that no longer exists
    pub destroyed_label: String,

    /// Shown when the signal index cannot be resolved
    pub unknown_label: String,
}

impl Default for ConnectionsModelConfig {
    fn default() -> Self {
        Self {
            destroyed_label: "<destroyed>".to_string(),
            unknown_label: "<unknown>".to_string(),
        }
    }
}

impl ConnectionsModelConfig {
    /// Create a config with default labels.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a config with custom sentinel labels.
    pub fn with_labels(destroyed: impl Into<String>, unknown: impl Into<String>) -> Self {
        Self {
            destroyed_label: destroyed.into(),
            unknown_label: unknown.into(),
        }
    }
}
