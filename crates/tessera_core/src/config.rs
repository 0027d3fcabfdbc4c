//! # World Configuration
//!
//! Initial container sizes for a [`World`](crate::World). Every field is
//! optional when loaded from TOML:
//!
//! ```toml
//! entity_capacity = 1024
//! system_capacity = 16
//! ```

use serde::Deserialize;

use crate::error::{EcsError, EcsResult};

/// Capacity used for every container unless configured otherwise.
pub const DEFAULT_CAPACITY: usize = 100;

/// World configuration.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    /// Initial number of entity slots. Must be greater than zero.
    pub entity_capacity: usize,
    /// Initial room for systems.
    pub system_capacity: usize,
    /// Initial room for listeners.
    pub listener_capacity: usize,
    /// Initial room for queued signals.
    pub signal_capacity: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            entity_capacity: DEFAULT_CAPACITY,
            system_capacity: DEFAULT_CAPACITY,
            listener_capacity: DEFAULT_CAPACITY,
            signal_capacity: DEFAULT_CAPACITY,
        }
    }
}

impl WorldConfig {
    /// Parses and validates a configuration from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if the text is not valid TOML for
    /// this structure or fails [`WorldConfig::validate`].
    pub fn from_toml_str(text: &str) -> EcsResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| EcsError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`EcsError::InvalidConfig`] if `entity_capacity` is zero.
    pub fn validate(&self) -> EcsResult<()> {
        if self.entity_capacity == 0 {
            return Err(EcsError::InvalidConfig(
                "entity_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
