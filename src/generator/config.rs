//! Generation limits.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Limits that bound sequence generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenConfig {
    /// Largest sequence the strategy will draw. Sizes are drawn from `0..=max_size`.
    pub max_size: usize,
    /// How many command+argument draws a single position may reject on its
    /// precondition before generation fails.
    pub max_precondition_retries: u32,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            max_size: 20,
            max_precondition_retries: 100,
        }
    }
}

impl GenConfig {
    /// Validate the config.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_precondition_retries == 0 {
            return Err(ConfigError::InvalidGenConfig {
                reason: "max_precondition_retries must be > 0".to_string(),
            });
        }
        if u32::try_from(self.max_size).is_err() {
            return Err(ConfigError::InvalidGenConfig {
                reason: "max_size must fit in u32".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        GenConfig::default().validate().unwrap();
    }

    #[test]
    fn zero_retries_rejected() {
        let c = GenConfig {
            max_precondition_retries: 0,
            ..GenConfig::default()
        };
        assert!(c.validate().is_err());
    }

    #[test]
    fn zero_size_is_allowed() {
        let c = GenConfig {
            max_size: 0,
            ..GenConfig::default()
        };
        c.validate().unwrap();
    }
}
