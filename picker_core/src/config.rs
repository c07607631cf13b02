use std::{fs, num::NonZeroUsize, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::PickerError;

/// Number of host interactions shown before the list is truncated.
pub const DEFAULT_MAX_ITEMS: usize = 50;

/// Picker settings loaded from JSON; missing keys keep their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PickerConfig {
    pub max_items: usize,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            max_items: DEFAULT_MAX_ITEMS,
        }
    }
}

impl PickerConfig {
    /// Loads overrides from a JSON file, falling back to defaults when no
    /// path is given.
    pub fn from_json_file(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                let raw = fs::read_to_string(path)
                    .with_context(|| format!("failed to read picker config: {}", path.display()))?;
                serde_json::from_str::<PickerConfig>(&raw).with_context(|| {
                    format!("failed to parse picker config json: {}", path.display())
                })?
            }
            None => PickerConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    pub fn validate(&self) -> Result<(), PickerError> {
        self.max_items_limit().map(|_| ())
    }

    pub fn max_items_limit(&self) -> Result<NonZeroUsize, PickerError> {
        NonZeroUsize::new(self.max_items).ok_or_else(|| {
            PickerError::InvalidConfig("max_items must be at least 1".to_string())
        })
    }
}
