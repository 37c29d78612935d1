// SPDX-License-Identifier: GPL-3.0-only

//! Session and stabilizer configuration

use crate::constants::stabilizer::DEFAULT_MISS_THRESHOLD;
use crate::errors::{ScanError, ScanResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tuning for the result stabilizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StabilizerConfig {
    /// Consecutive empty decode results required before an active
    /// detection is cleared. Appearance is never debounced.
    pub miss_threshold: u32,
}

impl Default for StabilizerConfig {
    fn default() -> Self {
        Self {
            miss_threshold: DEFAULT_MISS_THRESHOLD,
        }
    }
}

impl StabilizerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> ScanResult<()> {
        if self.miss_threshold == 0 {
            return Err(ScanError::Config(
                "miss_threshold must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration for a scan session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Result stabilizer tuning
    #[serde(default)]
    pub stabilizer: StabilizerConfig,
}

impl SessionConfig {
    /// Load a session configuration from a JSON file
    pub fn load(path: &Path) -> ScanResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ScanError::Config(format!("{}: {}", path.display(), e)))?;
        let config: SessionConfig = serde_json::from_str(&contents)
            .map_err(|e| ScanError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> ScanResult<()> {
        self.stabilizer.validate()
    }
}
