//! Engine configuration
//!
//! Defaults suit interactive use. Hosts can override them from the
//! environment (`MEMSIM_*`) or from a TOML document:
//!
//! ```toml
//! base_address = 4096
//! alignment = 16
//! event_capacity = 1024
//! metrics_enabled = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Largest accepted `event_capacity`.
pub const MAX_EVENT_CAPACITY: usize = 1 << 16;

/// Largest accepted `alignment`.
pub const MAX_ALIGNMENT: u64 = 4096;

/// Largest accepted `base_address`; the upper half stays free for blocks.
pub const MAX_BASE_ADDRESS: u64 = u64::MAX / 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// First synthetic address handed out
    pub base_address: u64,
    /// Address cursor alignment in bytes (power of two)
    pub alignment: u64,
    /// Buffered change events per subscriber before it starts lagging
    pub event_capacity: usize,
    /// Keep a Prometheus registry for this engine
    pub metrics_enabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_address: 0x1000,
            alignment: 8,
            event_capacity: 256,
            metrics_enabled: true,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by any `MEMSIM_*` variables that are set.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(raw) = env_var("MEMSIM_BASE_ADDRESS") {
            config.base_address = parse_address(&raw)?;
        }
        if let Some(raw) = env_var("MEMSIM_ALIGNMENT") {
            config.alignment = raw
                .parse()
                .map_err(|e| Error::Config(format!("MEMSIM_ALIGNMENT: {}", e)))?;
        }
        if let Some(raw) = env_var("MEMSIM_EVENT_CAPACITY") {
            config.event_capacity = raw
                .parse()
                .map_err(|e| Error::Config(format!("MEMSIM_EVENT_CAPACITY: {}", e)))?;
        }
        if let Some(raw) = env_var("MEMSIM_METRICS") {
            config.metrics_enabled = raw
                .parse()
                .map_err(|e| Error::Config(format!("MEMSIM_METRICS: {}", e)))?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.alignment.is_power_of_two() {
            return Err(Error::Config(format!(
                "alignment must be a power of two, got {}",
                self.alignment
            )));
        }
        if self.alignment > MAX_ALIGNMENT {
            return Err(Error::Config(format!(
                "alignment must be at most {}, got {}",
                MAX_ALIGNMENT, self.alignment
            )));
        }
        if self.event_capacity == 0 {
            return Err(Error::Config("event_capacity must be at least 1".to_string()));
        }
        if self.event_capacity > MAX_EVENT_CAPACITY {
            return Err(Error::Config(format!(
                "event_capacity must be at most {}, got {}",
                MAX_EVENT_CAPACITY, self.event_capacity
            )));
        }
        if self.base_address > MAX_BASE_ADDRESS {
            return Err(Error::Config(format!(
                "base_address must be at most {:#x}, got {:#x}",
                MAX_BASE_ADDRESS, self.base_address
            )));
        }
        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Decimal, or hex with a `0x` prefix.
fn parse_address(raw: &str) -> Result<u64> {
    let raw = raw.trim();
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => raw.parse(),
    };
    parsed.map_err(|e| Error::Config(format!("MEMSIM_BASE_ADDRESS: {}", e)))
}
