// memsim - Memory allocation simulator
// Typed values encoded into raw byte buffers under synthetic addresses

#![warn(rust_2018_idioms)]

//! Accepts typed user input (string, integer, float or array literal),
//! lays it out as the bytes it would occupy in raw memory, tracks the live
//! buffer under a synthetic address, and keeps allocation statistics.
//!
//! # Quick Start
//!
//! ```rust
//! use memsim::{DataType, MemoryEngine};
//!
//! let engine = MemoryEngine::with_defaults().unwrap();
//!
//! let block = engine.allocate(" -1 ", DataType::Integer).unwrap();
//! assert_eq!(block.content(), "-1");
//! assert_eq!(block.bytes_representation(), vec![0xFF; 8]);
//!
//! assert!(engine.allocate("1,,3", DataType::Array).is_err());
//!
//! engine.deallocate_all();
//! assert_eq!(engine.statistics().total_allocations, 1);
//! ```
//!
//! Presentation (GUI, CLI, web) is left to the host, which drives the
//! engine and listens to [`MemoryEngine::subscribe`] for redraws.

pub mod config;
pub mod logging;
pub mod memory;
pub mod metrics;

// Re-exports for convenience
pub use config::EngineConfig;
pub use memory::{BlockId, DataType, MemoryBlock, MemoryEngine, MemoryEvent, MemoryStatistics};

/// memsim error types
pub mod error {
    use crate::memory::DataType;
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum Error {
        /// Text does not validate for its declared type. Nothing was allocated.
        #[error("Invalid {data_type} input: {reason}")]
        InvalidInput { data_type: DataType, reason: String },

        #[error("Invalid argument: {0}")]
        InvalidArgument(String),

        #[error("Configuration error: {0}")]
        Config(String),

        #[error("Serialization error: {0}")]
        Serialization(String),

        #[error("Metrics error: {0}")]
        Metrics(String),

        #[error("Internal error: {0}")]
        Internal(String),
    }

    impl Error {
        pub fn is_invalid_input(&self) -> bool {
            matches!(self, Error::InvalidInput { .. })
        }
    }

    pub type Result<T> = std::result::Result<T, Error>;
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_format() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_invalid_input_message() {
        let err = error::Error::InvalidInput {
            data_type: DataType::Float,
            reason: "not a 64-bit float".to_string(),
        };
        assert!(err.is_invalid_input());
        assert_eq!(err.to_string(), "Invalid float input: not a 64-bit float");
    }
}
