//! Change notifications published after every mutation

use serde::Serialize;

use super::block::MemoryBlock;
use crate::error::{Error, Result};

/// What changed in the engine.
///
/// Published in mutation order. Subscribers that want the new totals read
/// [`MemoryEngine::statistics`](super::engine::MemoryEngine::statistics).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MemoryEvent {
    Allocated { block: MemoryBlock },
    Deallocated { block: MemoryBlock },
    /// Every live block was released at once.
    Cleared { released: usize },
}

impl MemoryEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            MemoryEvent::Allocated { .. } => "allocated",
            MemoryEvent::Deallocated { .. } => "deallocated",
            MemoryEvent::Cleared { .. } => "cleared",
        }
    }

    /// JSON form for hosts that forward events to a web front-end.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| Error::Serialization(format!("Failed to serialize event: {}", e)))
    }
}
