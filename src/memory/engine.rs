//! Memory engine: the context object callers hold
//!
//! Bundles one [`AllocationTable`] behind a single mutex with a broadcast
//! channel of [`MemoryEvent`]s and optional metrics. The mutex covers the
//! live-block list, the identity map and the statistics together, so every
//! mutation is observed atomically. Events are published while the lock is
//! held, so subscribers see them in mutation order.
//!
//! # Examples
//!
//! ```rust
//! use memsim::memory::{DataType, MemoryEngine};
//!
//! let engine = MemoryEngine::with_defaults().unwrap();
//! let mut events = engine.subscribe();
//!
//! let block = engine.allocate("hi", DataType::String).unwrap();
//! assert_eq!(block.size(), 3);
//! assert_eq!(engine.bytes(block.id()).unwrap(), vec![0x68, 0x69, 0x00]);
//! assert!(events.try_recv().is_ok());
//!
//! engine.deallocate(block.id());
//! assert_eq!(engine.statistics().current_allocations, 0);
//! ```

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use super::address::AddressSpace;
use super::block::{BlockId, MemoryBlock};
use super::data_type::DataType;
use super::events::MemoryEvent;
use super::stats::MemoryStatistics;
use super::table::AllocationTable;
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use crate::metrics::EngineMetrics;

pub struct MemoryEngine {
    table: Mutex<AllocationTable>,
    events: broadcast::Sender<MemoryEvent>,
    metrics: Option<EngineMetrics>,
    config: EngineConfig,
}

impl MemoryEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;

        let addresses = AddressSpace::new(config.base_address, config.alignment)?;
        let (events, _) = broadcast::channel(config.event_capacity);
        let metrics = if config.metrics_enabled {
            Some(EngineMetrics::new()?)
        } else {
            None
        };

        info!(
            base_address = addresses.base(),
            alignment = config.alignment,
            metrics = config.metrics_enabled,
            "Memory engine initialized"
        );

        Ok(Self {
            table: Mutex::new(AllocationTable::new(addresses)),
            events,
            metrics,
            config,
        })
    }

    pub fn with_defaults() -> Result<Self> {
        Self::new(EngineConfig::default())
    }

    /// Validate `text` as `data_type`, encode it and store the block.
    ///
    /// Fails with [`Error::InvalidInput`] before anything is allocated.
    pub fn allocate(&self, text: &str, data_type: DataType) -> Result<MemoryBlock> {
        let mut table = self.table.lock();

        let block = match table.allocate(text, data_type) {
            Ok(block) => block,
            Err(e) => {
                if let Error::InvalidInput { reason, .. } = &e {
                    warn!(data_type = %data_type, reason = %reason, "Rejected allocation");
                    if let Some(metrics) = &self.metrics {
                        metrics.record_rejection(data_type);
                    }
                } else {
                    error!(data_type = %data_type, error = %e, "Allocation failed");
                    if let Some(metrics) = &self.metrics {
                        metrics.record_failure(data_type);
                    }
                }
                return Err(e);
            }
        };

        if let Some(metrics) = &self.metrics {
            metrics.record_allocation(data_type, table.statistics());
        }
        self.publish(MemoryEvent::Allocated {
            block: block.clone(),
        });

        Ok(block)
    }

    /// Release a block. Returns `false` if `id` was not live.
    pub fn deallocate(&self, id: BlockId) -> bool {
        let mut table = self.table.lock();

        let Some(block) = table.deallocate(id) else {
            return false;
        };

        if let Some(metrics) = &self.metrics {
            metrics.record_deallocations(1, table.statistics());
        }
        self.publish(MemoryEvent::Deallocated { block });
        true
    }

    /// Release every live block. Totals, peak and history are kept.
    pub fn deallocate_all(&self) -> usize {
        let mut table = self.table.lock();
        let released = table.deallocate_all();

        if let Some(metrics) = &self.metrics {
            metrics.record_deallocations(released, table.statistics());
        }
        info!(released, "Deallocated all blocks");
        self.publish(MemoryEvent::Cleared { released });
        released
    }

    /// Live blocks in allocation order.
    pub fn blocks(&self) -> Vec<MemoryBlock> {
        self.table.lock().blocks().to_vec()
    }

    pub fn get(&self, id: BlockId) -> Option<MemoryBlock> {
        self.table.lock().get(id).cloned()
    }

    /// Copy of a live block's backing buffer.
    pub fn bytes(&self, id: BlockId) -> Option<Vec<u8>> {
        self.table.lock().buffer(id).map(<[u8]>::to_vec)
    }

    pub fn statistics(&self) -> MemoryStatistics {
        self.table.lock().statistics().clone()
    }

    pub fn len(&self) -> usize {
        self.table.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.lock().is_empty()
    }

    /// Receive an event after every allocate, deallocate and deallocate-all.
    pub fn subscribe(&self) -> broadcast::Receiver<MemoryEvent> {
        self.events.subscribe()
    }

    /// Prometheus text for this engine, if metrics are enabled.
    pub fn export_metrics(&self) -> Option<String> {
        self.metrics.as_ref().map(EngineMetrics::export)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn publish(&self, event: MemoryEvent) {
        // No subscribers is not an error
        let _ = self.events.send(event);
    }
}

impl std::fmt::Debug for MemoryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryEngine")
            .field("config", &self.config)
            .finish()
    }
}
