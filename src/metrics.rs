//! Prometheus metrics for an engine instance
//!
//! Each engine owns its own registry so that several engines in one process
//! (tests, multiple sessions) never share gauges.
//!
//! Metrics:
//! - `memsim_allocations_total{data_type}`
//! - `memsim_rejected_total{data_type}`
//! - `memsim_failed_total{data_type}`
//! - `memsim_deallocations_total`
//! - `memsim_live_blocks`, `memsim_live_bytes`, `memsim_peak_bytes`

use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use tracing::error;

use crate::error::{Error, Result};
use crate::memory::{DataType, MemoryStatistics};

pub struct EngineMetrics {
    registry: Registry,
    allocations: IntCounterVec,
    rejected: IntCounterVec,
    failed: IntCounterVec,
    deallocations: IntCounter,
    live_blocks: IntGauge,
    live_bytes: IntGauge,
    peak_bytes: IntGauge,
}

impl EngineMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let allocations = IntCounterVec::new(
            Opts::new("memsim_allocations_total", "Successful allocations"),
            &["data_type"],
        )
        .map_err(metrics_error)?;
        let rejected = IntCounterVec::new(
            Opts::new("memsim_rejected_total", "Allocations rejected as invalid input"),
            &["data_type"],
        )
        .map_err(metrics_error)?;
        let failed = IntCounterVec::new(
            Opts::new("memsim_failed_total", "Allocations that failed for reasons other than input"),
            &["data_type"],
        )
        .map_err(metrics_error)?;
        let deallocations = IntCounter::new("memsim_deallocations_total", "Blocks released")
            .map_err(metrics_error)?;
        let live_blocks =
            IntGauge::new("memsim_live_blocks", "Live blocks").map_err(metrics_error)?;
        let live_bytes =
            IntGauge::new("memsim_live_bytes", "Bytes held by live blocks").map_err(metrics_error)?;
        let peak_bytes =
            IntGauge::new("memsim_peak_bytes", "Peak live bytes").map_err(metrics_error)?;

        registry
            .register(Box::new(allocations.clone()))
            .map_err(metrics_error)?;
        registry
            .register(Box::new(rejected.clone()))
            .map_err(metrics_error)?;
        registry
            .register(Box::new(failed.clone()))
            .map_err(metrics_error)?;
        registry
            .register(Box::new(deallocations.clone()))
            .map_err(metrics_error)?;
        registry
            .register(Box::new(live_blocks.clone()))
            .map_err(metrics_error)?;
        registry
            .register(Box::new(live_bytes.clone()))
            .map_err(metrics_error)?;
        registry
            .register(Box::new(peak_bytes.clone()))
            .map_err(metrics_error)?;

        Ok(Self {
            registry,
            allocations,
            rejected,
            failed,
            deallocations,
            live_blocks,
            live_bytes,
            peak_bytes,
        })
    }

    pub fn record_allocation(&self, data_type: DataType, stats: &MemoryStatistics) {
        self.allocations
            .with_label_values(&[data_type.as_str()])
            .inc();
        self.sync(stats);
    }

    pub fn record_rejection(&self, data_type: DataType) {
        self.rejected.with_label_values(&[data_type.as_str()]).inc();
    }

    pub fn record_failure(&self, data_type: DataType) {
        self.failed.with_label_values(&[data_type.as_str()]).inc();
    }

    pub fn record_deallocations(&self, count: usize, stats: &MemoryStatistics) {
        self.deallocations.inc_by(count as u64);
        self.sync(stats);
    }

    fn sync(&self, stats: &MemoryStatistics) {
        self.live_blocks.set(clamp_i64(stats.current_allocations));
        self.live_bytes.set(clamp_i64(stats.current_bytes_allocated));
        self.peak_bytes.set(clamp_i64(stats.peak_bytes_allocated));
    }

    /// Render every metric in Prometheus text format.
    pub fn export(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();

        let mut buffer = Vec::new();
        if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
            error!(error = %e, "Failed to encode metrics");
            return String::from("# Error encoding metrics\n");
        }

        String::from_utf8(buffer).unwrap_or_else(|_| String::from("# Error converting metrics\n"))
    }
}

impl std::fmt::Debug for EngineMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineMetrics").finish()
    }
}

fn clamp_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn metrics_error(e: prometheus::Error) -> Error {
    Error::Metrics(e.to_string())
}
