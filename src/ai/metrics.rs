//! Pipeline Metrics Collection
//!
//! Centralized per-stage latency and outcome aggregation across pipeline
//! execution. Thread-safe so independent requests can share one collector.

use std::sync::RwLock;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::{Duration, Instant};

// =============================================================================
// Stage Outcomes
// =============================================================================

/// How a pipeline stage ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    /// Stage produced its output
    Ok,
    /// A toxicity gate stopped the pipeline after this stage
    Aborted,
    /// The stage surfaced an error
    Failed,
}

impl StageOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Aborted => "aborted",
            Self::Failed => "failed",
        }
    }
}

/// One recorded stage execution
#[derive(Debug, Clone)]
pub struct StageRecord {
    pub stage: String,
    pub latency_ms: u64,
    pub outcome: StageOutcome,
}

// =============================================================================
// Metrics Collector
// =============================================================================

/// Thread-safe metrics collector for pipeline execution.
///
/// Uses atomic counters for totals and an RwLock for the stage log.
pub struct PipelineMetrics {
    start_time: Instant,
    stages_run: AtomicU32,
    failures: AtomicU32,
    aborts: AtomicU32,
    total_latency_ms: AtomicU64,
    records: RwLock<Vec<StageRecord>>,
}

/// Summary statistics for pipeline execution
#[derive(Debug, Clone)]
pub struct MetricsSummary {
    pub total_duration_ms: u64,
    pub stages_run: u32,
    pub failures: u32,
    pub aborts: u32,
    pub avg_latency_ms: f64,
    pub records: Vec<StageRecord>,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            stages_run: AtomicU32::new(0),
            failures: AtomicU32::new(0),
            aborts: AtomicU32::new(0),
            total_latency_ms: AtomicU64::new(0),
            records: RwLock::new(Vec::new()),
        }
    }

    /// Record one stage execution
    pub fn record_stage(&self, stage: &str, latency: Duration, outcome: StageOutcome) {
        self.stages_run.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ms
            .fetch_add(latency.as_millis() as u64, Ordering::Relaxed);
        match outcome {
            StageOutcome::Failed => {
                self.failures.fetch_add(1, Ordering::Relaxed);
            }
            StageOutcome::Aborted => {
                self.aborts.fetch_add(1, Ordering::Relaxed);
            }
            StageOutcome::Ok => {}
        }

        let mut records = self.records.write().unwrap_or_else(|poisoned| {
            tracing::error!("Metrics records RwLock poisoned, recovering");
            poisoned.into_inner()
        });
        records.push(StageRecord {
            stage: stage.to_string(),
            latency_ms: latency.as_millis() as u64,
            outcome,
        });
    }

    /// Get current metrics snapshot
    pub fn summary(&self) -> MetricsSummary {
        let stages_run = self.stages_run.load(Ordering::Relaxed);
        let total_latency = self.total_latency_ms.load(Ordering::Relaxed);

        let avg_latency = if stages_run > 0 {
            total_latency as f64 / stages_run as f64
        } else {
            0.0
        };

        let records = self
            .records
            .read()
            .unwrap_or_else(|poisoned| {
                tracing::error!("Metrics records RwLock poisoned on read, recovering");
                poisoned.into_inner()
            })
            .clone();

        MetricsSummary {
            total_duration_ms: self.start_time.elapsed().as_millis() as u64,
            stages_run,
            failures: self.failures.load(Ordering::Relaxed),
            aborts: self.aborts.load(Ordering::Relaxed),
            avg_latency_ms: avg_latency,
            records,
        }
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsSummary {
    /// Format summary for display
    pub fn display(&self) -> String {
        format!(
            "Duration: {:.1}s\n\
             Stages: {} (aborted: {}, failed: {})\n\
             Avg Stage Latency: {:.0}ms",
            self.total_duration_ms as f64 / 1000.0,
            self.stages_run,
            self.aborts,
            self.failures,
            self.avg_latency_ms,
        )
    }
}

// =============================================================================
// Shared Type
// =============================================================================

use std::sync::Arc;

/// Shared metrics collector for pipeline stages
pub type SharedMetrics = Arc<PipelineMetrics>;

/// Create shared metrics collector
pub fn create_shared_metrics() -> SharedMetrics {
    Arc::new(PipelineMetrics::new())
}

// =============================================================================
// Tests
// =============================================================================
