//! Shared status and metrics state for the report pipeline.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use super::types::{ReportKind, ReportMetrics, ReportStatus, StatusSnapshot};

struct TrackerInner {
    states: BTreeMap<ReportKind, ReportStatus>,
    metrics: ReportMetrics,
}

/// Cloneable handle to the process-local report state.
///
/// One lock guards both maps: the pipeline task mutates through it and
/// poll handlers read through it, so a snapshot is never torn between a
/// status update and its metric update.
#[derive(Clone)]
pub struct ReportTracker {
    inner: Arc<RwLock<TrackerInner>>,
}

impl Default for ReportTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportTracker {
    /// Create a tracker with every report idle and zeroed metrics.
    pub fn new() -> Self {
        let states = ReportKind::ALL
            .into_iter()
            .map(|kind| (kind, ReportStatus::Idle))
            .collect();

        Self {
            inner: Arc::new(RwLock::new(TrackerInner {
                states,
                metrics: ReportMetrics::default(),
            })),
        }
    }

    /// Set a report's status.
    pub async fn set_status(&self, kind: ReportKind, status: ReportStatus) {
        let mut inner = self.inner.write().await;
        inner.states.insert(kind, status);
    }

    /// Current status of a report.
    pub async fn status(&self, kind: ReportKind) -> ReportStatus {
        let inner = self.inner.read().await;
        inner
            .states
            .get(&kind)
            .cloned()
            .unwrap_or(ReportStatus::Idle)
    }

    /// Point-in-time copy of all states and metrics. Pure read.
    pub async fn snapshot(&self) -> StatusSnapshot {
        let inner = self.inner.read().await;
        StatusSnapshot {
            states: inner.states.clone(),
            metrics: inner.metrics.clone(),
        }
    }

    /// Record one report's elapsed seconds into its last-run and
    /// running-average slots.
    ///
    /// The running average uses the shared run counter as denominator
    /// basis without advancing it; the counter moves only when a full
    /// pipeline run completes. A direct single-report run therefore
    /// averages against the current counter value.
    pub async fn record_report_duration(&self, kind: ReportKind, seconds: f64) {
        let mut inner = self.inner.write().await;
        let runs_before = inner.metrics.runs;
        inner.metrics.last_run_time.set(kind, seconds);
        let updated = rolling_average(
            inner.metrics.average_run_time.get(kind),
            runs_before,
            seconds,
        );
        inner.metrics.average_run_time.set(kind, updated);
    }

    /// Record a completed full run: total last/average slots, then the
    /// run counter and completion timestamp.
    pub async fn record_run_total(&self, seconds: f64) {
        let mut inner = self.inner.write().await;
        let runs_before = inner.metrics.runs;
        inner.metrics.last_run_time.total = seconds;
        inner.metrics.average_run_time.total =
            rolling_average(inner.metrics.average_run_time.total, runs_before, seconds);
        inner.metrics.runs = runs_before + 1;
        inner.metrics.last_run = Some(Utc::now());
    }
}

fn rolling_average(old_average: f64, runs_before: u64, duration: f64) -> f64 {
    (old_average * runs_before as f64 + duration) / (runs_before as f64 + 1.0)
}
