//! Report pipeline orchestration.

use std::path::PathBuf;
use std::time::Instant;

use futures::future::join_all;
use tracing::{debug, error, info};

use crate::config::ReportsConfig;
use crate::metrics::{REPORT_DURATION, REPORT_FAILURES, REPORT_RUNS};

use super::aggregate;
use super::tracker::ReportTracker;
use super::types::{ReportError, ReportKind, ReportStatus};

/// Runs the three report generators over the staging directory and keeps
/// the shared tracker up to date.
///
/// Generators run concurrently by default, or strictly one after another
/// when `reports.sequential` is set. A generator failure is contained in
/// its own status entry and never aborts the siblings.
pub struct ReportPipeline {
    staging_dir: PathBuf,
    output_dir: PathBuf,
    sequential: bool,
    tracker: ReportTracker,
}

impl ReportPipeline {
    pub fn new(config: &ReportsConfig, tracker: ReportTracker) -> Self {
        Self {
            staging_dir: config.staging_dir.clone(),
            output_dir: config.output_dir.clone(),
            sequential: config.sequential,
            tracker,
        }
    }

    /// Handle to the shared status/metrics state.
    pub fn tracker(&self) -> &ReportTracker {
        &self.tracker
    }

    /// Run a single report generator.
    ///
    /// Status moves to `starting`, then to `finished in ...` or
    /// `error: ...`. Elapsed seconds are recorded into the report's
    /// last-run and running-average metrics on success only; the shared
    /// run counter is not advanced here.
    pub async fn run_report(&self, kind: ReportKind) -> Result<(), ReportError> {
        self.tracker.set_status(kind, ReportStatus::Starting).await;
        let start = Instant::now();

        match aggregate::generate(kind, &self.staging_dir, &self.output_dir).await {
            Ok(()) => {
                let seconds = start.elapsed().as_secs_f64();
                self.tracker
                    .set_status(kind, ReportStatus::Finished { seconds })
                    .await;
                self.tracker.record_report_duration(kind, seconds).await;
                REPORT_DURATION
                    .with_label_values(&[kind.as_str()])
                    .observe(seconds);
                Ok(())
            }
            Err(e) => {
                error!("{} report generation failed: {}", kind, e);
                self.tracker
                    .set_status(
                        kind,
                        ReportStatus::Error {
                            message: e.to_string(),
                        },
                    )
                    .await;
                REPORT_FAILURES.with_label_values(&[kind.as_str()]).inc();
                Err(e)
            }
        }
    }

    /// Run all three generators and record the full-run metrics.
    ///
    /// Always attempts every report; individual failures surface only
    /// through their status strings. Returns false only on a failure
    /// outside the per-report containment.
    pub async fn run_all(&self) -> bool {
        let start = Instant::now();

        if let Err(e) = tokio::fs::create_dir_all(&self.output_dir).await {
            error!(
                "Failed to create report output directory {:?}: {}",
                self.output_dir, e
            );
            return false;
        }

        if self.sequential {
            for kind in ReportKind::ALL {
                if let Err(e) = self.run_report(kind).await {
                    debug!("{} report failed within run: {}", kind, e);
                }
            }
        } else {
            let results = join_all(ReportKind::ALL.map(|kind| self.run_report(kind))).await;
            for (kind, result) in ReportKind::ALL.iter().zip(results) {
                if let Err(e) = result {
                    debug!("{} report failed within run: {}", kind, e);
                }
            }
        }

        let seconds = start.elapsed().as_secs_f64();
        self.tracker.record_run_total(seconds).await;
        REPORT_RUNS.inc();

        info!("Report run completed in {:.2} seconds", seconds);
        true
    }
}
