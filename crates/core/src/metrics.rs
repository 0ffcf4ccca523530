//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Ticket router (creations, conflicts)
//! - Report pipeline (runs, failures, durations)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Ticket Router Metrics
// =============================================================================

/// Tickets created by type.
pub static TICKETS_CREATED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("opsdesk_tickets_created_total", "Total tickets created"),
        &["type"], // "management_report", "registration_address_change", "strike_off"
    )
    .unwrap()
});

/// Ticket creation conflicts by reason.
pub static TICKET_CONFLICTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "opsdesk_ticket_conflicts_total",
            "Total ticket creation conflicts",
        ),
        &["reason"], // "duplicate_open", "missing_assignee", "ambiguous_assignee", "storage"
    )
    .unwrap()
});

// =============================================================================
// Report Pipeline Metrics
// =============================================================================

/// Completed full pipeline runs.
pub static REPORT_RUNS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "opsdesk_report_runs_total",
        "Total completed report pipeline runs",
    )
    .unwrap()
});

/// Report generation failures by report.
pub static REPORT_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "opsdesk_report_failures_total",
            "Total report generation failures",
        ),
        &["report"], // "accounts", "yearly", "fs"
    )
    .unwrap()
});

/// Report generation duration in seconds.
pub static REPORT_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "opsdesk_report_duration_seconds",
            "Duration of report generation",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["report"],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Tickets
        Box::new(TICKETS_CREATED.clone()),
        Box::new(TICKET_CONFLICTS.clone()),
        // Reports
        Box::new(REPORT_RUNS.clone()),
        Box::new(REPORT_FAILURES.clone()),
        Box::new(REPORT_DURATION.clone()),
    ]
}
