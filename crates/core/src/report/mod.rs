//! Report pipeline: CSV aggregation with shared status and timing metrics.

mod aggregate;
mod pipeline;
mod tracker;
mod types;

pub use pipeline::ReportPipeline;
pub use tracker::ReportTracker;
pub use types::{
    ReportError, ReportKind, ReportMetrics, ReportStatus, RunDurations, StatusSnapshot,
};
