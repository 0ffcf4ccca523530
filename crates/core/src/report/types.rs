//! Report pipeline data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::ticket::EnumParseError;

/// The three derived reports produced from the staging directory.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Accounts,
    Yearly,
    #[serde(rename = "fs")]
    FinancialStatement,
}

impl ReportKind {
    /// All kinds, in the order a full run executes them.
    pub const ALL: [ReportKind; 3] = [
        ReportKind::Accounts,
        ReportKind::Yearly,
        ReportKind::FinancialStatement,
    ];

    /// Returns the kind as a string (wire name and status map key).
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Accounts => "accounts",
            ReportKind::Yearly => "yearly",
            ReportKind::FinancialStatement => "fs",
        }
    }

    /// Output file written to the output directory; also excluded from the
    /// generator's own input scan.
    pub fn output_filename(&self) -> &'static str {
        match self {
            ReportKind::Accounts => "accounts.csv",
            ReportKind::Yearly => "yearly.csv",
            ReportKind::FinancialStatement => "fs.csv",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = EnumParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "accounts" => Ok(ReportKind::Accounts),
            "yearly" => Ok(ReportKind::Yearly),
            "fs" => Ok(ReportKind::FinancialStatement),
            other => Err(EnumParseError {
                kind: "report",
                value: other.to_string(),
            }),
        }
    }
}

/// Last known lifecycle state of a report.
///
/// The rendered string is the observable contract: `idle`, `starting`,
/// `finished in <seconds> seconds` (2 decimals), or `error: <message>`.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportStatus {
    Idle,
    Starting,
    Finished { seconds: f64 },
    Error { message: String },
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportStatus::Idle => f.write_str("idle"),
            ReportStatus::Starting => f.write_str("starting"),
            ReportStatus::Finished { seconds } => {
                write!(f, "finished in {:.2} seconds", seconds)
            }
            ReportStatus::Error { message } => write!(f, "error: {}", message),
        }
    }
}

impl Serialize for ReportStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Error type for report generation.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Filesystem failure while scanning, reading or writing.
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

/// One duration slot per report plus the full-run total, in seconds.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Default)]
pub struct RunDurations {
    pub accounts: f64,
    pub yearly: f64,
    pub fs: f64,
    pub total: f64,
}

impl RunDurations {
    pub fn get(&self, kind: ReportKind) -> f64 {
        match kind {
            ReportKind::Accounts => self.accounts,
            ReportKind::Yearly => self.yearly,
            ReportKind::FinancialStatement => self.fs,
        }
    }

    pub fn set(&mut self, kind: ReportKind, seconds: f64) {
        match kind {
            ReportKind::Accounts => self.accounts = seconds,
            ReportKind::Yearly => self.yearly = seconds,
            ReportKind::FinancialStatement => self.fs = seconds,
        }
    }
}

/// Process-local run metrics, updated by pipeline runs.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct ReportMetrics {
    /// Completed full pipeline runs since process start.
    pub runs: u64,
    /// Completion timestamp of the last full run; absent before the first.
    pub last_run: Option<DateTime<Utc>>,
    pub last_run_time: RunDurations,
    pub average_run_time: RunDurations,
}

/// Point-in-time view of all report states and metrics.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatusSnapshot {
    pub states: BTreeMap<ReportKind, ReportStatus>,
    pub metrics: ReportMetrics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_kind_round_trip() {
        for kind in ReportKind::ALL {
            let parsed: ReportKind = kind.as_str().parse().unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn test_report_kind_unknown_value() {
        let result: Result<ReportKind, _> = "quarterly".parse();
        assert!(result.is_err());
    }

    #[test]
    fn test_report_kind_serialization() {
        let json = serde_json::to_string(&ReportKind::FinancialStatement).unwrap();
        assert_eq!(json, r#""fs""#);
    }

    #[test]
    fn test_status_rendering() {
        assert_eq!(ReportStatus::Idle.to_string(), "idle");
        assert_eq!(ReportStatus::Starting.to_string(), "starting");
        assert_eq!(
            ReportStatus::Finished { seconds: 1.2345 }.to_string(),
            "finished in 1.23 seconds"
        );
        assert_eq!(
            ReportStatus::Error {
                message: "boom".to_string()
            }
            .to_string(),
            "error: boom"
        );
    }

    #[test]
    fn test_status_serializes_as_string() {
        let json = serde_json::to_string(&ReportStatus::Finished { seconds: 0.5 }).unwrap();
        assert_eq!(json, r#""finished in 0.50 seconds""#);
    }

    #[test]
    fn test_run_durations_accessors() {
        let mut durations = RunDurations::default();
        durations.set(ReportKind::Yearly, 2.5);
        assert_eq!(durations.get(ReportKind::Yearly), 2.5);
        assert_eq!(durations.get(ReportKind::Accounts), 0.0);
        assert_eq!(durations.total, 0.0);
    }

    #[test]
    fn test_metrics_default_has_no_last_run() {
        let metrics = ReportMetrics::default();
        assert_eq!(metrics.runs, 0);
        assert!(metrics.last_run.is_none());
    }
}
