//! Run statistics and the end-of-run report

use crate::pipeline::CreatorOutcome;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Per-stage counters for one run.
///
/// Counters only grow, and only the pipeline driver touches them. A creator
/// is counted in `failed` at most once, at its first failing stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStatistics {
    total: u64,
    downloaded: u64,
    uploaded: u64,
    updated: u64,
    failed: u64,
}

impl RunStatistics {
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn downloaded(&self) -> u64 {
        self.downloaded
    }

    pub fn uploaded(&self) -> u64 {
        self.uploaded
    }

    pub fn updated(&self) -> u64 {
        self.updated
    }

    pub fn failed(&self) -> u64 {
        self.failed
    }

    pub(crate) fn record(&mut self, outcome: &CreatorOutcome) {
        self.total += 1;
        match outcome {
            CreatorOutcome::Skipped | CreatorOutcome::AcquireFailed { .. } => {
                self.failed += 1;
            }
            CreatorOutcome::StoreFailed { .. } => {
                self.downloaded += 1;
                self.failed += 1;
            }
            CreatorOutcome::Updated { .. } => {
                self.downloaded += 1;
                self.uploaded += 1;
                self.updated += 1;
            }
            CreatorOutcome::RecordUnmatched { .. } => {
                self.downloaded += 1;
                self.uploaded += 1;
            }
        }
    }
}

/// Stage at which a creator stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    MissingUsername,
    Acquire,
    Store,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureStage::MissingUsername => "missing username",
            FailureStage::Acquire => "acquire",
            FailureStage::Store => "store",
        };
        f.write_str(label)
    }
}

/// A creator that counted towards `failed`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatorFailure {
    /// 1-based position in the input
    pub position: usize,
    pub username: Option<String>,
    pub stage: FailureStage,
    pub reason: String,
}

/// A creator whose avatar was stored but whose record was not updated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordWarning {
    pub position: usize,
    pub username: String,
    pub url: String,
    pub reason: String,
}

/// Everything a finished run reports
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncReport {
    pub statistics: RunStatistics,
    pub failures: Vec<CreatorFailure>,
    pub warnings: Vec<RecordWarning>,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl SyncReport {
    pub fn has_failures(&self) -> bool {
        self.statistics.failed() > 0
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = &self.statistics;
        writeln!(f, "Sync summary ({:.1}s)", self.elapsed.as_secs_f64())?;
        writeln!(f, "  Total creators:     {}", stats.total())?;
        writeln!(f, "  Avatars downloaded: {}", stats.downloaded())?;
        writeln!(f, "  Avatars uploaded:   {}", stats.uploaded())?;
        writeln!(f, "  Records updated:    {}", stats.updated())?;
        write!(f, "  Failed:             {}", stats.failed())?;

        if !self.failures.is_empty() {
            writeln!(f)?;
            write!(f, "Failures:")?;
            for failure in &self.failures {
                write!(
                    f,
                    "\n  [{}] {} ({}): {}",
                    failure.position,
                    failure.username.as_deref().unwrap_or("<blank>"),
                    failure.stage,
                    failure.reason
                )?;
            }
        }

        if !self.warnings.is_empty() {
            writeln!(f)?;
            write!(f, "Record warnings:")?;
            for warning in &self.warnings {
                write!(
                    f,
                    "\n  [{}] {}: {}",
                    warning.position, warning.username, warning.reason
                )?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_library::{CreatorIdentifier, PublicReference};

    fn id(name: &str) -> CreatorIdentifier {
        CreatorIdentifier::parse(name).unwrap()
    }

    #[test]
    fn test_record_counts_each_outcome_once() {
        let mut stats = RunStatistics::default();
        let url = PublicReference::new("https://cdn.test/a.jpg");

        stats.record(&CreatorOutcome::Updated {
            identifier: id("a"),
            url: url.clone(),
        });
        stats.record(&CreatorOutcome::Skipped);
        stats.record(&CreatorOutcome::AcquireFailed { identifier: id("b") });
        stats.record(&CreatorOutcome::StoreFailed {
            identifier: id("c"),
            reason: "HTTP 500".to_string(),
        });
        stats.record(&CreatorOutcome::RecordUnmatched {
            identifier: id("d"),
            url,
            reason: "no match".to_string(),
        });

        assert_eq!(stats.total(), 5);
        assert_eq!(stats.downloaded(), 3);
        assert_eq!(stats.uploaded(), 2);
        assert_eq!(stats.updated(), 1);
        assert_eq!(stats.failed(), 3);
        assert!(stats.failed() + stats.updated() <= stats.total());
    }

    #[test]
    fn test_report_display_lists_failures_and_warnings() {
        let mut statistics = RunStatistics::default();
        statistics.record(&CreatorOutcome::Skipped);

        let report = SyncReport {
            statistics,
            failures: vec![CreatorFailure {
                position: 2,
                username: None,
                stage: FailureStage::MissingUsername,
                reason: "blank username".to_string(),
            }],
            warnings: vec![RecordWarning {
                position: 3,
                username: "bob".to_string(),
                url: "https://cdn.test/bob.jpg".to_string(),
                reason: "no record matched".to_string(),
            }],
            elapsed: Duration::from_millis(1500),
        };

        let text = report.to_string();
        assert!(text.starts_with("Sync summary (1.5s)"));
        assert!(text.contains("Failed:             1"));
        assert!(text.contains("[2] <blank> (missing username): blank username"));
        assert!(text.contains("[3] bob: no record matched"));
        assert!(report.has_failures());
    }

    #[test]
    fn test_report_serializes_stage_names() {
        let failure = CreatorFailure {
            position: 1,
            username: Some("bob".to_string()),
            stage: FailureStage::Acquire,
            reason: "all sources exhausted".to_string(),
        };
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["stage"], "acquire");
    }
}
