//! Batch generation result types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Outcome of one batch row (one generation unit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnitOutcome {
    /// Artifact written and registered.
    Written,
    /// Overwrite declined or unit skipped; not an error.
    Skipped,
    /// Unit failed; later units still run.
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitResult {
    /// 1-based spec-table row number.
    pub row: usize,
    pub name: Option<String>,
    pub outcome: UnitOutcome,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub template: PathBuf,
    pub results: Vec<UnitResult>,
}

impl BatchReport {
    pub fn new(template: PathBuf) -> Self {
        Self {
            template,
            results: Vec::new(),
        }
    }

    pub fn written_count(&self) -> usize {
        self.count(UnitOutcome::Written)
    }

    pub fn skipped_count(&self) -> usize {
        self.count(UnitOutcome::Skipped)
    }

    pub fn failed_count(&self) -> usize {
        self.count(UnitOutcome::Failed)
    }

    pub fn has_failures(&self) -> bool {
        self.failed_count() > 0
    }

    fn count(&self, outcome: UnitOutcome) -> usize {
        self.results
            .iter()
            .filter(|r| r.outcome == outcome)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_counts_outcomes() {
        let mut report = BatchReport::new(PathBuf::from("muse_template.dmm"));
        report.results.push(UnitResult {
            row: 1,
            name: Some("muse__Figur__Genre".to_string()),
            outcome: UnitOutcome::Written,
            message: None,
        });
        report.results.push(UnitResult {
            row: 2,
            name: None,
            outcome: UnitOutcome::Failed,
            message: Some("no column matches reference \"Tier\"".to_string()),
        });
        assert_eq!(report.written_count(), 1);
        assert_eq!(report.failed_count(), 1);
        assert!(report.has_failures());
    }

    #[test]
    fn report_serializes() {
        let report = BatchReport::new(PathBuf::from("muse_template.dmm"));
        let json = serde_json::to_string(&report).expect("serialize report");
        let round: BatchReport = serde_json::from_str(&json).expect("deserialize report");
        assert_eq!(round.template, report.template);
    }
}
