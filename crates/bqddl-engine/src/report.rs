//! Per-run provisioning report
//!
//! Written as JSON when the CLI is given `--report`.

use bqddl_core::DdlFile;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What happened to one DDL file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    /// The table already existed; nothing was submitted
    Skipped,

    /// The DDL job completed
    Created,

    /// The file was empty or unreadable; nothing was submitted
    EmptyQuery,

    /// The DDL job failed or timed out; the run continued
    Failed { reason: String },
}

/// Outcome of a single file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    /// DDL file path
    pub file: String,

    /// Table name derived from the file name
    pub table: String,

    #[serde(flatten)]
    pub outcome: FileOutcome,
}

/// Summary statistics for a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total: usize,
    pub created: usize,
    pub skipped: usize,
    pub empty: usize,
    pub failed: usize,
}

/// Provisioning report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisionReport {
    /// Timestamp (ISO 8601)
    pub timestamp: String,

    /// Dataset tables were provisioned into
    pub dataset: String,

    /// Summary statistics
    pub summary: ReportSummary,

    /// Outcomes in processing order
    pub files: Vec<FileReport>,
}

impl ProvisionReport {
    /// Create a new empty report
    pub fn new(dataset: impl Into<String>) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            dataset: dataset.into(),
            summary: ReportSummary::default(),
            files: Vec::new(),
        }
    }

    /// Record the outcome for a file
    pub fn record(&mut self, file: &DdlFile, outcome: FileOutcome) {
        self.summary.total += 1;
        match &outcome {
            FileOutcome::Skipped => self.summary.skipped += 1,
            FileOutcome::Created => self.summary.created += 1,
            FileOutcome::EmptyQuery => self.summary.empty += 1,
            FileOutcome::Failed { .. } => self.summary.failed += 1,
        }

        self.files.push(FileReport {
            file: file.path.display().to_string(),
            table: file.table_name.clone(),
            outcome,
        });
    }

    pub fn outcome_for(&self, table: &str) -> Option<&FileOutcome> {
        self.files.iter().find(|f| f.table == table).map(|f| &f.outcome)
    }

    pub fn has_failures(&self) -> bool {
        self.summary.failed > 0
    }

    /// Save report to JSON file
    pub fn save_to_file(&self, path: &Path) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_updates_summary() {
        let mut report = ProvisionReport::new("analytics");
        report.record(&DdlFile::new("ddl/orders.sql"), FileOutcome::Created);
        report.record(&DdlFile::new("ddl/customers.sql"), FileOutcome::Skipped);
        report.record(
            &DdlFile::new("ddl/broken.sql"),
            FileOutcome::Failed { reason: "Query failed: syntax".into() },
        );

        assert_eq!(
            report.summary,
            ReportSummary { total: 3, created: 1, skipped: 1, empty: 0, failed: 1 }
        );
        assert_eq!(report.outcome_for("customers"), Some(&FileOutcome::Skipped));
        assert!(report.has_failures());
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let mut report = ProvisionReport::new("analytics");
        report.record(
            &DdlFile::new("ddl/orders.sql"),
            FileOutcome::Failed { reason: "timeout".into() },
        );

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["files"][0]["status"], "failed");
        assert_eq!(json["files"][0]["reason"], "timeout");
        assert_eq!(json["files"][0]["table"], "orders");
    }
}
