use std::path::Path;

use crate::data::group::{group_sum, GroupTotal};
use crate::data::loader::load_file;
use crate::data::model::Table;
use crate::data::summary::{histogram, summarize, Histogram, Summary, SummaryError};
use crate::export;
use crate::insight::{InsightAssistant, InsightError};
use crate::report::PLATFORM_COLUMN;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Message shown in the top bar.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Info(String),
    Error(String),
}

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded table (None until the user opens a file).
    pub table: Option<Table>,

    /// File name of the loaded table.
    pub source_name: Option<String>,

    /// Selected metric column; always one of the numeric columns.
    pub metric: Option<String>,

    /// Summary of the selected metric (cached).
    pub summary: Option<Result<Summary, SummaryError>>,

    pub histogram: Option<Histogram>,

    /// Metric totals per platform, descending.
    pub platform_totals: Option<Vec<GroupTotal>>,

    pub assistant: InsightAssistant,

    /// Text in the question box.
    pub question: String,

    /// Last assistant answer or error.
    pub answer: Option<Result<String, InsightError>>,

    pub status: Option<Status>,
}

impl AppState {
    pub fn new(assistant: InsightAssistant) -> Self {
        Self {
            table: None,
            source_name: None,
            metric: None,
            summary: None,
            histogram: None,
            platform_totals: None,
            assistant,
            question: String::new(),
            answer: None,
            status: None,
        }
    }

    /// Load a file, replacing the current table. On failure nothing from the
    /// previous table is kept.
    pub fn load_path(&mut self, path: &Path) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        match load_file(path) {
            Ok(table) => {
                log::info!(
                    "Loaded {name}: {} rows, columns {:?}",
                    table.row_count(),
                    table.column_names()
                );
                self.set_table(table, name);
            }
            Err(e) => {
                log::error!("Failed to load {name}: {e:#}");
                self.clear();
                self.status = Some(Status::Error(format!("Error reading file: {e:#}")));
            }
        }
    }

    /// Ingest a newly loaded table; the default metric is the first numeric column.
    pub fn set_table(&mut self, table: Table, source_name: String) {
        self.metric = table.numeric_columns().first().map(|c| c.to_string());
        self.status = Some(Status::Info(format!(
            "Loaded {source_name} ({} rows)",
            table.row_count()
        )));
        self.table = Some(table);
        self.source_name = Some(source_name);
        self.answer = None;
        self.recompute();
    }

    pub fn clear(&mut self) {
        self.table = None;
        self.source_name = None;
        self.metric = None;
        self.summary = None;
        self.histogram = None;
        self.platform_totals = None;
        self.answer = None;
        self.status = None;
    }

    /// Switch the metric; names outside the numeric subset are ignored.
    pub fn select_metric(&mut self, metric: &str) {
        let Some(table) = &self.table else {
            return;
        };
        if !table.is_numeric_column(metric) {
            log::warn!("Ignoring non-numeric metric {metric}");
            return;
        }
        if self.metric.as_deref() != Some(metric) {
            self.metric = Some(metric.to_string());
            self.recompute();
        }
    }

    /// Rebuild summary, histogram and platform totals for the current metric.
    fn recompute(&mut self) {
        let (Some(table), Some(metric)) = (&self.table, &self.metric) else {
            self.summary = None;
            self.histogram = None;
            self.platform_totals = None;
            return;
        };
        let summary = summarize(table, metric);
        if let Err(e) = &summary {
            log::warn!("No summary for {metric}: {e}");
        }
        self.summary = Some(summary);
        self.histogram = histogram(table, metric).ok();
        self.platform_totals = group_sum(table, PLATFORM_COLUMN, metric);
    }

    pub fn ask(&mut self) {
        let Some(table) = &self.table else {
            return;
        };
        self.answer = Some(self.assistant.ask(&self.question, table));
    }

    pub fn save_csv(&mut self, path: &Path) {
        let Some(table) = &self.table else {
            return;
        };
        self.status = Some(match export::write_csv(table, path) {
            Ok(()) => Status::Info(format!("Saved {}", path.display())),
            Err(e) => {
                log::error!("CSV export failed: {e:#}");
                Status::Error(format!("CSV export failed: {e:#}"))
            }
        });
    }

    pub fn save_report(&mut self, path: &Path) {
        let (Some(table), Some(metric)) = (&self.table, &self.metric) else {
            return;
        };
        self.status = Some(match export::write_report(table, metric, path) {
            Ok(()) => Status::Info(format!("Saved {}", path.display())),
            Err(e) => {
                log::error!("Report export failed: {e:#}");
                Status::Error(format!("Report export failed: {e:#}"))
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use pretty_assertions::assert_eq;

    use super::*;

    const CSV: &str = "\
Date,Platform,Campaign,Cost,Clicks
2024-01-01,Google,Brand,100.5,10
2024-01-02,Meta,Retargeting,250.25,20
2024-01-03,Google,Brand,,5
";

    fn write_csv(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("media.csv");
        std::fs::write(&path, CSV).unwrap();
        path
    }

    fn loaded() -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir);
        let mut state = AppState::new(InsightAssistant::disabled());
        state.load_path(&path);
        (dir, state)
    }

    #[test]
    fn test_load_selects_first_numeric_metric() {
        let (_dir, state) = loaded();
        assert_eq!(state.source_name.as_deref(), Some("media.csv"));
        assert_eq!(state.metric.as_deref(), Some("Cost"));

        let summary = state.summary.clone().unwrap().unwrap();
        assert_eq!(summary.count, 2);
        assert!((summary.total - 350.75).abs() < 1e-9);
        assert!(state.histogram.is_some());

        let platforms: Vec<&str> = state
            .platform_totals
            .as_ref()
            .unwrap()
            .iter()
            .map(|g| g.key.as_str())
            .collect();
        assert_eq!(platforms, vec!["Meta", "Google"]);
    }

    #[test]
    fn test_select_metric_recomputes() {
        let (_dir, mut state) = loaded();
        state.select_metric("Clicks");
        assert_eq!(state.metric.as_deref(), Some("Clicks"));
        assert_eq!(state.summary.clone().unwrap().unwrap().total, 35.0);

        state.select_metric("Platform");
        assert_eq!(state.metric.as_deref(), Some("Clicks"));
    }

    #[test]
    fn test_no_credential_keeps_summary_and_export_working() {
        let (dir, mut state) = loaded();
        state.question = "Which platform performs best?".to_string();
        state.ask();
        assert_eq!(state.answer, Some(Err(InsightError::MissingCredential)));
        assert!(matches!(state.summary, Some(Ok(_))));

        let csv_path = dir.path().join(export::CSV_FILE_NAME);
        state.save_csv(&csv_path);
        assert!(matches!(state.status, Some(Status::Info(_))));
        assert!(csv_path.exists());

        let report_path = dir.path().join(export::report_file_name("Cost"));
        state.save_report(&report_path);
        assert!(matches!(state.status, Some(Status::Info(_))));
        assert!(report_path.exists());
    }

    #[test]
    fn test_failed_load_clears_previous_table() {
        let (dir, mut state) = loaded();
        let broken = dir.path().join("broken.xlsx");
        std::fs::write(&broken, b"definitely not a workbook").unwrap();

        state.load_path(&broken);
        assert!(state.table.is_none());
        assert!(state.metric.is_none());
        assert!(state.summary.is_none());
        assert!(state.platform_totals.is_none());
        assert!(matches!(state.status, Some(Status::Error(_))));
    }

    #[test]
    fn test_table_without_numeric_columns_has_no_metric() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.csv");
        std::fs::write(&path, "Platform\nGoogle\n").unwrap();
        let mut state = AppState::new(InsightAssistant::disabled());
        state.load_path(&path);
        assert!(state.table.is_some());
        assert!(state.metric.is_none());
        assert!(state.summary.is_none());
    }
}
