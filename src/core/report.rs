use crate::core::{ActionOutcome, Storage, SyncReport};
use crate::utils::error::{Result, SyncError};
use serde::Serialize;
use std::path::Path;

const CSV_HEADER: [&str; 8] = [
    "kind",
    "title",
    "target_id",
    "status",
    "result_id",
    "error",
    "images_uploaded",
    "images_failed",
];

#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    kind: &'a str,
    title: &'a str,
    target_id: &'a str,
    status: &'a str,
    result_id: &'a str,
    error: &'a str,
    images_uploaded: usize,
    images_failed: usize,
}

pub fn render_json(report: &SyncReport) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(report)?)
}

pub fn render_csv(report: &SyncReport) -> Result<Vec<u8>> {
    // header written up front so a run without actions still gets one
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for record in &report.actions {
        let (result_id, error) = match &record.outcome {
            ActionOutcome::Applied { id } => (id.as_str(), ""),
            ActionOutcome::Planned => ("", ""),
            ActionOutcome::Failed { error } => ("", error.as_str()),
        };

        writer.serialize(ReportRow {
            kind: record.action.kind(),
            title: record.action.title(),
            target_id: record.action.target_id().unwrap_or(""),
            status: record.outcome.status(),
            result_id,
            error,
            images_uploaded: record.images_uploaded,
            images_failed: record.images_failed,
        })?;
    }

    writer
        .into_inner()
        .map_err(|e| SyncError::IoError(e.into_error()))
}

/// One-line summary printed at the end of a run.
pub fn summary(report: &SyncReport) -> String {
    let prefix = if report.dry_run { "planned" } else { "applied" };
    format!(
        "{} products in Directus; {}: {} created, {} updated, {} deleted; {} failed",
        report.source_products,
        prefix,
        report.count("create"),
        report.count("update"),
        report.count("delete"),
        report.failures()
    )
}

/// Persists a [`SyncReport`], picking the format from the file extension.
pub struct ReportWriter<S: Storage> {
    storage: S,
}

impl<S: Storage> ReportWriter<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub async fn write(&self, report: &SyncReport, path: &str) -> Result<()> {
        let extension = Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();

        let data = match extension.as_str() {
            "json" => render_json(report)?,
            "csv" => render_csv(report)?,
            other => {
                return Err(SyncError::InvalidConfigValueError {
                    field: "report_path".to_string(),
                    value: path.to_string(),
                    reason: format!("Unsupported report format: '{}'", other),
                })
            }
        };

        tracing::debug!("Writing report ({} bytes) to {}", data.len(), path);
        self.storage.write_file(path, &data).await
    }
}
