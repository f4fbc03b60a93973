//! Sequential batch conversion with a JSON summary report.
//!
//! Each document gets its own pipeline run and its own stats; nothing is
//! carried over between documents. Documents are processed one at a time to
//! keep pdfium's memory use bounded. The caller hands over explicit file
//! paths; finding PDFs in a directory tree is the caller's business.
//!
//! Cancellation is cooperative: the flag in [`BatchOptions::cancel`] is
//! checked before each document, never in the middle of one.

use crate::config::ConversionConfig;
use crate::convert::{convert_to_file, DEFAULT_OUTPUT_DIR};
use crate::error::Pdf2MdError;
use crate::output::ConversionStats;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// File name of the summary written into the output directory.
pub const REPORT_FILE_NAME: &str = "conversion_stats.json";

/// How a batch reacts to failures and where it writes.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Keep going after a document fails. Default: `true`.
    pub continue_on_error: bool,
    /// Set to `true` from another thread to stop before the next document.
    pub cancel: Option<Arc<AtomicBool>>,
    /// Output directory. Default: `config.output_dir`, else
    /// `<parent of first input>/markdown_output`.
    pub output_dir: Option<PathBuf>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            continue_on_error: true,
            cancel: None,
            output_dir: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchStatus {
    Success,
    Failed,
}

/// Outcome for one input file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchEntry {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub status: BatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<ConversionStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary of a whole batch, also written as JSON to [`REPORT_FILE_NAME`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Number of inputs handed to the batch.
    pub total: usize,
    pub success: usize,
    pub failed: usize,
    /// Inputs never attempted because of cancellation or stop-on-error.
    pub skipped: usize,
    pub cancelled: bool,
    pub output_dir: PathBuf,
    pub duration_ms: u64,
    pub results: Vec<BatchEntry>,
}

/// Convert `inputs` one after another into a shared output directory.
///
/// Per-document failures are recorded in the report rather than returned;
/// the only error is failing to create the output directory or write the
/// report.
pub async fn convert_batch(
    inputs: &[PathBuf],
    config: &ConversionConfig,
    options: &BatchOptions,
) -> Result<BatchReport, Pdf2MdError> {
    let start = Instant::now();
    let output_dir = batch_output_dir(inputs, config, options);
    tokio::fs::create_dir_all(&output_dir)
        .await
        .map_err(|e| Pdf2MdError::OutputWriteFailed {
            path: output_dir.clone(),
            source: e,
        })?;
    info!(
        "Starting batch of {} files into {}",
        inputs.len(),
        output_dir.display()
    );

    let mut doc_config = config.clone();
    doc_config.output_dir = Some(output_dir.clone());

    let mut results = Vec::with_capacity(inputs.len());
    let mut cancelled = false;

    for input in inputs {
        if options
            .cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
        {
            warn!("Batch cancelled before {}", input.display());
            cancelled = true;
            break;
        }

        match convert_to_file(input, None, &doc_config).await {
            Ok(output) => {
                info!(
                    "✓ {} -> {} ({} pages, {} blocks, {} restored)",
                    input.display(),
                    output
                        .output_path
                        .as_deref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_default(),
                    output.stats.pages,
                    output.stats.blocks,
                    output.stats.restored_texts
                );
                results.push(BatchEntry {
                    input: input.clone(),
                    output: output.output_path,
                    status: BatchStatus::Success,
                    stats: Some(output.stats),
                    error: None,
                });
            }
            Err(e) => {
                error!("✗ {}: {}", input.display(), e);
                results.push(BatchEntry {
                    input: input.clone(),
                    output: None,
                    status: BatchStatus::Failed,
                    stats: None,
                    error: Some(e.to_string()),
                });
                if !options.continue_on_error {
                    warn!("Stopping batch after failure (continue_on_error = false)");
                    break;
                }
            }
        }
    }

    let success = results
        .iter()
        .filter(|r| r.status == BatchStatus::Success)
        .count();
    let failed = results.len() - success;
    let report = BatchReport {
        total: inputs.len(),
        success,
        failed,
        skipped: inputs.len() - results.len(),
        cancelled,
        output_dir: output_dir.clone(),
        duration_ms: start.elapsed().as_millis() as u64,
        results,
    };

    write_report(&output_dir, &report).await?;
    info!(
        "Batch complete: {}/{} succeeded, {} failed, {} skipped",
        report.success, report.total, report.failed, report.skipped
    );
    Ok(report)
}

fn batch_output_dir(
    inputs: &[PathBuf],
    config: &ConversionConfig,
    options: &BatchOptions,
) -> PathBuf {
    options
        .output_dir
        .clone()
        .or_else(|| config.output_dir.clone())
        .unwrap_or_else(|| {
            inputs
                .first()
                .and_then(|p| p.parent())
                .unwrap_or_else(|| Path::new("."))
                .join(DEFAULT_OUTPUT_DIR)
        })
}

async fn write_report(output_dir: &Path, report: &BatchReport) -> Result<(), Pdf2MdError> {
    let path = output_dir.join(REPORT_FILE_NAME);
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| Pdf2MdError::Internal(format!("Failed to serialise batch report: {}", e)))?;
    tokio::fs::write(&path, json)
        .await
        .map_err(|e| Pdf2MdError::OutputWriteFailed { path, source: e })
}
