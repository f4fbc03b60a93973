//! Result types returned by the conversion entry points.

use crate::error::PageError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Everything a conversion produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// The rendered, post-processed Markdown document.
    pub markdown: String,
    /// Per-conversion counters.
    pub stats: ConversionStats,
    /// Document metadata reported by the page source.
    pub metadata: DocumentMetadata,
    /// Sanitised document title, when one could be derived.
    pub title: Option<String>,
    /// Pages that failed extraction and were skipped.
    pub diagnostics: Vec<PageError>,
    /// Where the Markdown was written, for the file-writing entry points.
    pub output_path: Option<PathBuf>,
}

/// Counters for a single conversion.
///
/// Created fresh by every conversion; never shared between documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Page count of the document.
    pub pages: usize,
    /// Pages actually extracted (after page selection).
    pub selected_pages: usize,
    /// Text blocks extracted across all pages.
    pub blocks: usize,
    /// Words repaired by the Text Restorer.
    pub restored_texts: usize,
    /// Pages that failed extraction and were skipped.
    pub errors: usize,
    /// Output length in characters.
    pub output_size: usize,
    /// Output length in lines.
    pub output_lines: usize,
    /// Wall-clock time of the conversion.
    pub duration_ms: u64,
}

/// Document-level metadata exposed by the page source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub page_count: usize,
}
