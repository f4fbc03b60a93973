//! Progress-callback trait for per-page extraction events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events while the pipeline walks the document. Pages are extracted one at a
//! time in ascending order, so events for a single conversion arrive in page
//! order; the trait is still `Send + Sync` because the callback travels into
//! the blocking extraction thread.
//!
//! # Example
//!
//! ```rust
//! use pdf2md_structure::{ConversionProgressCallback, ConversionConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     blocks: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_page_complete(&self, page_num: usize, total_pages: usize, block_count: usize) {
//!         self.blocks.fetch_add(block_count, Ordering::SeqCst);
//!         eprintln!("Page {}/{} done ({} blocks)", page_num, total_pages, block_count);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { blocks: AtomicUsize::new(0) });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the conversion pipeline as it extracts each page.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before the first page is extracted.
    ///
    /// # Arguments
    /// * `total_pages` — number of pages that will be extracted
    fn on_conversion_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called just before a page is read from the page source.
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called when a page has been extracted.
    ///
    /// # Arguments
    /// * `page_num`    — 1-indexed page number
    /// * `total_pages` — total pages being extracted
    /// * `block_count` — text blocks the page contributed (0 for image-only pages)
    fn on_page_complete(&self, page_num: usize, total_pages: usize, block_count: usize) {
        let _ = (page_num, total_pages, block_count);
    }

    /// Called when a page could not be extracted and is skipped.
    ///
    /// Takes an owned `String` so implementations can move the message into
    /// a spawned task without borrowing from the pipeline.
    fn on_page_error(&self, page_num: usize, total_pages: usize, error: String) {
        let _ = (page_num, total_pages, error);
    }

    /// Called once after all pages have been attempted.
    ///
    /// # Arguments
    /// * `total_pages`   — pages that were attempted
    /// * `success_count` — pages extracted without error
    fn on_conversion_complete(&self, total_pages: usize, success_count: usize) {
        let _ = (total_pages, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
