//! Configuration types for structure reconstruction and Markdown rendering.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The heuristics of the pipeline carry a
//! handful of numeric thresholds (gap between layout groups, heading size
//! ratio, heading-level font sizes); they live here as documented defaults
//! rather than as constants buried in the stages, so a caller tuning for a
//! particular document family only touches one struct.

use crate::error::Pdf2MdError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Configuration for a PDF-to-Markdown conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2md_structure::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .gap_threshold(30.0)
///     .heading_size_ratio(1.4)
///     .build()
///     .unwrap();
/// assert_eq!(config.gap_threshold, 30.0);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Vertical gap (layout units) above which a block starts a new layout
    /// group. Default: 25.0.
    pub gap_threshold: f32,

    /// A block whose font size is at least this multiple of the page's mean
    /// font size is a heading. Default: 1.3.
    pub heading_size_ratio: f32,

    /// Bold blocks shorter than this many characters may be headings. Default: 150.
    pub bold_heading_max_chars: usize,

    /// Bold blocks must be strictly larger than this font size to be
    /// headings. Default: 12.0.
    pub bold_heading_min_font_size: f32,

    /// Font-size thresholds mapping a heading to `#`, `##`, `###` or `####`.
    pub heading_levels: HeadingLevels,

    /// Font size assigned to blocks whose spans carry no usable size. Default: 12.0.
    pub default_font_size: f32,

    /// Number of blocks borrowed from each neighbouring group when building
    /// the restoration vocabulary. Default: 3.
    pub context_window: usize,

    /// Digit→letter repair policy. Default: `0→O, 1→I, 5→S, 8→B`.
    pub restoration: RestorationPolicy,

    /// Marker inserted on page transitions. Default: [`PageSeparator::Comment`].
    pub page_separator: PageSeparator,

    /// Page selection. Default: all pages.
    pub pages: PageSelection,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Directory for derived output files when no explicit target is given.
    /// Default: `<input dir>/markdown_output`.
    pub output_dir: Option<PathBuf>,

    /// Maximum length of a title-derived file name. Default: 100.
    pub max_title_length: usize,

    /// Optional per-page progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            gap_threshold: 25.0,
            heading_size_ratio: 1.3,
            bold_heading_max_chars: 150,
            bold_heading_min_font_size: 12.0,
            heading_levels: HeadingLevels::default(),
            default_font_size: 12.0,
            context_window: 3,
            restoration: RestorationPolicy::default(),
            page_separator: PageSeparator::default(),
            pages: PageSelection::default(),
            password: None,
            output_dir: None,
            max_title_length: 100,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("gap_threshold", &self.gap_threshold)
            .field("heading_size_ratio", &self.heading_size_ratio)
            .field("bold_heading_max_chars", &self.bold_heading_max_chars)
            .field("bold_heading_min_font_size", &self.bold_heading_min_font_size)
            .field("heading_levels", &self.heading_levels)
            .field("default_font_size", &self.default_font_size)
            .field("context_window", &self.context_window)
            .field("restoration", &self.restoration)
            .field("page_separator", &self.page_separator)
            .field("pages", &self.pages)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("output_dir", &self.output_dir)
            .field("max_title_length", &self.max_title_length)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn gap_threshold(mut self, units: f32) -> Self {
        self.config.gap_threshold = units;
        self
    }

    pub fn heading_size_ratio(mut self, ratio: f32) -> Self {
        self.config.heading_size_ratio = ratio;
        self
    }

    pub fn bold_heading_max_chars(mut self, n: usize) -> Self {
        self.config.bold_heading_max_chars = n;
        self
    }

    pub fn bold_heading_min_font_size(mut self, size: f32) -> Self {
        self.config.bold_heading_min_font_size = size;
        self
    }

    pub fn heading_levels(mut self, levels: HeadingLevels) -> Self {
        self.config.heading_levels = levels;
        self
    }

    pub fn default_font_size(mut self, size: f32) -> Self {
        self.config.default_font_size = size;
        self
    }

    pub fn context_window(mut self, n: usize) -> Self {
        self.config.context_window = n;
        self
    }

    pub fn restoration(mut self, policy: RestorationPolicy) -> Self {
        self.config.restoration = policy;
        self
    }

    pub fn page_separator(mut self, sep: PageSeparator) -> Self {
        self.config.page_separator = sep;
        self
    }

    pub fn pages(mut self, selection: PageSelection) -> Self {
        self.config.pages = selection;
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = Some(dir.into());
        self
    }

    pub fn max_title_length(mut self, n: usize) -> Self {
        self.config.max_title_length = n;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Pdf2MdError> {
        let c = &self.config;
        if !is_positive(c.gap_threshold) {
            return Err(Pdf2MdError::InvalidConfig(format!(
                "gap threshold must be positive and finite, got {}",
                c.gap_threshold
            )));
        }
        if !(c.heading_size_ratio.is_finite() && c.heading_size_ratio > 1.0) {
            return Err(Pdf2MdError::InvalidConfig(format!(
                "heading size ratio must be finite and > 1.0, got {}",
                c.heading_size_ratio
            )));
        }
        if !is_positive(c.default_font_size) {
            return Err(Pdf2MdError::InvalidConfig(format!(
                "default font size must be positive and finite, got {}",
                c.default_font_size
            )));
        }
        if !is_positive(c.bold_heading_min_font_size) {
            return Err(Pdf2MdError::InvalidConfig(format!(
                "bold heading minimum font size must be positive and finite, got {}",
                c.bold_heading_min_font_size
            )));
        }
        c.heading_levels.validate()?;
        if c.max_title_length < 3 {
            return Err(Pdf2MdError::InvalidConfig(
                "max title length must be ≥ 3".into(),
            ));
        }
        Ok(self.config)
    }
}

fn is_positive(x: f32) -> bool {
    x.is_finite() && x > 0.0
}

// ── Policy types ─────────────────────────────────────────────────────────

/// Font-size thresholds for heading levels.
///
/// A heading is level 1 when its size is strictly above `h1`, level 2 above
/// `h2`, level 3 above `h3`, and level 4 otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadingLevels {
    pub h1: f32,
    pub h2: f32,
    pub h3: f32,
}

impl Default for HeadingLevels {
    fn default() -> Self {
        Self {
            h1: 20.0,
            h2: 16.0,
            h3: 14.0,
        }
    }
}

impl HeadingLevels {
    /// Markdown heading level (1–4) for a block of the given font size.
    pub fn level_for(&self, font_size: f32) -> usize {
        if font_size > self.h1 {
            1
        } else if font_size > self.h2 {
            2
        } else if font_size > self.h3 {
            3
        } else {
            4
        }
    }

    fn validate(&self) -> Result<(), Pdf2MdError> {
        if self.h1 > self.h2 && self.h2 > self.h3 && self.h3 > 0.0 {
            Ok(())
        } else {
            Err(Pdf2MdError::InvalidConfig(format!(
                "heading levels must be strictly decreasing and positive, got {}/{}/{}",
                self.h1, self.h2, self.h3
            )))
        }
    }
}

/// How the Text Restorer repairs letters mis-encoded as digits.
///
/// The substitution table is tried in order; for each suspicious word the
/// first substitution whose result appears in the local vocabulary wins.
/// Numeric-heavy documents (invoices, statements) can turn repair off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RestorationPolicy {
    /// Never rewrite words.
    Disabled,
    /// Try each `(digit, letter)` replacement in order.
    Substitutions(Vec<(char, char)>),
}

impl Default for RestorationPolicy {
    fn default() -> Self {
        RestorationPolicy::Substitutions(vec![('0', 'O'), ('1', 'I'), ('5', 'S'), ('8', 'B')])
    }
}

impl RestorationPolicy {
    /// The substitution table, empty when disabled.
    pub fn substitutions(&self) -> &[(char, char)] {
        match self {
            RestorationPolicy::Disabled => &[],
            RestorationPolicy::Substitutions(s) => s,
        }
    }
}

/// Specifies which pages of the PDF to convert.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum PageSelection {
    /// Convert all pages (default).
    #[default]
    All,
    /// Convert a single page (1-indexed).
    Single(usize),
    /// Convert a contiguous range of pages (1-indexed, inclusive).
    Range(usize, usize),
    /// Convert specific pages (1-indexed, deduplicated).
    Set(Vec<usize>),
}

impl PageSelection {
    /// Expand the selection into a sorted, deduplicated list of 0-indexed page numbers.
    pub fn to_indices(&self, total_pages: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = match self {
            PageSelection::All => (0..total_pages).collect(),
            PageSelection::Single(p) if (1..=total_pages).contains(p) => vec![p - 1],
            PageSelection::Single(_) => vec![],
            PageSelection::Range(start, end) => {
                let start = (*start).max(1) - 1;
                let end = (*end).min(total_pages);
                (start..end).collect()
            }
            PageSelection::Set(pages) => pages
                .iter()
                .filter(|&&p| p >= 1 && p <= total_pages)
                .map(|p| p - 1)
                .collect(),
        };
        indices.sort_unstable();
        indices.dedup();
        indices
    }

    /// First requested page (1-indexed), used in range errors.
    pub fn first_requested(&self) -> usize {
        match self {
            PageSelection::All => 1,
            PageSelection::Single(p) | PageSelection::Range(p, _) => *p,
            PageSelection::Set(pages) => pages.iter().copied().min().unwrap_or(0),
        }
    }
}

/// Parses `all`, `5`, `3-15` or `1,3,5`. Pages are 1-indexed.
impl FromStr for PageSelection {
    type Err = Pdf2MdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let page = |p: &str| -> Result<usize, Pdf2MdError> {
            match p.trim().parse::<usize>() {
                Ok(n) if n >= 1 => Ok(n),
                Ok(_) => Err(Pdf2MdError::InvalidConfig(
                    "pages are 1-indexed, minimum is 1".into(),
                )),
                Err(_) => Err(Pdf2MdError::InvalidConfig(format!(
                    "invalid page number '{}'",
                    p.trim()
                ))),
            }
        };

        if s.eq_ignore_ascii_case("all") {
            Ok(PageSelection::All)
        } else if let Some((start, end)) = s.split_once('-') {
            let (start, end) = (page(start)?, page(end)?);
            if start > end {
                return Err(Pdf2MdError::InvalidConfig(format!(
                    "page range {start}-{end} ends before it starts"
                )));
            }
            Ok(PageSelection::Range(start, end))
        } else if s.contains(',') {
            s.split(',')
                .map(page)
                .collect::<Result<Vec<_>, _>>()
                .map(PageSelection::Set)
        } else {
            page(s).map(PageSelection::Single)
        }
    }
}

/// Marker inserted into the Markdown when the page number increases.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum PageSeparator {
    /// No marker.
    None,
    /// HTML comment with page number: `<!-- Page N -->`. (default)
    #[default]
    Comment,
    /// Horizontal rule: `---`.
    HorizontalRule,
    /// Custom string inserted between pages.
    Custom(String),
}

impl PageSeparator {
    /// Render the marker for the page being entered (1-indexed).
    ///
    /// Returns `None` when no marker should be emitted.
    pub fn render(&self, page_num: usize) -> Option<String> {
        match self {
            PageSeparator::None => None,
            PageSeparator::Comment => Some(format!("\n\n<!-- Page {page_num} -->\n\n")),
            PageSeparator::HorizontalRule => Some("\n\n---\n\n".to_string()),
            PageSeparator::Custom(s) => Some(format!("\n\n{s}\n\n")),
        }
    }
}

/// Parses `none`, `hr` (or `---`), `comment`; anything else is a custom marker.
impl FromStr for PageSeparator {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "none" => PageSeparator::None,
            "hr" | "---" => PageSeparator::HorizontalRule,
            "comment" => PageSeparator::Comment,
            _ => PageSeparator::Custom(s.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = ConversionConfig::default();
        assert_eq!(c.gap_threshold, 25.0);
        assert_eq!(c.heading_size_ratio, 1.3);
        assert_eq!(c.heading_levels, HeadingLevels { h1: 20.0, h2: 16.0, h3: 14.0 });
        assert_eq!(c.context_window, 3);
        assert_eq!(c.page_separator, PageSeparator::Comment);
        assert_eq!(
            c.restoration.substitutions(),
            &[('0', 'O'), ('1', 'I'), ('5', 'S'), ('8', 'B')]
        );
    }

    #[test]
    fn builder_rejects_non_positive_gap() {
        let err = ConversionConfig::builder().gap_threshold(0.0).build().unwrap_err();
        assert!(matches!(err, Pdf2MdError::InvalidConfig(_)));
    }

    #[test]
    fn builder_rejects_unordered_heading_levels() {
        let err = ConversionConfig::builder()
            .heading_levels(HeadingLevels { h1: 14.0, h2: 16.0, h3: 20.0 })
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("heading levels"));
    }

    #[test]
    fn builder_rejects_infinite_thresholds() {
        assert!(ConversionConfig::builder()
            .gap_threshold(f32::INFINITY)
            .build()
            .is_err());
        assert!(ConversionConfig::builder()
            .heading_size_ratio(f32::INFINITY)
            .build()
            .is_err());
        assert!(ConversionConfig::builder()
            .default_font_size(f32::INFINITY)
            .build()
            .is_err());
        assert!(ConversionConfig::builder()
            .bold_heading_min_font_size(f32::INFINITY)
            .build()
            .is_err());
        assert!(ConversionConfig::builder()
            .bold_heading_min_font_size(-1.0)
            .build()
            .is_err());
    }

    #[test]
    fn builder_rejects_nan_ratio() {
        assert!(ConversionConfig::builder()
            .heading_size_ratio(f32::NAN)
            .build()
            .is_err());
    }

    #[test]
    fn heading_level_thresholds() {
        let l = HeadingLevels::default();
        assert_eq!(l.level_for(24.0), 1);
        assert_eq!(l.level_for(20.0), 2);
        assert_eq!(l.level_for(18.0), 2);
        assert_eq!(l.level_for(15.0), 3);
        assert_eq!(l.level_for(14.0), 4);
        assert_eq!(l.level_for(9.0), 4);
    }

    #[test]
    fn disabled_restoration_has_no_substitutions() {
        assert!(RestorationPolicy::Disabled.substitutions().is_empty());
    }

    #[test]
    fn page_selection_to_indices() {
        assert_eq!(PageSelection::All.to_indices(5), vec![0, 1, 2, 3, 4]);
        assert_eq!(PageSelection::Single(3).to_indices(5), vec![2]);
        assert_eq!(PageSelection::Single(6).to_indices(5), Vec::<usize>::new());
        assert_eq!(PageSelection::Range(2, 4).to_indices(5), vec![1, 2, 3]);
        assert_eq!(PageSelection::Range(4, 9).to_indices(5), vec![3, 4]);
        assert_eq!(PageSelection::Set(vec![3, 1, 3, 7]).to_indices(5), vec![0, 2]);
    }

    #[test]
    fn separator_rendering() {
        assert_eq!(
            PageSeparator::Comment.render(2).as_deref(),
            Some("\n\n<!-- Page 2 -->\n\n")
        );
        assert_eq!(PageSeparator::None.render(2), None);
        assert_eq!(
            PageSeparator::Custom("<hr>".into()).render(3).as_deref(),
            Some("\n\n<hr>\n\n")
        );
    }

    #[test]
    fn page_selection_from_str() {
        assert_eq!("ALL".parse::<PageSelection>().unwrap(), PageSelection::All);
        assert_eq!(" 5 ".parse::<PageSelection>().unwrap(), PageSelection::Single(5));
        assert_eq!("3-15".parse::<PageSelection>().unwrap(), PageSelection::Range(3, 15));
        assert_eq!(
            "1, 3,5".parse::<PageSelection>().unwrap(),
            PageSelection::Set(vec![1, 3, 5])
        );
        assert!("0".parse::<PageSelection>().is_err());
        assert!("9-2".parse::<PageSelection>().is_err());
        assert!("1,x".parse::<PageSelection>().is_err());
    }

    #[test]
    fn page_separator_from_str() {
        assert_eq!("none".parse::<PageSeparator>(), Ok(PageSeparator::None));
        assert_eq!("HR".parse::<PageSeparator>(), Ok(PageSeparator::HorizontalRule));
        assert_eq!("comment".parse::<PageSeparator>(), Ok(PageSeparator::Comment));
        assert_eq!(
            "<hr/>".parse::<PageSeparator>(),
            Ok(PageSeparator::Custom("<hr/>".into()))
        );
    }
}
