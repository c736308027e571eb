//! Extraction options and page selection.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Default directory name (relative to the output directory) for extracted images.
pub const DEFAULT_IMAGE_PREFIX: &str = "images";

/// Options for extracting page blocks from a PDF.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Which pages to extract
    pub pages: PageSelection,

    /// Directory where images are written as PNG. `None` skips writing but
    /// still emits image blocks.
    pub image_dir: Option<PathBuf>,

    /// Prefix of the `path` recorded in image blocks
    pub image_prefix: String,

    /// Merge adjacent same-font spans on one baseline into a single block
    pub merge_spans: bool,
}

impl ExtractOptions {
    /// Create new extract options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (log and skip broken pages).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }

    /// Write images into `dir`.
    pub fn with_image_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.image_dir = Some(dir.into());
        self
    }

    /// Set the path prefix recorded in image blocks.
    pub fn with_image_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.image_prefix = prefix.into();
        self
    }

    /// Enable or disable span merging.
    pub fn with_merge_spans(mut self, merge: bool) -> Self {
        self.merge_spans = merge;
        self
    }

    /// Path recorded for an image file name, e.g. `images/page_1_image_2.png`.
    pub fn image_path(&self, file_name: &str) -> String {
        let prefix = self.image_prefix.trim_end_matches(['/', '\\']);
        if prefix.is_empty() {
            file_name.to_string()
        } else {
            format!("{}/{}", prefix, file_name)
        }
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Strict,
            pages: PageSelection::All,
            image_dir: None,
            image_prefix: DEFAULT_IMAGE_PREFIX.to_string(),
            merge_spans: true,
        }
    }
}

/// Error handling mode during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on the first broken page
    #[default]
    Strict,
    /// Log broken pages and continue
    Lenient,
}

/// Pages to extract.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    /// Every page
    #[default]
    All,
    /// An inclusive, 1-indexed range
    Range(RangeInclusive<u32>),
    /// Specific 1-indexed pages, sorted and deduplicated
    Pages(Vec<u32>),
}

impl PageSelection {
    /// Check if a page number should be included.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.binary_search(&page).is_ok(),
        }
    }

    /// Parse a selection such as `all`, `3-7` or `1,3,5-7`.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(PageSelection::All);
        }

        let mut parts = s.split(',').map(str::trim).peekable();
        let first = parts.next().unwrap_or_default();
        if parts.peek().is_none() {
            if let Some((start, end)) = first.split_once('-') {
                return Ok(PageSelection::Range(parse_range(start, end, s)?));
            }
        }

        let mut pages = BTreeSet::new();
        for part in std::iter::once(first).chain(parts) {
            match part.split_once('-') {
                Some((start, end)) => pages.extend(parse_range(start, end, s)?),
                None => {
                    pages.insert(parse_page(part, s)?);
                }
            }
        }
        Ok(PageSelection::Pages(pages.into_iter().collect()))
    }
}

fn parse_page(value: &str, spec: &str) -> Result<u32> {
    match value.trim().parse::<u32>() {
        Ok(page) if page > 0 => Ok(page),
        _ => Err(Error::InvalidPageRange(format!(
            "'{}' in '{}' is not a page number",
            value.trim(),
            spec
        ))),
    }
}

fn parse_range(start: &str, end: &str, spec: &str) -> Result<RangeInclusive<u32>> {
    let start = parse_page(start, spec)?;
    let end = parse_page(end, spec)?;
    if start > end {
        return Err(Error::InvalidPageRange(format!(
            "range {}-{} in '{}' is reversed",
            start, end, spec
        )));
    }
    Ok(start..=end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_options_builder() {
        let options = ExtractOptions::new()
            .lenient()
            .with_image_dir("/tmp/out/images")
            .with_image_prefix("img/")
            .with_merge_spans(false);

        assert_eq!(options.error_mode, ErrorMode::Lenient);
        assert_eq!(options.image_dir, Some(PathBuf::from("/tmp/out/images")));
        assert_eq!(options.image_path("page_1_image_1.png"), "img/page_1_image_1.png");
        assert!(!options.merge_spans);
    }

    #[test]
    fn test_default_options() {
        let options = ExtractOptions::default();
        assert_eq!(options.error_mode, ErrorMode::Strict);
        assert!(options.image_dir.is_none());
        assert_eq!(options.image_path("a.png"), "images/a.png");
        assert_eq!(
            ExtractOptions::new().with_image_prefix("").image_path("a.png"),
            "a.png"
        );
    }

    #[test]
    fn test_page_selection_includes() {
        assert!(PageSelection::All.includes(100));

        let range = PageSelection::Range(5..=10);
        assert!(!range.includes(4));
        assert!(range.includes(5));
        assert!(range.includes(10));
        assert!(!range.includes(11));

        let pages = PageSelection::Pages(vec![1, 3, 5, 7]);
        assert!(pages.includes(3));
        assert!(!pages.includes(2));
    }

    #[test]
    fn test_page_selection_parse() {
        assert_eq!(PageSelection::parse("all").unwrap(), PageSelection::All);
        assert_eq!(PageSelection::parse(" ").unwrap(), PageSelection::All);
        assert_eq!(
            PageSelection::parse("1-10").unwrap(),
            PageSelection::Range(1..=10)
        );
        assert_eq!(
            PageSelection::parse("7,1,3,5-7,10").unwrap(),
            PageSelection::Pages(vec![1, 3, 5, 6, 7, 10])
        );
        assert_eq!(
            PageSelection::parse("4").unwrap(),
            PageSelection::Pages(vec![4])
        );
    }

    #[test]
    fn test_page_selection_parse_errors() {
        assert!(matches!(
            PageSelection::parse("0-3"),
            Err(Error::InvalidPageRange(_))
        ));
        assert!(matches!(
            PageSelection::parse("9-2"),
            Err(Error::InvalidPageRange(_))
        ));
        assert!(matches!(
            PageSelection::parse("1,x"),
            Err(Error::InvalidPageRange(_))
        ));
    }
}
