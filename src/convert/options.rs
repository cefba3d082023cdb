//! Conversion options.

use std::fmt;
use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::parser::TableDetectorConfig;
use crate::render::JsonFormat;

/// Callback invoked after each page with `(pages_done, pages_total)`.
pub type ProgressFn = Arc<dyn Fn(u32, u32) + Send + Sync>;

/// Options for converting a PDF into a structured document.
#[derive(Clone)]
pub struct ConvertOptions {
    /// Which pages to convert
    pub pages: PageSelection,

    /// Whether to process pages in parallel
    pub parallel: bool,

    /// Which non-text blocks receive a section context
    pub context: ContextPolicy,

    /// JSON layout used when writing output
    pub json_format: JsonFormat,

    /// Table detection tuning
    pub tables: TableDetectorConfig,

    /// Flag checked before each page
    pub cancel: Option<CancelToken>,

    /// Per-page progress callback
    pub progress: Option<ProgressFn>,
}

impl ConvertOptions {
    /// Create new conversion options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.pages = pages;
        self
    }

    /// Enable or disable parallel processing.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Set the context policy for tables and links.
    pub fn with_context(mut self, context: ContextPolicy) -> Self {
        self.context = context;
        self
    }

    /// Set the JSON output format.
    pub fn with_json_format(mut self, format: JsonFormat) -> Self {
        self.json_format = format;
        self
    }

    /// Write compact JSON.
    pub fn compact(mut self) -> Self {
        self.json_format = JsonFormat::Compact;
        self
    }

    /// Set table detector configuration.
    pub fn with_table_config(mut self, config: TableDetectorConfig) -> Self {
        self.tables = config;
        self
    }

    /// Attach a cancellation token.
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Attach a progress callback.
    pub fn with_progress<F>(mut self, progress: F) -> Self
    where
        F: Fn(u32, u32) + Send + Sync + 'static,
    {
        self.progress = Some(Arc::new(progress));
        self
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            pages: PageSelection::All,
            parallel: true,
            context: ContextPolicy::default(),
            json_format: JsonFormat::Pretty,
            tables: TableDetectorConfig::default(),
            cancel: None,
            progress: None,
        }
    }
}

impl fmt::Debug for ConvertOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConvertOptions")
            .field("pages", &self.pages)
            .field("parallel", &self.parallel)
            .field("context", &self.context)
            .field("json_format", &self.json_format)
            .field("tables", &self.tables)
            .field("cancel", &self.cancel)
            .field("progress", &self.progress.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Which block kinds besides text lines get a resolved section context.
///
/// Tables and links carry no section context unless enabled here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContextPolicy {
    /// Resolve tables from their top edge
    pub tables: bool,
    /// Resolve links from their rectangle's top edge
    pub links: bool,
}

impl ContextPolicy {
    /// Resolve context for tables and links alike.
    pub fn all() -> Self {
        Self {
            tables: true,
            links: true,
        }
    }
}

/// Shared flag for aborting a running conversion.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; pages not yet started are skipped.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Page selection for conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageSelection {
    /// Convert all pages
    #[default]
    All,
    /// Convert a range of pages (inclusive, 1-indexed)
    Range(RangeInclusive<u32>),
    /// Convert specific pages (1-indexed, ascending)
    Pages(Vec<u32>),
    /// Convert the union of several inclusive ranges, ordered by start
    Ranges(Vec<RangeInclusive<u32>>),
}

impl PageSelection {
    /// Check if a page number should be included.
    pub fn includes(&self, page: u32) -> bool {
        match self {
            PageSelection::All => true,
            PageSelection::Range(range) => range.contains(&page),
            PageSelection::Pages(pages) => pages.contains(&page),
            PageSelection::Ranges(ranges) => ranges.iter().any(|r| r.contains(&page)),
        }
    }

    /// Selected page numbers of a document with `page_count` pages, ascending.
    ///
    /// A range may run past the last page, but it must start inside the
    /// document; listed pages must all exist. A single page inside a list
    /// is a one-page range.
    pub fn resolve(&self, page_count: u32) -> Result<Vec<u32>> {
        let out_of_range = match self {
            PageSelection::All => None,
            PageSelection::Range(range) => Some(*range.start()).filter(|p| *p > page_count),
            PageSelection::Pages(pages) => pages.iter().copied().find(|p| *p > page_count),
            PageSelection::Ranges(ranges) => ranges
                .iter()
                .map(|r| *r.start())
                .find(|p| *p > page_count),
        };

        if let Some(page) = out_of_range {
            return Err(Error::PageOutOfRange(page, page_count));
        }

        Ok((1..=page_count).filter(|p| self.includes(*p)).collect())
    }

    /// Parse a page selection string (e.g., "1-10", "1,3,5,7-10").
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            return Ok(PageSelection::All);
        }

        if !s.contains(',') {
            if let Some((start, end)) = s.split_once('-') {
                let (start, end) = (parse_page(start, s)?, parse_page(end, s)?);
                if start > end {
                    return Err(Error::InvalidPageRange(s.to_string()));
                }
                return Ok(PageSelection::Range(start..=end));
            }
        }

        let mut ranges = Vec::new();
        for part in s.split(',') {
            let range = match part.split_once('-') {
                Some((start, end)) => {
                    let (start, end) = (parse_page(start, s)?, parse_page(end, s)?);
                    if start > end {
                        return Err(Error::InvalidPageRange(s.to_string()));
                    }
                    start..=end
                }
                None => {
                    let page = parse_page(part, s)?;
                    page..=page
                }
            };
            ranges.push(range);
        }

        ranges.sort_by_key(|r| (*r.start(), *r.end()));
        ranges.dedup();
        Ok(PageSelection::Ranges(ranges))
    }
}

fn parse_page(part: &str, whole: &str) -> Result<u32> {
    match part.trim().parse::<u32>() {
        Ok(0) | Err(_) => Err(Error::InvalidPageRange(whole.to_string())),
        Ok(n) => Ok(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_builder() {
        let options = ConvertOptions::new()
            .sequential()
            .compact()
            .with_context(ContextPolicy::all())
            .with_pages(PageSelection::Range(1..=2));

        assert!(!options.parallel);
        assert_eq!(options.json_format, JsonFormat::Compact);
        assert!(options.context.tables && options.context.links);
        assert_eq!(options.pages, PageSelection::Range(1..=2));
    }

    #[test]
    fn test_options_defaults() {
        let options = ConvertOptions::default();
        assert!(options.parallel);
        assert_eq!(options.context, ContextPolicy::default());
        assert!(!options.context.tables);
        assert!(!options.is_cancelled());
        assert!(format!("{:?}", options).contains("ConvertOptions"));
    }

    #[test]
    fn test_cancel_token_shared() {
        let token = CancelToken::new();
        let options = ConvertOptions::new().with_cancel_token(token.clone());
        assert!(!options.is_cancelled());
        token.cancel();
        assert!(options.is_cancelled());
    }

    #[test]
    fn test_page_selection_includes() {
        let range = PageSelection::Range(5..=10);
        assert!(!range.includes(4));
        assert!(range.includes(5));
        assert!(range.includes(10));
        assert!(!range.includes(11));

        let pages = PageSelection::Pages(vec![1, 3, 5, 7]);
        assert!(pages.includes(3));
        assert!(!pages.includes(2));
        assert!(PageSelection::All.includes(100));

        let ranges = PageSelection::Ranges(vec![1..=1, 4..=u32::MAX]);
        assert!(ranges.includes(1));
        assert!(!ranges.includes(2));
        assert!(ranges.includes(4_000_000_000));
    }

    #[test]
    fn test_page_selection_parse() {
        assert_eq!(PageSelection::parse("all").unwrap(), PageSelection::All);
        assert_eq!(PageSelection::parse("").unwrap(), PageSelection::All);
        assert_eq!(PageSelection::parse("2-4").unwrap(), PageSelection::Range(2..=4));
        assert_eq!(
            PageSelection::parse("7,1,3,5-7").unwrap(),
            PageSelection::Ranges(vec![1..=1, 3..=3, 5..=7, 7..=7])
        );
    }

    #[test]
    fn test_page_selection_parse_huge_range_stays_small() {
        let selection = PageSelection::parse("1,2-4000000000").unwrap();
        assert_eq!(selection, PageSelection::Ranges(vec![1..=1, 2..=4_000_000_000]));
        assert_eq!(selection.resolve(3).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_list_ranges_clip_like_single_range() {
        let single = PageSelection::parse("3-5").unwrap();
        let listed = PageSelection::parse("1,3-5").unwrap();
        assert_eq!(single.resolve(3).unwrap(), vec![3]);
        assert_eq!(listed.resolve(3).unwrap(), vec![1, 3]);

        assert!(matches!(
            PageSelection::parse("1,4-5").unwrap().resolve(3),
            Err(Error::PageOutOfRange(4, 3))
        ));
        assert!(matches!(
            PageSelection::parse("2,9").unwrap().resolve(3),
            Err(Error::PageOutOfRange(9, 3))
        ));
    }

    #[test]
    fn test_page_selection_parse_errors() {
        for bad in ["x", "0", "3-1", "1,,2", "1-a"] {
            assert!(
                matches!(PageSelection::parse(bad), Err(Error::InvalidPageRange(_))),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_page_selection_resolve() {
        assert_eq!(PageSelection::All.resolve(3).unwrap(), vec![1, 2, 3]);
        assert_eq!(PageSelection::Range(2..=9).resolve(3).unwrap(), vec![2, 3]);
        assert_eq!(PageSelection::Pages(vec![3, 1]).resolve(3).unwrap(), vec![1, 3]);
        assert!(PageSelection::All.resolve(0).unwrap().is_empty());

        assert!(matches!(
            PageSelection::Pages(vec![1, 5]).resolve(3),
            Err(Error::PageOutOfRange(5, 3))
        ));
        assert!(matches!(
            PageSelection::Range(4..=6).resolve(3),
            Err(Error::PageOutOfRange(4, 3))
        ));
    }
}
