//! PDF backend abstraction layer.
//!
//! The structure pipeline consumes pages through [`PdfBackend`], which hands
//! out already-extracted lines, tables, and links. This keeps `lopdf` types
//! out of the pipeline and lets tests drive it with synthetic pages.

use std::collections::BTreeMap;
use std::path::Path;

use lopdf::{Document as LopdfDocument, ObjectId};

use crate::error::{Error, Result};
use crate::model::{Rect, TableData};

use super::layout::{group_spans_into_lines, LayoutAnalyzer, TextLine};
use super::links::{extract_page_links, LinkAnnotation};
use super::table_detector::{TableDetector, TableDetectorConfig};

/// A table grid as extracted from a page.
#[derive(Debug, Clone, PartialEq)]
pub struct TableGrid {
    /// Row-major cells
    pub rows: TableData,
    /// Region the table occupies, when known
    pub bbox: Option<Rect>,
}

impl TableGrid {
    pub fn new(rows: TableData) -> Self {
        Self { rows, bbox: None }
    }

    pub fn with_bbox(mut self, bbox: Rect) -> Self {
        self.bbox = Some(bbox);
        self
    }
}

/// Everything the pipeline needs from one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    /// Text lines, top to bottom
    pub lines: Vec<TextLine>,
    /// Detected tables, top to bottom
    pub tables: Vec<TableGrid>,
    /// Link annotations in annotation order
    pub links: Vec<LinkAnnotation>,
}

/// Page-level access to a loaded PDF.
///
/// Implementations must be shareable across threads so pages can be
/// extracted in parallel.
pub trait PdfBackend: Sync {
    /// Number of pages in the document.
    fn page_count(&self) -> u32;

    /// Extract the layout of a page (1-indexed).
    fn page_layout(&self, page_number: u32) -> Result<PageLayout>;
}

/// Concrete [`PdfBackend`] backed by `lopdf::Document`.
pub struct LopdfBackend {
    doc: LopdfDocument,
    pages: BTreeMap<u32, ObjectId>,
    tables: TableDetector,
}

impl LopdfBackend {
    /// Load from a file path.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        LopdfDocument::load(path)
            .map(Self::from_document)
            .map_err(map_load_error)
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        LopdfDocument::load_mem(data)
            .map(Self::from_document)
            .map_err(map_load_error)
    }

    /// Wrap an already loaded document.
    pub fn from_document(doc: LopdfDocument) -> Self {
        let pages = doc.get_pages();
        Self {
            doc,
            pages,
            tables: TableDetector::new(),
        }
    }

    /// Use a custom table detector configuration.
    pub fn with_table_config(mut self, config: TableDetectorConfig) -> Self {
        self.tables = TableDetector::with_config(config);
        self
    }

    fn page_id(&self, page_number: u32) -> Result<ObjectId> {
        self.pages
            .get(&page_number)
            .copied()
            .ok_or(Error::PageOutOfRange(page_number, self.page_count()))
    }
}

impl PdfBackend for LopdfBackend {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_layout(&self, page_number: u32) -> Result<PageLayout> {
        let page_id = self.page_id(page_number)?;
        let analyzer = LayoutAnalyzer::new(&self.doc);
        let frame = analyzer.page_frame(page_id);

        let spans = analyzer.extract_page_spans(page_id)?;
        let tables: Vec<TableGrid> = self
            .tables
            .detect(&spans)
            .iter()
            .map(|t| TableGrid::new(t.to_grid()).with_bbox(t.bbox(&frame)))
            .collect();
        let lines = group_spans_into_lines(spans, &frame);
        let links = extract_page_links(&self.doc, page_id, &frame);

        log::debug!(
            "Page {}: {} lines, {} tables, {} links",
            page_number,
            lines.len(),
            tables.len(),
            links.len()
        );

        Ok(PageLayout {
            lines,
            tables,
            links,
        })
    }
}

fn map_load_error(e: lopdf::Error) -> Error {
    match e {
        lopdf::Error::Decryption(_) => Error::Encrypted,
        _ => Error::from(e),
    }
}
