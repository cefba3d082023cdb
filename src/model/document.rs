//! Document-level types.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::Page;

/// A converted PDF document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Provenance information
    pub meta: Meta,

    /// Pages in ascending page-number order
    pub pages: Vec<Page>,
}

impl Document {
    /// Create an empty document for the given source name.
    pub fn new(source_pdf: impl Into<String>) -> Self {
        Self {
            meta: Meta {
                source_pdf: source_pdf.into(),
            },
            pages: Vec::new(),
        }
    }

    /// Get the number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Get a page by its page number.
    pub fn get_page(&self, page_number: u32) -> Option<&Page> {
        self.pages.iter().find(|p| p.page_number == page_number)
    }

    /// Add a page to the document.
    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Check if the document has any pages.
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Total number of content blocks across all pages.
    pub fn block_count(&self) -> usize {
        self.pages.iter().map(Page::block_count).sum()
    }
}

/// Document provenance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    /// Base name of the source PDF
    pub source_pdf: String,
}

/// Base name of a path as used in [`Meta::source_pdf`].
pub fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_pages() {
        let mut doc = Document::new("fund.pdf");
        doc.add_page(Page::new(1));
        doc.add_page(Page::new(2));

        assert_eq!(doc.meta.source_pdf, "fund.pdf");
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.get_page(2).map(|p| p.page_number), Some(2));
        assert!(doc.get_page(3).is_none());
        assert_eq!(doc.block_count(), 0);
    }

    #[test]
    fn test_source_name() {
        assert_eq!(
            source_name(Path::new("/data/[Fund Factsheet - May].pdf")),
            "[Fund Factsheet - May].pdf"
        );
        assert_eq!(source_name(Path::new("plain.pdf")), "plain.pdf");
    }
}
