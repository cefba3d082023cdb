//! # pdfstruct
//!
//! Structured JSON extraction for fund factsheet PDFs.
//!
//! Every page is reduced to a list of content blocks (paragraphs, chart
//! captions, tables, and links), each tagged with the section and
//! sub-section it sits under. Sections are inferred per page from
//! numbered headings ("2.3 Expense ratio") or from the two largest font
//! sizes on the page.
//!
//! ## Quick Start
//!
//! ```no_run
//! fn main() -> pdfstruct::Result<()> {
//!     let doc = pdfstruct::convert_file("factsheet.pdf", "factsheet.json")?;
//!
//!     for page in &doc.pages {
//!         for block in page.paragraphs() {
//!             println!("{:?} / {:?}: {:?}", block.section(), block.sub_section(), block.text());
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Heading inference**: numbering prefixes, then font-size rank
//! - **Tables**: detected from text alignment, empty cells as `null`
//! - **Links**: URI annotations with their page rectangle
//! - **Parallel processing**: pages are converted with Rayon

pub mod convert;
pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;
pub mod structure;

// Re-export commonly used types
pub use convert::{CancelToken, ContextPolicy, ConvertOptions, PageSelection, PdfConverter};
pub use detect::{is_pdf_bytes, sniff_bytes, sniff_path, PdfHeader};
pub use error::{Error, Result, Stage};
pub use model::{BlockKind, ContentBlock, Document, Meta, Page, Rect, SectionContext, TableData};
pub use parser::{LopdfBackend, PageLayout, PdfBackend, TableDetectorConfig};
pub use render::{from_json, to_json, write_json, JsonFormat};
pub use structure::{Anchor, HeadingLevel, SectionMap};

use std::path::Path;

/// Convert a PDF file and write the result to `output` as pretty JSON.
///
/// # Arguments
///
/// * `input` - Path to the PDF file
/// * `output` - Path of the JSON file to create
///
/// # Example
///
/// ```no_run
/// let doc = pdfstruct::convert_file("factsheet.pdf", "factsheet.json").unwrap();
/// println!("Pages: {}", doc.page_count());
/// ```
pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> Result<Document> {
    convert_file_with_options(input, output, ConvertOptions::default())
}

/// Convert a PDF file with custom options and write the JSON result.
///
/// # Example
///
/// ```no_run
/// use pdfstruct::{convert_file_with_options, ConvertOptions, PageSelection};
///
/// let options = ConvertOptions::new()
///     .with_pages(PageSelection::Range(1..=2))
///     .compact();
/// convert_file_with_options("factsheet.pdf", "out.json", options).unwrap();
/// ```
pub fn convert_file_with_options<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    options: ConvertOptions,
) -> Result<Document> {
    PdfConverter::open(input, options)?.convert_to_file(output)
}

/// Parse a PDF file into a structured document without writing anything.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    parse_file_with_options(path, ConvertOptions::default())
}

/// Parse a PDF file with custom options.
pub fn parse_file_with_options<P: AsRef<Path>>(path: P, options: ConvertOptions) -> Result<Document> {
    PdfConverter::open(path, options)?.convert()
}

/// Parse a PDF held in memory.
///
/// `source_pdf` is the name recorded in the document's metadata.
///
/// # Example
///
/// ```no_run
/// let data = std::fs::read("factsheet.pdf").unwrap();
/// let doc = pdfstruct::parse_bytes(&data, "factsheet.pdf").unwrap();
/// ```
pub fn parse_bytes(data: &[u8], source_pdf: &str) -> Result<Document> {
    PdfConverter::from_bytes(data, source_pdf, ConvertOptions::default())?.convert()
}
