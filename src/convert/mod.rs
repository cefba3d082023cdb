//! Conversion of PDF pages into structured content.
//!
//! Each page is handled on its own: lines are extracted, headings found,
//! section anchors built, and every line, table and link turned into a
//! content block. Pages never share state, so they may be processed in
//! parallel.
//!
//! # Example
//!
//! ```no_run
//! use pdfstruct::convert::{ContextPolicy, ConvertOptions, PageSelection, PdfConverter};
//!
//! fn main() -> pdfstruct::Result<()> {
//!     let options = ConvertOptions::new()
//!         .with_pages(PageSelection::parse("1-2")?)
//!         .with_context(ContextPolicy::all());
//!
//!     let converter = PdfConverter::open("factsheet.pdf", options)?;
//!     let doc = converter.convert_to_file("factsheet.json")?;
//!     println!("{} pages", doc.page_count());
//!     Ok(())
//! }
//! ```

mod assembler;
mod options;
mod pdf;

pub use assembler::{assemble_page, page_sections};
pub use options::{CancelToken, ContextPolicy, ConvertOptions, PageSelection, ProgressFn};
pub use pdf::PdfConverter;
