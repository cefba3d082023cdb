//! PDF extraction: text lines, tables, and links per page.

mod backend;
mod layout;
mod links;
mod table_detector;

pub use backend::{LopdfBackend, PageLayout, PdfBackend, TableGrid};
pub use layout::{group_spans_into_lines, LayoutAnalyzer, PageFrame, TextLine, TextSpan};
pub use links::{extract_page_links, LinkAnnotation};
pub use table_detector::{DetectedTable, TableDetector, TableDetectorConfig, TableRowData};
