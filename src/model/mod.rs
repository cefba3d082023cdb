//! Output model for converted documents.
//!
//! Content blocks are a sum type with a shared section-context envelope;
//! the JSON form is the flat, uniformly-nulled schema produced by the
//! serde adapter on [`ContentBlock`].

mod content;
mod document;
mod geometry;
mod page;

pub use content::{BlockKind, ContentBlock, SectionContext, TableData};
pub use document::{source_name, Document, Meta};
pub use geometry::Rect;
pub use page::Page;
