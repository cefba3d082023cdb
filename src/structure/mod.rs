//! Section structure inferred from page layout.
//!
//! Headings are recognised per page from numbering prefixes or relative
//! font size, folded into a map of section anchors, and used to tag every
//! line with the section it falls under.

mod classify;
mod headings;
mod sections;

pub use classify::{classify_line, classify_lines, is_chart_caption};
pub use headings::{classify_heading, detect_headings, numbering_level, FontRanking, Heading, HeadingLevel};
pub use sections::{Anchor, SectionMap};
