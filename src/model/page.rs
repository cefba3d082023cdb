//! Page-level types.

use serde::{Deserialize, Serialize};

use super::ContentBlock;

/// A single page of the converted document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Page number (1-indexed)
    pub page_number: u32,

    /// Content blocks in output order
    pub content: Vec<ContentBlock>,
}

impl Page {
    /// Create an empty page.
    pub fn new(page_number: u32) -> Self {
        Self {
            page_number,
            content: Vec::new(),
        }
    }

    /// Append a block to the page.
    pub fn push(&mut self, block: ContentBlock) {
        self.content.push(block);
    }

    /// Check if the page has no content.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Number of blocks on the page.
    pub fn block_count(&self) -> usize {
        self.content.len()
    }

    /// Iterate over paragraph blocks.
    pub fn paragraphs(&self) -> impl Iterator<Item = &ContentBlock> {
        self.content.iter().filter(|b| b.is_paragraph())
    }

    /// Iterate over table blocks.
    pub fn tables(&self) -> impl Iterator<Item = &ContentBlock> {
        self.content.iter().filter(|b| b.is_table())
    }

    /// Iterate over link blocks.
    pub fn links(&self) -> impl Iterator<Item = &ContentBlock> {
        self.content.iter().filter(|b| b.is_link())
    }
}
