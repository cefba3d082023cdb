//! Section anchors and position lookup.

use crate::model::SectionContext;
use crate::parser::TextLine;

use super::headings::{detect_headings, Heading, HeadingLevel};

static NO_CONTEXT: SectionContext = SectionContext::NONE;

/// Section context in effect from a vertical position downward.
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    pub position: f32,
    pub context: SectionContext,
}

impl Anchor {
    pub fn new(position: f32, context: SectionContext) -> Self {
        Self { position, context }
    }
}

/// Anchors of one page in ascending position order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionMap {
    anchors: Vec<Anchor>,
}

impl SectionMap {
    /// Build the map for a page directly from its lines.
    pub fn build(lines: &[TextLine]) -> Self {
        Self::from_headings(&detect_headings(lines))
    }

    /// Fold headings (ordered top to bottom) into running anchors.
    ///
    /// A level-1 heading starts a new section and clears the sub-section;
    /// a level-2 heading only replaces the sub-section. Without headings the
    /// map holds a single empty anchor at position 0.
    pub fn from_headings(headings: &[Heading]) -> Self {
        if headings.is_empty() {
            return Self {
                anchors: vec![Anchor::new(0.0, SectionContext::NONE)],
            };
        }

        let mut current = SectionContext::NONE;
        let anchors = headings
            .iter()
            .map(|heading| {
                match heading.level {
                    HeadingLevel::Section => {
                        current.section = Some(heading.text.clone());
                        current.sub_section = None;
                    }
                    HeadingLevel::SubSection => {
                        current.sub_section = Some(heading.text.clone());
                    }
                }
                Anchor::new(heading.position, current.clone())
            })
            .collect();

        Self { anchors }
    }

    /// Build a map from explicit anchors, sorting them by position.
    pub fn from_anchors(mut anchors: Vec<Anchor>) -> Self {
        anchors.sort_by(|a, b| a.position.total_cmp(&b.position));
        Self { anchors }
    }

    /// Context of the last anchor at or above `position`.
    ///
    /// Positions above the first anchor resolve to an empty context.
    pub fn resolve(&self, position: f32) -> &SectionContext {
        let idx = self.anchors.partition_point(|a| a.position <= position);
        match idx {
            0 => &NO_CONTEXT,
            i => &self.anchors[i - 1].context,
        }
    }

    pub fn anchors(&self) -> &[Anchor] {
        &self.anchors
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }
}
