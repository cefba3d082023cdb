//! Content blocks and their section context.

use serde::{Deserialize, Serialize};

use super::Rect;

/// Rows of cells; a cell the detector found empty is `None`.
pub type TableData = Vec<Vec<Option<String>>>;

/// The section and sub-section a block sits in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionContext {
    /// Enclosing level-1 heading text
    pub section: Option<String>,
    /// Enclosing level-2 heading text
    pub sub_section: Option<String>,
}

impl SectionContext {
    /// Context with neither section nor sub-section.
    pub const NONE: SectionContext = SectionContext {
        section: None,
        sub_section: None,
    };

    /// Create a context from optional section and sub-section titles.
    pub fn new(section: Option<String>, sub_section: Option<String>) -> Self {
        Self {
            section,
            sub_section,
        }
    }

    /// Whether neither a section nor a sub-section is set.
    pub fn is_none(&self) -> bool {
        self.section.is_none() && self.sub_section.is_none()
    }
}

/// Variant-specific payload of a content block.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    /// A line of body text
    Paragraph {
        /// Raw line text
        text: String,
    },
    /// A chart, known only by its caption
    Chart {
        /// Caption text
        description: String,
    },
    /// A detected table grid
    Table {
        /// Row-major cell grid
        table_data: TableData,
    },
    /// A link annotation
    Link {
        /// Target URI, if the annotation carries one
        uri: Option<String>,
        /// Annotation rectangle
        from: Rect,
    },
}

/// One item of a page's content list.
///
/// Serializes to a flat object tagged by `type` in which every field of the
/// variant's schema is present, with `null` for the ones it does not use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireBlock", into = "WireBlock")]
pub struct ContentBlock {
    /// Section context shared by all variants
    pub context: SectionContext,
    /// Variant payload
    pub kind: BlockKind,
}

impl ContentBlock {
    /// Create a paragraph block.
    pub fn paragraph(context: SectionContext, text: impl Into<String>) -> Self {
        Self {
            context,
            kind: BlockKind::Paragraph { text: text.into() },
        }
    }

    /// Create a chart block from its caption.
    pub fn chart(context: SectionContext, description: impl Into<String>) -> Self {
        Self {
            context,
            kind: BlockKind::Chart {
                description: description.into(),
            },
        }
    }

    /// Create a table block.
    pub fn table(context: SectionContext, table_data: TableData) -> Self {
        Self {
            context,
            kind: BlockKind::Table { table_data },
        }
    }

    /// Create a link block.
    pub fn link(context: SectionContext, uri: Option<String>, from: Rect) -> Self {
        Self {
            context,
            kind: BlockKind::Link { uri, from },
        }
    }

    /// The `type` tag used in JSON output.
    pub fn type_name(&self) -> &'static str {
        match self.kind {
            BlockKind::Paragraph { .. } => "paragraph",
            BlockKind::Chart { .. } => "chart",
            BlockKind::Table { .. } => "table",
            BlockKind::Link { .. } => "link",
        }
    }

    /// Text carried by paragraph and chart blocks.
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            BlockKind::Paragraph { text } => Some(text),
            BlockKind::Chart { description } => Some(description),
            _ => None,
        }
    }

    /// Section title, if any.
    pub fn section(&self) -> Option<&str> {
        self.context.section.as_deref()
    }

    /// Sub-section title, if any.
    pub fn sub_section(&self) -> Option<&str> {
        self.context.sub_section.as_deref()
    }

    pub fn is_paragraph(&self) -> bool {
        matches!(self.kind, BlockKind::Paragraph { .. })
    }

    pub fn is_chart(&self) -> bool {
        matches!(self.kind, BlockKind::Chart { .. })
    }

    pub fn is_table(&self) -> bool {
        matches!(self.kind, BlockKind::Table { .. })
    }

    pub fn is_link(&self) -> bool {
        matches!(self.kind, BlockKind::Link { .. })
    }
}

/// Flat on-disk shape of a [`ContentBlock`].
#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireBlock {
    Paragraph {
        section: Option<String>,
        sub_section: Option<String>,
        text: String,
    },
    Chart {
        section: Option<String>,
        sub_section: Option<String>,
        description: String,
        table_data: Option<TableData>,
        image_name: Option<String>,
    },
    Table {
        section: Option<String>,
        sub_section: Option<String>,
        description: Option<String>,
        table_data: TableData,
    },
    Link {
        section: Option<String>,
        sub_section: Option<String>,
        uri: Option<String>,
        from: Rect,
    },
}

impl From<ContentBlock> for WireBlock {
    fn from(block: ContentBlock) -> Self {
        let SectionContext {
            section,
            sub_section,
        } = block.context;

        match block.kind {
            BlockKind::Paragraph { text } => WireBlock::Paragraph {
                section,
                sub_section,
                text,
            },
            BlockKind::Chart { description } => WireBlock::Chart {
                section,
                sub_section,
                description,
                table_data: None,
                image_name: None,
            },
            BlockKind::Table { table_data } => WireBlock::Table {
                section,
                sub_section,
                description: None,
                table_data,
            },
            BlockKind::Link { uri, from } => WireBlock::Link {
                section,
                sub_section,
                uri,
                from,
            },
        }
    }
}

impl From<WireBlock> for ContentBlock {
    fn from(wire: WireBlock) -> Self {
        match wire {
            WireBlock::Paragraph {
                section,
                sub_section,
                text,
            } => ContentBlock::paragraph(SectionContext::new(section, sub_section), text),
            // Charts never carry extracted data or images.
            WireBlock::Chart {
                section,
                sub_section,
                description,
                ..
            } => ContentBlock::chart(SectionContext::new(section, sub_section), description),
            WireBlock::Table {
                section,
                sub_section,
                table_data,
                ..
            } => ContentBlock::table(SectionContext::new(section, sub_section), table_data),
            WireBlock::Link {
                section,
                sub_section,
                uri,
                from,
            } => ContentBlock::link(SectionContext::new(section, sub_section), uri, from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn ctx(section: &str) -> SectionContext {
        SectionContext::new(Some(section.to_string()), None)
    }

    #[test]
    fn test_paragraph_wire_shape() {
        let block = ContentBlock::paragraph(ctx("1 Overview"), "Fund objective");
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "paragraph",
                "section": "1 Overview",
                "sub_section": null,
                "text": "Fund objective"
            })
        );
    }

    #[test]
    fn test_chart_wire_shape_has_null_placeholders() {
        let block = ContentBlock::chart(SectionContext::NONE, "Figure 1: NAV");
        let value = serde_json::to_value(&block).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj["type"], "chart");
        assert_eq!(obj["description"], "Figure 1: NAV");
        assert_eq!(obj["table_data"], Value::Null);
        assert_eq!(obj["image_name"], Value::Null);
        assert_eq!(obj["section"], Value::Null);
        assert_eq!(obj.len(), 6);
    }

    #[test]
    fn test_table_wire_shape() {
        let data = vec![
            vec![Some("Scheme".to_string()), Some("1Y".to_string())],
            vec![Some("Flexicap".to_string()), None],
        ];
        let block = ContentBlock::table(SectionContext::NONE, data);
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "table",
                "section": null,
                "sub_section": null,
                "description": null,
                "table_data": [["Scheme", "1Y"], ["Flexicap", null]]
            })
        );
    }

    #[test]
    fn test_link_wire_shape() {
        let block = ContentBlock::link(
            SectionContext::NONE,
            None,
            Rect::new(1.0, 2.0, 3.0, 4.0),
        );
        let value = serde_json::to_value(&block).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "link",
                "section": null,
                "sub_section": null,
                "uri": null,
                "from": [1.0, 2.0, 3.0, 4.0]
            })
        );
    }

    #[test]
    fn test_wire_field_order_starts_with_type() {
        let block = ContentBlock::paragraph(SectionContext::NONE, "x");
        let json = serde_json::to_string(&block).unwrap();
        assert!(json.starts_with("{\"type\":\"paragraph\",\"section\":null"));
    }

    #[test]
    fn test_deserialize_from_wire() {
        let block: ContentBlock = serde_json::from_value(json!({
            "type": "chart",
            "section": "Portfolio",
            "sub_section": "Top holdings",
            "description": "Fig. 2 Allocation",
            "table_data": null,
            "image_name": null
        }))
        .unwrap();

        assert!(block.is_chart());
        assert_eq!(block.section(), Some("Portfolio"));
        assert_eq!(block.sub_section(), Some("Top holdings"));
        assert_eq!(block.text(), Some("Fig. 2 Allocation"));
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let result: Result<ContentBlock, _> = serde_json::from_value(json!({
            "type": "image",
            "section": null,
            "sub_section": null
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_type_name() {
        let block = ContentBlock::table(SectionContext::NONE, vec![]);
        assert_eq!(block.type_name(), "table");
        assert!(block.is_table());
        assert!(block.text().is_none());
        assert!(block.context.is_none());
    }
}
