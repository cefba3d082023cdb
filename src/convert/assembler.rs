//! Per-page assembly of content blocks.

use crate::model::{ContentBlock, Page, SectionContext};
use crate::parser::PageLayout;
use crate::structure::{classify_lines, SectionMap};

use super::ContextPolicy;

/// Build the section map of a page from its lines.
pub fn page_sections(layout: &PageLayout) -> SectionMap {
    SectionMap::build(&layout.lines)
}

/// Assemble one page: text blocks in line order, then tables, then links.
pub fn assemble_page(page_number: u32, layout: &PageLayout, policy: ContextPolicy) -> Page {
    let sections = page_sections(layout);
    let mut page = Page::new(page_number);

    page.content = classify_lines(&layout.lines, &sections);

    for table in &layout.tables {
        let context = match table.bbox {
            Some(bbox) if policy.tables => sections.resolve(bbox.top()).clone(),
            _ => SectionContext::NONE,
        };
        page.push(ContentBlock::table(context, table.rows.clone()));
    }

    for link in &layout.links {
        let context = if policy.links {
            sections.resolve(link.rect.top()).clone()
        } else {
            SectionContext::NONE
        };
        page.push(ContentBlock::link(context, link.uri.clone(), link.rect));
    }

    page
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Rect;
    use crate::parser::{LinkAnnotation, TableGrid, TextLine};

    fn layout() -> PageLayout {
        PageLayout {
            lines: vec![
                TextLine::new("Portfolio", Rect::new(72.0, 50.0, 200.0, 68.0), 18.0),
                TextLine::new("Holdings as of May", Rect::new(72.0, 100.0, 200.0, 110.0), 10.0),
                TextLine::new("Figure 2: Sector allocation", Rect::new(72.0, 400.0, 300.0, 410.0), 10.0),
            ],
            tables: vec![TableGrid::new(vec![vec![Some("HDFC Bank".to_string()), None]])
                .with_bbox(Rect::new(72.0, 200.0, 400.0, 300.0))],
            links: vec![LinkAnnotation::new(
                Some("https://example.com".to_string()),
                Rect::new(72.0, 700.0, 150.0, 712.0),
            )],
        }
    }

    #[test]
    fn test_block_order_and_types() {
        let page = assemble_page(4, &layout(), ContextPolicy::default());
        let types: Vec<_> = page.content.iter().map(ContentBlock::type_name).collect();
        assert_eq!(page.page_number, 4);
        assert_eq!(types, vec!["paragraph", "paragraph", "chart", "table", "link"]);
    }

    #[test]
    fn test_text_blocks_tagged_tables_and_links_not() {
        let page = assemble_page(1, &layout(), ContextPolicy::default());
        assert_eq!(page.content[1].section(), Some("Portfolio"));
        assert_eq!(page.content[2].section(), Some("Portfolio"));
        assert!(page.content[3].context.is_none());
        assert!(page.content[4].context.is_none());
    }

    #[test]
    fn test_context_policy_tags_tables_and_links() {
        let page = assemble_page(1, &layout(), ContextPolicy::all());
        assert_eq!(page.content[3].section(), Some("Portfolio"));
        assert_eq!(page.content[4].section(), Some("Portfolio"));
    }

    #[test]
    fn test_table_without_bbox_stays_untagged() {
        let mut layout = layout();
        layout.tables[0].bbox = None;
        let page = assemble_page(1, &layout, ContextPolicy::all());
        assert!(page.content[3].context.is_none());
    }

    #[test]
    fn test_empty_layout() {
        let page = assemble_page(2, &PageLayout::default(), ContextPolicy::default());
        assert!(page.is_empty());
    }
}
