//! Chart caption and paragraph classification.

use std::sync::OnceLock;

use regex::Regex;

use crate::model::ContentBlock;
use crate::parser::TextLine;

use super::sections::SectionMap;

fn caption_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^\s*(Figure|Fig\.)\s*\d+").expect("valid caption regex"))
}

/// Whether a line reads as a figure caption ("Figure 3: ...", "Fig. 12 ...").
pub fn is_chart_caption(text: &str) -> bool {
    caption_regex().is_match(text)
}

/// Turn a line into a chart or paragraph block in its section context.
pub fn classify_line(line: &TextLine, sections: &SectionMap) -> ContentBlock {
    let context = sections.resolve(line.top()).clone();

    if is_chart_caption(&line.text) {
        ContentBlock::chart(context, line.text.as_str())
    } else {
        ContentBlock::paragraph(context, line.text.as_str())
    }
}

/// Classify every line, keeping line order.
pub fn classify_lines(lines: &[TextLine], sections: &SectionMap) -> Vec<ContentBlock> {
    lines.iter().map(|line| classify_line(line, sections)).collect()
}
