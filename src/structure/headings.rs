//! Heading detection from numbering prefixes and font-size rank.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::parser::TextLine;

/// Depth of a heading in the section hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HeadingLevel {
    /// Level 1: opens a new section
    Section,
    /// Level 2: opens a sub-section within the current section
    SubSection,
}

impl HeadingLevel {
    /// Level for a numeric depth; anything deeper than 2 is clamped.
    pub fn from_depth(depth: usize) -> Option<Self> {
        match depth {
            0 => None,
            1 => Some(HeadingLevel::Section),
            _ => Some(HeadingLevel::SubSection),
        }
    }
}

/// A line recognised as a heading.
#[derive(Debug, Clone, PartialEq)]
pub struct Heading {
    /// Top of the line's bounding box
    pub position: f32,
    pub level: HeadingLevel,
    pub text: String,
}

/// Distinct font sizes of a page ranked from largest to smallest.
///
/// Sizes are compared at two-decimal precision.
#[derive(Debug, Clone, Default)]
pub struct FontRanking {
    /// Size keys in hundredths of a point, largest first
    sizes: Vec<i64>,
}

impl FontRanking {
    /// Rank the average font sizes of the given lines.
    pub fn from_lines(lines: &[TextLine]) -> Self {
        let distinct: BTreeSet<i64> = lines.iter().map(|l| size_key(l.avg_font_size)).collect();
        Self {
            sizes: distinct.into_iter().rev().collect(),
        }
    }

    /// 1-based rank of a font size, or `None` if the size was not observed.
    pub fn rank(&self, size: f32) -> Option<usize> {
        let key = size_key(size);
        self.sizes.iter().position(|s| *s == key).map(|i| i + 1)
    }

    /// Number of distinct sizes.
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }
}

fn size_key(size: f32) -> i64 {
    (f64::from(size) * 100.0).round() as i64
}

fn numbering_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+(\.\d+)*\s").expect("valid numbering regex"))
}

/// Level implied by a numbering prefix such as `"2.3 "`.
///
/// The first dotted group sets the depth: `"3 "` is level 1, `"2.3 "` and
/// deeper are level 2.
pub fn numbering_level(text: &str) -> Option<HeadingLevel> {
    let prefix = numbering_regex().find(text)?;
    let dots = prefix.as_str().trim_end().matches('.').count();
    HeadingLevel::from_depth(1 + dots)
}

/// Heading level of a line given the page's font ranking.
///
/// A numbering prefix wins over font size.
pub fn classify_heading(line: &TextLine, ranking: &FontRanking) -> Option<HeadingLevel> {
    if let Some(level) = numbering_level(&line.text) {
        return Some(level);
    }

    match ranking.rank(line.avg_font_size)? {
        1 => Some(HeadingLevel::Section),
        2 => Some(HeadingLevel::SubSection),
        _ => None,
    }
}

/// Detect the headings of a page, ordered top to bottom.
///
/// When a page uses a single font size every line ranks first and becomes
/// a level-1 heading.
pub fn detect_headings(lines: &[TextLine]) -> Vec<Heading> {
    if lines.is_empty() {
        return Vec::new();
    }

    let ranking = FontRanking::from_lines(lines);

    let mut headings: Vec<Heading> = lines
        .iter()
        .filter_map(|line| {
            classify_heading(line, &ranking).map(|level| Heading {
                position: line.top(),
                level,
                text: line.text.clone(),
            })
        })
        .collect();

    // Stable, so equal positions keep line order.
    headings.sort_by(|a, b| a.position.total_cmp(&b.position));

    log::debug!(
        "Detected {} heading(s) among {} lines ({} font sizes)",
        headings.len(),
        lines.len(),
        ranking.len()
    );

    headings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Rect;

    fn line(text: &str, top: f32, size: f32) -> TextLine {
        TextLine::new(text, Rect::new(72.0, top, 300.0, top + size), size)
    }

    #[test]
    fn test_numbering_levels() {
        assert_eq!(numbering_level("1 Overview"), Some(HeadingLevel::Section));
        assert_eq!(numbering_level("2.3 Risk factors"), Some(HeadingLevel::SubSection));
        assert_eq!(numbering_level("4.1.2 Detail"), Some(HeadingLevel::SubSection));
        assert_eq!(numbering_level("2.3"), None);
        assert_eq!(numbering_level("12.4% return"), None);
        assert_eq!(numbering_level("Overview"), None);
    }

    #[test]
    fn test_numbering_beats_font_size() {
        let lines = vec![
            line("Fund Factsheet", 50.0, 20.0),
            line("Subtitle", 80.0, 14.0),
            line("2.3 Expense ratio", 120.0, 9.0),
            line("body text", 140.0, 9.0),
        ];

        let headings = detect_headings(&lines);
        let levels: Vec<_> = headings.iter().map(|h| (h.text.as_str(), h.level)).collect();
        assert_eq!(
            levels,
            vec![
                ("Fund Factsheet", HeadingLevel::Section),
                ("Subtitle", HeadingLevel::SubSection),
                ("2.3 Expense ratio", HeadingLevel::SubSection),
            ]
        );
    }

    #[test]
    fn test_third_rank_is_not_a_heading() {
        let lines = vec![
            line("Title", 10.0, 18.0),
            line("Section", 40.0, 12.0),
            line("Body", 60.0, 10.0),
        ];
        let ranking = FontRanking::from_lines(&lines);
        assert_eq!(ranking.rank(18.0), Some(1));
        assert_eq!(ranking.rank(10.0), Some(3));
        assert_eq!(classify_heading(&lines[2], &ranking), None);
    }

    #[test]
    fn test_sizes_compared_at_two_decimals() {
        let lines = vec![line("a", 0.0, 10.001), line("b", 20.0, 9.999)];
        let ranking = FontRanking::from_lines(&lines);
        assert_eq!(ranking.len(), 1);
    }

    #[test]
    fn test_single_size_all_headings() {
        let lines = vec![line("one", 0.0, 10.0), line("two", 20.0, 10.0)];
        let headings = detect_headings(&lines);
        assert_eq!(headings.len(), 2);
        assert!(headings.iter().all(|h| h.level == HeadingLevel::Section));
    }

    #[test]
    fn test_headings_sorted_by_position() {
        let lines = vec![line("Lower", 300.0, 18.0), line("Upper", 100.0, 18.0)];
        let headings = detect_headings(&lines);
        assert_eq!(headings[0].text, "Upper");
        assert_eq!(headings[0].position, 100.0);
    }

    #[test]
    fn test_empty_input() {
        assert!(detect_headings(&[]).is_empty());
        assert!(FontRanking::from_lines(&[]).is_empty());
    }

    #[test]
    fn test_level_from_depth() {
        assert_eq!(HeadingLevel::from_depth(1), Some(HeadingLevel::Section));
        assert_eq!(HeadingLevel::from_depth(5), Some(HeadingLevel::SubSection));
        assert_eq!(HeadingLevel::from_depth(0), None);
    }
}
