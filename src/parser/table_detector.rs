//! Table detection from text alignment.
//!
//! Finds runs of rows whose spans start at shared x positions, without
//! relying on ruling lines. Detected tables become row-major cell grids.

use std::collections::{HashMap, HashSet};

use crate::model::{Rect, TableData};

use super::layout::{PageFrame, TextSpan};

/// Width of the buckets used to cluster left edges, in points.
const EDGE_BUCKET: f32 = 5.0;

/// How far a span may sit from a column edge and still count as aligned.
const ALIGN_TOLERANCE: f32 = 5.0;

/// A detected table region.
#[derive(Debug, Clone)]
pub struct DetectedTable {
    /// Column left edges, ascending
    pub columns: Vec<f32>,
    /// Rows from top to bottom
    pub rows: Vec<TableRowData>,
}

/// A row of text spans in a table.
#[derive(Debug, Clone)]
pub struct TableRowData {
    /// Mean baseline of the row
    pub y: f32,
    /// Spans in this row, sorted by X
    pub spans: Vec<TextSpan>,
}

impl DetectedTable {
    /// Right edge of the widest span.
    fn right_x(&self) -> f32 {
        self.spans().map(TextSpan::right).fold(f32::NEG_INFINITY, f32::max)
    }

    fn spans(&self) -> impl Iterator<Item = &TextSpan> {
        self.rows.iter().flat_map(|r| r.spans.iter())
    }

    /// Cell grid with one entry per column in every row.
    ///
    /// Spans that fall in the same cell are joined with a space; a cell
    /// that received no text is `None`.
    pub fn to_grid(&self) -> TableData {
        let right_x = self.right_x();

        self.rows
            .iter()
            .map(|row| {
                let mut cells: Vec<Vec<&str>> = vec![Vec::new(); self.columns.len()];
                for span in &row.spans {
                    let col = column_for(span.x, &self.columns, right_x);
                    let text = span.text.trim();
                    if !text.is_empty() {
                        if let Some(cell) = cells.get_mut(col) {
                            cell.push(text);
                        }
                    }
                }
                cells
                    .into_iter()
                    .map(|parts| (!parts.is_empty()).then(|| parts.join(" ")))
                    .collect()
            })
            .collect()
    }

    /// Bounding box in page coordinates.
    pub fn bbox(&self, frame: &PageFrame) -> Rect {
        let left = self.spans().map(|s| s.x).fold(f32::INFINITY, f32::min);
        let top = self.spans().map(TextSpan::top).fold(f32::NEG_INFINITY, f32::max);
        let bottom = self.spans().map(TextSpan::bottom).fold(f32::INFINITY, f32::min);
        frame.to_page_rect(left, bottom, self.right_x(), top)
    }
}

/// Table detector configuration.
#[derive(Debug, Clone)]
pub struct TableDetectorConfig {
    /// Minimum number of rows to consider as table
    pub min_rows: usize,
    /// Minimum number of columns to consider as table
    pub min_columns: usize,
    /// Maximum number of columns (above this, likely word-level splitting)
    pub max_columns: usize,
    /// Y tolerance for grouping spans into rows (fraction of font size)
    pub y_tolerance_factor: f32,
    /// Minimum column alignment ratio (0.0-1.0)
    pub min_alignment_ratio: f32,
    /// Minimum gap between columns (points)
    pub min_column_gap: f32,
}

impl Default for TableDetectorConfig {
    fn default() -> Self {
        Self {
            min_rows: 2,
            min_columns: 2,
            max_columns: 8,
            y_tolerance_factor: 0.4,
            min_alignment_ratio: 0.3,
            min_column_gap: 15.0,
        }
    }
}

/// Detects tables in a list of text spans.
#[derive(Debug, Clone, Default)]
pub struct TableDetector {
    config: TableDetectorConfig,
}

impl TableDetector {
    /// Create a new table detector with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new table detector with custom configuration.
    pub fn with_config(config: TableDetectorConfig) -> Self {
        Self { config }
    }

    /// Detect tables among the spans of one page, top to bottom.
    pub fn detect(&self, spans: &[TextSpan]) -> Vec<DetectedTable> {
        let cfg = &self.config;

        if spans.len() < cfg.min_rows * cfg.min_columns {
            log::trace!("TableDetector: only {} spans", spans.len());
            return vec![];
        }

        let rows = self.group_into_rows(spans);
        if rows.len() < cfg.min_rows {
            return vec![];
        }

        let columns = self.detect_columns(&rows);
        log::trace!("TableDetector: page columns at {:?}", columns);
        if columns.len() < cfg.min_columns {
            return vec![];
        }

        let mut tables = Vec::new();
        for (start, end) in self.find_table_regions(&rows, &columns) {
            let region = &rows[start..=end];

            // Columns of the whole page are too coarse for one region.
            let region_columns = self.detect_columns(region);

            if region_columns.len() < cfg.min_columns {
                continue;
            }
            if region_columns.len() > cfg.max_columns {
                log::debug!(
                    "TableDetector: skipping region with {} columns",
                    region_columns.len()
                );
                continue;
            }
            if is_list_pattern(region, &region_columns) {
                log::debug!("TableDetector: skipping list-like region");
                continue;
            }

            tables.push(DetectedTable {
                columns: region_columns,
                rows: region.to_vec(),
            });
        }

        log::debug!("TableDetector: {} table(s) detected", tables.len());
        tables
    }

    /// Group spans into rows by baseline, top to bottom.
    fn group_into_rows(&self, spans: &[TextSpan]) -> Vec<TableRowData> {
        let mut sorted = spans.to_vec();
        sorted.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

        let mut rows: Vec<TableRowData> = Vec::new();
        let mut current: Vec<TextSpan> = Vec::new();
        let mut current_y: Option<f32> = None;

        for span in sorted {
            let tolerance = span.font_size * self.config.y_tolerance_factor;
            match current_y {
                Some(y) if (span.y - y).abs() <= tolerance => current.push(span),
                _ => {
                    if !current.is_empty() {
                        rows.push(make_row(std::mem::take(&mut current)));
                    }
                    current_y = Some(span.y);
                    current.push(span);
                }
            }
        }

        if !current.is_empty() {
            rows.push(make_row(current));
        }

        rows
    }

    /// Left edges shared by enough rows to be column boundaries.
    ///
    /// Prefers rows holding two or more spans, since single-span rows are
    /// usually running text; falls back to every row when too few qualify.
    fn detect_columns(&self, rows: &[TableRowData]) -> Vec<f32> {
        let multi_span: Vec<&TableRowData> = rows.iter().filter(|r| r.spans.len() >= 2).collect();

        let mut edge_counts: HashMap<i32, usize> = HashMap::new();
        let sample_size = if multi_span.len() >= self.config.min_rows {
            for row in &multi_span {
                let buckets: HashSet<i32> = row.spans.iter().map(|s| bucket(s.x)).collect();
                for b in buckets {
                    *edge_counts.entry(b).or_insert(0) += 1;
                }
            }
            multi_span.len()
        } else {
            for span in rows.iter().flat_map(|r| r.spans.iter()) {
                *edge_counts.entry(bucket(span.x)).or_insert(0) += 1;
            }
            rows.len()
        };

        let min_occurrences =
            ((sample_size as f32 * self.config.min_alignment_ratio) as usize).max(2);

        let mut edges: Vec<f32> = edge_counts
            .into_iter()
            .filter(|(_, count)| *count >= min_occurrences)
            .map(|(b, _)| b as f32 * EDGE_BUCKET)
            .collect();
        edges.sort_by(f32::total_cmp);

        let mut merged: Vec<f32> = Vec::with_capacity(edges.len());
        for edge in edges {
            match merged.last() {
                Some(&last) if edge - last < self.config.min_column_gap => {}
                _ => merged.push(edge),
            }
        }
        merged
    }

    /// Contiguous runs of aligned rows long enough to be tables.
    fn find_table_regions(&self, rows: &[TableRowData], columns: &[f32]) -> Vec<(usize, usize)> {
        let mut regions = Vec::new();
        let mut start: Option<usize> = None;

        for (i, row) in rows.iter().enumerate() {
            if alignment_score(row, columns) >= self.config.min_alignment_ratio {
                start.get_or_insert(i);
                continue;
            }
            if let Some(s) = start.take() {
                if i - s >= self.config.min_rows {
                    regions.push((s, i - 1));
                }
            }
        }

        if let Some(s) = start {
            if rows.len() - s >= self.config.min_rows {
                regions.push((s, rows.len() - 1));
            }
        }

        regions
    }
}

fn make_row(spans: Vec<TextSpan>) -> TableRowData {
    let y = spans.iter().map(|s| s.y).sum::<f32>() / spans.len() as f32;
    TableRowData { y, spans }
}

fn bucket(x: f32) -> i32 {
    (x / EDGE_BUCKET).round() as i32
}

/// Fraction of a row's spans starting on a column edge.
fn alignment_score(row: &TableRowData, columns: &[f32]) -> f32 {
    if row.spans.is_empty() || columns.is_empty() {
        return 0.0;
    }

    let aligned = row
        .spans
        .iter()
        .filter(|span| columns.iter().any(|col| (span.x - col).abs() <= ALIGN_TOLERANCE))
        .count();

    aligned as f32 / row.spans.len() as f32
}

/// Column index for a span's left edge.
fn column_for(x: f32, columns: &[f32], right_x: f32) -> usize {
    let slot = columns.iter().enumerate().position(|(i, &start)| {
        let end = columns.get(i + 1).copied().unwrap_or(right_x + 100.0);
        x >= start - 10.0 && x < end - 10.0
    });

    slot.unwrap_or_else(|| {
        columns
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| (x - **a).abs().total_cmp(&(x - **b).abs()))
            .map(|(i, _)| i)
            .unwrap_or(0)
    })
}

/// Whether aligned rows are really a bulleted or numbered list.
///
/// List markers and item text are separate spans at different x positions,
/// which looks like a two-column table.
fn is_list_pattern(rows: &[TableRowData], columns: &[f32]) -> bool {
    if columns.len() < 2 || rows.is_empty() {
        return false;
    }

    let mut bullets = 0;
    let mut numbers = 0;

    for row in rows {
        let first = row.spans.iter().min_by(|a, b| a.x.total_cmp(&b.x));
        if let Some(span) = first {
            let text = span.text.trim();
            if is_bullet_marker(text) {
                bullets += 1;
            } else if is_number_marker(text) {
                numbers += 1;
            }
        }
    }

    let total = rows.len() as f32;
    if bullets as f32 / total >= 0.5 {
        return true;
    }

    // Numbered first columns are common in real tables, so only
    // two-column regions are rejected.
    columns.len() == 2 && (bullets + numbers) as f32 / total >= 0.5
}

/// Check if text is a bullet marker (•, -, etc.).
fn is_bullet_marker(text: &str) -> bool {
    matches!(
        text.trim(),
        "-" | "–" | "—" | "•" | "·" | "*" | "○" | "▪" | "◦" | "▸" | "►" | "■" | "●" | "□" | "◆" | "▶" | "➤"
    )
}

/// Check if text is a number-style list marker (1., 2), a., etc.).
fn is_number_marker(text: &str) -> bool {
    let cleaned: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return false;
    }

    let digits = cleaned.chars().take_while(char::is_ascii_digit).count();
    let rest = &cleaned[digits..];
    if digits > 0 && matches!(rest, "" | "." | ")") {
        return true;
    }

    let mut chars = cleaned.chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some(c), Some('.' | ')'), None) if c.is_alphabetic()
    )
}
