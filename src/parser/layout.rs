//! Layout extraction for PDF pages.
//!
//! Interprets a page's content stream into positioned text spans, then
//! groups the spans into lines carrying a bounding box and the average
//! font size. Positions are converted from PDF user space (origin at the
//! bottom-left, y up) into page coordinates (origin at the MediaBox
//! top-left, y down) so that ascending y is top-to-bottom reading order.

use std::collections::{BTreeMap, HashMap};

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::error::{Error, Result};
use crate::model::Rect;

/// Glyph advance used when a font has no usable width table, in
/// thousandths of an em.
const FALLBACK_GLYPH_WIDTH: f32 = 500.0;

/// Gaps wider than this many average character widths split a baseline
/// into separate lines.
const GUTTER_CHAR_WIDTHS: f32 = 3.0;

/// Narrowest gap that can separate two columns, in points.
const MIN_GUTTER_WIDTH: f32 = 12.0;

/// TJ adjustments larger than this (thousandths of an em) are read as a
/// word break.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// A text span with position and style information, in PDF user space.
#[derive(Debug, Clone)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// X position (left edge)
    pub x: f32,
    /// Y position (baseline)
    pub y: f32,
    /// Advance width of the text
    pub width: f32,
    /// Font size in points
    pub font_size: f32,
    /// Base font name (e.g., "Helvetica-Bold")
    pub font_name: String,
}

impl TextSpan {
    /// Create a new text span.
    pub fn new(text: impl Into<String>, x: f32, y: f32, width: f32, font_size: f32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            width,
            font_size,
            font_name: String::new(),
        }
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Get the bottom Y coordinate (approximate, based on font size).
    pub fn bottom(&self) -> f32 {
        self.y - self.font_size * 0.2
    }

    /// Get the top Y coordinate (approximate, based on font size).
    pub fn top(&self) -> f32 {
        self.y + self.font_size * 0.8
    }
}

/// A line of text in page coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    /// Line text with surrounding whitespace removed
    pub text: String,
    /// Bounding box in page coordinates
    pub bbox: Rect,
    /// Mean font size of the spans making up the line
    pub avg_font_size: f32,
}

impl TextLine {
    /// Create a line directly.
    pub fn new(text: impl Into<String>, bbox: Rect, avg_font_size: f32) -> Self {
        Self {
            text: text.into(),
            bbox,
            avg_font_size,
        }
    }

    /// Vertical position of the top of the line.
    pub fn top(&self) -> f32 {
        self.bbox.top()
    }

    /// Build a line from spans sharing a baseline.
    ///
    /// Returns `None` when the joined text is blank.
    pub fn from_spans(mut spans: Vec<TextSpan>, frame: &PageFrame) -> Option<Self> {
        if spans.is_empty() {
            return None;
        }

        spans.sort_by(|a, b| a.x.total_cmp(&b.x));

        let text = join_spans(&spans).trim().to_string();
        if text.is_empty() {
            return None;
        }

        let avg_font_size =
            spans.iter().map(|s| s.font_size).sum::<f32>() / spans.len() as f32;

        let left = spans.iter().map(|s| s.x).fold(f32::INFINITY, f32::min);
        let right = spans.iter().map(TextSpan::right).fold(f32::NEG_INFINITY, f32::max);
        let top = spans.iter().map(TextSpan::top).fold(f32::NEG_INFINITY, f32::max);
        let bottom = spans.iter().map(TextSpan::bottom).fold(f32::INFINITY, f32::min);

        Some(Self {
            text,
            bbox: frame.to_page_rect(left, bottom, right, top),
            avg_font_size,
        })
    }
}

/// The visible area of a page, taken from its MediaBox.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFrame {
    /// Left edge in user space
    pub left: f32,
    /// Top edge in user space
    pub top: f32,
    /// Page width in points
    pub width: f32,
    /// Page height in points
    pub height: f32,
}

impl PageFrame {
    /// Build a frame from MediaBox corners in any order.
    pub fn from_media_box(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            left: x0.min(x1),
            top: y0.max(y1),
            width: (x1 - x0).abs(),
            height: (y1 - y0).abs(),
        }
    }

    /// US Letter (8.5 x 11 inches).
    pub fn letter() -> Self {
        Self::from_media_box(0.0, 0.0, 612.0, 792.0)
    }

    /// Convert a user-space rectangle into page coordinates.
    pub fn to_page_rect(&self, x0: f32, y0: f32, x1: f32, y1: f32) -> Rect {
        Rect::new(
            x0.min(x1) - self.left,
            self.top - y0.max(y1),
            x0.max(x1) - self.left,
            self.top - y0.min(y1),
        )
    }
}

impl Default for PageFrame {
    fn default() -> Self {
        Self::letter()
    }
}

/// Layout analyzer extracting text spans and lines from PDF pages.
pub struct LayoutAnalyzer<'a> {
    doc: &'a LopdfDocument,
}

impl<'a> LayoutAnalyzer<'a> {
    /// Create a new layout analyzer.
    pub fn new(doc: &'a LopdfDocument) -> Self {
        Self { doc }
    }

    /// Resolve the page's MediaBox, following `/Parent` inheritance.
    pub fn page_frame(&self, page_id: ObjectId) -> PageFrame {
        let mut current = Some(page_id);

        while let Some(id) = current {
            let Ok(dict) = self.doc.get_dictionary(id) else {
                break;
            };

            if let Ok(media_box) = dict.get(b"MediaBox") {
                if let Some([x0, y0, x1, y1]) = resolve(self.doc, media_box)
                    .as_array()
                    .ok()
                    .and_then(|arr| rect_from_array(self.doc, arr))
                {
                    return PageFrame::from_media_box(x0, y0, x1, y1);
                }
            }

            current = dict.get(b"Parent").and_then(Object::as_reference).ok();
        }

        log::debug!("No MediaBox for page {:?}, assuming Letter", page_id);
        PageFrame::letter()
    }

    /// Extract lines for a page in top-to-bottom order.
    pub fn extract_page_lines(&self, page_id: ObjectId) -> Result<Vec<TextLine>> {
        let frame = self.page_frame(page_id);
        let spans = self.extract_page_spans(page_id)?;
        Ok(group_spans_into_lines(spans, &frame))
    }

    /// Extract text spans from a page with position and font information.
    pub fn extract_page_spans(&self, page_id: ObjectId) -> Result<Vec<TextSpan>> {
        let fonts = self
            .doc
            .get_page_fonts(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let content = self.get_page_content(page_id)?;
        if content.is_empty() {
            return Ok(Vec::new());
        }

        let mut interpreter = TextInterpreter::new(self.doc, &fonts);
        interpreter.run(&content)?;
        Ok(interpreter.spans)
    }

    /// Concatenated, decompressed content streams of a page.
    fn get_page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self
            .doc
            .get_dictionary(page_id)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let Ok(contents) = page_dict.get(b"Contents") else {
            return Ok(Vec::new());
        };

        let streams: Vec<&Object> = match resolve(self.doc, contents) {
            Object::Array(arr) => arr.iter().map(|o| resolve(self.doc, o)).collect(),
            other => vec![other],
        };

        let mut content = Vec::new();
        for obj in streams {
            match obj {
                Object::Stream(s) => {
                    let data = if s.dict.get(b"Filter").is_ok() {
                        s.decompressed_content().unwrap_or_else(|e| {
                            log::warn!("Using raw content stream of page {:?}: {}", page_id, e);
                            s.content.clone()
                        })
                    } else {
                        s.content.clone()
                    };
                    content.extend_from_slice(&data);
                    content.push(b'\n');
                }
                _ => return Err(Error::PdfParse("Invalid content stream".to_string())),
            }
        }

        Ok(content)
    }
}

/// Group spans into lines by baseline, top to bottom.
pub fn group_spans_into_lines(mut spans: Vec<TextSpan>, frame: &PageFrame) -> Vec<TextLine> {
    if spans.is_empty() {
        return vec![];
    }

    // PDF y grows upward, so descending y is top to bottom.
    spans.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

    let mut lines = Vec::new();
    let mut current: Vec<TextSpan> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        let tolerance = span.font_size * 0.3;
        match current_y {
            Some(y) if (span.y - y).abs() <= tolerance => current.push(span),
            _ => {
                if !current.is_empty() {
                    push_baseline(&mut lines, std::mem::take(&mut current), frame);
                }
                current_y = Some(span.y);
                current.push(span);
            }
        }
    }

    if !current.is_empty() {
        push_baseline(&mut lines, current, frame);
    }

    lines
}

/// Emit the spans of one baseline as lines, split left to right at gutters.
fn push_baseline(lines: &mut Vec<TextLine>, mut spans: Vec<TextSpan>, frame: &PageFrame) {
    spans.sort_by(|a, b| a.x.total_cmp(&b.x));

    let mut segment: Vec<TextSpan> = Vec::new();
    for span in spans {
        let split = segment
            .last()
            .is_some_and(|prev| span.x - prev.right() > gutter_width(prev, &span));
        if split {
            lines.extend(TextLine::from_spans(std::mem::take(&mut segment), frame));
        }
        segment.push(span);
    }

    lines.extend(TextLine::from_spans(segment, frame));
}

/// Horizontal gap between neighbours on a baseline that separates columns.
fn gutter_width(prev: &TextSpan, next: &TextSpan) -> f32 {
    let char_width = avg_char_width(prev).max(avg_char_width(next));
    (char_width * GUTTER_CHAR_WIDTHS).max(MIN_GUTTER_WIDTH)
}

fn avg_char_width(span: &TextSpan) -> f32 {
    let count = span.text.chars().count();
    if count > 0 && span.width > 0.0 {
        span.width / count as f32
    } else {
        span.font_size * 0.5
    }
}

/// Join spans sorted by x, inserting a space where the horizontal gap
/// between neighbours is wide enough to be a word break.
fn join_spans(spans: &[TextSpan]) -> String {
    let mut result = String::new();

    for (i, span) in spans.iter().enumerate() {
        if i == 0 {
            result.push_str(&span.text);
            continue;
        }

        let prev = &spans[i - 1];
        let gap = span.x - prev.right();

        let both_spaceless = prev
            .text
            .chars()
            .last()
            .map(is_spaceless_script_char)
            .unwrap_or(false)
            && span
                .text
                .chars()
                .next()
                .map(is_spaceless_script_char)
                .unwrap_or(false);

        let already_spaced = prev.text.ends_with([' ', '\u{00A0}'])
            || span.text.starts_with([' ', '\u{00A0}']);

        if gap > avg_char_width(span) * 0.2 && !both_spaceless && !already_spaced {
            result.push(' ');
        }

        result.push_str(&span.text);
    }

    result
}

/// A 2D affine transform `[a b c d e f]` in PDF row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Matrix([f32; 6]);

impl Matrix {
    const IDENTITY: Matrix = Matrix([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

    fn translation(tx: f32, ty: f32) -> Self {
        Matrix([1.0, 0.0, 0.0, 1.0, tx, ty])
    }

    fn from_operands(operands: &[Object]) -> Option<Self> {
        if operands.len() < 6 {
            return None;
        }
        let mut m = [0.0; 6];
        for (slot, obj) in m.iter_mut().zip(operands) {
            *slot = get_number(obj)?;
        }
        Some(Matrix(m))
    }

    /// `self × other`: apply `self` first, then `other`.
    fn then(&self, other: &Matrix) -> Matrix {
        let [a, b, c, d, e, f] = self.0;
        let [a2, b2, c2, d2, e2, f2] = other.0;
        Matrix([
            a * a2 + b * c2,
            a * b2 + b * d2,
            c * a2 + d * c2,
            c * b2 + d * d2,
            e * a2 + f * c2 + e2,
            e * b2 + f * d2 + f2,
        ])
    }

    fn origin(&self) -> (f32, f32) {
        (self.0[4], self.0[5])
    }

    fn vertical_scale(&self) -> f32 {
        self.0[2].hypot(self.0[3])
    }
}

/// Graphics state entries that matter for text placement.
#[derive(Debug, Clone)]
struct GraphicsState {
    ctm: Matrix,
    font_key: Vec<u8>,
    font_size: f32,
    char_spacing: f32,
    word_spacing: f32,
    horizontal_scaling: f32,
    leading: f32,
    rise: f32,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            ctm: Matrix::IDENTITY,
            font_key: Vec::new(),
            font_size: 12.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            horizontal_scaling: 1.0,
            leading: 0.0,
            rise: 0.0,
        }
    }
}

/// Glyph widths of one font resource.
#[derive(Debug, Clone, Default)]
struct FontMetrics {
    base_font: String,
    /// Composite (Type0) fonts use two-byte codes.
    two_byte: bool,
    widths: HashMap<u32, f32>,
    default_width: f32,
}

impl FontMetrics {
    fn load(doc: &LopdfDocument, font: &Dictionary) -> Self {
        let base_font = font
            .get(b"BaseFont")
            .and_then(Object::as_name)
            .map(|n| String::from_utf8_lossy(n).into_owned())
            .unwrap_or_else(|_| "Unknown".to_string());

        let is_type0 = matches!(
            font.get(b"Subtype").and_then(Object::as_name),
            Ok(b"Type0")
        );

        if is_type0 {
            let descendant = font
                .get(b"DescendantFonts")
                .ok()
                .map(|o| resolve(doc, o))
                .and_then(|o| o.as_array().ok())
                .and_then(|arr| arr.first())
                .map(|o| resolve(doc, o))
                .and_then(|o| o.as_dict().ok());

            let (widths, default_width) = match descendant {
                Some(cid_font) => (
                    cid_font
                        .get(b"W")
                        .ok()
                        .map(|o| resolve(doc, o))
                        .and_then(|o| o.as_array().ok())
                        .map(|arr| parse_cid_widths(doc, arr))
                        .unwrap_or_default(),
                    cid_font
                        .get(b"DW")
                        .ok()
                        .and_then(get_number)
                        .unwrap_or(1000.0),
                ),
                None => (HashMap::new(), 1000.0),
            };

            return Self {
                base_font,
                two_byte: true,
                widths,
                default_width,
            };
        }

        let first_char = font
            .get(b"FirstChar")
            .ok()
            .and_then(|o| resolve(doc, o).as_i64().ok())
            .unwrap_or(0);

        let widths = font
            .get(b"Widths")
            .ok()
            .map(|o| resolve(doc, o))
            .and_then(|o| o.as_array().ok())
            .map(|arr| {
                arr.iter()
                    .enumerate()
                    .filter_map(|(i, w)| {
                        let code = u32::try_from(first_char + i as i64).ok()?;
                        Some((code, get_number(resolve(doc, w))?))
                    })
                    .collect()
            })
            .unwrap_or_default();

        let missing_width = font
            .get(b"FontDescriptor")
            .ok()
            .map(|o| resolve(doc, o))
            .and_then(|o| o.as_dict().ok())
            .and_then(|d| d.get(b"MissingWidth").ok())
            .and_then(get_number)
            .filter(|w| *w > 0.0)
            .unwrap_or(FALLBACK_GLYPH_WIDTH);

        Self {
            base_font,
            two_byte: false,
            widths,
            default_width: missing_width,
        }
    }

    /// Character codes in a shown string, paired with whether the code is
    /// a single-byte space (the only code word spacing applies to).
    fn codes(&self, bytes: &[u8]) -> Vec<(u32, bool)> {
        if self.two_byte {
            bytes
                .chunks(2)
                .map(|c| {
                    let code = match c {
                        [hi, lo] => u32::from(*hi) << 8 | u32::from(*lo),
                        [b] => u32::from(*b),
                        _ => 0,
                    };
                    (code, false)
                })
                .collect()
        } else {
            bytes.iter().map(|b| (u32::from(*b), *b == b' ')).collect()
        }
    }

    fn glyph_width(&self, code: u32) -> f32 {
        self.widths.get(&code).copied().unwrap_or(self.default_width)
    }
}

/// Parse a CIDFont `/W` array: `c [w1 w2 ...]` and `c_first c_last w` runs.
fn parse_cid_widths(doc: &LopdfDocument, arr: &[Object]) -> HashMap<u32, f32> {
    let mut widths = HashMap::new();
    let mut i = 0;

    while i < arr.len() {
        let Some(start) = get_number(resolve(doc, &arr[i])) else {
            break;
        };
        let start = start as u32;

        match arr.get(i + 1).map(|o| resolve(doc, o)) {
            Some(Object::Array(run)) => {
                for (offset, w) in run.iter().enumerate() {
                    if let Some(w) = get_number(resolve(doc, w)) {
                        widths.insert(start + offset as u32, w);
                    }
                }
                i += 2;
            }
            Some(end) => {
                let end = get_number(end).map(|e| e as u32);
                let w = arr.get(i + 2).and_then(|o| get_number(resolve(doc, o)));
                match (end, w) {
                    (Some(end), Some(w)) => {
                        for code in start..=end.min(start.saturating_add(0xFFFF)) {
                            widths.insert(code, w);
                        }
                    }
                    _ => break,
                }
                i += 3;
            }
            None => break,
        }
    }

    widths
}

/// Content-stream interpreter collecting text spans.
struct TextInterpreter<'a> {
    doc: &'a LopdfDocument,
    fonts: &'a BTreeMap<Vec<u8>, &'a Dictionary>,
    metrics: HashMap<Vec<u8>, FontMetrics>,
    state: GraphicsState,
    saved: Vec<GraphicsState>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    in_text_block: bool,
    spans: Vec<TextSpan>,
}

impl<'a> TextInterpreter<'a> {
    fn new(doc: &'a LopdfDocument, fonts: &'a BTreeMap<Vec<u8>, &'a Dictionary>) -> Self {
        Self {
            doc,
            fonts,
            metrics: HashMap::new(),
            state: GraphicsState::default(),
            saved: Vec::new(),
            text_matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            in_text_block: false,
            spans: Vec::new(),
        }
    }

    fn run(&mut self, content: &[u8]) -> Result<()> {
        let content = lopdf::content::Content::decode(content)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        for op in &content.operations {
            let operands = op.operands.as_slice();
            let num = |i: usize| operands.get(i).and_then(get_number);

            match op.operator.as_str() {
                "q" => self.saved.push(self.state.clone()),
                "Q" => {
                    if let Some(state) = self.saved.pop() {
                        self.state = state;
                    }
                }
                "cm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        self.state.ctm = m.then(&self.state.ctm);
                    }
                }
                "BT" => {
                    self.in_text_block = true;
                    self.text_matrix = Matrix::IDENTITY;
                    self.line_matrix = Matrix::IDENTITY;
                }
                "ET" => self.in_text_block = false,
                "Tf" => {
                    if let Some(Object::Name(name)) = operands.first() {
                        self.state.font_key = name.clone();
                    }
                    if let Some(size) = num(1) {
                        self.state.font_size = size;
                    }
                }
                "Tc" => self.state.char_spacing = num(0).unwrap_or(0.0),
                "Tw" => self.state.word_spacing = num(0).unwrap_or(0.0),
                "Tz" => self.state.horizontal_scaling = num(0).unwrap_or(100.0) / 100.0,
                "TL" => self.state.leading = num(0).unwrap_or(0.0),
                "Ts" => self.state.rise = num(0).unwrap_or(0.0),
                "Td" => self.move_line(num(0).unwrap_or(0.0), num(1).unwrap_or(0.0)),
                "TD" => {
                    let ty = num(1).unwrap_or(0.0);
                    self.state.leading = -ty;
                    self.move_line(num(0).unwrap_or(0.0), ty);
                }
                "Tm" => {
                    if let Some(m) = Matrix::from_operands(operands) {
                        self.text_matrix = m;
                        self.line_matrix = m;
                    }
                }
                "T*" => self.next_line(),
                "Tj" => {
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        self.show(std::slice::from_ref(&Object::String(
                            bytes.clone(),
                            lopdf::StringFormat::Literal,
                        )));
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(items)) = operands.first() {
                        self.show(items);
                    }
                }
                "'" => {
                    self.next_line();
                    if let Some(s @ Object::String(..)) = operands.first() {
                        self.show(std::slice::from_ref(s));
                    }
                }
                "\"" => {
                    self.state.word_spacing = num(0).unwrap_or(self.state.word_spacing);
                    self.state.char_spacing = num(1).unwrap_or(self.state.char_spacing);
                    self.next_line();
                    if let Some(s @ Object::String(..)) = operands.get(2) {
                        self.show(std::slice::from_ref(s));
                    }
                }
                "Do" => {
                    log::trace!("Skipping XObject {:?}", operands.first());
                }
                _ => {}
            }
        }

        Ok(())
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = Matrix::translation(tx, ty).then(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.state.leading);
    }

    fn metrics(&mut self) -> &FontMetrics {
        let key = self.state.font_key.clone();
        let doc = self.doc;
        let fonts = self.fonts;
        self.metrics.entry(key).or_insert_with_key(|key| {
            fonts
                .get(key)
                .map(|font| FontMetrics::load(doc, font))
                .unwrap_or_default()
        })
    }

    /// Show a TJ-style array of strings and kerning adjustments as one span.
    fn show(&mut self, items: &[Object]) {
        if !self.in_text_block {
            return;
        }

        let (doc, fonts) = (self.doc, self.fonts);
        let encoding = fonts
            .get(&self.state.font_key)
            .and_then(|f| f.get_font_encoding(doc).ok());

        let start = self.rendering_matrix();
        let size = self.state.font_size;
        let scaling = self.state.horizontal_scaling;
        let mut text = String::new();
        let mut advance = 0.0;

        for item in items {
            match item {
                Object::String(bytes, _) => {
                    let decoded = match &encoding {
                        Some(enc) => LopdfDocument::decode_text(enc, bytes)
                            .unwrap_or_else(|_| decode_text_simple(bytes)),
                        None => decode_text_simple(bytes),
                    };
                    text.push_str(&decoded);

                    let (char_spacing, word_spacing) =
                        (self.state.char_spacing, self.state.word_spacing);
                    let metrics = self.metrics();
                    for (code, is_space) in metrics.codes(bytes) {
                        let mut tx = metrics.glyph_width(code) / 1000.0 * size + char_spacing;
                        if is_space {
                            tx += word_spacing;
                        }
                        advance += tx * scaling;
                    }
                }
                Object::Integer(_) | Object::Real(_) => {
                    let adjustment = -get_number(item).unwrap_or(0.0);
                    advance += adjustment / 1000.0 * size * scaling;

                    if adjustment > TJ_SPACE_THRESHOLD
                        && !text.is_empty()
                        && !text.ends_with([' ', '\u{00A0}'])
                        && !text.chars().last().is_some_and(is_spaceless_script_char)
                    {
                        text.push(' ');
                    }
                }
                _ => {}
            }
        }

        self.text_matrix = Matrix::translation(advance, 0.0).then(&self.text_matrix);

        if text.trim().is_empty() {
            return;
        }

        let end = self.rendering_matrix();
        let (x, y) = start.origin();
        let (end_x, end_y) = end.origin();
        let font_name = self.metrics().base_font.clone();

        self.spans.push(TextSpan {
            text,
            x: x.min(end_x),
            y,
            width: (end_x - x).hypot(end_y - y),
            font_size: size * start.vertical_scale(),
            font_name,
        });
    }

    /// Text space origin (including rise) mapped through the CTM.
    fn rendering_matrix(&self) -> Matrix {
        Matrix::translation(0.0, self.state.rise)
            .then(&self.text_matrix)
            .then(&self.state.ctm)
    }
}

/// Follow an indirect reference, returning the object itself otherwise.
pub(crate) fn resolve<'d>(doc: &'d LopdfDocument, obj: &'d Object) -> &'d Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        other => other,
    }
}

/// Read a four-number rectangle array.
pub(crate) fn rect_from_array(doc: &LopdfDocument, arr: &[Object]) -> Option<[f32; 4]> {
    match arr {
        [a, b, c, d] => Some([
            get_number(resolve(doc, a))?,
            get_number(resolve(doc, b))?,
            get_number(resolve(doc, c))?,
            get_number(resolve(doc, d))?,
        ]),
        _ => None,
    }
}

/// Helper to extract number from PDF object.
fn get_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Check if character is from a script that doesn't use word spaces.
/// Chinese and Japanese don't use spaces between words, but Korean does.
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and extensions
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana, Katakana
    || (0x3040..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}

/// Text decoding fallback when no font encoding is available.
pub(crate) fn decode_text_simple(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        // Latin-1
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(text: &str, x: f32, y: f32, size: f32) -> TextSpan {
        TextSpan::new(text, x, y, text.chars().count() as f32 * size * 0.5, size)
    }

    #[test]
    fn test_matrix_composition() {
        let scale = Matrix([2.0, 0.0, 0.0, 2.0, 0.0, 0.0]);
        let moved = Matrix::translation(10.0, 20.0).then(&scale);
        assert_eq!(moved.origin(), (20.0, 40.0));
        assert_eq!(moved.vertical_scale(), 2.0);
    }

    #[test]
    fn test_page_frame_flips_y() {
        let frame = PageFrame::letter();
        let rect = frame.to_page_rect(72.0, 700.0, 200.0, 720.0);
        assert_eq!(rect, Rect::new(72.0, 72.0, 200.0, 92.0));
    }

    #[test]
    fn test_page_frame_with_offset_media_box() {
        let frame = PageFrame::from_media_box(10.0, 20.0, 610.0, 820.0);
        assert_eq!(frame.width, 600.0);
        assert_eq!(frame.height, 800.0);
        let rect = frame.to_page_rect(10.0, 800.0, 20.0, 820.0);
        assert_eq!(rect, Rect::new(0.0, 0.0, 10.0, 20.0));
    }

    #[test]
    fn test_group_spans_into_lines_orders_top_to_bottom() {
        let frame = PageFrame::letter();
        let spans = vec![
            span("second", 72.0, 680.0, 10.0),
            span("Heading", 72.0, 720.0, 18.0),
            span("line", 110.0, 680.5, 10.0),
        ];

        let lines = group_spans_into_lines(spans, &frame);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "Heading");
        assert_eq!(lines[1].text, "second line");
        assert!(lines[0].top() < lines[1].top());
        assert!((lines[1].avg_font_size - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_column_gutter_splits_baseline() {
        let frame = PageFrame::letter();
        let spans = vec![
            span("NAV as on 31 May", 320.0, 700.0, 9.0),
            span("Portfolio", 36.0, 700.0, 18.0),
        ];

        let lines = group_spans_into_lines(spans, &frame);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "Portfolio");
        assert_eq!(lines[0].avg_font_size, 18.0);
        assert_eq!(lines[1].text, "NAV as on 31 May");
        assert_eq!(lines[1].avg_font_size, 9.0);
        assert!(lines[0].bbox.x1 < lines[1].bbox.x0);
    }

    #[test]
    fn test_word_gap_below_gutter_keeps_line() {
        let frame = PageFrame::letter();
        // 11pt gap, under the 12pt floor.
        let spans = vec![span("Expense", 72.0, 700.0, 4.0), span("Ratio", 97.0, 700.0, 4.0)];

        let lines = group_spans_into_lines(spans, &frame);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "Expense Ratio");
    }

    #[test]
    fn test_line_average_font_size_is_unweighted_mean() {
        let frame = PageFrame::letter();
        let spans = vec![span("A", 72.0, 700.0, 10.0), span("long words", 90.0, 700.0, 12.0)];
        let line = TextLine::from_spans(spans, &frame).unwrap();
        assert!((line.avg_font_size - 11.0).abs() < 1e-6);
    }

    #[test]
    fn test_blank_line_is_dropped() {
        let frame = PageFrame::letter();
        assert!(TextLine::from_spans(vec![span("   ", 72.0, 700.0, 10.0)], &frame).is_none());
        assert!(TextLine::from_spans(vec![], &frame).is_none());
    }

    #[test]
    fn test_join_spans_inserts_space_on_gap() {
        let spans = vec![span("Net", 0.0, 0.0, 10.0), span("Assets", 40.0, 0.0, 10.0)];
        assert_eq!(join_spans(&spans), "Net Assets");

        let touching = vec![span("Net", 0.0, 0.0, 10.0), span("work", 15.0, 0.0, 10.0)];
        assert_eq!(join_spans(&touching), "Network");
    }

    #[test]
    fn test_join_spans_cjk_no_space() {
        let spans = vec![span("基金", 0.0, 0.0, 10.0), span("概要", 40.0, 0.0, 10.0)];
        assert_eq!(join_spans(&spans), "基金概要");
    }

    #[test]
    fn test_parse_cid_widths() {
        let doc = LopdfDocument::with_version("1.5");
        let arr = vec![
            Object::Integer(1),
            Object::Array(vec![Object::Integer(250), Object::Integer(300)]),
            Object::Integer(10),
            Object::Integer(12),
            Object::Integer(600),
        ];
        let widths = parse_cid_widths(&doc, &arr);
        assert_eq!(widths.get(&1), Some(&250.0));
        assert_eq!(widths.get(&2), Some(&300.0));
        assert_eq!(widths.get(&11), Some(&600.0));
        assert_eq!(widths.get(&13), None);
    }

    #[test]
    fn test_font_metrics_codes() {
        let simple = FontMetrics::default();
        assert_eq!(simple.codes(b"a b"), vec![(97, false), (32, true), (98, false)]);

        let composite = FontMetrics {
            two_byte: true,
            ..FontMetrics::default()
        };
        assert_eq!(composite.codes(&[0x00, 0x41, 0x00, 0x20]), vec![(0x41, false), (0x20, false)]);
    }

    #[test]
    fn test_decode_text_simple() {
        assert_eq!(decode_text_simple(b"Hello"), "Hello");
        assert_eq!(decode_text_simple(&[0x48, 0x65, 0x6C, 0x6C, 0xE9]), "Hellé");
        assert_eq!(decode_text_simple(&[0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69]), "Hi");
    }
}
