//! JSON output for converted documents.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{Error, Result, Stage};
use crate::model::Document;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a document to JSON.
pub fn to_json(doc: &Document, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(doc),
        JsonFormat::Compact => serde_json::to_string(doc),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Read a document back from its JSON form.
pub fn from_json(json: &str) -> Result<Document> {
    serde_json::from_str(json).map_err(|e| Error::Render(format!("JSON parse error: {}", e)))
}

/// Write a document as UTF-8 JSON to `path`.
///
/// Failures are tagged with the write stage and the document's source name.
pub fn write_json<P: AsRef<Path>>(doc: &Document, path: P, format: JsonFormat) -> Result<()> {
    let path = path.as_ref();

    write_json_inner(doc, path, format)
        .map_err(|e| e.at(Stage::Write(path.to_path_buf()), doc.meta.source_pdf.as_str()))?;

    log::info!("Wrote {} page(s) to {}", doc.page_count(), path.display());
    Ok(())
}

fn write_json_inner(doc: &Document, path: &Path, format: JsonFormat) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);

    match format {
        JsonFormat::Pretty => serde_json::to_writer_pretty(&mut writer, doc)?,
        JsonFormat::Compact => serde_json::to_writer(&mut writer, doc)?,
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ContentBlock, Page, SectionContext};

    fn sample() -> Document {
        let mut doc = Document::new("fund.pdf");
        let mut page = Page::new(1);
        page.push(ContentBlock::paragraph(SectionContext::NONE, "Hello"));
        doc.add_page(page);
        doc
    }

    #[test]
    fn test_to_json_pretty() {
        let json = to_json(&sample(), JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"source_pdf\": \"fund.pdf\""));
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_to_json_compact() {
        let json = to_json(&sample(), JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n'));
        assert!(json.starts_with("{\"meta\":{\"source_pdf\":\"fund.pdf\"},\"pages\":["));
    }

    #[test]
    fn test_from_json_round_trip() {
        let doc = sample();
        let back = from_json(&to_json(&doc, JsonFormat::Compact).unwrap()).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_from_json_invalid() {
        assert!(matches!(from_json("{\"meta\": 1}"), Err(Error::Render(_))));
    }

    #[test]
    fn test_write_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_json(&sample(), &path, JsonFormat::Pretty).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(from_json(&written).unwrap(), sample());
    }

    #[test]
    fn test_write_json_failure_is_tagged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.json");

        let err = write_json(&sample(), &path, JsonFormat::Pretty).unwrap_err();
        assert_eq!(err.stage(), Some(&Stage::Write(path.clone())));
        assert!(matches!(err.root(), Error::Io(_)));
        assert!(err.to_string().contains("fund.pdf"));
    }
}
