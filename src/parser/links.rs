//! Link annotation extraction.

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use crate::model::Rect;

use super::layout::{decode_text_simple, rect_from_array, resolve, PageFrame};

/// A link annotation on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkAnnotation {
    /// External target, present only for URI actions
    pub uri: Option<String>,
    /// Annotation rectangle in page coordinates
    pub rect: Rect,
}

impl LinkAnnotation {
    pub fn new(uri: Option<String>, rect: Rect) -> Self {
        Self { uri, rect }
    }
}

/// Collect the `/Link` annotations of a page in `/Annots` order.
///
/// Entries that are not dictionaries, not links, or lack a usable `/Rect`
/// are skipped.
pub fn extract_page_links(
    doc: &LopdfDocument,
    page_id: ObjectId,
    frame: &PageFrame,
) -> Vec<LinkAnnotation> {
    let Ok(page_dict) = doc.get_dictionary(page_id) else {
        return Vec::new();
    };

    let Ok(annots) = page_dict.get(b"Annots") else {
        return Vec::new();
    };

    let Ok(annots) = resolve(doc, annots).as_array() else {
        log::debug!("/Annots on page {:?} is not an array", page_id);
        return Vec::new();
    };

    let mut links = Vec::new();

    for entry in annots {
        let Ok(annot) = resolve(doc, entry).as_dict() else {
            continue;
        };

        if !matches!(annot.get(b"Subtype"), Ok(Object::Name(name)) if name == b"Link") {
            continue;
        }

        let rect = annot
            .get(b"Rect")
            .ok()
            .and_then(|r| resolve(doc, r).as_array().ok())
            .and_then(|arr| rect_from_array(doc, arr));

        let Some([x0, y0, x1, y1]) = rect else {
            log::debug!("Skipping link without a valid /Rect on page {:?}", page_id);
            continue;
        };

        links.push(LinkAnnotation {
            uri: link_uri(doc, annot),
            rect: frame.to_page_rect(x0, y0, x1, y1),
        });
    }

    links
}

/// URI of a link's `/A` action, when the action is `/S /URI`.
fn link_uri(doc: &LopdfDocument, annot: &Dictionary) -> Option<String> {
    let action = resolve(doc, annot.get(b"A").ok()?).as_dict().ok()?;

    match action.get(b"S") {
        Ok(Object::Name(kind)) if kind == b"URI" => {}
        _ => return None,
    }

    match resolve(doc, action.get(b"URI").ok()?) {
        Object::String(bytes, _) => Some(decode_text_simple(bytes)),
        _ => None,
    }
}
