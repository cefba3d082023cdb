//! PDF document converter.

use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};

use rayon::prelude::*;

use crate::detect::{sniff_bytes, sniff_path};
use crate::error::{Error, Result, Stage};
use crate::model::{source_name, Document, Page};
use crate::parser::{LopdfBackend, PdfBackend};
use crate::render::write_json;
use crate::structure::SectionMap;

use super::assembler::{assemble_page, page_sections};
use super::ConvertOptions;

/// Converts the pages of a loaded PDF into a [`Document`].
///
/// The converter owns its backend; the loaded PDF is released when the
/// converter is dropped.
pub struct PdfConverter<B: PdfBackend = LopdfBackend> {
    backend: B,
    source_pdf: String,
    options: ConvertOptions,
}

impl PdfConverter<LopdfBackend> {
    /// Open a PDF file.
    ///
    /// Failures are tagged with the open stage.
    pub fn open<P: AsRef<Path>>(path: P, options: ConvertOptions) -> Result<Self> {
        let path = path.as_ref();
        let source_pdf = source_name(path);

        let backend = sniff_path(path)
            .and_then(|header| {
                log::info!("Opening {} ({})", path.display(), header);
                LopdfBackend::load_file(path)
            })
            .map_err(|e| e.at(Stage::Open, source_pdf.as_str()))?;

        Ok(Self::with_backend(
            backend.with_table_config(options.tables.clone()),
            source_pdf,
            options,
        ))
    }

    /// Load a PDF from memory, naming it `source_pdf` in the output.
    pub fn from_bytes(
        data: &[u8],
        source_pdf: impl Into<String>,
        options: ConvertOptions,
    ) -> Result<Self> {
        let source_pdf = source_pdf.into();

        let backend = sniff_bytes(data)
            .and_then(|_| LopdfBackend::load_bytes(data))
            .map_err(|e| e.at(Stage::Open, source_pdf.as_str()))?;

        Ok(Self::with_backend(
            backend.with_table_config(options.tables.clone()),
            source_pdf,
            options,
        ))
    }
}

impl<B: PdfBackend> PdfConverter<B> {
    /// Wrap an arbitrary backend.
    pub fn with_backend(backend: B, source_pdf: impl Into<String>, options: ConvertOptions) -> Self {
        Self {
            backend,
            source_pdf: source_pdf.into(),
            options,
        }
    }

    /// Number of pages in the source document.
    pub fn page_count(&self) -> u32 {
        self.backend.page_count()
    }

    /// Base name of the source PDF.
    pub fn source_pdf(&self) -> &str {
        &self.source_pdf
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert the selected pages.
    ///
    /// Pages come out in ascending page-number order whether or not they
    /// were processed in parallel. The first failing page aborts the run.
    pub fn convert(&self) -> Result<Document> {
        let page_numbers = self.selected_pages()?;
        let total = page_numbers.len() as u32;
        let done = AtomicU32::new(0);

        log::info!(
            "Converting {} of {} page(s) from {}",
            total,
            self.page_count(),
            self.source_pdf
        );

        let pages: Vec<Page> = if self.options.parallel {
            page_numbers
                .par_iter()
                .map(|&n| self.convert_page(n, &done, total))
                .collect::<Result<_>>()?
        } else {
            page_numbers
                .iter()
                .map(|&n| self.convert_page(n, &done, total))
                .collect::<Result<_>>()?
        };

        let mut doc = Document::new(self.source_pdf.as_str());
        doc.pages = pages;

        log::info!(
            "Converted {}: {} page(s), {} block(s)",
            self.source_pdf,
            doc.page_count(),
            doc.block_count()
        );

        Ok(doc)
    }

    /// Convert and write the result as JSON in the configured format.
    pub fn convert_to_file<P: AsRef<Path>>(&self, output: P) -> Result<Document> {
        let doc = self.convert()?;
        write_json(&doc, output, self.options.json_format)?;
        Ok(doc)
    }

    /// Section anchors detected on a page.
    pub fn page_sections(&self, page_number: u32) -> Result<SectionMap> {
        self.backend
            .page_layout(page_number)
            .map(|layout| page_sections(&layout))
            .map_err(|e| e.at(Stage::Page(page_number), self.source_pdf.as_str()))
    }

    fn selected_pages(&self) -> Result<Vec<u32>> {
        self.options
            .pages
            .resolve(self.page_count())
            .map_err(|e| match e {
                Error::PageOutOfRange(page, _) => e.at(Stage::Page(page), self.source_pdf.as_str()),
                other => other.at(Stage::Open, self.source_pdf.as_str()),
            })
    }

    fn convert_page(&self, page_number: u32, done: &AtomicU32, total: u32) -> Result<Page> {
        if self.options.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let layout = self
            .backend
            .page_layout(page_number)
            .map_err(|e| e.at(Stage::Page(page_number), self.source_pdf.as_str()))?;

        let page = assemble_page(page_number, &layout, self.options.context);
        log::debug!("Page {}: {} block(s)", page_number, page.block_count());

        let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
        if let Some(progress) = &self.options.progress {
            progress(finished, total);
        }

        Ok(page)
    }
}
