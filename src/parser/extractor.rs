//! Page block extraction.

use std::io::Read;
use std::path::Path;

use unicode_normalization::UnicodeNormalization;

use crate::detect::{detect_format_from_bytes, detect_format_from_path};
use crate::error::{Error, Result};
use crate::model::{BBox, Block, PageBlocks, PdfInfo};

use super::backend::{LopdfBackend, PageId, PdfBackend};
use super::content::{ContentInterpreter, PageContent, RawSpan};
use super::image_writer::write_png;
use super::options::{ErrorMode, ExtractOptions};

/// Spans further apart than this many ems are never merged.
const MERGE_MAX_GAP_EM: f32 = 2.0;
/// A gap wider than this fraction of a character gets a space when merging.
const MERGE_SPACE_RATIO: f32 = 0.2;

/// Extracts positioned text and image blocks from each page of a PDF.
pub struct BlockExtractor<B: PdfBackend = LopdfBackend> {
    backend: B,
    options: ExtractOptions,
}

impl BlockExtractor<LopdfBackend> {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ExtractOptions::default())
    }

    /// Open a PDF file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ExtractOptions) -> Result<Self> {
        let path = path.as_ref();

        // Verify it's a PDF
        detect_format_from_path(path)?;

        let backend = LopdfBackend::load_file(path)?;
        Ok(Self::with_backend(backend, options))
    }

    /// Load a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ExtractOptions::default())
    }

    /// Load a PDF from bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: ExtractOptions) -> Result<Self> {
        detect_format_from_bytes(data)?;
        let backend = LopdfBackend::load_bytes(data)?;
        Ok(Self::with_backend(backend, options))
    }

    /// Load a PDF from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, ExtractOptions::default())
    }

    /// Load a PDF from a reader with custom options.
    pub fn from_reader_with_options<R: Read>(mut reader: R, options: ExtractOptions) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes_with_options(&data, options)
    }

    /// Document information (version, page count, Info dictionary).
    pub fn info(&self) -> PdfInfo {
        self.backend.info()
    }
}

impl<B: PdfBackend> BlockExtractor<B> {
    /// Wrap an existing backend.
    pub fn with_backend(backend: B, options: ExtractOptions) -> Self {
        Self { backend, options }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Get the number of pages.
    pub fn page_count(&self) -> u32 {
        self.backend.pages().len() as u32
    }

    /// Extract the selected pages, in page order.
    pub fn extract(&self) -> Result<Vec<PageBlocks>> {
        if let Some(dir) = &self.options.image_dir {
            std::fs::create_dir_all(dir)?;
        }

        let mut pages = Vec::new();
        for (number, id) in self.backend.pages() {
            if !self.options.pages.includes(number) {
                continue;
            }

            match self.extract_page_id(number, id) {
                Ok(page) => pages.push(page),
                Err(e) => {
                    if self.options.error_mode == ErrorMode::Strict {
                        return Err(e);
                    }
                    log::warn!("Failed to extract page {}: {}", number, e);
                    pages.push(PageBlocks::new(number));
                }
            }
        }

        let (texts, images) = pages
            .iter()
            .fold((0, 0), |(t, i), p| (t + p.text_count(), i + p.image_count()));
        log::info!(
            "extracted {} page(s): {} text block(s), {} image block(s)",
            pages.len(),
            texts,
            images
        );

        Ok(pages)
    }

    /// Extract a single page by its 1-based number, ignoring the page selection.
    pub fn extract_page(&self, number: u32) -> Result<PageBlocks> {
        let pages = self.backend.pages();
        let id = pages
            .get(&number)
            .copied()
            .ok_or(Error::PageOutOfRange(number, pages.len() as u32))?;

        if let Some(dir) = &self.options.image_dir {
            std::fs::create_dir_all(dir)?;
        }
        self.extract_page_id(number, id)
    }

    fn extract_page_id(&self, number: u32, id: PageId) -> Result<PageBlocks> {
        let data = self.backend.page_content(id)?;
        let ops = self.backend.decode_content(&data)?;
        let content = ContentInterpreter::new(&self.backend, id).run(&ops);
        let media_box = self.backend.media_box(id);

        let page = self.build_page(number, id, content, media_box);
        log::debug!(
            "page {}: {} text block(s), {} image block(s)",
            number,
            page.text_count(),
            page.image_count()
        );
        Ok(page)
    }

    fn build_page(
        &self,
        number: u32,
        id: PageId,
        content: PageContent,
        media_box: [f32; 4],
    ) -> PageBlocks {
        let mut page = PageBlocks::new(number);

        let spans = if self.options.merge_spans {
            merge_spans(content.spans)
        } else {
            content.spans
        };
        for span in spans {
            let text: String = span.text.trim().nfc().collect();
            if text.is_empty() {
                continue;
            }
            let bbox = to_page_space(&span.bbox, media_box);
            if !bbox.is_finite() {
                log::warn!("Skipping text {:?} on page {}: degenerate position", text, number);
                continue;
            }
            page.push(Block::text(text, bbox));
        }

        for (index, placement) in content.images.iter().enumerate() {
            let file_name = format!("page_{}_image_{}.png", number, index + 1);
            let bbox = to_page_space(&placement.bbox, media_box);
            if !bbox.is_finite() {
                log::warn!(
                    "Skipping image /{} on page {}: degenerate position",
                    String::from_utf8_lossy(&placement.name),
                    number
                );
                continue;
            }

            if let Some(dir) = &self.options.image_dir {
                let written = self
                    .backend
                    .load_image(id, &placement.name)
                    .and_then(|xobject| write_png(&xobject, &dir.join(&file_name)));
                if let Err(e) = written {
                    log::warn!(
                        "Skipping image /{} on page {}: {}",
                        String::from_utf8_lossy(&placement.name),
                        number,
                        e
                    );
                    continue;
                }
            }

            page.push(Block::image(self.options.image_path(&file_name), bbox));
        }

        page.sort_by_position();
        page
    }
}

/// Convert a user-space box to page space (top-left origin, y down).
fn to_page_space(bbox: &BBox, media_box: [f32; 4]) -> BBox {
    let [left, _, _, top] = media_box;
    BBox::new(
        bbox.x0 - left,
        top - bbox.y1,
        bbox.x1 - left,
        top - bbox.y0,
    )
}

/// Merge consecutive spans drawn on one baseline in the same font.
pub fn merge_spans(spans: Vec<RawSpan>) -> Vec<RawSpan> {
    let mut merged: Vec<RawSpan> = Vec::with_capacity(spans.len());

    for span in spans {
        if let Some(last) = merged.last_mut() {
            if continues(last, &span) {
                let gap = span.bbox.x0 - last.bbox.x1;
                let chars = last.text.chars().count().max(1) as f32;
                let char_width = last.bbox.width() / chars;
                if gap > char_width * MERGE_SPACE_RATIO
                    && !last.text.ends_with(char::is_whitespace)
                    && !span.text.starts_with(char::is_whitespace)
                {
                    last.text.push(' ');
                }
                last.text.push_str(&span.text);
                last.bbox = last.bbox.union(&span.bbox);
                continue;
            }
        }
        merged.push(span);
    }

    merged
}

fn continues(last: &RawSpan, next: &RawSpan) -> bool {
    let gap = next.bbox.x0 - last.bbox.x1;
    last.font == next.font
        && (last.font_size - next.font_size).abs() < 0.01
        && (last.baseline - next.baseline).abs() < 0.5
        && gap > -0.5 * last.font_size
        && gap < MERGE_MAX_GAP_EM * last.font_size
}
