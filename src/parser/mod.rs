//! PDF parsing module.
//!
//! [`BlockExtractor`] turns each page into a [`PageBlocks`](crate::model::PageBlocks)
//! record: the content stream is interpreted by [`ContentInterpreter`], spans
//! on one line are merged, and image XObjects are written out as PNG.

pub mod backend;
mod content;
mod extractor;
mod image_writer;
mod options;

pub use backend::{LopdfBackend, PdfBackend};
pub use content::{ContentInterpreter, ImagePlacement, Matrix, PageContent, RawSpan};
pub use extractor::{merge_spans, BlockExtractor};
pub use image_writer::{decode_image, write_png};
pub use options::{ErrorMode, ExtractOptions, PageSelection, DEFAULT_IMAGE_PREFIX};
