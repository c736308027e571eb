//! # quizpdf
//!
//! Rebuilds multiple-choice questions from exam PDFs.
//!
//! Extraction turns every page into an ordered list of positioned text and
//! image blocks. Reconstruction groups that block stream by question number
//! and recovers each question's stem, options, images and answer key.
//!
//! ## Quick Start
//!
//! ```no_run
//! use quizpdf::{extract_file, reconstruct, render};
//!
//! fn main() -> quizpdf::Result<()> {
//!     // Extract page blocks (no images written)
//!     let pages = extract_file("exam.pdf")?;
//!
//!     // Rebuild the questions
//!     let questions = reconstruct(&pages);
//!     println!("{}", render::questions_to_json(&questions, render::JsonFormat::Pretty)?);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Input conventions
//!
//! - A question starts with a text block beginning `<number>.`
//! - Options are marked `[A]` to `[D]`
//! - The answer key is written `Ans [X]`
//! - Images after a question start belong to that question; the trailing ones
//!   are matched to the options

pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod reconstruct;
pub mod render;

// Re-export commonly used types
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_pdf, PdfFormat};
pub use error::{Error, Result};
pub use model::{
    flatten_pages, BBox, Block, OptionLetter, PageBlocks, PdfInfo, Question, QuestionOption,
};
pub use parser::{BlockExtractor, ErrorMode, ExtractOptions, PageSelection};
pub use reconstruct::{reconstruct, ReconstructOptions, Reconstructor};
pub use render::{JsonFormat, QUESTIONS_FILE, STRUCTURED_CONTENT_FILE};

use std::io::Read;
use std::path::{Path, PathBuf};

/// Extract page blocks from a PDF file.
///
/// No image files are written; image blocks still carry their would-be path.
///
/// # Example
///
/// ```no_run
/// use quizpdf::extract_file;
///
/// let pages = extract_file("exam.pdf").unwrap();
/// println!("Pages: {}", pages.len());
/// ```
pub fn extract_file<P: AsRef<Path>>(path: P) -> Result<Vec<PageBlocks>> {
    BlockExtractor::open(path)?.extract()
}

/// Extract page blocks from a PDF file with custom options.
///
/// # Example
///
/// ```no_run
/// use quizpdf::{extract_file_with_options, ExtractOptions};
///
/// let options = ExtractOptions::new()
///     .lenient()
///     .with_image_dir("out/images");
/// let pages = extract_file_with_options("exam.pdf", options).unwrap();
/// ```
pub fn extract_file_with_options<P: AsRef<Path>>(
    path: P,
    options: ExtractOptions,
) -> Result<Vec<PageBlocks>> {
    BlockExtractor::open_with_options(path, options)?.extract()
}

/// Extract page blocks from PDF bytes.
pub fn extract_bytes(data: &[u8]) -> Result<Vec<PageBlocks>> {
    BlockExtractor::from_bytes(data)?.extract()
}

/// Extract page blocks from a reader.
pub fn extract_reader<R: Read>(reader: R) -> Result<Vec<PageBlocks>> {
    BlockExtractor::from_reader(reader)?.extract()
}

/// Reconstruct questions from a `structured_content.json` artifact.
///
/// # Example
///
/// ```no_run
/// use quizpdf::reconstruct_file;
///
/// let questions = reconstruct_file("pdf_structured_output/structured_content.json").unwrap();
/// ```
pub fn reconstruct_file<P: AsRef<Path>>(path: P) -> Result<Vec<Question>> {
    let pages = render::read_pages(path)?;
    Ok(reconstruct(&pages))
}

/// Extract and reconstruct a PDF file in one step (no images written).
pub fn process_file<P: AsRef<Path>>(path: P) -> Result<Vec<Question>> {
    QuizPdf::new().process(path).map(|result| result.questions)
}

/// Builder for running extraction and reconstruction together.
///
/// # Example
///
/// ```no_run
/// use quizpdf::{JsonFormat, QuizPdf};
///
/// QuizPdf::new()
///     .with_output_dir("pdf_structured_output")
///     .lenient()
///     .process("exam.pdf")?
///     .write_to("pdf_structured_output", JsonFormat::Pretty)?;
/// # Ok::<(), quizpdf::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct QuizPdf {
    extract_options: ExtractOptions,
    reconstruct_options: ReconstructOptions,
}

impl QuizPdf {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable lenient extraction mode.
    pub fn lenient(mut self) -> Self {
        self.extract_options = self.extract_options.lenient();
        self
    }

    /// Disable parallel reconstruction.
    pub fn sequential(mut self) -> Self {
        self.reconstruct_options = self.reconstruct_options.sequential();
        self
    }

    /// Set page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.extract_options = self.extract_options.with_pages(pages);
        self
    }

    /// Write images into `dir`.
    pub fn with_image_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.extract_options = self.extract_options.with_image_dir(dir);
        self
    }

    /// Write images into `<dir>/images`, matching the recorded `images/...` paths.
    pub fn with_output_dir(self, dir: impl AsRef<Path>) -> Self {
        let images = dir.as_ref().join(parser::DEFAULT_IMAGE_PREFIX);
        self.with_image_dir(images)
            .with_image_prefix(parser::DEFAULT_IMAGE_PREFIX)
    }

    /// Set the path prefix recorded in image blocks.
    pub fn with_image_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.extract_options = self.extract_options.with_image_prefix(prefix);
        self
    }

    /// Replace the extraction options.
    pub fn with_extract_options(mut self, options: ExtractOptions) -> Self {
        self.extract_options = options;
        self
    }

    /// Replace the reconstruction options.
    pub fn with_reconstruct_options(mut self, options: ReconstructOptions) -> Self {
        self.reconstruct_options = options;
        self
    }

    /// Process a PDF file.
    pub fn process<P: AsRef<Path>>(self, path: P) -> Result<QuizPdfResult> {
        let extractor = BlockExtractor::open_with_options(path, self.extract_options.clone())?;
        self.run(&extractor)
    }

    /// Process a PDF from bytes.
    pub fn process_bytes(self, data: &[u8]) -> Result<QuizPdfResult> {
        let extractor = BlockExtractor::from_bytes_with_options(data, self.extract_options.clone())?;
        self.run(&extractor)
    }

    fn run(self, extractor: &BlockExtractor) -> Result<QuizPdfResult> {
        let pages = extractor.extract()?;
        let questions = Reconstructor::with_options(self.reconstruct_options).reconstruct(&pages);
        Ok(QuizPdfResult { pages, questions })
    }
}

/// Output of [`QuizPdf::process`].
#[derive(Debug, Clone)]
pub struct QuizPdfResult {
    /// Extracted page documents
    pub pages: Vec<PageBlocks>,
    /// Reconstructed questions, ascending by number
    pub questions: Vec<Question>,
}

impl QuizPdfResult {
    /// Page documents as JSON.
    pub fn pages_json(&self, format: JsonFormat) -> Result<String> {
        render::pages_to_json(&self.pages, format)
    }

    /// Questions as JSON.
    pub fn questions_json(&self, format: JsonFormat) -> Result<String> {
        render::questions_to_json(&self.questions, format)
    }

    /// Write `structured_content.json` and `final_questions.json` into `dir`.
    pub fn write_to<P: AsRef<Path>>(&self, dir: P, format: JsonFormat) -> Result<()> {
        let dir = dir.as_ref();
        render::write_pages(dir.join(STRUCTURED_CONTENT_FILE), &self.pages, format)?;
        render::write_questions(dir.join(QUESTIONS_FILE), &self.questions, format)
    }
}
