//! Data model shared by the extractor and the reconstructor.
//!
//! [`PageBlocks`] is the intermediate artifact written by extraction;
//! [`Question`] is the final artifact written by reconstruction.

mod block;
mod info;
mod question;

pub use block::{flatten_pages, BBox, Block, PageBlocks};
pub use info::{parse_pdf_date, PdfInfo};
pub use question::{OptionLetter, Question, QuestionOption};
