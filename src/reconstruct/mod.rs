//! Question reconstruction from the extracted block stream.
//!
//! The pipeline is a single grouping pass over the flattened blocks followed by
//! independent per-group assembly:
//!
//! 1. [`group_blocks`] folds the stream into groups keyed by question number.
//! 2. For each group, [`build_question`] pulls the answer key, splits stem and
//!    option text, and distributes the group's images between stem and options.
//!
//! Groups share nothing, so assembly runs on the rayon pool unless
//! [`ReconstructOptions::sequential`] is requested. Output is identical either
//! way.

mod assemble;
mod grouping;
pub mod markers;

pub use assemble::{
    build_question, extract_answer_key, normalize_whitespace, partition_images, partition_text,
    ImagePartition, TextPartition,
};
pub use grouping::{group_blocks, QuestionGroup};

use rayon::prelude::*;

use crate::model::{flatten_pages, Block, PageBlocks, Question};

/// Options for question reconstruction.
#[derive(Debug, Clone)]
pub struct ReconstructOptions {
    /// Assemble question groups in parallel
    pub parallel: bool,
}

impl ReconstructOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable parallel assembly.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel assembly.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

impl Default for ReconstructOptions {
    fn default() -> Self {
        Self { parallel: true }
    }
}

/// Rebuilds question records from page blocks.
#[derive(Debug, Clone, Default)]
pub struct Reconstructor {
    options: ReconstructOptions,
}

impl Reconstructor {
    /// Create a reconstructor with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a reconstructor with custom options.
    pub fn with_options(options: ReconstructOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ReconstructOptions {
        &self.options
    }

    /// Reconstruct questions from page documents, in page order.
    pub fn reconstruct(&self, pages: &[PageBlocks]) -> Vec<Question> {
        self.reconstruct_blocks(flatten_pages(pages))
    }

    /// Reconstruct questions from an already flattened block stream.
    ///
    /// Questions come back in ascending number order.
    pub fn reconstruct_blocks<'a, I>(&self, blocks: I) -> Vec<Question>
    where
        I: IntoIterator<Item = &'a Block>,
    {
        let groups = group_blocks(blocks);
        log::debug!("grouped block stream into {} question(s)", groups.len());

        let questions: Vec<Question> = if self.options.parallel {
            groups.par_iter().map(build_question).collect()
        } else {
            groups.iter().map(build_question).collect()
        };

        let answered = questions
            .iter()
            .filter(|q| q.correct_answer.is_some())
            .count();
        log::info!(
            "reconstructed {} question(s), {} with an answer key",
            questions.len(),
            answered
        );

        questions
    }
}

/// Reconstruct questions from page documents with default options.
pub fn reconstruct(pages: &[PageBlocks]) -> Vec<Question> {
    Reconstructor::new().reconstruct(pages)
}
