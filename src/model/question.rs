//! Reconstructed question records.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Letter key of an answer option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OptionLetter {
    A,
    B,
    C,
    D,
}

impl OptionLetter {
    /// All letters in alphabetical order.
    pub const ALL: [OptionLetter; 4] = [
        OptionLetter::A,
        OptionLetter::B,
        OptionLetter::C,
        OptionLetter::D,
    ];

    /// Parse an upper-case letter `A`..`D`.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'A' => Some(OptionLetter::A),
            'B' => Some(OptionLetter::B),
            'C' => Some(OptionLetter::C),
            'D' => Some(OptionLetter::D),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            OptionLetter::A => 'A',
            OptionLetter::B => 'B',
            OptionLetter::C => 'C',
            OptionLetter::D => 'D',
        }
    }
}

impl std::fmt::Display for OptionLetter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// One answer choice.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuestionOption {
    /// Normalized option text
    pub text: String,

    /// Image attached to this option
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl QuestionOption {
    /// Create an option without an image.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            image: None,
        }
    }

    /// Attach an image.
    pub fn with_image(mut self, path: impl Into<String>) -> Self {
        self.image = Some(path.into());
        self
    }
}

/// A reconstructed multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Question number as printed in the document
    #[serde(rename = "question_number")]
    pub number: u32,

    /// Stem text without number prefix, option markers or answer key
    #[serde(rename = "question_text")]
    pub stem_text: String,

    /// Images belonging to the stem, in document order
    #[serde(rename = "question_images")]
    pub stem_images: Vec<String>,

    /// Options keyed by letter
    pub options: BTreeMap<OptionLetter, QuestionOption>,

    /// Letter marked correct by the answer key, if any
    pub correct_answer: Option<OptionLetter>,
}

impl Question {
    /// Create an empty question.
    pub fn new(number: u32) -> Self {
        Self {
            number,
            stem_text: String::new(),
            stem_images: Vec::new(),
            options: BTreeMap::new(),
            correct_answer: None,
        }
    }

    /// Number of options.
    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    /// Iterate over every image referenced by the question, stem first.
    pub fn images(&self) -> impl Iterator<Item = &str> {
        self.stem_images.iter().map(String::as_str).chain(
            self.options
                .values()
                .filter_map(|o| o.image.as_deref()),
        )
    }

    /// The option marked correct, when the key names a parsed option.
    pub fn correct_option(&self) -> Option<&QuestionOption> {
        self.correct_answer.and_then(|l| self.options.get(&l))
    }
}
