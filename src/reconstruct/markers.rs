//! Marker patterns recognized in exam text.
//!
//! Three kinds of marker drive reconstruction:
//!
//! - question start: `12.` at the beginning of a text block
//! - answer key: `Ans [B]`
//! - option: `[A]` .. `[D]`
//!
//! Each matcher returns a structured result with the byte span of the match so
//! callers never re-scan the text by hand. Whitespace is tolerated inside and
//! around the brackets; letters are case-sensitive.

use std::borrow::Cow;
use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;

use crate::model::OptionLetter;

fn question_start_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(\d+)\.").expect("question-start pattern is valid"))
}

fn answer_key_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Ans\s*\[\s*([A-D])\s*\]").expect("answer-key pattern is valid"))
}

fn option_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[\s*([A-D])\s*\]").expect("option pattern is valid"))
}

/// A question-start marker at the beginning of a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionStart {
    /// The question number
    pub number: u32,
    /// Span of the marker including leading whitespace and the period
    pub span: Range<usize>,
}

/// Match a question-start marker (`<int>.`) at the start of `text`.
///
/// Numbers that overflow `u32` or are zero are not question starts.
pub fn match_question_start(text: &str) -> Option<QuestionStart> {
    let caps = question_start_regex().captures(text)?;
    let whole = caps.get(0)?;
    let number = caps[1].parse::<u32>().ok().filter(|n| *n > 0)?;
    Some(QuestionStart {
        number,
        span: whole.range(),
    })
}

/// Whether `text` begins with something shaped like `<int>.`, valid or not.
pub fn looks_like_question_start(text: &str) -> bool {
    question_start_regex().is_match(text)
}

/// Remove a leading `<int>.` prefix, if any.
pub fn strip_question_start(text: &str) -> &str {
    match question_start_regex().find(text) {
        Some(m) => &text[m.end()..],
        None => text,
    }
}

/// An `Ans [X]` answer-key marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerKey {
    pub letter: OptionLetter,
    pub span: Range<usize>,
}

/// Find the first answer-key marker in `text`.
pub fn find_answer_key(text: &str) -> Option<AnswerKey> {
    let caps = answer_key_regex().captures(text)?;
    Some(AnswerKey {
        letter: letter_of(&caps[1])?,
        span: caps.get(0)?.range(),
    })
}

/// Remove every answer-key marker from `text`.
pub fn remove_answer_keys(text: &str) -> Cow<'_, str> {
    answer_key_regex().replace_all(text, "")
}

/// A bracketed option marker together with the text it introduces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionMarker<'t> {
    pub letter: OptionLetter,
    /// Span of the bracketed letter
    pub span: Range<usize>,
    /// Raw text after the marker, up to the next option marker or end of text
    pub text: &'t str,
}

/// Find every option marker in `text`, in order of appearance.
pub fn find_option_markers(text: &str) -> Vec<OptionMarker<'_>> {
    let found: Vec<(OptionLetter, Range<usize>)> = option_regex()
        .captures_iter(text)
        .filter_map(|caps| Some((letter_of(&caps[1])?, caps.get(0)?.range())))
        .collect();

    found
        .iter()
        .enumerate()
        .map(|(i, (letter, span))| {
            let end = found
                .get(i + 1)
                .map(|(_, next)| next.start)
                .unwrap_or(text.len());
            OptionMarker {
                letter: *letter,
                span: span.clone(),
                text: &text[span.end..end],
            }
        })
        .collect()
}

fn letter_of(s: &str) -> Option<OptionLetter> {
    let mut chars = s.chars();
    let letter = OptionLetter::from_char(chars.next()?)?;
    chars.next().is_none().then_some(letter)
}
