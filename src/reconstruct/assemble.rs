//! Turning one question group into a [`Question`].

use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::model::{OptionLetter, Question, QuestionOption};

use super::grouping::QuestionGroup;
use super::markers::{find_answer_key, find_option_markers, remove_answer_keys, strip_question_start};

/// Stem text and per-letter option text split out of a question's text.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TextPartition {
    pub stem: String,
    pub options: BTreeMap<OptionLetter, String>,
}

/// Images split between the stem and the options.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImagePartition<'a> {
    pub stem: Vec<&'a str>,
    pub options: BTreeMap<OptionLetter, &'a str>,
}

/// Collapse whitespace runs to one space and trim both ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Pull the answer key out of `text`.
///
/// The first `Ans [X]` decides the answer; every answer-key marker is removed
/// from the returned text. Without a marker the text is returned untouched.
pub fn extract_answer_key(text: &str) -> (Option<OptionLetter>, Cow<'_, str>) {
    match find_answer_key(text) {
        Some(key) => (Some(key.letter), remove_answer_keys(text)),
        None => (None, Cow::Borrowed(text)),
    }
}

/// Split question text into the stem and the option texts.
///
/// The stem is everything before the first option marker with the leading
/// `<int>.` removed. When a letter repeats, its last occurrence wins.
pub fn partition_text(text: &str) -> TextPartition {
    let markers = find_option_markers(text);

    let stem_end = markers.first().map(|m| m.span.start).unwrap_or(text.len());
    let stem = normalize_whitespace(strip_question_start(&text[..stem_end]));

    let options = markers
        .into_iter()
        .map(|m| (m.letter, normalize_whitespace(m.text)))
        .collect();

    TextPartition { stem, options }
}

/// Assign images to the stem or to options.
///
/// The trailing `min(letters, images)` images go to the options, matched in
/// order against the alphabetically last letters of the same count; every
/// earlier image belongs to the stem.
pub fn partition_images<'a>(images: &[&'a str], letters: &[OptionLetter]) -> ImagePartition<'a> {
    let window = letters.len().min(images.len());
    let (stem, option_images) = images.split_at(images.len() - window);

    let options = letters[letters.len() - window..]
        .iter()
        .copied()
        .zip(option_images.iter().copied())
        .collect();

    ImagePartition {
        stem: stem.to_vec(),
        options,
    }
}

/// Build the question for one group.
pub fn build_question(group: &QuestionGroup<'_>) -> Question {
    let joined = group.joined_text();
    let (correct_answer, text) = extract_answer_key(&joined);
    let partition = partition_text(&text);

    let letters: Vec<OptionLetter> = partition.options.keys().copied().collect();
    let images = group.image_paths();
    let mut placed = partition_images(&images, &letters);

    let options = partition
        .options
        .into_iter()
        .map(|(letter, text)| {
            let option = QuestionOption {
                text,
                image: placed.options.remove(&letter).map(str::to_string),
            };
            (letter, option)
        })
        .collect();

    log::debug!(
        "question {}: {} option(s), {} stem image(s), answer {:?}",
        group.number,
        letters.len(),
        placed.stem.len(),
        correct_answer
    );

    Question {
        number: group.number,
        stem_text: partition.stem,
        stem_images: placed.stem.into_iter().map(str::to_string).collect(),
        options,
        correct_answer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, Block};
    use crate::model::OptionLetter::*;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a \t b\n\nc  "), "a b c");
        assert_eq!(normalize_whitespace("   "), "");
    }

    #[test]
    fn test_extract_answer_key() {
        let (answer, text) = extract_answer_key("3. Q [A] x [B] y Ans [B]");
        assert_eq!(answer, Some(B));
        assert_eq!(text, "3. Q [A] x [B] y ");

        let (answer, text) = extract_answer_key("3. Q [A] x");
        assert_eq!(answer, None);
        assert_eq!(text, "3. Q [A] x");
    }

    #[test]
    fn test_partition_text() {
        let p = partition_text("3. What is 2+2? [A] 3 [B] 4 [C] 5 ");
        assert_eq!(p.stem, "What is 2+2?");
        assert_eq!(p.options.len(), 3);
        assert_eq!(p.options[&A], "3");
        assert_eq!(p.options[&B], "4");
        assert_eq!(p.options[&C], "5");
    }

    #[test]
    fn test_partition_text_without_options() {
        let p = partition_text("8.   Explain   entropy.");
        assert_eq!(p.stem, "Explain entropy.");
        assert!(p.options.is_empty());
    }

    #[test]
    fn test_partition_text_duplicate_letter_last_wins() {
        let p = partition_text("1. Q [A] first [B] b [A] second");
        assert_eq!(p.options.len(), 2);
        assert_eq!(p.options[&A], "second");
    }

    #[test]
    fn test_partition_images_more_images_than_options() {
        let images = ["q1.png", "q2.png", "a.png", "b.png"];
        let p = partition_images(&images, &[A, B]);
        assert_eq!(p.stem, vec!["q1.png", "q2.png"]);
        assert_eq!(p.options[&A], "a.png");
        assert_eq!(p.options[&B], "b.png");
    }

    #[test]
    fn test_partition_images_fewer_images_than_options() {
        let images = ["x.png", "y.png"];
        let p = partition_images(&images, &[A, B, C, D]);
        assert!(p.stem.is_empty());
        assert!(!p.options.contains_key(&A));
        assert!(!p.options.contains_key(&B));
        assert_eq!(p.options[&C], "x.png");
        assert_eq!(p.options[&D], "y.png");
    }

    #[test]
    fn test_partition_images_no_options() {
        let images = ["x.png", "y.png"];
        let p = partition_images(&images, &[]);
        assert_eq!(p.stem, vec!["x.png", "y.png"]);
        assert!(p.options.is_empty());
    }

    #[test]
    fn test_partition_images_skips_missing_letters() {
        let images = ["stem.png", "a.png", "c.png"];
        let p = partition_images(&images, &[A, C]);
        assert_eq!(p.stem, vec!["stem.png"]);
        assert_eq!(p.options[&A], "a.png");
        assert_eq!(p.options[&C], "c.png");
    }

    #[test]
    fn test_build_question() {
        let blocks = vec![
            Block::text("3. What is 2+2?", BBox::default()),
            Block::image("images/q.png", BBox::default()),
            Block::text("[A] 3", BBox::default()),
            Block::image("images/a.png", BBox::default()),
            Block::text("[B] 4 Ans [B]", BBox::default()),
            Block::image("images/b.png", BBox::default()),
        ];
        let group = QuestionGroup {
            number: 3,
            blocks: blocks.iter().collect(),
        };

        let q = build_question(&group);
        assert_eq!(q.number, 3);
        assert_eq!(q.stem_text, "What is 2+2?");
        assert_eq!(q.stem_images, vec!["images/q.png"]);
        assert_eq!(q.options[&A].image.as_deref(), Some("images/a.png"));
        assert_eq!(q.options[&B].text, "4");
        assert_eq!(q.options[&B].image.as_deref(), Some("images/b.png"));
        assert_eq!(q.correct_answer, Some(B));
    }

    #[test]
    fn test_build_question_duplicate_letter_counts_once() {
        let blocks = vec![
            Block::text("7. Pick", BBox::default()),
            Block::image("images/stem.png", BBox::default()),
            Block::text("[A] first [B] b [A] second", BBox::default()),
            Block::image("images/a.png", BBox::default()),
            Block::image("images/b.png", BBox::default()),
        ];
        let group = QuestionGroup {
            number: 7,
            blocks: blocks.iter().collect(),
        };

        let q = build_question(&group);
        assert_eq!(q.option_count(), 2);
        assert_eq!(q.stem_images, vec!["images/stem.png"]);
        assert_eq!(q.options[&A].text, "second");
        assert_eq!(q.options[&A].image.as_deref(), Some("images/a.png"));
        assert_eq!(q.options[&B].image.as_deref(), Some("images/b.png"));
    }
}
