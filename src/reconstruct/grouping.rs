//! Grouping of the block stream by question number.

use std::collections::BTreeMap;

use crate::model::Block;

use super::markers::{looks_like_question_start, match_question_start};

/// All blocks attributed to one question number, in stream order.
#[derive(Debug, Clone)]
pub struct QuestionGroup<'a> {
    pub number: u32,
    pub blocks: Vec<&'a Block>,
}

impl<'a> QuestionGroup<'a> {
    /// Contents of all text blocks joined with single spaces.
    pub fn joined_text(&self) -> String {
        self.blocks
            .iter()
            .filter_map(|b| b.as_text())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Paths of all image blocks, in stream order.
    pub fn image_paths(&self) -> Vec<&'a str> {
        self.blocks.iter().filter_map(|b| b.as_image()).collect()
    }
}

/// Partition a block stream into question groups.
///
/// A text block that starts with `<int>.` makes that number current; every
/// block seen while a number is current (the marker block included) joins
/// that number's group. Blocks before the first marker are dropped. A number
/// that repeats keeps appending to its existing group. A block shaped like a
/// marker whose number is zero or overflows belongs to no group and leaves the
/// current number unchanged.
///
/// Groups are returned in ascending question order.
pub fn group_blocks<'a, I>(blocks: I) -> Vec<QuestionGroup<'a>>
where
    I: IntoIterator<Item = &'a Block>,
{
    let (groups, _current) = blocks.into_iter().fold(
        (BTreeMap::<u32, Vec<&'a Block>>::new(), None::<u32>),
        |(mut groups, current), block| {
            let current = match block.as_text().filter(|t| looks_like_question_start(t)) {
                Some(text) => match match_question_start(text) {
                    Some(start) => Some(start.number),
                    None => {
                        log::debug!("ignoring block with invalid question number: {:?}", text);
                        return (groups, current);
                    }
                },
                None => current,
            };

            if let Some(number) = current {
                groups.entry(number).or_default().push(block);
            }
            (groups, current)
        },
    );

    groups
        .into_iter()
        .map(|(number, blocks)| QuestionGroup { number, blocks })
        .collect()
}
