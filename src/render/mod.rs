//! Serialization of page documents and question lists.

mod json;

pub use json::{
    pages_from_json, pages_to_json, questions_from_json, questions_to_json, read_pages,
    read_questions, to_json, write_pages, write_questions, JsonFormat, QUESTIONS_FILE,
    STRUCTURED_CONTENT_FILE,
};
