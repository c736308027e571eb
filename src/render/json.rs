//! JSON artifacts: page documents and question lists.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::{PageBlocks, Question};

/// File name of the page-document artifact.
pub const STRUCTURED_CONTENT_FILE: &str = "structured_content.json";

/// File name of the question-list artifact.
pub const QUESTIONS_FILE: &str = "final_questions.json";

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Serialize any value to JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value),
        JsonFormat::Compact => serde_json::to_string(value),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Convert page documents to JSON.
pub fn pages_to_json(pages: &[PageBlocks], format: JsonFormat) -> Result<String> {
    to_json(pages, format)
}

/// Convert a question list to JSON.
pub fn questions_to_json(questions: &[Question], format: JsonFormat) -> Result<String> {
    to_json(questions, format)
}

/// Parse page documents from JSON.
pub fn pages_from_json(json: &str) -> Result<Vec<PageBlocks>> {
    Ok(serde_json::from_str(json)?)
}

/// Parse a question list from JSON.
pub fn questions_from_json(json: &str) -> Result<Vec<Question>> {
    Ok(serde_json::from_str(json)?)
}

/// Read page documents from a file.
pub fn read_pages<P: AsRef<Path>>(path: P) -> Result<Vec<PageBlocks>> {
    pages_from_json(&fs::read_to_string(path)?)
}

/// Read a question list from a file.
pub fn read_questions<P: AsRef<Path>>(path: P) -> Result<Vec<Question>> {
    questions_from_json(&fs::read_to_string(path)?)
}

/// Write page documents to a file.
pub fn write_pages<P: AsRef<Path>>(path: P, pages: &[PageBlocks], format: JsonFormat) -> Result<()> {
    write_json(path.as_ref(), &pages_to_json(pages, format)?)
}

/// Write a question list to a file.
pub fn write_questions<P: AsRef<Path>>(
    path: P,
    questions: &[Question],
    format: JsonFormat,
) -> Result<()> {
    write_json(path.as_ref(), &questions_to_json(questions, format)?)
}

fn write_json(path: &Path, json: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, format!("{}\n", json))?;
    log::debug!("wrote {} ({} bytes)", path.display(), json.len() + 1);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, Block, OptionLetter, QuestionOption};

    fn sample_pages() -> Vec<PageBlocks> {
        let mut page = PageBlocks::new(1);
        page.push(Block::text("1. Où est Paris?", BBox::new(72.0, 80.0, 200.0, 92.0)));
        page.push(Block::image(
            "images/page_1_image_1.png",
            BBox::new(72.0, 100.0, 172.0, 140.0),
        ));
        vec![page]
    }

    #[test]
    fn test_to_json_pretty() {
        let json = pages_to_json(&sample_pages(), JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"page_number\": 1"));
        assert!(json.contains('\n')); // Pretty has newlines
        // Non-ASCII is kept as-is
        assert!(json.contains("Où"));
    }

    #[test]
    fn test_to_json_compact() {
        let json = pages_to_json(&sample_pages(), JsonFormat::Compact).unwrap();
        assert!(!json.contains('\n')); // Compact has no newlines
        assert!(json.contains(r#""type":"image","path":"images/page_1_image_1.png""#));
    }

    #[test]
    fn test_pages_from_json() {
        let json = r#"[
            {"page_number": 2, "blocks": [
                {"type": "text", "content": "5. Q [A] x", "bbox": [1, 2, 3, 4]},
                {"type": "image", "path": "images/a.png", "bbox": [0, 10.5, 5, 20]}
            ]}
        ]"#;
        let pages = pages_from_json(json).unwrap();

        assert_eq!(pages[0].page_number, 2);
        assert_eq!(pages[0].blocks[0].as_text(), Some("5. Q [A] x"));
        assert_eq!(pages[0].blocks[1].bbox().y0, 10.5);
    }

    #[test]
    fn test_pages_from_json_invalid() {
        assert!(matches!(
            pages_from_json("{not json"),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            pages_from_json(r#"[{"page_number": 1, "blocks": [{"type": "video"}]}]"#),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_write_and_read_files() {
        let dir = tempfile::tempdir().unwrap();
        let pages_path = dir.path().join("out").join(STRUCTURED_CONTENT_FILE);
        write_pages(&pages_path, &sample_pages(), JsonFormat::Pretty).unwrap();
        assert_eq!(read_pages(&pages_path).unwrap(), sample_pages());

        let mut question = Question::new(1);
        question.stem_text = "Où est Paris?".to_string();
        question
            .options
            .insert(OptionLetter::A, QuestionOption::new("France"));
        question.correct_answer = Some(OptionLetter::A);

        let questions_path = dir.path().join(QUESTIONS_FILE);
        write_questions(&questions_path, &[question.clone()], JsonFormat::Compact).unwrap();
        assert_eq!(read_questions(&questions_path).unwrap(), vec![question]);
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_pages(dir.path().join("missing.json")),
            Err(Error::Io(_))
        ));
    }
}
