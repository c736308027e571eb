//! Integration tests for question reconstruction from page blocks.

use quizpdf::render::{self, JsonFormat};
use quizpdf::{
    reconstruct, BBox, Block, OptionLetter, PageBlocks, ReconstructOptions, Reconstructor,
};

fn text(s: &str) -> Block {
    Block::text(s, BBox::default())
}

fn image(p: &str) -> Block {
    Block::image(p, BBox::default())
}

fn page(number: u32, blocks: Vec<Block>) -> PageBlocks {
    PageBlocks {
        page_number: number,
        blocks,
    }
}

/// A mixed exam: header noise, images, repeated answer keys, odd spacing.
fn exam() -> Vec<PageBlocks> {
    vec![
        page(
            1,
            vec![
                text("Chemistry Quiz"),
                image("images/page_1_image_1.png"),
                text("2.   Which   gas is   inert?"),
                text("[A]  Neon   [ B ] Oxygen"),
                text("Ans [A]"),
                text("1. Name the diagram"),
                image("images/page_1_image_2.png"),
                image("images/page_1_image_3.png"),
                image("images/page_1_image_4.png"),
                text("[A] cell [B] atom Ans[ B ] Ans [A]"),
            ],
        ),
        page(
            2,
            vec![
                text("3. Describe osmosis."),
                image("images/page_2_image_1.png"),
                text("10. Last question [C] maybe [D] never"),
            ],
        ),
    ]
}

#[test]
fn test_questions_ascending_and_unique() {
    let questions = reconstruct(&exam());
    let numbers: Vec<u32> = questions.iter().map(|q| q.number).collect();
    assert_eq!(numbers, vec![1, 2, 3, 10]);
}

#[test]
fn test_header_blocks_before_first_question_dropped() {
    let questions = reconstruct(&exam());
    assert!(questions
        .iter()
        .all(|q| q.images().all(|i| i != "images/page_1_image_1.png")));
    assert!(questions.iter().all(|q| !q.stem_text.contains("Chemistry")));
}

#[test]
fn test_whitespace_normalized() {
    let questions = reconstruct(&exam());
    let q2 = &questions[1];
    assert_eq!(q2.stem_text, "Which gas is inert?");
    assert_eq!(q2.options[&OptionLetter::A].text, "Neon");
    assert_eq!(q2.options[&OptionLetter::B].text, "Oxygen");

    for q in &questions {
        let texts = std::iter::once(&q.stem_text).chain(q.options.values().map(|o| &o.text));
        for t in texts {
            assert!(!t.contains("  "), "double space in {:?}", t);
            assert_eq!(t.trim(), t);
        }
    }
}

#[test]
fn test_answer_keys_removed_first_wins() {
    let questions = reconstruct(&exam());
    let q1 = &questions[0];

    assert_eq!(q1.correct_answer, Some(OptionLetter::B));
    assert_eq!(q1.options[&OptionLetter::B].text, "atom");
    for q in &questions {
        assert!(!q.stem_text.contains("Ans"));
        assert!(q.options.values().all(|o| !o.text.contains("Ans")));
    }
}

#[test]
fn test_image_partition_boundary() {
    let questions = reconstruct(&exam());
    let q1 = &questions[0];

    // 3 images, 2 options: one for the stem, the trailing two for A and B
    assert_eq!(q1.stem_images, vec!["images/page_1_image_2.png"]);
    assert_eq!(
        q1.options[&OptionLetter::A].image.as_deref(),
        Some("images/page_1_image_3.png")
    );
    assert_eq!(
        q1.options[&OptionLetter::B].image.as_deref(),
        Some("images/page_1_image_4.png")
    );

    // No options: the image stays with the stem
    let q3 = &questions[2];
    assert_eq!(q3.stem_images, vec!["images/page_2_image_1.png"]);
    assert!(q3.options.is_empty());
    assert_eq!(q3.correct_answer, None);
}

#[test]
fn test_options_without_a_and_b() {
    let questions = reconstruct(&exam());
    let q10 = &questions[3];
    assert_eq!(q10.stem_text, "Last question");
    let letters: Vec<OptionLetter> = q10.options.keys().copied().collect();
    assert_eq!(letters, vec![OptionLetter::C, OptionLetter::D]);
}

#[test]
fn test_fewer_images_than_options() {
    let pages = vec![page(
        1,
        vec![
            text("4. Pick one"),
            text("[A] w [B] x [C] y [D] z"),
            image("images/one.png"),
            image("images/two.png"),
        ],
    )];
    let q = &reconstruct(&pages)[0];

    assert!(q.stem_images.is_empty());
    assert_eq!(q.options[&OptionLetter::A].image, None);
    assert_eq!(q.options[&OptionLetter::B].image, None);
    assert_eq!(q.options[&OptionLetter::C].image.as_deref(), Some("images/one.png"));
    assert_eq!(q.options[&OptionLetter::D].image.as_deref(), Some("images/two.png"));
}

#[test]
fn test_no_markers_no_questions() {
    let pages = vec![page(1, vec![text("Read carefully"), image("images/x.png")])];
    assert!(reconstruct(&pages).is_empty());
    assert!(reconstruct(&[]).is_empty());
}

#[test]
fn test_idempotent_and_mode_independent() {
    let pages = exam();
    let first = render::questions_to_json(&reconstruct(&pages), JsonFormat::Pretty).unwrap();
    let second = render::questions_to_json(&reconstruct(&pages), JsonFormat::Pretty).unwrap();
    let sequential = render::questions_to_json(
        &Reconstructor::with_options(ReconstructOptions::new().sequential()).reconstruct(&pages),
        JsonFormat::Pretty,
    )
    .unwrap();

    assert_eq!(first, second);
    assert_eq!(first, sequential);
}

#[test]
fn test_reconstruct_from_artifact_json() {
    let json = r#"[
        {"page_number": 1, "blocks": [
            {"type": "text", "content": "3. What is 2+2? [A] 3 [B] 4 [C] 5 Ans [B]", "bbox": [72, 52, 300, 64]}
        ]}
    ]"#;
    let pages = render::pages_from_json(json).unwrap();
    let out = render::questions_to_json(&reconstruct(&pages), JsonFormat::Compact).unwrap();

    assert_eq!(
        out,
        concat!(
            r#"[{"question_number":3,"question_text":"What is 2+2?","question_images":[],"#,
            r#""options":{"A":{"text":"3"},"B":{"text":"4"},"C":{"text":"5"}},"#,
            r#""correct_answer":"B"}]"#
        )
    );
}

#[test]
fn test_invalid_question_numbers_do_not_leak_into_options() {
    let pages = vec![page(
        1,
        vec![
            text("4. Four [A] a [B] b"),
            text("0. stray"),
            text("99999999999999999999. huge"),
        ],
    )];
    let questions = reconstruct(&pages);

    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].number, 4);
    assert_eq!(questions[0].options[&OptionLetter::A].text, "a");
    assert_eq!(questions[0].options[&OptionLetter::B].text, "b");
}
