//! Synthetic exam PDFs built with lopdf.

#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

pub const PAGE_WIDTH: i64 = 595;
pub const PAGE_HEIGHT: i64 = 842;

/// Content operations for one page.
#[derive(Default)]
pub struct TestPage {
    ops: Vec<Operation>,
}

impl TestPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw `text` in 12pt Helvetica with its baseline at `(x, y)`.
    pub fn text(mut self, x: i64, y: i64, text: &str) -> Self {
        self.ops.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![x.into(), y.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ]);
        self
    }

    /// Draw a `TJ` array of strings and kerning adjustments.
    pub fn text_array(mut self, x: i64, y: i64, items: Vec<Object>) -> Self {
        self.ops.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![x.into(), y.into()]),
            Operation::new("TJ", vec![Object::Array(items)]),
            Operation::new("ET", vec![]),
        ]);
        self
    }

    /// Draw the image XObject `name` in the rectangle with lower-left `(x, y)`.
    pub fn image(mut self, name: &str, x: i64, y: i64, width: i64, height: i64) -> Self {
        self.ops.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    width.into(),
                    0.into(),
                    0.into(),
                    height.into(),
                    x.into(),
                    y.into(),
                ],
            ),
            Operation::new("Do", vec![name.into()]),
            Operation::new("Q", vec![]),
        ]);
        self
    }
}

/// Build a PDF with the given pages.
///
/// Every page shares one resource dictionary with font `F1` and three images:
/// `Im1` (2×2 RGB), `Im2` (2×2 gray) and `Jpx` (JPEG 2000, not decodable).
pub fn build_pdf(pages: Vec<TestPage>) -> Vec<u8> {
    build_pdf_with_title(pages, None)
}

pub fn build_pdf_with_title(pages: Vec<TestPage>, title: Option<&str>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });

    let rgb_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 2,
            "Height" => 2,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        },
        vec![
            255, 0, 0, 0, 255, 0, //
            0, 0, 255, 255, 255, 255,
        ],
    ));
    let gray_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 2,
            "Height" => 2,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
        },
        vec![0, 85, 170, 255],
    ));
    let jpx_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => 2,
            "Height" => 2,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "JPXDecode",
        },
        vec![0, 0, 0, 12],
    ));

    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
        "XObject" => dictionary! {
            "Im1" => rgb_id,
            "Im2" => gray_id,
            "Jpx" => jpx_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for page in pages {
        let content = Content {
            operations: page.ops,
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("encode content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    if let Some(title) = title {
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(title),
            "CreationDate" => Object::string_literal("D:20240115103045Z"),
        });
        doc.trailer.set("Info", info_id);
    }

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).expect("save pdf");
    buffer
}

/// The two-question exam used by the pipeline tests.
///
/// Question 1 has one stem image and one image per option; question 2 is
/// text only.
pub fn sample_exam() -> Vec<u8> {
    build_pdf(vec![
        TestPage::new()
            .text(72, 780, "1. Which shape has three sides?")
            .image("Im1", 72, 700, 40, 40)
            .text(72, 680, "[A] Triangle [B] Square")
            .image("Im1", 72, 600, 40, 40)
            .image("Im2", 72, 540, 40, 40)
            .text(72, 500, "Ans [A]"),
        TestPage::new().text(72, 780, "2. What is 2+2? [A] 3 [B] 4 [C] 5 Ans [B]"),
    ])
}
