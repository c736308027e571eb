//! Content stream interpretation.
//!
//! Walks a page's decoded operations with a graphics-state stack and text
//! state, producing positioned text spans and image placements in PDF user
//! space (origin bottom-left, y up). Glyph metrics are not consulted: every
//! character is estimated at half an em wide.

use std::collections::HashMap;

use crate::model::BBox;

use super::backend::{ContentOp, PageId, PdfBackend, PdfValue};

/// Estimated advance of one character, in em.
const CHAR_WIDTH_EM: f32 = 0.5;
const ASCENT_EM: f32 = 0.8;
const DESCENT_EM: f32 = 0.2;

/// A `TJ` adjustment beyond this many thousandths of an em is a word break.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Graphics-state nesting beyond this depth is ignored.
const MAX_STATE_DEPTH: usize = 64;

/// A PDF transformation matrix `[a b c d e f]`, applied to row vectors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Matrix {
    pub const IDENTITY: Matrix = Matrix {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        e: 0.0,
        f: 0.0,
    };

    pub fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub fn translation(tx: f32, ty: f32) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, tx, ty)
    }

    /// Read a matrix from six numeric operands.
    fn from_op(op: &ContentOp) -> Option<Self> {
        Some(Self::new(
            op.number(0)?,
            op.number(1)?,
            op.number(2)?,
            op.number(3)?,
            op.number(4)?,
            op.number(5)?,
        ))
    }

    /// `self × other`: apply `self` first, then `other`.
    pub fn then(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }

    /// Transform a point.
    pub fn apply(&self, x: f32, y: f32) -> (f32, f32) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Length of the transformed vertical unit vector.
    pub fn vertical_scale(&self) -> f32 {
        (self.c * self.c + self.d * self.d).sqrt()
    }

    /// Bounding box of the rectangle `(x0, y0)-(x1, y1)` after transformation.
    pub fn map_rect(&self, x0: f32, y0: f32, x1: f32, y1: f32) -> BBox {
        let corners = [
            self.apply(x0, y0),
            self.apply(x1, y0),
            self.apply(x0, y1),
            self.apply(x1, y1),
        ];
        // Four corners are never empty.
        BBox::enclosing(&corners).unwrap_or_default()
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A run of text drawn by one text-showing operator.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSpan {
    pub text: String,
    /// Estimated extent in user space
    pub bbox: BBox,
    /// Baseline y in user space
    pub baseline: f32,
    /// Font name (base font when known, else the resource name)
    pub font: String,
    /// Font size after text and graphics scaling
    pub font_size: f32,
}

/// An image XObject drawn with `Do`.
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePlacement {
    /// XObject resource name
    pub name: Vec<u8>,
    /// The unit square mapped through the current matrix
    pub bbox: BBox,
}

/// Everything drawn on a page, in drawing order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageContent {
    pub spans: Vec<RawSpan>,
    pub images: Vec<ImagePlacement>,
}

#[derive(Debug, Clone)]
struct TextState {
    matrix: Matrix,
    line_matrix: Matrix,
    font_resource: Vec<u8>,
    font: String,
    font_size: f32,
    leading: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            matrix: Matrix::IDENTITY,
            line_matrix: Matrix::IDENTITY,
            font_resource: Vec::new(),
            font: String::new(),
            font_size: 12.0,
            leading: 0.0,
        }
    }
}

impl TextState {
    fn begin(&mut self) {
        self.matrix = Matrix::IDENTITY;
        self.line_matrix = Matrix::IDENTITY;
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = Matrix::translation(tx, ty).then(&self.line_matrix);
        self.matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        // Without an explicit leading, assume 1.2 × the font size.
        let leading = if self.leading != 0.0 {
            self.leading
        } else {
            self.font_size * 1.2
        };
        self.move_line(0.0, -leading);
    }

    fn advance(&mut self, tx: f32) {
        self.matrix = Matrix::translation(tx, 0.0).then(&self.matrix);
    }
}

/// Interprets the operations of one page.
pub struct ContentInterpreter<'b, B: PdfBackend> {
    backend: &'b B,
    page: PageId,
    ctm: Matrix,
    stack: Vec<(Matrix, TextState)>,
    text: TextState,
    in_text: bool,
    font_names: HashMap<Vec<u8>, String>,
    content: PageContent,
}

impl<'b, B: PdfBackend> ContentInterpreter<'b, B> {
    pub fn new(backend: &'b B, page: PageId) -> Self {
        Self {
            backend,
            page,
            ctm: Matrix::IDENTITY,
            stack: Vec::new(),
            text: TextState::default(),
            in_text: false,
            font_names: HashMap::new(),
            content: PageContent::default(),
        }
    }

    /// Run all operations and return what was drawn.
    pub fn run(mut self, ops: &[ContentOp]) -> PageContent {
        for op in ops {
            self.step(op);
        }
        self.content
    }

    fn step(&mut self, op: &ContentOp) {
        match op.operator.as_str() {
            "q" => {
                if self.stack.len() < MAX_STATE_DEPTH {
                    self.stack.push((self.ctm, self.text.clone()));
                }
            }
            "Q" => {
                if let Some((ctm, text)) = self.stack.pop() {
                    self.ctm = ctm;
                    self.text = text;
                }
            }
            "cm" => {
                if let Some(m) = Matrix::from_op(op) {
                    self.ctm = m.then(&self.ctm);
                }
            }
            "BT" => {
                self.in_text = true;
                self.text.begin();
            }
            "ET" => self.in_text = false,
            "Tf" => {
                if let Some(name) = op.operands.first().and_then(PdfValue::as_name) {
                    self.set_font(name);
                }
                if let Some(size) = op.number(1) {
                    self.text.font_size = size;
                }
            }
            "TL" => {
                if let Some(leading) = op.number(0) {
                    self.text.leading = leading;
                }
            }
            "Td" => {
                if let (Some(tx), Some(ty)) = (op.number(0), op.number(1)) {
                    self.text.move_line(tx, ty);
                }
            }
            "TD" => {
                if let (Some(tx), Some(ty)) = (op.number(0), op.number(1)) {
                    self.text.leading = -ty;
                    self.text.move_line(tx, ty);
                }
            }
            "Tm" => {
                if let Some(m) = Matrix::from_op(op) {
                    self.text.line_matrix = m;
                    self.text.matrix = m;
                }
            }
            "T*" => self.text.next_line(),
            "Tj" => {
                if let Some(PdfValue::Str(bytes)) = op.operands.first() {
                    self.show(&[PdfValue::Str(bytes.clone())]);
                }
            }
            "TJ" => {
                if let Some(PdfValue::Array(items)) = op.operands.first() {
                    self.show(items);
                }
            }
            "'" => {
                self.text.next_line();
                if let Some(PdfValue::Str(bytes)) = op.operands.first() {
                    self.show(&[PdfValue::Str(bytes.clone())]);
                }
            }
            "\"" => {
                self.text.next_line();
                if let Some(PdfValue::Str(bytes)) = op.operands.get(2) {
                    self.show(&[PdfValue::Str(bytes.clone())]);
                }
            }
            "Do" => {
                if let Some(name) = op.operands.first().and_then(PdfValue::as_name) {
                    self.place_xobject(name);
                }
            }
            _ => {}
        }
    }

    fn set_font(&mut self, resource: &[u8]) {
        let backend = self.backend;
        let page = self.page;
        let font = self
            .font_names
            .entry(resource.to_vec())
            .or_insert_with(|| {
                backend
                    .font_base_name(page, resource)
                    .unwrap_or_else(|| String::from_utf8_lossy(resource).to_string())
            })
            .clone();
        self.text.font_resource = resource.to_vec();
        self.text.font = font;
    }

    /// Show the strings of a `Tj`/`TJ` operand list as one span.
    fn show(&mut self, items: &[PdfValue]) {
        if !self.in_text {
            return;
        }

        let size = self.text.font_size;
        let start = self.text.matrix.then(&self.ctm);
        let mut text = String::new();
        let mut advance = 0.0_f32;

        for item in items {
            match item {
                PdfValue::Str(bytes) => {
                    let decoded =
                        self.backend
                            .decode_text(self.page, &self.text.font_resource, bytes);
                    advance += decoded.chars().count() as f32 * CHAR_WIDTH_EM * size;
                    text.push_str(&decoded);
                }
                value => {
                    if let Some(adjustment) = value.as_number() {
                        advance -= adjustment / 1000.0 * size;
                        if -adjustment > TJ_SPACE_THRESHOLD && wants_space(&text) {
                            text.push(' ');
                        }
                    }
                }
            }
        }

        self.text.advance(advance);

        if text.trim().is_empty() {
            return;
        }

        let bbox = start.map_rect(
            0.0,
            -DESCENT_EM * size,
            advance.max(0.0),
            ASCENT_EM * size,
        );
        self.content.spans.push(RawSpan {
            text,
            bbox,
            baseline: start.apply(0.0, 0.0).1,
            font: self.text.font.clone(),
            font_size: size * start.vertical_scale(),
        });
    }

    fn place_xobject(&mut self, name: &[u8]) {
        if !self.backend.is_image_xobject(self.page, name) {
            // Form XObjects are not descended into.
            log::debug!(
                "page object {:?}: skipping non-image XObject /{}",
                self.page,
                String::from_utf8_lossy(name)
            );
            return;
        }
        self.content.images.push(ImagePlacement {
            name: name.to_vec(),
            bbox: self.ctm.map_rect(0.0, 0.0, 1.0, 1.0),
        });
    }
}

/// Whether a `TJ` word break should append a space to `text`.
fn wants_space(text: &str) -> bool {
    match text.chars().last() {
        Some(c) => c != ' ' && c != '\u{00A0}' && !is_spaceless_script_char(c),
        None => false,
    }
}

/// Check if character is from a script that doesn't use word spaces.
/// Chinese and Japanese don't use spaces between words, but Korean does.
pub fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and extensions
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    || (0x20000..=0x2A6DF).contains(&code)
    || (0x2A700..=0x2B73F).contains(&code)
    || (0x2B740..=0x2B81F).contains(&code)
    || (0x2B820..=0x2CEAF).contains(&code)
    || (0x2CEB0..=0x2EBEF).contains(&code)
    // Hiragana, Katakana
    || (0x3040..=0x309F).contains(&code)
    || (0x30A0..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}
