//! PDF backend abstraction layer.
//!
//! Provides a trait-based interface for the PDF operations block extraction
//! needs, isolating the concrete PDF library (lopdf) from the content-stream
//! interpreter.

use std::collections::BTreeMap;

use crate::error::{Error, Result};
use crate::model::{parse_pdf_date, PdfInfo};

/// Page identifier: (object number, generation number).
pub type PageId = (u32, u16);

/// Resource inheritance through `/Parent` is followed at most this deep.
const MAX_TREE_DEPTH: usize = 32;

/// A value from a PDF content stream operand.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Other,
}

impl PdfValue {
    /// Numeric value of an integer or real operand.
    pub fn as_number(&self) -> Option<f32> {
        match self {
            PdfValue::Integer(i) => Some(*i as f32),
            PdfValue::Real(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&[u8]> {
        match self {
            PdfValue::Name(n) => Some(n),
            _ => None,
        }
    }
}

/// A single operation from a PDF content stream.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

impl ContentOp {
    pub fn new(operator: impl Into<String>, operands: Vec<PdfValue>) -> Self {
        Self {
            operator: operator.into(),
            operands,
        }
    }

    /// Numeric operand at `index`.
    pub fn number(&self, index: usize) -> Option<f32> {
        self.operands.get(index).and_then(PdfValue::as_number)
    }
}

/// Color space of an image XObject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorSpace {
    Gray,
    Rgb,
    Cmyk,
    Other(String),
}

/// How an image XObject's samples are stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageEncoding {
    /// A complete JPEG file (`DCTDecode`)
    Jpeg,
    /// Uncompressed samples, already run through Flate/LZW if needed
    Raw,
    /// A filter this crate cannot decode (e.g. `JPXDecode`, `CCITTFaxDecode`)
    Unsupported(String),
}

/// An image XObject loaded from a page's resources.
#[derive(Debug, Clone)]
pub struct ImageXObject {
    pub width: u32,
    pub height: u32,
    pub bits_per_component: u8,
    pub color_space: ColorSpace,
    pub encoding: ImageEncoding,
    pub data: Vec<u8>,
}

/// Abstract interface for PDF document access.
pub trait PdfBackend {
    /// Return all pages as (page_number → PageId).
    fn pages(&self) -> BTreeMap<u32, PageId>;

    /// Return the page's MediaBox as `[x0, y0, x1, y1]` in default user space.
    fn media_box(&self, page: PageId) -> [f32; 4];

    /// Return the raw (decompressed) content stream bytes for a page.
    fn page_content(&self, page: PageId) -> Result<Vec<u8>>;

    /// Parse raw content stream bytes into a sequence of operations.
    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>>;

    /// Decode a text byte sequence using the font's encoding on the given page.
    /// Falls back to simple decoding if the font or encoding is unavailable.
    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String;

    /// Base font name for a font resource, e.g. `Helvetica-Bold`.
    fn font_base_name(&self, page: PageId, font_name: &[u8]) -> Option<String>;

    /// Whether the named XObject on the page is an image.
    fn is_image_xobject(&self, page: PageId, name: &[u8]) -> bool;

    /// Load the named image XObject.
    fn load_image(&self, page: PageId, name: &[u8]) -> Result<ImageXObject>;
}

/// Simple text decoding fallback when no encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&utf16);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

// ---------------------------------------------------------------------------
// LopdfBackend — concrete implementation backed by lopdf
// ---------------------------------------------------------------------------

use lopdf::{Dictionary, Document as LopdfDocument, Object, Stream};

/// Concrete [`PdfBackend`] backed by `lopdf::Document`.
pub struct LopdfBackend {
    doc: LopdfDocument,
}

impl LopdfBackend {
    /// Load from a file path.
    pub fn load_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        Self::checked(LopdfDocument::load(path)?)
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        Self::checked(LopdfDocument::load_mem(data)?)
    }

    /// Load from a reader.
    pub fn load_reader<R: std::io::Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::load_bytes(&data)
    }

    fn checked(doc: LopdfDocument) -> Result<Self> {
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }
        Ok(Self { doc })
    }

    /// Direct access to the underlying `lopdf::Document`.
    pub fn raw_doc(&self) -> &LopdfDocument {
        &self.doc
    }

    /// Get PDF version string.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    /// Read the document Info dictionary.
    pub fn info(&self) -> PdfInfo {
        let mut info = PdfInfo::with_version(self.version());
        info.page_count = self.doc.get_pages().len() as u32;
        info.encrypted = self.doc.is_encrypted();

        let dict = self
            .doc
            .trailer
            .get(b"Info")
            .ok()
            .and_then(|obj| self.resolve_dict(obj));

        if let Some(dict) = dict {
            info.title = string_from_dict(dict, b"Title");
            info.author = string_from_dict(dict, b"Author");
            info.creator = string_from_dict(dict, b"Creator");
            info.producer = string_from_dict(dict, b"Producer");
            info.created = string_from_dict(dict, b"CreationDate").and_then(|d| parse_pdf_date(&d));
            info.modified = string_from_dict(dict, b"ModDate").and_then(|d| parse_pdf_date(&d));
        }

        info
    }

    fn resolve<'a>(&'a self, obj: &'a Object) -> &'a Object {
        match obj {
            Object::Reference(r) => self.doc.get_object(*r).unwrap_or(obj),
            _ => obj,
        }
    }

    fn resolve_dict<'a>(&'a self, obj: &'a Object) -> Option<&'a Dictionary> {
        match self.resolve(obj) {
            Object::Dictionary(d) => Some(d),
            Object::Stream(s) => Some(&s.dict),
            _ => None,
        }
    }

    /// Look up a page attribute, following `/Parent` for inheritable keys.
    fn inherited<'a>(&'a self, page: PageId, key: &[u8]) -> Option<&'a Object> {
        let mut node = self.doc.get_dictionary(page).ok()?;
        for _ in 0..MAX_TREE_DEPTH {
            if let Ok(value) = node.get(key) {
                return Some(self.resolve(value));
            }
            let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
            node = self.doc.get_dictionary(parent).ok()?;
        }
        None
    }

    fn resource_entry<'a>(&'a self, page: PageId, category: &[u8], name: &[u8]) -> Option<&'a Object> {
        let resources = self.resolve_dict(self.inherited(page, b"Resources")?)?;
        let category = self.resolve_dict(resources.get(category).ok()?)?;
        Some(self.resolve(category.get(name).ok()?))
    }

    fn xobject_stream(&self, page: PageId, name: &[u8]) -> Option<&Stream> {
        match self.resource_entry(page, b"XObject", name)? {
            Object::Stream(s) => Some(s),
            _ => None,
        }
    }

    fn color_space(&self, obj: &Object) -> ColorSpace {
        match self.resolve(obj) {
            Object::Name(n) => match n.as_slice() {
                b"DeviceGray" | b"CalGray" | b"G" => ColorSpace::Gray,
                b"DeviceRGB" | b"CalRGB" | b"RGB" => ColorSpace::Rgb,
                b"DeviceCMYK" | b"CMYK" => ColorSpace::Cmyk,
                other => ColorSpace::Other(String::from_utf8_lossy(other).to_string()),
            },
            Object::Array(arr) => {
                let family = arr.first().and_then(|o| o.as_name().ok()).unwrap_or(b"");
                if family == b"ICCBased" {
                    let components = arr
                        .get(1)
                        .and_then(|o| self.resolve_dict(o))
                        .and_then(|d| d.get(b"N").ok())
                        .and_then(|n| n.as_i64().ok());
                    return match components {
                        Some(1) => ColorSpace::Gray,
                        Some(3) => ColorSpace::Rgb,
                        Some(4) => ColorSpace::Cmyk,
                        _ => ColorSpace::Other("ICCBased".to_string()),
                    };
                }
                match arr.first() {
                    Some(first) if arr.len() == 1 => self.color_space(first),
                    _ => ColorSpace::Other(String::from_utf8_lossy(family).to_string()),
                }
            }
            _ => ColorSpace::Other("Unknown".to_string()),
        }
    }
}

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn media_box(&self, page: PageId) -> [f32; 4] {
        let letter = [0.0, 0.0, 612.0, 792.0];
        let Some(Object::Array(values)) = self.inherited(page, b"MediaBox") else {
            return letter;
        };
        let numbers: Vec<f32> = values
            .iter()
            .filter_map(|v| object_number(self.resolve(v)))
            .collect();
        match numbers.as_slice() {
            [x0, y0, x1, y1] => [x0.min(*x1), y0.min(*y1), x0.max(*x1), y0.max(*y1)],
            _ => letter,
        }
    }

    fn page_content(&self, page: PageId) -> Result<Vec<u8>> {
        let page_dict = self
            .doc
            .get_dictionary(page)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        let contents = match page_dict.get(b"Contents") {
            Ok(contents) => self.resolve(contents),
            // A page without content is blank, not broken.
            Err(_) => return Ok(Vec::new()),
        };

        match contents {
            Object::Stream(s) => Ok(stream_bytes(s)),
            Object::Array(arr) => {
                let mut content = Vec::new();
                for obj in arr {
                    if let Object::Stream(s) = self.resolve(obj) {
                        content.extend_from_slice(&stream_bytes(s));
                        content.push(b'\n');
                    }
                }
                Ok(content)
            }
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>> {
        let content =
            lopdf::content::Content::decode(data).map_err(|e| Error::PdfParse(e.to_string()))?;

        Ok(content
            .operations
            .into_iter()
            .map(|op| ContentOp {
                operator: op.operator,
                operands: op.operands.iter().map(convert_object).collect(),
            })
            .collect())
    }

    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String {
        if let Ok(fonts) = self.doc.get_page_fonts(page) {
            if let Some(font_dict) = fonts.get(font_name) {
                if let Ok(enc) = font_dict.get_font_encoding(&self.doc) {
                    if let Ok(text) = LopdfDocument::decode_text(&enc, bytes) {
                        return text;
                    }
                }
            }
        }
        decode_text_simple(bytes)
    }

    fn font_base_name(&self, page: PageId, font_name: &[u8]) -> Option<String> {
        let font = self.resolve_dict(self.resource_entry(page, b"Font", font_name)?)?;
        font.get(b"BaseFont")
            .ok()
            .and_then(|o| o.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).to_string())
    }

    fn is_image_xobject(&self, page: PageId, name: &[u8]) -> bool {
        self.xobject_stream(page, name)
            .and_then(|s| s.dict.get(b"Subtype").ok())
            .and_then(|o| o.as_name().ok())
            .is_some_and(|subtype| subtype == b"Image")
    }

    fn load_image(&self, page: PageId, name: &[u8]) -> Result<ImageXObject> {
        let name_str = String::from_utf8_lossy(name);
        let stream = self
            .xobject_stream(page, name)
            .ok_or_else(|| Error::ImageExtract(format!("XObject /{} not found", name_str)))?;
        let dict = &stream.dict;

        let dimension = |key: &[u8]| -> Result<u32> {
            dict.get(key)
                .ok()
                .and_then(|o| self.resolve(o).as_i64().ok())
                .and_then(|v| u32::try_from(v).ok())
                .filter(|v| *v > 0)
                .ok_or_else(|| {
                    Error::ImageExtract(format!(
                        "/{} has no valid {}",
                        name_str,
                        String::from_utf8_lossy(key)
                    ))
                })
        };
        let width = dimension(b"Width")?;
        let height = dimension(b"Height")?;

        let bits_per_component = dict
            .get(b"BitsPerComponent")
            .ok()
            .and_then(|b| b.as_i64().ok())
            .and_then(|b| u8::try_from(b).ok())
            .unwrap_or(8);

        let color_space = dict
            .get(b"ColorSpace")
            .map(|cs| self.color_space(cs))
            .unwrap_or(ColorSpace::Gray);

        let filters = filter_names(dict);
        let (encoding, data) = match filters.as_slice() {
            [] => (ImageEncoding::Raw, stream.content.clone()),
            [only] if only == "DCTDecode" => (ImageEncoding::Jpeg, stream.content.clone()),
            fs if fs.iter().all(|f| f == "FlateDecode" || f == "LZWDecode") => {
                let data = stream
                    .decompressed_content()
                    .map_err(|e| Error::ImageExtract(format!("/{}: {}", name_str, e)))?;
                (ImageEncoding::Raw, data)
            }
            fs => (ImageEncoding::Unsupported(fs.join("+")), Vec::new()),
        };

        Ok(ImageXObject {
            width,
            height,
            bits_per_component,
            color_space,
            encoding,
            data,
        })
    }
}

/// Decompressed bytes of a stream, or its raw bytes when it has no filter.
fn stream_bytes(stream: &Stream) -> Vec<u8> {
    stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone())
}

/// Names of the filters applied to a stream, in order.
fn filter_names(dict: &Dictionary) -> Vec<String> {
    match dict.get(b"Filter") {
        Ok(Object::Name(n)) => vec![String::from_utf8_lossy(n).to_string()],
        Ok(Object::Array(arr)) => arr
            .iter()
            .filter_map(|o| o.as_name().ok())
            .map(|n| String::from_utf8_lossy(n).to_string())
            .collect(),
        _ => Vec::new(),
    }
}

/// Convert a `lopdf::Object` to [`PdfValue`].
fn convert_object(obj: &Object) -> PdfValue {
    match obj {
        Object::Integer(i) => PdfValue::Integer(*i),
        Object::Real(r) => PdfValue::Real(*r),
        Object::Name(n) => PdfValue::Name(n.clone()),
        Object::String(b, _) => PdfValue::Str(b.clone()),
        Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        _ => PdfValue::Other,
    }
}

fn object_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Helper to get a text string from a PDF dictionary.
fn string_from_dict(dict: &Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key).ok()? {
        Object::String(bytes, _) => Some(decode_text_simple(bytes)),
        Object::Name(bytes) => Some(String::from_utf8_lossy(bytes).to_string()),
        _ => None,
    }
    .map(|s| s.trim_matches('\0').trim().to_string())
    .filter(|s| !s.is_empty())
}
