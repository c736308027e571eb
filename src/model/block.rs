//! Positioned content blocks produced by the extractor.

use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in page space.
///
/// The origin is the top-left corner of the page and `y` grows downwards,
/// so `y0` is the top edge. Serialized as `[x0, y0, x1, y1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BBox {
    /// Create a box from its corners.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Smallest box containing all the given points.
    pub fn enclosing(points: &[(f32, f32)]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bbox = Self::new(first.0, first.1, first.0, first.1);
        for &(x, y) in rest {
            bbox.x0 = bbox.x0.min(x);
            bbox.y0 = bbox.y0.min(y);
            bbox.x1 = bbox.x1.max(x);
            bbox.y1 = bbox.y1.max(y);
        }
        Some(bbox)
    }

    /// Merge with another box.
    pub fn union(&self, other: &BBox) -> BBox {
        BBox::new(
            self.x0.min(other.x0),
            self.y0.min(other.y0),
            self.x1.max(other.x1),
            self.y1.max(other.y1),
        )
    }

    /// Vertical position used for top-to-bottom ordering.
    pub fn top(&self) -> f32 {
        self.y0
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Whether all coordinates are finite.
    pub fn is_finite(&self) -> bool {
        self.x0.is_finite() && self.y0.is_finite() && self.x1.is_finite() && self.y1.is_finite()
    }
}

impl From<[f32; 4]> for BBox {
    fn from(v: [f32; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BBox> for [f32; 4] {
    fn from(b: BBox) -> Self {
        [b.x0, b.y0, b.x1, b.y1]
    }
}

/// One positioned unit of page content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Block {
    /// A run of text. `content` is trimmed and never empty.
    Text { content: String, bbox: BBox },
    /// A placed image, referenced by its path relative to the output directory.
    Image { path: String, bbox: BBox },
}

impl Block {
    /// Create a text block.
    pub fn text(content: impl Into<String>, bbox: BBox) -> Self {
        Block::Text {
            content: content.into(),
            bbox,
        }
    }

    /// Create an image block.
    pub fn image(path: impl Into<String>, bbox: BBox) -> Self {
        Block::Image {
            path: path.into(),
            bbox,
        }
    }

    pub fn bbox(&self) -> &BBox {
        match self {
            Block::Text { bbox, .. } | Block::Image { bbox, .. } => bbox,
        }
    }

    /// Text content, if this is a text block.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Block::Text { content, .. } => Some(content),
            Block::Image { .. } => None,
        }
    }

    /// Image path, if this is an image block.
    pub fn as_image(&self) -> Option<&str> {
        match self {
            Block::Image { path, .. } => Some(path),
            Block::Text { .. } => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Block::Text { .. })
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Block::Image { .. })
    }
}

/// The blocks of one page, top to bottom.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PageBlocks {
    /// Page number (1-indexed)
    pub page_number: u32,

    /// Content blocks in reading order
    pub blocks: Vec<Block>,
}

impl PageBlocks {
    /// Create an empty page.
    pub fn new(page_number: u32) -> Self {
        Self {
            page_number,
            blocks: Vec::new(),
        }
    }

    /// Add a block at the end of the page.
    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Sort blocks top to bottom. The sort is stable, so blocks sharing a top
    /// edge keep their insertion order.
    pub fn sort_by_position(&mut self) {
        self.blocks
            .sort_by(|a, b| a.bbox().top().total_cmp(&b.bbox().top()));
    }

    pub fn text_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_text()).count()
    }

    pub fn image_count(&self) -> usize {
        self.blocks.iter().filter(|b| b.is_image()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Flatten page documents into the single block stream, in page order.
pub fn flatten_pages(pages: &[PageBlocks]) -> impl Iterator<Item = &Block> {
    pages.iter().flat_map(|p| p.blocks.iter())
}
