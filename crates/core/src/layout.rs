//! Positioned-layout data model shared by extraction, reconstruction and
//! document building.
//!
//! All coordinates are in the source document's native space (PDF user
//! space, origin at the bottom-left corner of the page).

use serde::{Deserialize, Serialize};

/// Font used when a span carries no usable font name.
pub const DEFAULT_FONT_NAME: &str = "Helvetica";

/// Font size used when a span carries no usable size.
pub const DEFAULT_FONT_SIZE: f32 = 12.0;

/// Page size used when the source page has no MediaBox (A4 in points).
pub const DEFAULT_PAGE_SIZE: (f32, f32) = (595.0, 842.0);

/// Axis-aligned rectangle `(x0, y0, x1, y1)` with `x0 <= x1` and `y0 <= y1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BBox {
    /// Build a box from two corners, normalising swapped coordinates.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        BBox {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// Smallest box containing every point.  Returns `None` for no points.
    pub fn from_points(points: &[(f32, f32)]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut bbox = BBox::new(first.0, first.1, first.0, first.1);
        for &(x, y) in rest {
            bbox.x0 = bbox.x0.min(x);
            bbox.y0 = bbox.y0.min(y);
            bbox.x1 = bbox.x1.max(x);
            bbox.y1 = bbox.y1.max(y);
        }
        Some(bbox)
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    pub fn is_finite(&self) -> bool {
        self.x0.is_finite() && self.y0.is_finite() && self.x1.is_finite() && self.y1.is_finite()
    }
}

/// One contiguous run of same-styled text on a page.
///
/// `(bbox.x0, bbox.y0)` is the baseline origin the run was drawn at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpan {
    pub text: String,
    pub font_name: String,
    pub font_size: f32,
    pub bbox: BBox,
    pub page_index: usize,
}

impl TextSpan {
    /// Create a span, substituting the default font and size when the
    /// source does not provide usable values.
    pub fn new(
        text: impl Into<String>,
        font_name: impl Into<String>,
        font_size: f32,
        bbox: BBox,
        page_index: usize,
    ) -> Self {
        let font_name = font_name.into();
        let font_name = if font_name.trim().is_empty() {
            DEFAULT_FONT_NAME.to_string()
        } else {
            font_name
        };
        let font_size = if font_size.is_finite() && font_size > 0.0 {
            font_size
        } else {
            DEFAULT_FONT_SIZE
        };
        TextSpan {
            text: text.into(),
            font_name,
            font_size,
            bbox,
            page_index,
        }
    }
}

/// All spans of one page, in document order.
///
/// The page's MediaBox is `origin` plus `width` by `height`; span boxes
/// live in the same space, so a box that does not start at `(0, 0)` must
/// be written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub index: usize,
    pub width: f32,
    pub height: f32,
    /// Lower-left corner of the MediaBox.
    #[serde(default)]
    pub origin: (f32, f32),
    /// Clockwise display rotation in degrees: 0, 90, 180 or 270.
    #[serde(default)]
    pub rotation: i32,
    pub spans: Vec<TextSpan>,
}

impl Page {
    /// An empty page of the default size.
    pub fn empty(index: usize) -> Self {
        Page {
            index,
            width: DEFAULT_PAGE_SIZE.0,
            height: DEFAULT_PAGE_SIZE.1,
            origin: (0.0, 0.0),
            rotation: 0,
            spans: Vec::new(),
        }
    }

    pub fn media_box(&self) -> BBox {
        let (x, y) = self.origin;
        BBox::new(x, y, x + self.width, y + self.height)
    }
}

/// Reduce a `/Rotate` value to 0, 90, 180 or 270.  Values that are not a
/// multiple of 90 are invalid and read as 0.
pub fn normalize_rotation(degrees: i64) -> i32 {
    if degrees % 90 != 0 {
        return 0;
    }
    degrees.rem_euclid(360) as i32
}

/// Colour model of uncompressed 8-bit pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RawColor {
    Gray,
    Rgb,
    Cmyk,
}

impl RawColor {
    pub fn channels(&self) -> u8 {
        match self {
            RawColor::Gray => 1,
            RawColor::Rgb => 3,
            RawColor::Cmyk => 4,
        }
    }

    pub fn from_channels(channels: i64) -> Option<Self> {
        match channels {
            1 => Some(RawColor::Gray),
            3 => Some(RawColor::Rgb),
            4 => Some(RawColor::Cmyk),
            _ => None,
        }
    }
}

/// How the bytes of an [`ImageAsset`] are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageKind {
    /// Baseline JPEG stream with the given number of colour components.
    Jpeg { components: u8 },
    /// JPEG 2000 codestream (self-describing colour).
    Jpeg2000,
    /// Uncompressed rows, 8 bits per component.
    Raw { color: RawColor },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageEncoding {
    pub width: u32,
    pub height: u32,
    pub kind: ImageKind,
}

impl ImageEncoding {
    /// Byte count a `Raw` image must have.  `None` for encoded kinds.
    pub fn expected_raw_len(&self) -> Option<usize> {
        match self.kind {
            ImageKind::Raw { color } => {
                Some(self.width as usize * self.height as usize * color.channels() as usize)
            }
            _ => None,
        }
    }
}

/// One embedded raster image and where it was painted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAsset {
    pub page_index: usize,
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub placement: BBox,
    pub encoding: ImageEncoding,
}
