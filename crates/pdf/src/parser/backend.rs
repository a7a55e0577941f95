use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use doctrans_core::layout::{normalize_rotation, BBox};
use lopdf::{self, content::Content};

use crate::encoding::{decode_text_simple, FontDecoder};
use crate::images::{self, DecodedImage};
use crate::PdfError;

/// A page identifier mirroring `lopdf::ObjectId`: (object number, generation number).
pub type PageId = (u32, u16);

/// Font information extracted from a page's resource dictionary.
#[derive(Debug, Clone)]
pub struct BackendFontInfo {
    /// The font name key as it appears in the resource dictionary (e.g. `b"F1"`).
    pub name: Vec<u8>,
    /// Base font name from the font dictionary, if present.
    pub base_font: Option<String>,
}

/// Content-stream operand, detached from `lopdf::Object` so the layout
/// walker can be driven by mock backends.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Number(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<Operand>),
    Other,
}

impl Operand {
    pub fn as_number(&self) -> Option<f32> {
        match self {
            Operand::Number(n) => Some(*n),
            _ => None,
        }
    }
}

/// A single content-stream operation (operator + operands).
#[derive(Debug, Clone)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<Operand>,
}

/// What a `Do` operand resolves to on a page.
#[derive(Debug, Clone, PartialEq)]
pub enum XObject {
    Image(DecodedImage),
    /// An image we could not turn into a supported encoding.
    Undecodable(String),
    /// Form XObjects, missing names and anything else that is not an image.
    NotImage,
}

pub fn convert_object(obj: &lopdf::Object) -> Operand {
    match obj {
        lopdf::Object::Integer(i) => Operand::Number(*i as f32),
        lopdf::Object::Real(f) => Operand::Number(*f),
        lopdf::Object::Name(n) => Operand::Name(n.clone()),
        lopdf::Object::String(s, _) => Operand::Str(s.clone()),
        lopdf::Object::Array(arr) => Operand::Array(arr.iter().map(convert_object).collect()),
        _ => Operand::Other,
    }
}

/// Abstraction over the PDF parsing backend.
///
/// Extraction only talks to this trait, so page walking can be tested
/// against mock documents, including ones whose pages fail to load.
pub trait PdfBackend {
    /// Mapping from 1-based page number to [`PageId`].
    fn pages(&self) -> BTreeMap<u32, PageId>;

    /// The page's MediaBox, if it has a usable one.
    fn media_box(&self, page: PageId) -> Option<BBox>;

    /// Display rotation in degrees (0, 90, 180 or 270).
    fn rotation(&self, page: PageId) -> i32;

    fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>, PdfError>;

    /// Decoded content stream bytes for a page.  A `/Contents` entry that
    /// points at a missing or non-stream object is an error.
    fn page_content(&self, page: PageId) -> Result<Vec<u8>, PdfError>;

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>, PdfError>;

    /// Decode the bytes of a text-showing operator drawn with `font_name`.
    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String;

    /// Resolve the XObject painted by `/name Do` on a page.
    fn xobject(&self, page: PageId, name: &[u8]) -> XObject;
}

/// [`PdfBackend`] backed by [`lopdf::Document`].
pub struct LopdfBackend {
    doc: lopdf::Document,
    /// Decoders built so far, keyed by page and font resource name.
    decoders: RefCell<HashMap<(PageId, Vec<u8>), Rc<FontDecoder>>>,
}

impl LopdfBackend {
    /// Parse a PDF from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self, PdfError> {
        let doc = lopdf::Document::load_mem(data).map_err(|e| PdfError::Read(e.to_string()))?;

        if doc.is_encrypted() {
            return Err(PdfError::Encrypted);
        }

        Ok(Self {
            doc,
            decoders: RefCell::new(HashMap::new()),
        })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// String entries of the trailer's Info dictionary.
    pub fn metadata(&self) -> BTreeMap<String, String> {
        let mut meta = BTreeMap::new();

        let Ok(info_ref) = self.doc.trailer.get(b"Info") else {
            return meta;
        };
        let Some(info_dict) = self.resolve_dict(info_ref) else {
            return meta;
        };

        for (key, obj) in info_dict.iter() {
            let value = match self.resolve(obj) {
                lopdf::Object::String(bytes, _) => decode_text_simple(bytes),
                lopdf::Object::Name(bytes) => String::from_utf8_lossy(bytes).into_owned(),
                _ => continue,
            };
            meta.insert(String::from_utf8_lossy(key).into_owned(), value);
        }

        meta
    }

    /// Look up `key` on a page, walking up the page tree for inheritable
    /// attributes (MediaBox, Resources).
    fn inherited<'a>(&'a self, dict: &'a lopdf::Dictionary, key: &[u8]) -> Option<&'a lopdf::Object> {
        if let Ok(obj) = dict.get(key) {
            return Some(self.resolve(obj));
        }
        let parent_id = dict.get(b"Parent").ok()?.as_reference().ok()?;
        let parent = self.doc.get_object(parent_id).ok()?.as_dict().ok()?;
        self.inherited(parent, key)
    }

    fn resolve<'a>(&'a self, obj: &'a lopdf::Object) -> &'a lopdf::Object {
        match obj {
            lopdf::Object::Reference(id) => self.doc.get_object(*id).unwrap_or(obj),
            _ => obj,
        }
    }

    fn resolve_dict<'a>(&'a self, obj: &'a lopdf::Object) -> Option<&'a lopdf::Dictionary> {
        self.resolve(obj).as_dict().ok()
    }

    fn page_dict(&self, page: PageId) -> Option<&lopdf::Dictionary> {
        self.doc.get_object(page).ok()?.as_dict().ok()
    }

    fn decoder(&self, page: PageId, font_name: &[u8]) -> Rc<FontDecoder> {
        let key = (page, font_name.to_vec());
        if let Some(decoder) = self.decoders.borrow().get(&key) {
            return Rc::clone(decoder);
        }

        let decoder = self
            .doc
            .get_page_fonts(page)
            .ok()
            .and_then(|fonts| fonts.get(font_name).map(|font| FontDecoder::from_font(&self.doc, font)))
            .unwrap_or(FontDecoder::Raw);
        log::trace!("font /{} on {:?}: {:?}", String::from_utf8_lossy(font_name), page, decoder);

        let decoder = Rc::new(decoder);
        self.decoders.borrow_mut().insert(key, Rc::clone(&decoder));
        decoder
    }

    fn stream_content(&self, id: lopdf::ObjectId) -> Result<Vec<u8>, PdfError> {
        let stream = self
            .doc
            .get_object(id)
            .and_then(lopdf::Object::as_stream)
            .map_err(|e| PdfError::Read(format!("content stream {} {} R: {}", id.0, id.1, e)))?;
        stream
            .get_plain_content()
            .map_err(|e| PdfError::Read(format!("content stream {} {} R: {}", id.0, id.1, e)))
    }
}

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn media_box(&self, page: PageId) -> Option<BBox> {
        let page_dict = self.page_dict(page)?;
        let media_box = self.inherited(page_dict, b"MediaBox")?.as_array().ok()?;
        let nums: Vec<f32> = media_box
            .iter()
            .filter_map(|o| match self.resolve(o) {
                lopdf::Object::Integer(i) => Some(*i as f32),
                lopdf::Object::Real(f) => Some(*f),
                _ => None,
            })
            .collect();
        let [x0, y0, x1, y1] = <[f32; 4]>::try_from(nums).ok()?;
        let bbox = BBox::new(x0, y0, x1, y1);
        (bbox.is_finite() && bbox.width() > 0.0 && bbox.height() > 0.0).then_some(bbox)
    }

    fn rotation(&self, page: PageId) -> i32 {
        self.page_dict(page)
            .and_then(|d| self.inherited(d, b"Rotate"))
            .and_then(|o| o.as_i64().ok())
            .map(normalize_rotation)
            .unwrap_or(0)
    }

    fn page_fonts(&self, page: PageId) -> Result<Vec<BackendFontInfo>, PdfError> {
        let fonts_map = self
            .doc
            .get_page_fonts(page)
            .map_err(|e| PdfError::Read(format!("cannot get page fonts: {}", e)))?;

        Ok(fonts_map
            .iter()
            .map(|(name, dict)| BackendFontInfo {
                name: name.clone(),
                base_font: dict
                    .get(b"BaseFont")
                    .ok()
                    .and_then(|o| o.as_name().ok())
                    .map(|n| String::from_utf8_lossy(n).into_owned()),
            })
            .collect())
    }

    fn page_content(&self, page: PageId) -> Result<Vec<u8>, PdfError> {
        let page_dict = self
            .page_dict(page)
            .ok_or_else(|| PdfError::Read(format!("page {} {} R is not a dictionary", page.0, page.1)))?;

        let ids: Vec<lopdf::ObjectId> = match page_dict.get(b"Contents") {
            Err(_) => return Ok(Vec::new()),
            Ok(lopdf::Object::Reference(id)) => match self.doc.get_object(*id) {
                Ok(lopdf::Object::Array(parts)) => parts.iter().filter_map(|p| p.as_reference().ok()).collect(),
                _ => vec![*id],
            },
            Ok(lopdf::Object::Array(parts)) => parts.iter().filter_map(|p| p.as_reference().ok()).collect(),
            Ok(other) => {
                return Err(PdfError::Read(format!("unexpected /Contents {}", other.enum_variant())));
            }
        };

        let mut content = Vec::new();
        for id in ids {
            content.extend(self.stream_content(id)?);
            content.push(b'\n');
        }
        Ok(content)
    }

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>, PdfError> {
        let content = Content::decode(data)
            .map_err(|e| PdfError::Read(format!("content stream decode error: {}", e)))?;

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
        self.decoder(page, font_name).decode(bytes)
    }

    fn xobject(&self, page: PageId, name: &[u8]) -> XObject {
        let stream = self
            .page_dict(page)
            .and_then(|d| self.inherited(d, b"Resources"))
            .and_then(|r| r.as_dict().ok())
            .and_then(|r| r.get(b"XObject").ok())
            .and_then(|x| self.resolve_dict(x))
            .and_then(|x| x.get(name).ok())
            .and_then(|o| self.resolve(o).as_stream().ok());

        let Some(stream) = stream else {
            return XObject::NotImage;
        };

        let is_image = stream
            .dict
            .get(b"Subtype")
            .ok()
            .and_then(|o| o.as_name().ok())
            .is_some_and(|n| n == b"Image");
        if !is_image {
            return XObject::NotImage;
        }

        match images::decode_image_stream(&self.doc, stream) {
            Ok(image) => XObject::Image(image),
            Err(reason) => XObject::Undecodable(reason),
        }
    }
}
