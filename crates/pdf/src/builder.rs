//! Writes translated pages back out as a new PDF.
//!
//! Each input page becomes one output page of the same size.  Spans are
//! replayed at their baseline origin with the closest standard-14 font and
//! images are embedded as XObjects painted into their placement boxes.
//! Elements that cannot be written are logged, skipped and counted in the
//! [`BuildReport`]; only failures to produce the file itself are errors.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use doctrans_core::layout::{BBox, ImageAsset, ImageKind, Page, TextSpan, DEFAULT_PAGE_SIZE};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::encoding::encode_win_ansi;
use crate::fonts::StandardFont;
use crate::images::flate_compress;
use crate::types::{BuildReport, BuiltDocument};
use crate::PdfError;

struct DocumentBuilder {
    doc: Document,
    pages_id: ObjectId,
    kids: Vec<Object>,
    /// Standard font -> (resource name, font object).
    fonts: HashMap<StandardFont, (String, ObjectId)>,
    image_counter: usize,
    report: BuildReport,
}

impl DocumentBuilder {
    fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        DocumentBuilder {
            doc,
            pages_id,
            kids: Vec::new(),
            fonts: HashMap::new(),
            image_counter: 0,
            report: BuildReport::default(),
        }
    }

    fn page_count(&self) -> usize {
        self.kids.len()
    }

    fn font(&mut self, font: StandardFont) -> (String, ObjectId) {
        let next = self.fonts.len() + 1;
        let doc = &mut self.doc;
        self.fonts
            .entry(font)
            .or_insert_with(|| {
                let mut dict = Dictionary::new();
                dict.set("Type", Object::Name(b"Font".to_vec()));
                dict.set("Subtype", Object::Name(b"Type1".to_vec()));
                dict.set("BaseFont", Object::Name(font.base_font().as_bytes().to_vec()));
                dict.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
                (format!("F{}", next), doc.add_object(Object::Dictionary(dict)))
            })
            .clone()
    }

    fn add_page(&mut self, page: &Page, images: &[&ImageAsset]) -> Result<(), PdfError> {
        let page_number = self.page_count() + 1;
        let mut operations = Vec::new();
        let mut font_resources = Dictionary::new();
        let mut xobject_resources = Dictionary::new();

        for span in &page.spans {
            if span.text.is_empty() {
                continue;
            }
            let (resource, font_id) = self.font(StandardFont::resolve(&span.font_name));
            match span_operations(span, &resource) {
                Ok(ops) => {
                    operations.extend(ops);
                    font_resources.set(resource.as_str(), Object::Reference(font_id));
                    self.report.spans_written += 1;
                }
                Err(e) => {
                    log::warn!("page {}: skipping span {:?}: {}", page_number, span.text, e);
                    self.report.skipped_spans += 1;
                }
            }
        }

        for image in images {
            match image_stream(image) {
                Ok(stream) => {
                    self.image_counter += 1;
                    let name = format!("Im{}", self.image_counter);
                    let image_id = self.doc.add_object(stream);
                    xobject_resources.set(name.as_str(), Object::Reference(image_id));
                    operations.extend(paint_operations(image, &name));
                    self.report.images_written += 1;
                }
                Err(e) => {
                    log::warn!("page {}: skipping image: {}", page_number, e);
                    self.report.skipped_images += 1;
                }
            }
        }

        let content = Content { operations }
            .encode()
            .map_err(|e| PdfError::Write(format!("cannot encode page {}: {}", page_number, e)))?;
        let content_id = self.doc.add_object(Stream::new(Dictionary::new(), content));

        let mut resources = Dictionary::new();
        resources.set("Font", Object::Dictionary(font_resources));
        resources.set("XObject", Object::Dictionary(xobject_resources));

        let media_box = media_box(page);
        let mut page_dict = Dictionary::new();
        page_dict.set("Type", Object::Name(b"Page".to_vec()));
        page_dict.set("Parent", Object::Reference(self.pages_id));
        page_dict.set("Resources", Object::Dictionary(resources));
        page_dict.set(
            "MediaBox",
            Object::Array(vec![
                Object::Real(media_box.x0),
                Object::Real(media_box.y0),
                Object::Real(media_box.x1),
                Object::Real(media_box.y1),
            ]),
        );
        if page.rotation != 0 {
            page_dict.set("Rotate", Object::Integer(page.rotation as i64));
        }
        page_dict.set("Contents", Object::Reference(content_id));

        let page_id = self.doc.add_object(Object::Dictionary(page_dict));
        self.kids.push(Object::Reference(page_id));
        self.report.pages += 1;
        Ok(())
    }

    fn finish(mut self) -> Result<BuiltDocument, PdfError> {
        let mut pages_dict = Dictionary::new();
        pages_dict.set("Type", Object::Name(b"Pages".to_vec()));
        pages_dict.set("Count", Object::Integer(self.kids.len() as i64));
        pages_dict.set("Kids", Object::Array(self.kids));
        self.doc
            .objects
            .insert(self.pages_id, Object::Dictionary(pages_dict));

        let mut catalog = Dictionary::new();
        catalog.set("Type", Object::Name(b"Catalog".to_vec()));
        catalog.set("Pages", Object::Reference(self.pages_id));
        let catalog_id = self.doc.add_object(Object::Dictionary(catalog));

        let mut info = Dictionary::new();
        info.set("Producer", Object::string_literal("doctrans"));
        let info_id = self.doc.add_object(Object::Dictionary(info));

        self.doc.trailer.set("Root", Object::Reference(catalog_id));
        self.doc.trailer.set("Info", Object::Reference(info_id));

        let mut bytes = Vec::new();
        self.doc
            .save_to(&mut bytes)
            .map_err(|e| PdfError::Write(format!("cannot serialise document: {}", e)))?;

        Ok(BuiltDocument {
            bytes,
            report: self.report,
        })
    }
}

/// The page's own MediaBox, or a default-size box at the origin when the
/// recorded geometry is unusable.
fn media_box(page: &Page) -> BBox {
    let valid = |v: f32| v.is_finite() && v > 0.0;
    let (x, y) = page.origin;
    if valid(page.width) && valid(page.height) && x.is_finite() && y.is_finite() {
        page.media_box()
    } else {
        BBox::new(0.0, 0.0, DEFAULT_PAGE_SIZE.0, DEFAULT_PAGE_SIZE.1)
    }
}

/// `BT /F1 size Tf 1 0 0 1 x y Tm <text> Tj ET` for one span.
fn span_operations(span: &TextSpan, font_resource: &str) -> Result<Vec<Operation>, PdfError> {
    let (x, y) = (span.bbox.x0, span.bbox.y0);
    if !x.is_finite() || !y.is_finite() || !span.font_size.is_finite() {
        return Err(PdfError::Insertion("non-finite position or size".into()));
    }
    let encoded = encode_win_ansi(&span.text)
        .map_err(|c| PdfError::Insertion(format!("no WinAnsi code for {:?}", c)))?;

    Ok(vec![
        Operation::new("BT", vec![]),
        Operation::new(
            "Tf",
            vec![
                Object::Name(font_resource.as_bytes().to_vec()),
                Object::Real(span.font_size),
            ],
        ),
        Operation::new(
            "Tm",
            vec![
                Object::Real(1.0),
                Object::Real(0.0),
                Object::Real(0.0),
                Object::Real(1.0),
                Object::Real(x),
                Object::Real(y),
            ],
        ),
        Operation::new("Tj", vec![Object::String(encoded, StringFormat::Hexadecimal)]),
        Operation::new("ET", vec![]),
    ])
}

/// `q w 0 0 h x y cm /Im Do Q`: maps the unit square onto the placement box.
fn paint_operations(image: &ImageAsset, name: &str) -> Vec<Operation> {
    let p = image.placement;
    vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![
                Object::Real(p.width()),
                Object::Real(0.0),
                Object::Real(0.0),
                Object::Real(p.height()),
                Object::Real(p.x0),
                Object::Real(p.y0),
            ],
        ),
        Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]),
        Operation::new("Q", vec![]),
    ]
}

fn color_space_name(channels: u8) -> &'static [u8] {
    match channels {
        1 => b"DeviceGray",
        4 => b"DeviceCMYK",
        _ => b"DeviceRGB",
    }
}

/// Image XObject for an asset.  Encoded images keep their bytes verbatim;
/// raw samples are Flate-compressed.
fn image_stream(image: &ImageAsset) -> Result<Stream, PdfError> {
    if !image.placement.is_finite() {
        return Err(PdfError::Insertion("non-finite placement box".into()));
    }

    let encoding = image.encoding;
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"XObject".to_vec()));
    dict.set("Subtype", Object::Name(b"Image".to_vec()));
    dict.set("Width", Object::Integer(encoding.width as i64));
    dict.set("Height", Object::Integer(encoding.height as i64));

    let content = match encoding.kind {
        ImageKind::Jpeg { components } => {
            dict.set("ColorSpace", Object::Name(color_space_name(components).to_vec()));
            dict.set("BitsPerComponent", Object::Integer(8));
            dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));
            image.bytes.clone()
        }
        ImageKind::Jpeg2000 => {
            dict.set("Filter", Object::Name(b"JPXDecode".to_vec()));
            image.bytes.clone()
        }
        ImageKind::Raw { color } => {
            if Some(image.bytes.len()) != encoding.expected_raw_len() {
                return Err(PdfError::Insertion(format!(
                    "{}x{} {:?} image has {} bytes",
                    encoding.width,
                    encoding.height,
                    color,
                    image.bytes.len()
                )));
            }
            dict.set("ColorSpace", Object::Name(color_space_name(color.channels()).to_vec()));
            dict.set("BitsPerComponent", Object::Integer(8));
            dict.set("Filter", Object::Name(b"FlateDecode".to_vec()));
            flate_compress(&image.bytes)?
        }
    };

    Ok(Stream::new(dict, content))
}

/// Build a PDF from `pages`, inserting `images` as the pages are created.
///
/// Images are consumed in order: after output page `k` is created, every
/// pending image with `page_index == k` goes onto it.  An image whose index
/// is never reached this way is skipped.
pub fn build(pages: &[Page], images: &[ImageAsset]) -> Result<BuiltDocument, PdfError> {
    let mut builder = DocumentBuilder::new();
    let mut pending = images.iter().peekable();

    for page in pages {
        let output_index = builder.page_count();
        let mut on_page = Vec::new();
        while let Some(image) = pending.next_if(|img| img.page_index == output_index) {
            on_page.push(image);
        }
        builder.add_page(page, &on_page)?;
    }

    let unreached = pending.count();
    if unreached > 0 {
        log::warn!("{} image(s) reference pages that were never created", unreached);
        builder.report.skipped_images += unreached;
    }

    builder.finish()
}

/// Build and write the document to `output_path`.
///
/// The bytes are staged in a temporary file next to the destination and
/// renamed into place, so a failed write never leaves a partial file.
pub fn save(
    pages: &[Page],
    images: &[ImageAsset],
    output_path: &Path,
) -> Result<BuildReport, PdfError> {
    let built = build(pages, images)?;
    write_atomically(output_path, &built.bytes)?;
    Ok(built.report)
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), PdfError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let write_err = |e: std::io::Error| PdfError::Write(format!("{}: {}", path.display(), e));

    fs::create_dir_all(dir).map_err(write_err)?;
    let mut staging = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    staging.write_all(bytes).map_err(write_err)?;
    staging.as_file().sync_all().map_err(write_err)?;
    staging.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
