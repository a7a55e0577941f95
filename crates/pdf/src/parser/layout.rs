//! Content-stream walking: positioned text spans and image placements.
//!
//! Every function here is a pure transformation over data supplied by a
//! [`PdfBackend`]; the lopdf document itself never leaks in, which keeps the
//! state machine testable against hand-written operator lists.
//!
//! ```text
//! content ops  ->  PageScan { spans, draws }  ->  Page + ImageAsset[]
//!  (per page)        scan_page                     extract_all_pages
//! ```

use doctrans_core::layout::{BBox, ImageAsset, Page, TextSpan};

use super::backend::{BackendFontInfo, ContentOp, Operand, PageId, PdfBackend, XObject};
use crate::text::{clean_span_text, strip_subset_tag};
use crate::types::ExtractedDocument;
use crate::PdfError;

/// Approximate glyph advance as a fraction of the font size.  No width
/// tables are read, so span boxes are estimates.
const APPROX_CHAR_WIDTH_RATIO: f32 = 0.5;

/// Affine matrix `[a, b, c, d, e, f]` in PDF row-vector convention.
type Matrix = [f32; 6];

const IDENTITY_MATRIX: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// `m` followed by `n`.
fn multiply(m: &Matrix, n: &Matrix) -> Matrix {
    [
        m[0] * n[0] + m[1] * n[2],
        m[0] * n[1] + m[1] * n[3],
        m[2] * n[0] + m[3] * n[2],
        m[2] * n[1] + m[3] * n[3],
        m[4] * n[0] + m[5] * n[2] + n[4],
        m[4] * n[1] + m[5] * n[3] + n[5],
    ]
}

fn apply(m: &Matrix, x: f32, y: f32) -> (f32, f32) {
    (x * m[0] + y * m[2] + m[4], x * m[1] + y * m[3] + m[5])
}

fn matrix_operands(operands: &[Operand]) -> Option<Matrix> {
    let vals: Vec<f32> = operands.iter().take(6).filter_map(Operand::as_number).collect();
    <[f32; 6]>::try_from(vals).ok()
}

/// An image XObject painted by `Do`, with the page-space box it covers.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageDraw {
    pub name: Vec<u8>,
    pub placement: BBox,
}

/// Everything one page's content stream paints, in paint order.
#[derive(Debug, Clone, Default)]
pub struct PageScan {
    pub spans: Vec<TextSpan>,
    pub draws: Vec<ImageDraw>,
}

/// Text parameters tracked while walking a content stream.
#[derive(Debug, Clone)]
struct TextState {
    /// Resource key of the current font (`F1`), used for decoding.
    font_key: Vec<u8>,
    /// Base font name with any subset tag removed.
    font_name: String,
    font_size: f32,
    text_matrix: Matrix,
    line_matrix: Matrix,
    horiz_scale: f32,
    char_spacing: f32,
    word_spacing: f32,
    text_rise: f32,
    leading: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font_key: Vec::new(),
            font_name: String::new(),
            font_size: 0.0,
            text_matrix: IDENTITY_MATRIX,
            line_matrix: IDENTITY_MATRIX,
            horiz_scale: 1.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            text_rise: 0.0,
            leading: 0.0,
        }
    }
}

impl TextState {
    fn advance_x(&mut self, dx: f32) {
        self.text_matrix[4] += dx * self.text_matrix[0];
        self.text_matrix[5] += dx * self.text_matrix[1];
    }

    /// Td: translate the line matrix and start a new line there.
    fn translate_line(&mut self, tx: f32, ty: f32) {
        let (x, y) = apply(&self.line_matrix, tx, ty);
        self.line_matrix[4] = x;
        self.line_matrix[5] = y;
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.translate_line(0.0, -self.leading);
    }

    fn set_font(&mut self, key: Vec<u8>, fonts: &[BackendFontInfo], size: f32) {
        self.font_name = fonts
            .iter()
            .find(|info| info.name == key)
            .and_then(|info| info.base_font.as_deref())
            .map(|name| strip_subset_tag(name).to_string())
            .unwrap_or_default();
        self.font_key = key;
        self.font_size = size;
    }

    fn glyph_advance(&self, ch: char) -> f32 {
        let mut dx = self.font_size * APPROX_CHAR_WIDTH_RATIO + self.char_spacing;
        if ch == ' ' {
            dx += self.word_spacing;
        }
        dx * self.horiz_scale
    }
}

/// Walks one page's operators, carrying the graphics state stack.
struct PageWalker<'a> {
    backend: &'a dyn PdfBackend,
    page_id: PageId,
    page_index: usize,
    fonts: Vec<BackendFontInfo>,
    ctm: Matrix,
    state: TextState,
    stack: Vec<(Matrix, TextState)>,
    scan: PageScan,
}

impl<'a> PageWalker<'a> {
    fn decode(&self, operand: &Operand) -> String {
        match operand {
            Operand::Str(bytes) => self.backend.decode_text(self.page_id, &self.state.font_key, bytes),
            _ => String::new(),
        }
    }

    /// Record one span for a text-showing operator.  `pieces` are the
    /// strings and kerning adjustments of the operator, in order.
    fn show(&mut self, pieces: &[Operand]) {
        let start = multiply(&self.state.text_matrix, &self.ctm);
        let mut raw = String::new();

        for piece in pieces {
            match piece {
                Operand::Str(_) => {
                    let decoded = self.decode(piece);
                    for ch in decoded.chars() {
                        let dx = self.state.glyph_advance(ch);
                        self.state.advance_x(dx);
                    }
                    raw.push_str(&decoded);
                }
                Operand::Number(adjust) => {
                    let dx = -adjust / 1000.0 * self.state.font_size * self.state.horiz_scale;
                    self.state.advance_x(dx);
                }
                _ => {}
            }
        }

        let text = clean_span_text(&raw);
        if text.is_empty() {
            return;
        }

        let end = multiply(&self.state.text_matrix, &self.ctm);
        let (x, y) = apply(&start, 0.0, self.state.text_rise);
        let (end_x, _) = apply(&end, 0.0, self.state.text_rise);
        let size = (self.state.font_size * (start[2].powi(2) + start[3].powi(2)).sqrt()).abs();

        self.scan.spans.push(TextSpan::new(
            text,
            self.state.font_name.clone(),
            size,
            BBox::new(x, y, end_x.max(x), y + size),
            self.page_index,
        ));
    }

    fn paint_xobject(&mut self, name: &[u8]) {
        let corners = [(0.0, 0.0), (1.0, 0.0), (0.0, 1.0), (1.0, 1.0)]
            .map(|(x, y)| apply(&self.ctm, x, y));
        if let Some(placement) = BBox::from_points(&corners) {
            self.scan.draws.push(ImageDraw {
                name: name.to_vec(),
                placement,
            });
        }
    }

    fn step(&mut self, op: &ContentOp) {
        let operands = &op.operands;
        let number = |i: usize| operands.get(i).and_then(Operand::as_number);

        match op.operator.as_str() {
            "q" => self.stack.push((self.ctm, self.state.clone())),
            "Q" => {
                if let Some((ctm, state)) = self.stack.pop() {
                    self.ctm = ctm;
                    self.state = state;
                }
            }
            "cm" => {
                if let Some(m) = matrix_operands(operands) {
                    self.ctm = multiply(&m, &self.ctm);
                }
            }

            "BT" => {
                self.state.text_matrix = IDENTITY_MATRIX;
                self.state.line_matrix = IDENTITY_MATRIX;
            }
            "Tf" => {
                let key = match operands.first() {
                    Some(Operand::Name(n)) => n.clone(),
                    _ => return,
                };
                let size = number(1).unwrap_or(0.0);
                self.state.set_font(key, &self.fonts, size);
            }
            "Tm" => {
                if let Some(m) = matrix_operands(operands) {
                    self.state.text_matrix = m;
                    self.state.line_matrix = m;
                }
            }
            "Td" => {
                if let (Some(tx), Some(ty)) = (number(0), number(1)) {
                    self.state.translate_line(tx, ty);
                }
            }
            "TD" => {
                if let (Some(tx), Some(ty)) = (number(0), number(1)) {
                    self.state.leading = -ty;
                    self.state.translate_line(tx, ty);
                }
            }
            "T*" => self.state.next_line(),
            "TL" => {
                if let Some(v) = number(0) {
                    self.state.leading = v;
                }
            }
            "Tc" => {
                if let Some(v) = number(0) {
                    self.state.char_spacing = v;
                }
            }
            "Tw" => {
                if let Some(v) = number(0) {
                    self.state.word_spacing = v;
                }
            }
            "Tz" => {
                if let Some(v) = number(0) {
                    self.state.horiz_scale = v / 100.0;
                }
            }
            "Ts" => {
                if let Some(v) = number(0) {
                    self.state.text_rise = v;
                }
            }

            "Tj" => {
                if let Some(s) = operands.first() {
                    self.show(std::slice::from_ref(s));
                }
            }
            "TJ" => {
                if let Some(Operand::Array(pieces)) = operands.first() {
                    self.show(pieces);
                }
            }
            "'" => {
                self.state.next_line();
                if let Some(s) = operands.first() {
                    self.show(std::slice::from_ref(s));
                }
            }
            "\"" => {
                if operands.len() >= 3 {
                    if let Some(aw) = number(0) {
                        self.state.word_spacing = aw;
                    }
                    if let Some(ac) = number(1) {
                        self.state.char_spacing = ac;
                    }
                    self.state.next_line();
                    self.show(&operands[2..3]);
                }
            }

            "Do" => {
                if let Some(Operand::Name(name)) = operands.first() {
                    self.paint_xobject(name);
                }
            }

            _ => {}
        }
    }
}

/// Walk a single page's content stream.
///
/// Handles the graphics-state operators `q`, `Q` and `cm`, the text state
/// and positioning operators (`BT`, `Tf`, `Tm`, `Td`, `TD`, `T*`, `TL`,
/// `Tc`, `Tw`, `Tz`, `Ts`), the four text-showing operators and `Do`.
/// Each text-showing operator with non-empty text yields exactly one span.
pub fn scan_page(
    backend: &dyn PdfBackend,
    page_id: PageId,
    page_index: usize,
) -> Result<PageScan, PdfError> {
    let raw_content = backend.page_content(page_id)?;
    let ops = backend.decode_content(&raw_content)?;
    let fonts = backend.page_fonts(page_id)?;

    let mut walker = PageWalker {
        backend,
        page_id,
        page_index,
        fonts,
        ctm: IDENTITY_MATRIX,
        state: TextState::default(),
        stack: Vec::new(),
        scan: PageScan::default(),
    };
    for op in &ops {
        walker.step(op);
    }
    Ok(walker.scan)
}

/// Extract every page of a document.
///
/// Pages keep their MediaBox (origin included) and rotation.  A page
/// without a usable MediaBox gets the default size.  A page whose content
/// cannot be read is kept with its geometry but no spans or images, and counted in `failed_pages`.  Images that cannot be
/// decoded are dropped and counted in `skipped_images`.
pub fn extract_all_pages(backend: &dyn PdfBackend) -> Result<ExtractedDocument, PdfError> {
    let page_ids = backend.pages();
    if page_ids.is_empty() {
        return Err(PdfError::Read("document has no pages".into()));
    }

    let mut doc = ExtractedDocument::default();

    for (index, (&page_num, &page_id)) in page_ids.iter().enumerate() {
        let mut page = Page::empty(index);
        if let Some(media_box) = backend.media_box(page_id) {
            page.origin = (media_box.x0, media_box.y0);
            page.width = media_box.width();
            page.height = media_box.height();
        }
        page.rotation = backend.rotation(page_id);

        match scan_page(backend, page_id, index) {
            Ok(scan) => {
                page.spans = scan.spans;
                for draw in scan.draws {
                    match backend.xobject(page_id, &draw.name) {
                        XObject::Image(image) => doc.images.push(ImageAsset {
                            page_index: index,
                            bytes: image.bytes,
                            placement: draw.placement,
                            encoding: image.encoding,
                        }),
                        XObject::Undecodable(reason) => {
                            log::warn!(
                                "page {}: skipping image /{}: {}",
                                page_num,
                                String::from_utf8_lossy(&draw.name),
                                reason
                            );
                            doc.skipped_images += 1;
                        }
                        XObject::NotImage => {}
                    }
                }
            }
            Err(e) => {
                log::warn!("page {}: extraction failed, page left empty: {}", page_num, e);
                doc.failed_pages += 1;
            }
        }

        doc.pages.push(page);
    }

    Ok(doc)
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, HashSet};

    use doctrans_core::layout::{ImageEncoding, ImageKind, RawColor};

    use super::*;
    use crate::images::DecodedImage;
    use crate::encoding::decode_text_simple;

    /// Mock backend; every page shares the same operators unless listed in
    /// `broken`.
    struct MockBackend {
        page_ids: BTreeMap<u32, PageId>,
        fonts: Vec<BackendFontInfo>,
        ops: Vec<ContentOp>,
        broken: HashSet<PageId>,
        images: Vec<(Vec<u8>, XObject)>,
        media_box: Option<BBox>,
        rotation: i32,
    }

    impl MockBackend {
        fn new(pages: usize, ops: Vec<ContentOp>) -> Self {
            MockBackend {
                page_ids: (1..=pages as u32).map(|n| (n, (n * 10, 0))).collect(),
                fonts: helvetica_font(),
                ops,
                broken: HashSet::new(),
                images: Vec::new(),
                media_box: Some(BBox::new(0.0, 0.0, 612.0, 792.0)),
                rotation: 0,
            }
        }
    }

    impl PdfBackend for MockBackend {
        fn pages(&self) -> BTreeMap<u32, PageId> {
            self.page_ids.clone()
        }

        fn media_box(&self, _page: PageId) -> Option<BBox> {
            self.media_box
        }

        fn rotation(&self, _page: PageId) -> i32 {
            self.rotation
        }

        fn page_fonts(&self, _page_id: PageId) -> Result<Vec<BackendFontInfo>, PdfError> {
            Ok(self.fonts.clone())
        }

        fn page_content(&self, page_id: PageId) -> Result<Vec<u8>, PdfError> {
            if self.broken.contains(&page_id) {
                return Err(PdfError::Read("broken content stream".into()));
            }
            Ok(vec![])
        }

        fn decode_content(&self, _data: &[u8]) -> Result<Vec<ContentOp>, PdfError> {
            Ok(self.ops.clone())
        }

        fn decode_text(&self, _page: PageId, _font_name: &[u8], data: &[u8]) -> String {
            decode_text_simple(data)
        }

        fn xobject(&self, _page: PageId, name: &[u8]) -> XObject {
            self.images
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, x)| x.clone())
                .unwrap_or(XObject::NotImage)
        }
    }

    fn op(operator: &str, operands: Vec<Operand>) -> ContentOp {
        ContentOp {
            operator: operator.to_string(),
            operands,
        }
    }

    fn nums(values: &[f32]) -> Vec<Operand> {
        values.iter().map(|&v| Operand::Number(v)).collect()
    }

    fn helvetica_font() -> Vec<BackendFontInfo> {
        vec![BackendFontInfo {
            name: b"F1".to_vec(),
            base_font: Some("ABCDEF+Helvetica-Bold".to_string()),
        }]
    }

    fn text_at(text: &str, x: f32, y: f32) -> Vec<ContentOp> {
        vec![
            op("BT", vec![]),
            op("Tf", vec![Operand::Name(b"F1".to_vec()), Operand::Number(12.0)]),
            op("Tm", nums(&[1.0, 0.0, 0.0, 1.0, x, y])),
            op("Tj", vec![Operand::Str(text.as_bytes().to_vec())]),
            op("ET", vec![]),
        ]
    }

    fn gray_image() -> XObject {
        XObject::Image(DecodedImage {
            encoding: ImageEncoding {
                width: 1,
                height: 1,
                kind: ImageKind::Raw {
                    color: RawColor::Gray,
                },
            },
            bytes: vec![128],
        })
    }

    #[test]
    fn test_simple_tj() {
        let backend = MockBackend::new(1, text_at("Hello World", 72.0, 700.0));
        let scan = scan_page(&backend, (10, 0), 0).unwrap();
        assert_eq!(scan.spans.len(), 1);
        let span = &scan.spans[0];
        assert_eq!(span.text, "Hello World");
        assert_eq!(span.font_name, "Helvetica-Bold");
        assert!((span.font_size - 12.0).abs() < 0.01);
        assert!((span.bbox.x0 - 72.0).abs() < 0.01);
        assert!((span.bbox.y0 - 700.0).abs() < 0.01);
        assert!((span.bbox.y1 - 712.0).abs() < 0.01);
        assert!(span.bbox.x1 > span.bbox.x0);
    }

    #[test]
    fn test_each_show_operator_is_one_span() {
        let mut ops = text_at("one", 10.0, 10.0);
        ops.insert(4, op("TL", nums(&[14.0])));
        ops.insert(5, op("'", vec![Operand::Str(b"two".to_vec())]));
        ops.insert(
            6,
            op(
                "\"",
                vec![
                    Operand::Number(0.0),
                    Operand::Number(0.0),
                    Operand::Str(b"three".to_vec()),
                ],
            ),
        );
        ops.insert(
            7,
            op(
                "TJ",
                vec![Operand::Array(vec![
                    Operand::Str(b"fo".to_vec()),
                    Operand::Number(-50.0),
                    Operand::Str(b"ur".to_vec()),
                ])],
            ),
        );
        let backend = MockBackend::new(1, ops);
        let scan = scan_page(&backend, (10, 0), 0).unwrap();
        let texts: Vec<&str> = scan.spans.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", "three", "four"]);
        // ' and " move down one line each.
        assert!((scan.spans[1].bbox.y0 - -4.0).abs() < 0.01);
        assert!((scan.spans[2].bbox.y0 - -18.0).abs() < 0.01);
    }

    #[test]
    fn test_empty_strings_are_not_spans() {
        let mut ops = text_at("", 0.0, 0.0);
        ops.insert(4, op("Tj", vec![Operand::Str(b"\xEF\xBF\xBD".to_vec())]));
        let backend = MockBackend::new(1, ops);
        let scan = scan_page(&backend, (10, 0), 0).unwrap();
        assert!(scan.spans.is_empty());
    }

    #[test]
    fn test_text_cleanup_applied() {
        let backend = MockBackend::new(1, text_at("\u{FB01}ne", 0.0, 0.0));
        let scan = scan_page(&backend, (10, 0), 0).unwrap();
        assert_eq!(scan.spans[0].text, "fine");
    }

    #[test]
    fn test_cm_translates_and_scales_text() {
        let mut ops = vec![op("q", vec![]), op("cm", nums(&[2.0, 0.0, 0.0, 2.0, 100.0, 50.0]))];
        ops.extend(text_at("Scaled", 10.0, 20.0));
        ops.push(op("Q", vec![]));
        ops.extend(text_at("Plain", 10.0, 20.0));
        let backend = MockBackend::new(1, ops);
        let scan = scan_page(&backend, (10, 0), 0).unwrap();

        let scaled = &scan.spans[0];
        assert!((scaled.bbox.x0 - 120.0).abs() < 0.01);
        assert!((scaled.bbox.y0 - 90.0).abs() < 0.01);
        assert!((scaled.font_size - 24.0).abs() < 0.01);

        let plain = &scan.spans[1];
        assert!((plain.bbox.x0 - 10.0).abs() < 0.01);
        assert!((plain.font_size - 12.0).abs() < 0.01);
    }

    #[test]
    fn test_unknown_font_uses_default() {
        let mut ops = text_at("x", 0.0, 0.0);
        ops[1] = op("Tf", vec![Operand::Name(b"F9".to_vec()), Operand::Number(0.0)]);
        let backend = MockBackend::new(1, ops);
        let scan = scan_page(&backend, (10, 0), 0).unwrap();
        assert_eq!(scan.spans[0].font_name, "Helvetica");
        assert_eq!(scan.spans[0].font_size, 12.0);
    }

    #[test]
    fn test_do_records_unit_square_placement() {
        let ops = vec![
            op("q", vec![]),
            op("cm", nums(&[200.0, 0.0, 0.0, 100.0, 50.0, 400.0])),
            op("Do", vec![Operand::Name(b"Im1".to_vec())]),
            op("Q", vec![]),
        ];
        let backend = MockBackend::new(1, ops);
        let scan = scan_page(&backend, (10, 0), 0).unwrap();
        assert_eq!(
            scan.draws,
            vec![ImageDraw {
                name: b"Im1".to_vec(),
                placement: BBox::new(50.0, 400.0, 250.0, 500.0),
            }]
        );
    }

    #[test]
    fn test_flipped_ctm_normalises_placement() {
        let ops = vec![
            op("cm", nums(&[10.0, 0.0, 0.0, -10.0, 0.0, 100.0])),
            op("Do", vec![Operand::Name(b"Im1".to_vec())]),
        ];
        let backend = MockBackend::new(1, ops);
        let scan = scan_page(&backend, (10, 0), 0).unwrap();
        assert_eq!(scan.draws[0].placement, BBox::new(0.0, 90.0, 10.0, 100.0));
    }

    #[test]
    fn test_extract_all_pages_collects_images() {
        let mut ops = text_at("Hi", 0.0, 0.0);
        ops.push(op("Do", vec![Operand::Name(b"Im1".to_vec())]));
        ops.push(op("Do", vec![Operand::Name(b"Fm1".to_vec())]));
        ops.push(op("Do", vec![Operand::Name(b"Bad".to_vec())]));
        let mut backend = MockBackend::new(2, ops);
        backend.images = vec![
            (b"Im1".to_vec(), gray_image()),
            (b"Bad".to_vec(), XObject::Undecodable("Indexed".into())),
        ];

        let doc = extract_all_pages(&backend).unwrap();
        assert_eq!(doc.pages.len(), 2);
        assert_eq!(doc.pages[1].index, 1);
        assert_eq!(doc.pages[1].spans[0].page_index, 1);
        assert_eq!(doc.images.len(), 2);
        assert_eq!(doc.images[0].page_index, 0);
        assert_eq!(doc.images[1].page_index, 1);
        assert_eq!(doc.images[0].placement, BBox::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(doc.skipped_images, 2);
        assert_eq!(doc.failed_pages, 0);
    }

    #[test]
    fn test_broken_page_is_kept_empty() {
        let mut backend = MockBackend::new(3, text_at("text", 0.0, 0.0));
        backend.broken.insert((20, 0));

        let doc = extract_all_pages(&backend).unwrap();
        assert_eq!(doc.pages.len(), 3);
        assert_eq!(doc.failed_pages, 1);
        assert!(doc.pages[1].spans.is_empty());
        assert_eq!(doc.pages[1].width, 612.0);
        assert_eq!(doc.pages[0].spans.len(), 1);
        assert_eq!(doc.pages[2].spans.len(), 1);
    }

    #[test]
    fn test_page_geometry_is_carried() {
        let mut backend = MockBackend::new(1, text_at("Top", 72.0, 950.0));
        backend.media_box = Some(BBox::new(0.0, 200.0, 612.0, 992.0));
        backend.rotation = 180;

        let doc = extract_all_pages(&backend).unwrap();
        let page = &doc.pages[0];
        assert_eq!(page.origin, (0.0, 200.0));
        assert_eq!((page.width, page.height), (612.0, 792.0));
        assert_eq!(page.rotation, 180);
        assert_eq!(page.spans[0].bbox.y0, 950.0);
    }

    #[test]
    fn test_missing_media_box_uses_default_size() {
        let mut backend = MockBackend::new(1, vec![]);
        backend.media_box = None;
        let doc = extract_all_pages(&backend).unwrap();
        assert_eq!(doc.pages[0], Page::empty(0));
    }

    #[test]
    fn test_no_pages_is_read_error() {
        let backend = MockBackend::new(0, vec![]);
        assert!(matches!(extract_all_pages(&backend), Err(PdfError::Read(_))));
    }

    #[test]
    fn test_multiply_identity() {
        let m = [2.0, 1.0, 0.5, 3.0, 10.0, 20.0];
        assert_eq!(multiply(&m, &IDENTITY_MATRIX), m);
        assert_eq!(multiply(&IDENTITY_MATRIX, &m), m);
    }
}
