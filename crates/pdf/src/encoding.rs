//! Font text decoding and WinAnsi encoding.
//!
//! Decoding follows the usual precedence for text extraction: a font's
//! ToUnicode CMap wins, then its `/Encoding` (a base encoding name, or a
//! dictionary with `/Differences`), then the font type's default.
//! lopdf supplies the CMap parser and the one-byte tables.

use std::collections::HashMap;
use std::sync::OnceLock;

use lopdf::{Dictionary, Document, Encoding, Object};

use crate::glyphs::glyph_to_char;

/// Names of the one-byte base encodings lopdf ships tables for.
const BASE_ENCODINGS: [&[u8]; 5] = [
    b"StandardEncoding",
    b"MacRomanEncoding",
    b"MacExpertEncoding",
    b"WinAnsiEncoding",
    b"PDFDocEncoding",
];

type ByteTable = [Option<char>; 256];

/// How the string bytes of one font turn into text.
pub enum FontDecoder {
    /// A parsed ToUnicode CMap.
    Cmap(Encoding<'static>),
    /// One character per byte.
    Table(Box<ByteTable>),
    /// Two-byte codes read as UTF-16BE (Identity fonts without a CMap).
    Utf16,
    /// Encoding we cannot interpret.
    Raw,
}

impl std::fmt::Debug for FontDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cmap(_) => f.write_str("Cmap"),
            Self::Table(_) => f.write_str("Table"),
            Self::Utf16 => f.write_str("Utf16"),
            Self::Raw => f.write_str("Raw"),
        }
    }
}

impl FontDecoder {
    /// Pick the decoder for a font dictionary of `doc`.
    pub fn from_font(doc: &Document, font: &Dictionary) -> Self {
        if let Some(cmap) = to_unicode(doc, font) {
            return cmap;
        }

        let encoding = font.get(b"Encoding").ok().map(|o| deref(doc, o));
        match encoding {
            Some(Object::Name(name)) => Self::from_name(name),
            Some(Object::Dictionary(dict)) => Self::Table(Box::new(differences(doc, dict))),
            _ if is_type0(font) => Self::Utf16,
            _ => Self::Table(Box::new(base_table(b"StandardEncoding"))),
        }
    }

    fn from_name(name: &[u8]) -> Self {
        if BASE_ENCODINGS.contains(&name) {
            return Self::Table(Box::new(base_table(name)));
        }
        match name {
            b"Identity-H" | b"Identity-V" => Self::Utf16,
            _ if name.ends_with(b"UCS2-H") || name.ends_with(b"UTF16-H") => Self::Utf16,
            _ => {
                log::debug!("unsupported font encoding {}", String::from_utf8_lossy(name));
                Self::Raw
            }
        }
    }

    pub fn decode(&self, bytes: &[u8]) -> String {
        match self {
            Self::Cmap(encoding) => {
                Document::decode_text(encoding, bytes).unwrap_or_else(|_| decode_text_simple(bytes))
            }
            Self::Table(table) => bytes.iter().filter_map(|&b| table[b as usize]).collect(),
            Self::Utf16 => decode_utf16(bytes),
            Self::Raw => decode_text_simple(bytes),
        }
    }
}

fn deref<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    doc.dereference(obj).map(|(_, o)| o).unwrap_or(obj)
}

fn is_type0(font: &Dictionary) -> bool {
    font.get(b"Subtype")
        .and_then(Object::as_name)
        .is_ok_and(|n| n == b"Type0")
}

/// A font dictionary holding only the entries lopdf looks at.
fn font_shim(encoding: &[u8]) -> Dictionary {
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"Font".to_vec()));
    dict.set("Encoding", Object::Name(encoding.to_vec()));
    dict
}

fn to_unicode(doc: &Document, font: &Dictionary) -> Option<FontDecoder> {
    let cmap = font.get(b"ToUnicode").ok()?;
    let mut shim = font_shim(b"Identity-H");
    shim.set("ToUnicode", cmap.clone());

    match shim.get_font_encoding(doc) {
        Ok(Encoding::UnicodeMapEncoding(map)) => Some(FontDecoder::Cmap(Encoding::UnicodeMapEncoding(map))),
        Ok(_) => None,
        Err(err) => {
            log::debug!("ignoring unreadable ToUnicode CMap: {err}");
            None
        }
    }
}

/// Materialise one of lopdf's one-byte encodings.
fn base_table(name: &[u8]) -> ByteTable {
    let mut table = [None; 256];
    let shim = font_shim(name);
    let Ok(encoding) = shim.get_font_encoding(&Document::new()) else {
        return table;
    };
    for (byte, slot) in table.iter_mut().enumerate() {
        *slot = Document::decode_text(&encoding, &[byte as u8])
            .ok()
            .and_then(|s| s.chars().next());
    }
    table
}

/// Apply an encoding dictionary: `/BaseEncoding` then `/Differences`.
fn differences(doc: &Document, dict: &Dictionary) -> ByteTable {
    let base = dict
        .get(b"BaseEncoding")
        .and_then(Object::as_name)
        .ok()
        .filter(|n| BASE_ENCODINGS.contains(n))
        .unwrap_or(&b"StandardEncoding"[..]);
    let mut table = base_table(base);

    let Some(entries) = dict
        .get(b"Differences")
        .ok()
        .and_then(|o| deref(doc, o).as_array().ok())
    else {
        return table;
    };

    let mut code: usize = 0;
    for entry in entries {
        match deref(doc, entry) {
            Object::Integer(start) => code = (*start).clamp(0, 256) as usize,
            Object::Name(glyph) => {
                if let Some(slot) = table.get_mut(code) {
                    *slot = glyph_to_char(&String::from_utf8_lossy(glyph));
                }
                code += 1;
            }
            _ => {}
        }
    }
    table
}

fn decode_utf16(bytes: &[u8]) -> String {
    if bytes.is_empty() || bytes.len() % 2 != 0 {
        return decode_text_simple(bytes);
    }
    let code_units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| u16::from_be_bytes([c[0], c[1]]))
        .collect();
    let decoded = String::from_utf16_lossy(&code_units);
    if decoded.chars().all(|c| c == '\u{FFFD}' || c == '\0') {
        decode_text_simple(bytes)
    } else {
        decoded
    }
}

/// Best-effort decoding of raw PDF string bytes into a Rust `String`.
///
/// UTF-16BE with a BOM first, then UTF-8, then Latin-1 as a last resort.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let code_units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&code_units);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    bytes.iter().map(|&b| b as char).collect()
}

fn win_ansi_codes() -> &'static HashMap<char, u8> {
    static CODES: OnceLock<HashMap<char, u8>> = OnceLock::new();
    CODES.get_or_init(|| {
        let mut codes = HashMap::new();
        for (byte, c) in base_table(b"WinAnsiEncoding").iter().enumerate() {
            if let Some(c) = c {
                codes.entry(*c).or_insert(byte as u8);
            }
        }
        // Unassigned bytes decode as bullets too; 0x95 is the real one.
        codes.insert('\u{2022}', 0x95);
        codes
    })
}

/// Encode `text` as WinAnsi for the standard 14 fonts.  Any whitespace
/// becomes a plain space.
///
/// Returns the first character that has no WinAnsi code.
pub fn encode_win_ansi(text: &str) -> Result<Vec<u8>, char> {
    let codes = win_ansi_codes();
    text.chars()
        .map(|c| {
            if c.is_whitespace() {
                Ok(b' ')
            } else {
                codes.get(&c).copied().ok_or(c)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::Stream;

    fn font(entries: Vec<(&str, Object)>) -> Dictionary {
        let mut dict = Dictionary::new();
        dict.set("Type", Object::Name(b"Font".to_vec()));
        for (key, value) in entries {
            dict.set(key, value);
        }
        dict
    }

    fn name(n: &str) -> Object {
        Object::Name(n.as_bytes().to_vec())
    }

    const CMAP: &[u8] = b"/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
/CIDSystemInfo
<< /Registry (Adobe)
/Ordering (UCS)
/Supplement 0
>> def
/CMapName /Adobe-Identity-UCS def
/CMapType 2 def
1 begincodespacerange
<0000> <FFFF>
endcodespacerange
2 beginbfchar
<0003> <0048>
<0004> <0069>
endbfchar
endcmap
CMapName currentdict /CMap defineresource pop
end
end";

    #[test]
    fn test_to_unicode_cmap() {
        let mut doc = Document::with_version("1.7");
        let cmap_id = doc.add_object(Stream::new(Dictionary::new(), CMAP.to_vec()));
        let f = font(vec![
            ("Subtype", name("Type0")),
            ("Encoding", name("Identity-H")),
            ("ToUnicode", Object::Reference(cmap_id)),
        ]);

        let decoder = FontDecoder::from_font(&doc, &f);
        assert!(matches!(decoder, FontDecoder::Cmap(_)));
        assert_eq!(decoder.decode(&[0x00, 0x03, 0x00, 0x04]), "Hi");
    }

    #[test]
    fn test_to_unicode_wins_over_encoding_name() {
        let mut doc = Document::with_version("1.7");
        let cmap_id = doc.add_object(Stream::new(Dictionary::new(), CMAP.to_vec()));
        let f = font(vec![
            ("Subtype", name("TrueType")),
            ("Encoding", name("WinAnsiEncoding")),
            ("ToUnicode", Object::Reference(cmap_id)),
        ]);

        assert_eq!(FontDecoder::from_font(&doc, &f).decode(&[0x00, 0x03]), "H");
    }

    #[test]
    fn test_unreadable_cmap_uses_encoding() {
        let mut doc = Document::with_version("1.7");
        let cmap_id = doc.add_object(Stream::new(Dictionary::new(), b"garbage".to_vec()));
        let f = font(vec![
            ("Encoding", name("WinAnsiEncoding")),
            ("ToUnicode", Object::Reference(cmap_id)),
        ]);

        assert_eq!(FontDecoder::from_font(&doc, &f).decode(b"Caf\xE9"), "Caf\u{00E9}");
    }

    #[test]
    fn test_differences() {
        let doc = Document::with_version("1.7");
        let mut encoding = Dictionary::new();
        encoding.set(
            "Differences",
            Object::Array(vec![Object::Integer(1), name("H"), name("i")]),
        );
        let f = font(vec![
            ("Subtype", name("Type1")),
            ("Encoding", Object::Dictionary(encoding)),
        ]);

        let decoder = FontDecoder::from_font(&doc, &f);
        assert_eq!(decoder.decode(&[0x01, 0x02]), "Hi");
        assert_eq!(decoder.decode(b"ok"), "ok");
    }

    #[test]
    fn test_differences_over_base_encoding() {
        let mut doc = Document::with_version("1.7");
        let mut encoding = Dictionary::new();
        encoding.set("BaseEncoding", name("WinAnsiEncoding"));
        encoding.set(
            "Differences",
            Object::Array(vec![Object::Integer(0x41), name("eacute"), name("uni0394")]),
        );
        let encoding_id = doc.add_object(Object::Dictionary(encoding));
        let f = font(vec![("Encoding", Object::Reference(encoding_id))]);

        let decoder = FontDecoder::from_font(&doc, &f);
        assert_eq!(decoder.decode(b"ABC\x93"), "\u{00E9}\u{0394}C\u{201C}");
    }

    #[test]
    fn test_win_ansi_font() {
        let doc = Document::with_version("1.7");
        let f = font(vec![("Encoding", name("WinAnsiEncoding"))]);
        // 0x93/0x94 are curly quotes in WinAnsi, C1 controls in Latin-1.
        assert_eq!(
            FontDecoder::from_font(&doc, &f).decode(&[0x93, b'h', b'i', 0x94]),
            "\u{201C}hi\u{201D}"
        );
    }

    #[test]
    fn test_identity_without_cmap() {
        let doc = Document::with_version("1.7");
        let f = font(vec![("Subtype", name("Type0")), ("Encoding", name("Identity-H"))]);
        assert_eq!(FontDecoder::from_font(&doc, &f).decode(&[0x00, 0x48, 0x00, 0x69]), "Hi");
    }

    #[test]
    fn test_missing_encoding_is_standard() {
        let doc = Document::with_version("1.7");
        let f = font(vec![("Subtype", name("Type1"))]);
        assert_eq!(FontDecoder::from_font(&doc, &f).decode(b"It's"), "It\u{2019}s");
    }

    #[test]
    fn test_unknown_encoding_is_raw() {
        let doc = Document::with_version("1.7");
        let f = font(vec![("Encoding", name("Custom-Thing"))]);
        assert_eq!(FontDecoder::from_font(&doc, &f).decode(b"abc"), "abc");
    }

    #[test]
    fn test_decode_text_simple() {
        assert_eq!(decode_text_simple("caf\u{00E9}".as_bytes()), "caf\u{00E9}");
        assert_eq!(decode_text_simple(&[0x63, 0x61, 0x66, 0xE9]), "caf\u{00E9}");
        assert_eq!(decode_text_simple(&[0xFE, 0xFF, 0x00, 0x41, 0x00, 0xE9, 0x00]), "A\u{00E9}");
    }

    #[test]
    fn test_encode_ascii_and_latin1() {
        assert_eq!(encode_win_ansi("Adiós").unwrap(), b"Adi\xF3s".to_vec());
    }

    #[test]
    fn test_encode_high_range() {
        let bytes = encode_win_ansi("\u{20AC}5 \u{2014} \u{201C}ok\u{201D}").unwrap();
        assert_eq!(bytes, b"\x805 \x97 \x93ok\x94".to_vec());
        assert_eq!(encode_win_ansi("\u{2022}").unwrap(), vec![0x95]);
    }

    #[test]
    fn test_whitespace_becomes_space() {
        assert_eq!(encode_win_ansi("a\tb\nc").unwrap(), b"a b c".to_vec());
    }

    #[test]
    fn test_unencodable() {
        assert_eq!(encode_win_ansi("日本"), Err('日'));
        assert_eq!(encode_win_ansi("ok \u{0394}"), Err('\u{0394}'));
    }
}
