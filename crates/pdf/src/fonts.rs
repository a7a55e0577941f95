//! Mapping of source font names onto the standard 14 PDF fonts.

use crate::text::strip_subset_tag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    Helvetica,
    Times,
    Courier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StandardFont {
    pub family: Family,
    pub bold: bool,
    pub italic: bool,
}

impl StandardFont {
    pub const DEFAULT: StandardFont = StandardFont {
        family: Family::Helvetica,
        bold: false,
        italic: false,
    };

    /// Pick the closest standard font for a source font name.
    ///
    /// Unrecognised families fall back to Helvetica, keeping weight and
    /// slant when the name gives them away.
    pub fn resolve(font_name: &str) -> StandardFont {
        let name = strip_subset_tag(font_name).to_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|n| name.contains(n));

        let family = if has(&["courier", "mono", "consol"]) {
            Family::Courier
        } else if has(&["sans", "helvetica", "arial"]) {
            Family::Helvetica
        } else if has(&["times", "serif", "roman", "georgia", "garamond", "cambria", "minion"]) {
            Family::Times
        } else {
            Family::Helvetica
        };

        StandardFont {
            family,
            bold: has(&["bold", "black", "heavy", "semibold", "demi"]),
            italic: has(&["italic", "oblique"]),
        }
    }

    /// PostScript name of the standard font.
    pub fn base_font(&self) -> &'static str {
        match (self.family, self.bold, self.italic) {
            (Family::Helvetica, false, false) => "Helvetica",
            (Family::Helvetica, true, false) => "Helvetica-Bold",
            (Family::Helvetica, false, true) => "Helvetica-Oblique",
            (Family::Helvetica, true, true) => "Helvetica-BoldOblique",
            (Family::Times, false, false) => "Times-Roman",
            (Family::Times, true, false) => "Times-Bold",
            (Family::Times, false, true) => "Times-Italic",
            (Family::Times, true, true) => "Times-BoldItalic",
            (Family::Courier, false, false) => "Courier",
            (Family::Courier, true, false) => "Courier-Bold",
            (Family::Courier, false, true) => "Courier-Oblique",
            (Family::Courier, true, true) => "Courier-BoldOblique",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_names_round_trip() {
        for name in [
            "Helvetica",
            "Helvetica-BoldOblique",
            "Times-Roman",
            "Times-BoldItalic",
            "Courier-Oblique",
        ] {
            assert_eq!(StandardFont::resolve(name).base_font(), name);
        }
    }

    #[test]
    fn test_embedded_font_names() {
        assert_eq!(
            StandardFont::resolve("ABCDEF+TimesNewRomanPS-BoldMT").base_font(),
            "Times-Bold"
        );
        assert_eq!(StandardFont::resolve("Arial-ItalicMT").base_font(), "Helvetica-Oblique");
        assert_eq!(StandardFont::resolve("DejaVuSansMono").base_font(), "Courier");
        assert_eq!(StandardFont::resolve("NotoSans-Regular").base_font(), "Helvetica");
    }

    #[test]
    fn test_unknown_falls_back_to_helvetica() {
        assert_eq!(StandardFont::resolve("F1"), StandardFont::DEFAULT);
        assert_eq!(StandardFont::resolve("").base_font(), "Helvetica");
        assert_eq!(StandardFont::resolve("Symbol").base_font(), "Helvetica");
    }
}
