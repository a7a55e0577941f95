//! Glyph names to Unicode, for fonts that remap codes with `/Differences`.

use phf::phf_map;

/// Names from the Adobe Glyph List that appear in the standard one-byte
/// encodings, plus the Latin ligatures.
static GLYPHS: phf::Map<&'static str, char> = phf_map! {
    "A" => 'A',
    "AE" => '\u{00C6}',
    "Aacute" => '\u{00C1}',
    "Acircumflex" => '\u{00C2}',
    "Adieresis" => '\u{00C4}',
    "Agrave" => '\u{00C0}',
    "Alpha" => '\u{0391}',
    "Aring" => '\u{00C5}',
    "Atilde" => '\u{00C3}',
    "B" => 'B',
    "Beta" => '\u{0392}',
    "C" => 'C',
    "Ccedilla" => '\u{00C7}',
    "Chi" => '\u{03A7}',
    "D" => 'D',
    "Delta" => '\u{2206}',
    "E" => 'E',
    "Eacute" => '\u{00C9}',
    "Ecircumflex" => '\u{00CA}',
    "Edieresis" => '\u{00CB}',
    "Egrave" => '\u{00C8}',
    "Epsilon" => '\u{0395}',
    "Eta" => '\u{0397}',
    "Eth" => '\u{00D0}',
    "Euro" => '\u{20AC}',
    "F" => 'F',
    "G" => 'G',
    "Gamma" => '\u{0393}',
    "H" => 'H',
    "I" => 'I',
    "Iacute" => '\u{00CD}',
    "Icircumflex" => '\u{00CE}',
    "Idieresis" => '\u{00CF}',
    "Ifraktur" => '\u{2111}',
    "Igrave" => '\u{00CC}',
    "Iota" => '\u{0399}',
    "J" => 'J',
    "K" => 'K',
    "Kappa" => '\u{039A}',
    "L" => 'L',
    "Lambda" => '\u{039B}',
    "Lslash" => '\u{0141}',
    "M" => 'M',
    "Mu" => '\u{039C}',
    "N" => 'N',
    "Ntilde" => '\u{00D1}',
    "Nu" => '\u{039D}',
    "O" => 'O',
    "OE" => '\u{0152}',
    "Oacute" => '\u{00D3}',
    "Ocircumflex" => '\u{00D4}',
    "Odieresis" => '\u{00D6}',
    "Ograve" => '\u{00D2}',
    "Omega" => '\u{2126}',
    "Omicron" => '\u{039F}',
    "Oslash" => '\u{00D8}',
    "Otilde" => '\u{00D5}',
    "P" => 'P',
    "Phi" => '\u{03A6}',
    "Pi" => '\u{03A0}',
    "Psi" => '\u{03A8}',
    "Q" => 'Q',
    "R" => 'R',
    "Rfraktur" => '\u{211C}',
    "Rho" => '\u{03A1}',
    "S" => 'S',
    "Scaron" => '\u{0160}',
    "Sigma" => '\u{03A3}',
    "T" => 'T',
    "Tau" => '\u{03A4}',
    "Theta" => '\u{0398}',
    "Thorn" => '\u{00DE}',
    "U" => 'U',
    "Uacute" => '\u{00DA}',
    "Ucircumflex" => '\u{00DB}',
    "Udieresis" => '\u{00DC}',
    "Ugrave" => '\u{00D9}',
    "Upsilon" => '\u{03A5}',
    "Upsilon1" => '\u{03D2}',
    "V" => 'V',
    "W" => 'W',
    "X" => 'X',
    "Xi" => '\u{039E}',
    "Y" => 'Y',
    "Yacute" => '\u{00DD}',
    "Ydieresis" => '\u{0178}',
    "Z" => 'Z',
    "Zcaron" => '\u{017D}',
    "Zeta" => '\u{0396}',
    "a" => 'a',
    "aacute" => '\u{00E1}',
    "acircumflex" => '\u{00E2}',
    "acute" => '\u{00B4}',
    "adieresis" => '\u{00E4}',
    "ae" => '\u{00E6}',
    "agrave" => '\u{00E0}',
    "aleph" => '\u{2135}',
    "alpha" => '\u{03B1}',
    "ampersand" => '&',
    "angle" => '\u{2220}',
    "angleleft" => '\u{2329}',
    "angleright" => '\u{232A}',
    "approxequal" => '\u{2248}',
    "aring" => '\u{00E5}',
    "arrowboth" => '\u{2194}',
    "arrowdblboth" => '\u{21D4}',
    "arrowdbldown" => '\u{21D3}',
    "arrowdblleft" => '\u{21D0}',
    "arrowdblright" => '\u{21D2}',
    "arrowdblup" => '\u{21D1}',
    "arrowdown" => '\u{2193}',
    "arrowleft" => '\u{2190}',
    "arrowright" => '\u{2192}',
    "arrowup" => '\u{2191}',
    "arrowvertex" => '\u{2195}',
    "asciicircum" => '^',
    "asciitilde" => '~',
    "asterisk" => '*',
    "asteriskmath" => '\u{2217}',
    "at" => '@',
    "atilde" => '\u{00E3}',
    "b" => 'b',
    "backslash" => '\u{005C}',
    "bar" => '|',
    "beta" => '\u{03B2}',
    "braceex" => '|',
    "braceleft" => '{',
    "braceleftmid" => '|',
    "braceright" => '}',
    "bracerightmid" => '\u{2016}',
    "bracketleft" => '[',
    "bracketright" => ']',
    "breve" => '\u{02D8}',
    "brokenbar" => '\u{00A6}',
    "bullet" => '\u{2022}',
    "c" => 'c',
    "caron" => '\u{02C7}',
    "carriagereturn" => '\u{21B5}',
    "ccedilla" => '\u{00E7}',
    "cedilla" => '\u{00B8}',
    "cent" => '\u{00A2}',
    "chi" => '\u{03C7}',
    "circlemultiply" => '\u{2297}',
    "circleplus" => '\u{2295}',
    "circumflex" => '\u{02C6}',
    "club" => '\u{2663}',
    "colon" => ':',
    "colonmonetary" => '\u{20A1}',
    "comma" => ',',
    "congruent" => '\u{2245}',
    "copyright" => '\u{00A9}',
    "currency" => '\u{00A4}',
    "d" => 'd',
    "dagger" => '\u{2020}',
    "daggerdbl" => '\u{2021}',
    "degree" => '\u{00B0}',
    "delta" => '\u{03B4}',
    "diamond" => '\u{2662}',
    "dieresis" => '\u{00A8}',
    "divide" => '\u{00F7}',
    "dollar" => '$',
    "dotaccent" => '\u{02D9}',
    "dotlessi" => '\u{0131}',
    "dotmath" => '\u{22C5}',
    "e" => 'e',
    "eacute" => '\u{00E9}',
    "ecircumflex" => '\u{00EA}',
    "edieresis" => '\u{00EB}',
    "egrave" => '\u{00E8}',
    "eight" => '8',
    "eightinferior" => '\u{2088}',
    "eightsuperior" => '\u{2078}',
    "element" => '\u{2208}',
    "ellipsis" => '\u{2026}',
    "emdash" => '\u{2014}',
    "emptyset" => '\u{2205}',
    "endash" => '\u{2013}',
    "epsilon" => '\u{03B5}',
    "equal" => '=',
    "equivalence" => '\u{2261}',
    "eta" => '\u{03B7}',
    "eth" => '\u{00F0}',
    "exclam" => '!',
    "exclamdown" => '\u{00A1}',
    "existential" => '\u{2203}',
    "f" => 'f',
    "ff" => '\u{FB00}',
    "ffi" => '\u{FB03}',
    "ffl" => '\u{FB04}',
    "fi" => '\u{FB01}',
    "figuredash" => '\u{2012}',
    "five" => '5',
    "fiveeighths" => '\u{215D}',
    "fiveinferior" => '\u{2085}',
    "fivesuperior" => '\u{2075}',
    "fl" => '\u{FB02}',
    "florin" => '\u{0192}',
    "four" => '4',
    "fourinferior" => '\u{2084}',
    "foursuperior" => '\u{2074}',
    "fraction" => '\u{2044}',
    "g" => 'g',
    "gamma" => '\u{03B3}',
    "germandbls" => '\u{00DF}',
    "gradient" => '\u{2207}',
    "grave" => '`',
    "greater" => '>',
    "greaterequal" => '\u{2265}',
    "guillemotleft" => '\u{00AB}',
    "guillemotright" => '\u{00BB}',
    "guilsinglleft" => '\u{2039}',
    "guilsinglright" => '\u{203A}',
    "h" => 'h',
    "heart" => '\u{2661}',
    "hungarumlaut" => '\u{02DD}',
    "hyphen" => '-',
    "i" => 'i',
    "iacute" => '\u{00ED}',
    "icircumflex" => '\u{00EE}',
    "idieresis" => '\u{00EF}',
    "igrave" => '\u{00EC}',
    "infinity" => '\u{221E}',
    "integral" => '\u{222B}',
    "integralbt" => '\u{2321}',
    "integraltp" => '\u{2320}',
    "intersection" => '\u{2229}',
    "iota" => '\u{03B9}',
    "j" => 'j',
    "k" => 'k',
    "kappa" => '\u{03BA}',
    "l" => 'l',
    "lambda" => '\u{03BB}',
    "less" => '<',
    "lessequal" => '\u{2264}',
    "logicaland" => '\u{2227}',
    "logicalnot" => '\u{00AC}',
    "logicalor" => '\u{2228}',
    "lozenge" => '\u{25CA}',
    "lslash" => '\u{0142}',
    "m" => 'm',
    "macron" => '\u{00AF}',
    "minus" => '\u{2212}',
    "minute" => '\u{2032}',
    "mu" => '\u{00B5}',
    "multiply" => '\u{00D7}',
    "n" => 'n',
    "nbspace" => '\u{00A0}',
    "nine" => '9',
    "nineinferior" => '\u{2089}',
    "ninesuperior" => '\u{2079}',
    "notelement" => '\u{2209}',
    "notequal" => '\u{2260}',
    "notsubset" => '\u{2284}',
    "nsuperior" => '\u{207F}',
    "ntilde" => '\u{00F1}',
    "nu" => '\u{03BD}',
    "numbersign" => '#',
    "o" => 'o',
    "oacute" => '\u{00F3}',
    "ocircumflex" => '\u{00F4}',
    "odieresis" => '\u{00F6}',
    "oe" => '\u{0153}',
    "ogonek" => '\u{02DB}',
    "ograve" => '\u{00F2}',
    "omega" => '\u{03C9}',
    "omega1" => '\u{03D6}',
    "omicron" => '\u{03BF}',
    "one" => '1',
    "onedotenleader" => '\u{2024}',
    "oneeighth" => '\u{215B}',
    "onehalf" => '\u{00BD}',
    "oneinferior" => '\u{2081}',
    "onequarter" => '\u{00BC}',
    "onesuperior" => '\u{00B9}',
    "onethird" => '\u{2153}',
    "ordfeminine" => '\u{00AA}',
    "ordmasculine" => '\u{00BA}',
    "oslash" => '\u{00F8}',
    "otilde" => '\u{00F5}',
    "p" => 'p',
    "paragraph" => '\u{00B6}',
    "parenleft" => '(',
    "parenleftex" => '|',
    "parenleftinferior" => '\u{208D}',
    "parenleftsuperior" => '\u{207D}',
    "parenright" => ')',
    "parenrightex" => '|',
    "parenrightinferior" => '\u{208E}',
    "parenrightsuperior" => '\u{207E}',
    "partialdiff" => '\u{2202}',
    "percent" => '%',
    "period" => '.',
    "periodcentered" => '\u{00B7}',
    "perpendicular" => '\u{22A5}',
    "perthousand" => '\u{2030}',
    "phi" => '\u{03C6}',
    "phi2" => '\u{03D5}',
    "pi" => '\u{03C0}',
    "plus" => '+',
    "plusminus" => '\u{00B1}',
    "product" => '\u{220F}',
    "propersubset" => '\u{2282}',
    "propersuperset" => '\u{2283}',
    "proportional" => '\u{221D}',
    "psi" => '\u{03C8}',
    "q" => 'q',
    "question" => '?',
    "questiondown" => '\u{00BF}',
    "quotedbl" => '"',
    "quotedblbase" => '\u{201E}',
    "quotedblleft" => '\u{201C}',
    "quotedblright" => '\u{201D}',
    "quoteleft" => '\u{2018}',
    "quoteright" => '\u{2019}',
    "quotesinglbase" => '\u{201A}',
    "quotesingle" => '\u{0027}',
    "r" => 'r',
    "radical" => '\u{221A}',
    "reflexsubset" => '\u{2286}',
    "reflexsuperset" => '\u{2287}',
    "registered" => '\u{00AE}',
    "rho" => '\u{03C1}',
    "ring" => '\u{02DA}',
    "s" => 's',
    "scaron" => '\u{0161}',
    "second" => '\u{2033}',
    "section" => '\u{00A7}',
    "semicolon" => ';',
    "seven" => '7',
    "seveneighths" => '\u{215E}',
    "seveninferior" => '\u{2087}',
    "sevensuperior" => '\u{2077}',
    "sfthyphen" => '\u{00AD}',
    "sigma" => '\u{03C3}',
    "sigma1" => '\u{03C2}',
    "similar" => '\u{223C}',
    "six" => '6',
    "sixinferior" => '\u{2086}',
    "sixsuperior" => '\u{2076}',
    "slash" => '/',
    "space" => '\u{0020}',
    "spade" => '\u{2660}',
    "sterling" => '\u{00A3}',
    "suchthat" => '\u{220B}',
    "summation" => '\u{2211}',
    "t" => 't',
    "tau" => '\u{03C4}',
    "therefore" => '\u{2234}',
    "theta" => '\u{03B8}',
    "theta1" => '\u{03D1}',
    "thorn" => '\u{00FE}',
    "three" => '3',
    "threeeighths" => '\u{215C}',
    "threeinferior" => '\u{2083}',
    "threequarters" => '\u{00BE}',
    "threesuperior" => '\u{00B3}',
    "tilde" => '\u{02DC}',
    "trademark" => '\u{2122}',
    "two" => '2',
    "twodotenleader" => '\u{2025}',
    "twoinferior" => '\u{2082}',
    "twosuperior" => '\u{00B2}',
    "twothirds" => '\u{2154}',
    "u" => 'u',
    "uacute" => '\u{00FA}',
    "ucircumflex" => '\u{00FB}',
    "udieresis" => '\u{00FC}',
    "ugrave" => '\u{00F9}',
    "underscore" => '_',
    "union" => '\u{222A}',
    "universal" => '\u{2200}',
    "upsilon" => '\u{03C5}',
    "v" => 'v',
    "w" => 'w',
    "weierstrass" => '\u{2118}',
    "x" => 'x',
    "xi" => '\u{03BE}',
    "y" => 'y',
    "yacute" => '\u{00FD}',
    "ydieresis" => '\u{00FF}',
    "yen" => '\u{00A5}',
    "z" => 'z',
    "zcaron" => '\u{017E}',
    "zero" => '0',
    "zeroinferior" => '\u{2080}',
    "zerosuperior" => '\u{2070}',
    "zeta" => '\u{03B6}',
};

/// Resolve a glyph name such as `eacute`, `uni00E9` or `u1F600`.
///
/// Suffixes after a period (`a.sc`, `one.oldstyle`) are ignored.
pub fn glyph_to_char(name: &str) -> Option<char> {
    let base = name.split('.').next().unwrap_or(name);

    if let Some(&c) = GLYPHS.get(base) {
        return Some(c);
    }

    if let Some(hex) = base.strip_prefix("uni").filter(|h| h.len() == 4) {
        return u32::from_str_radix(hex, 16).ok().and_then(char::from_u32);
    }

    if let Some(hex) = base.strip_prefix('u').filter(|h| (4..=6).contains(&h.len())) {
        return u32::from_str_radix(hex, 16).ok().and_then(char::from_u32);
    }

    log::debug!("unknown glyph name '{name}'");
    None
}
