use crate::types::Pt;
use serde::{Deserialize, Serialize};

/// Font weights the table layout asks the canvas for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontVariant {
    Regular,
    Bold,
}

/// The two base-14 faces used by table exports. Widths are the Adobe AFM
/// advances (1/1000 em) for every WinAnsi code point, so measurement agrees
/// with what a viewer renders for a `/WinAnsiEncoding` Type1 font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
}

impl StandardFont {
    pub fn for_variant(variant: FontVariant) -> Self {
        match variant {
            FontVariant::Regular => StandardFont::Helvetica,
            FontVariant::Bold => StandardFont::HelveticaBold,
        }
    }

    pub fn base_font_name(self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// Advance width of one byte of WinAnsi-encoded text, in 1/1000 em.
    pub(crate) fn advance_for_byte(self, byte: u8) -> u16 {
        let (ascii, upper) = match self {
            StandardFont::Helvetica => (&HELVETICA_ASCII, &HELVETICA_UPPER),
            StandardFont::HelveticaBold => (&HELVETICA_BOLD_ASCII, &HELVETICA_BOLD_UPPER),
        };
        let width = match byte {
            32..=126 => ascii[(byte - 32) as usize],
            128..=255 => upper[(byte - 128) as usize],
            _ => 0,
        };
        if width == 0 {
            // Undefined slots render as the replacement glyph.
            ascii[(b'?' - 32) as usize]
        } else {
            width
        }
    }

    pub(crate) fn advance_for_char(self, ch: char) -> u16 {
        self.advance_for_byte(winansi_byte(ch).unwrap_or(b'?'))
    }

    pub fn measure_text_width(self, font_size: Pt, text: &str) -> Pt {
        let total_units: i64 = text
            .chars()
            .map(|ch| self.advance_for_char(ch) as i64)
            .sum();
        if total_units <= 0 {
            return Pt::ZERO;
        }
        font_size.mul_ratio(total_units, 1000)
    }
}

// WinAnsi bytes 0x80..=0x9F that differ from Latin-1.
const WINANSI_HIGH: [(char, u8); 27] = [
    ('\u{20AC}', 0x80),
    ('\u{201A}', 0x82),
    ('\u{0192}', 0x83),
    ('\u{201E}', 0x84),
    ('\u{2026}', 0x85),
    ('\u{2020}', 0x86),
    ('\u{2021}', 0x87),
    ('\u{02C6}', 0x88),
    ('\u{2030}', 0x89),
    ('\u{0160}', 0x8A),
    ('\u{2039}', 0x8B),
    ('\u{0152}', 0x8C),
    ('\u{017D}', 0x8E),
    ('\u{2018}', 0x91),
    ('\u{2019}', 0x92),
    ('\u{201C}', 0x93),
    ('\u{201D}', 0x94),
    ('\u{2022}', 0x95),
    ('\u{2013}', 0x96),
    ('\u{2014}', 0x97),
    ('\u{02DC}', 0x98),
    ('\u{2122}', 0x99),
    ('\u{0161}', 0x9A),
    ('\u{203A}', 0x9B),
    ('\u{0153}', 0x9C),
    ('\u{017E}', 0x9E),
    ('\u{0178}', 0x9F),
];

/// Maps a char to its cp1252 byte. Control characters map to `None`, as do
/// characters outside the code page.
pub(crate) fn winansi_byte(ch: char) -> Option<u8> {
    match ch {
        '\u{0020}'..='\u{007E}' | '\u{00A0}'..='\u{00FF}' => Some(ch as u8),
        _ => WINANSI_HIGH
            .iter()
            .find(|(c, _)| *c == ch)
            .map(|(_, byte)| *byte),
    }
}

/// Inverse of [`winansi_byte`] for bytes read back out of a content stream.
pub(crate) fn winansi_char(byte: u8) -> Option<char> {
    match byte {
        0x20..=0x7E | 0xA0..=0xFF => Some(byte as char),
        _ => WINANSI_HIGH
            .iter()
            .find(|(_, b)| *b == byte)
            .map(|(c, _)| *c),
    }
}

#[rustfmt::skip]
const HELVETICA_ASCII: [u16; 95] = [
    // space ! " # $ % & ' ( ) * + , - . /
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    // 0-9
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    // : ; < = > ? @
    278, 278, 584, 584, 584, 556, 1015,
    // A-Z
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    // [ \ ] ^ _ `
    278, 278, 278, 469, 556, 333,
    // a-z
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    // { | } ~
    334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_ASCII: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

// 0x80..=0xFF; zero marks code points WinAnsi leaves undefined.
#[rustfmt::skip]
const HELVETICA_UPPER: [u16; 128] = [
    // 0x80
    556, 0, 222, 556, 333, 1000, 556, 556, 333, 1000, 667, 333, 1000, 0, 611, 0,
    // 0x90
    0, 222, 222, 333, 333, 350, 556, 1000, 333, 1000, 500, 333, 944, 0, 500, 667,
    // 0xA0
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    // 0xB0
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    // 0xC0
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    // 0xD0
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    // 0xE0
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278,
    // 0xF0
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500,
];

#[rustfmt::skip]
const HELVETICA_BOLD_UPPER: [u16; 128] = [
    556, 0, 278, 556, 500, 1000, 556, 556, 333, 1000, 667, 333, 1000, 0, 611, 0,
    0, 278, 278, 500, 500, 350, 556, 1000, 333, 1000, 556, 333, 944, 0, 500, 667,
    278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278,
    611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn measures_ascii_with_afm_widths() {
        // H(722) e(556) l(222) l(222) o(556) = 2278 units
        let width = StandardFont::Helvetica.measure_text_width(Pt::from_i32(10), "Hello");
        assert_eq!(width, Pt::from_f32(22.78));

        let bold = StandardFont::HelveticaBold.measure_text_width(Pt::from_i32(10), "Hello");
        // H(722) e(556) l(278) l(278) o(611) = 2445 units
        assert_eq!(bold, Pt::from_f32(24.45));
    }

    #[test]
    fn ellipsis_and_em_dash_are_full_em() {
        let size = Pt::from_i32(10);
        assert_eq!(
            StandardFont::Helvetica.measure_text_width(size, "\u{2026}"),
            Pt::from_i32(10)
        );
        assert_eq!(
            StandardFont::HelveticaBold.measure_text_width(size, "\u{2014}"),
            Pt::from_i32(10)
        );
    }

    #[test]
    fn unencodable_chars_measure_as_replacement() {
        let size = Pt::from_i32(10);
        let devanagari = StandardFont::Helvetica.measure_text_width(size, "\u{0928}");
        let question = StandardFont::Helvetica.measure_text_width(size, "?");
        assert_eq!(devanagari, question);
    }

    #[test]
    fn latin1_accents_follow_base_letters() {
        let size = Pt::from_i32(12);
        assert_eq!(
            StandardFont::Helvetica.measure_text_width(size, "\u{00E9}"),
            StandardFont::Helvetica.measure_text_width(size, "e")
        );
        assert_eq!(
            StandardFont::HelveticaBold.measure_text_width(size, "\u{00C5}"),
            StandardFont::HelveticaBold.measure_text_width(size, "A")
        );
    }

    #[test]
    fn empty_text_is_zero_width() {
        assert_eq!(
            StandardFont::Helvetica.measure_text_width(Pt::from_i32(10), ""),
            Pt::ZERO
        );
    }

    #[test]
    fn winansi_decoding_inverts_encoding() {
        for ch in ['A', '~', '\u{00E9}', '\u{2026}', '\u{2014}', '\u{20AC}'] {
            let byte = winansi_byte(ch).expect("encodable");
            assert_eq!(winansi_char(byte), Some(ch));
        }
        assert_eq!(winansi_char(0x81), None);
        assert_eq!(winansi_char(b'\n'), None);
    }
}
