//! Text encoding and measurement for the standard Helvetica font
//!
//! Captions and bands are drawn with the built-in Type1 Helvetica using
//! WinAnsiEncoding, so no font program is embedded. Widths come from the
//! Helvetica AFM metrics (1/1000 em).

use crate::constants::{REPLACEMENT_CHAR, TRUNCATION_SUFFIX};

/// Advance widths for the printable ASCII range 0x20..=0x7E
const ASCII_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0..9
    278, 278, 584, 584, 584, 556, 1015, // :..@
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A..M
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N..Z
    278, 278, 278, 469, 556, 333, // [..`
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a..m
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n..z
    334, 260, 334, 584, // {..~
];

/// Width used for encoded bytes outside the ASCII table
const DEFAULT_WIDTH: u16 = 556;

/// Encode text as WinAnsi bytes.
///
/// Latin-1 code points map to themselves, a handful of common punctuation
/// marks map into the 0x80..0x9F block, and everything else (including
/// control characters) becomes `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(encode_char).collect()
}

fn encode_char(c: char) -> u8 {
    match c {
        ' '..='~' => c as u8,
        '\u{A0}'..='\u{FF}' => c as u32 as u8,
        '€' => 0x80,
        '‚' => 0x82,
        '„' => 0x84,
        '…' => 0x85,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '™' => 0x99,
        _ => REPLACEMENT_CHAR,
    }
}

/// Width of WinAnsi-encoded text in points at `font_size`
pub fn text_width(encoded: &[u8], font_size: f32) -> f32 {
    let units: u32 = encoded.iter().map(|&b| char_width(b) as u32).sum();
    units as f32 * font_size / 1000.0
}

fn char_width(byte: u8) -> u16 {
    match byte {
        0x20..=0x7E => ASCII_WIDTHS[(byte - 0x20) as usize],
        _ => DEFAULT_WIDTH,
    }
}

/// Encode `text` and shorten it until it fits in `max_width` points.
///
/// Text that does not fit is cut at a character boundary and gets a
/// trailing `...`. Returns an empty vector when not even the suffix fits.
pub fn fit_text(text: &str, max_width: f32, font_size: f32) -> Vec<u8> {
    let encoded = encode_win_ansi(text);
    if text_width(&encoded, font_size) <= max_width {
        return encoded;
    }

    let suffix = TRUNCATION_SUFFIX.as_bytes();
    let suffix_width = text_width(suffix, font_size);
    if suffix_width > max_width {
        return Vec::new();
    }

    let mut kept = 0;
    let mut width = suffix_width;
    for &byte in &encoded {
        let next = width + text_width(&[byte], font_size);
        if next > max_width {
            break;
        }
        width = next;
        kept += 1;
    }

    let mut fitted = encoded[..kept].to_vec();
    // Avoid "word ..." when the cut lands right after a space
    while fitted.last() == Some(&b' ') {
        fitted.pop();
    }
    fitted.extend_from_slice(suffix);
    fitted
}

/// Write encoded bytes as the body of a PDF literal string.
///
/// Parentheses and backslashes are escaped, and bytes outside printable
/// ASCII are written as three-digit octal escapes so the content stream
/// stays ASCII.
pub fn escape_pdf_string(encoded: &[u8]) -> String {
    let mut escaped = String::with_capacity(encoded.len());
    for &byte in encoded {
        match byte {
            b'(' | b')' | b'\\' => {
                escaped.push('\\');
                escaped.push(byte as char);
            }
            0x20..=0x7E => escaped.push(byte as char),
            _ => escaped.push_str(&format!("\\{:03o}", byte)),
        }
    }
    escaped
}

/// Replace `{page}` and `{pages}` in band text (1-based page number)
pub fn substitute_tokens(text: &str, page_number: usize, page_total: usize) -> String {
    text.replace("{pages}", &page_total.to_string())
        .replace("{page}", &page_number.to_string())
}

/// Band text with the page tokens removed and whitespace collapsed
pub fn strip_tokens(text: &str) -> String {
    text.replace("{pages}", " ")
        .replace("{page}", " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_widths() {
        // "Hi" = 722 + 222 units
        assert!((text_width(b"Hi", 10.0) - 9.44).abs() < 1e-4);
        assert!((text_width(b" ", 1000.0) - 278.0).abs() < 1e-3);
        assert_eq!(text_width(b"", 12.0), 0.0);
    }

    #[test]
    fn test_encoding_latin1_and_replacement() {
        assert_eq!(encode_win_ansi("abc"), b"abc".to_vec());
        assert_eq!(encode_win_ansi("café"), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(encode_win_ansi("a–b"), vec![b'a', 0x96, b'b']);
        assert_eq!(encode_win_ansi("日本"), b"??".to_vec());
        assert_eq!(encode_win_ansi("tab\there"), b"tab?here".to_vec());
    }

    #[test]
    fn test_escaping() {
        assert_eq!(escape_pdf_string(b"a(b)c\\"), "a\\(b\\)c\\\\");
        assert_eq!(escape_pdf_string(&[0xE9]), "\\351");
        assert_eq!(escape_pdf_string(b"plain"), "plain");
    }

    #[test]
    fn test_fit_text_keeps_short_text() {
        assert_eq!(fit_text("photo.png", 500.0, 8.0), b"photo.png".to_vec());
    }

    #[test]
    fn test_fit_text_truncates_with_suffix() {
        let text = "a very long caption that cannot possibly fit";
        let max_width = 60.0;
        let fitted = fit_text(text, max_width, 8.0);

        assert!(fitted.ends_with(b"..."));
        assert!(fitted.len() < text.len());
        assert!(text_width(&fitted, 8.0) <= max_width);
        assert!(text.as_bytes().starts_with(&fitted[..fitted.len() - 3]));
    }

    #[test]
    fn test_fit_text_too_narrow_for_suffix() {
        assert!(fit_text("anything", 1.0, 8.0).is_empty());
    }

    #[test]
    fn test_substitute_tokens() {
        assert_eq!(substitute_tokens("Page {page} of {pages}", 2, 5), "Page 2 of 5");
        assert_eq!(substitute_tokens("No tokens", 1, 1), "No tokens");
    }

    #[test]
    fn test_strip_tokens() {
        assert_eq!(strip_tokens("Holiday {page}/{pages}"), "Holiday /");
        assert_eq!(strip_tokens("Trip - page {page} of {pages}"), "Trip - page of");
        assert_eq!(strip_tokens("{page}"), "");
    }
}
