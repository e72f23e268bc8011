//! Character encodings for receipt text
//!
//! Thermal printers take text as single-byte code page data (or UTF-8 on
//! newer firmware). This module converts between Unicode strings and the
//! byte form for the supported code pages:
//! - CP437 (the printer default on most ESC/POS devices)
//! - UTF-8
//! - ISO-8859-1 (strict Latin-1, U+0000..=U+00FF)
//! - Windows-1252
//!
//! ESC/POS command bytes are never passed through here; only the text
//! segment of a payload is encoded.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{EncodeError, EncodeResult};

/// Supported text encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EncodingName {
    #[default]
    #[serde(rename = "CP437")]
    Cp437,
    #[serde(rename = "UTF-8")]
    Utf8,
    #[serde(rename = "ISO-8859-1")]
    Iso8859_1,
    #[serde(rename = "Windows-1252")]
    Windows1252,
}

impl EncodingName {
    /// All encodings, in the order a selection list offers them
    pub const ALL: [EncodingName; 4] = [
        EncodingName::Cp437,
        EncodingName::Utf8,
        EncodingName::Iso8859_1,
        EncodingName::Windows1252,
    ];

    /// Canonical name
    pub fn as_str(&self) -> &'static str {
        match self {
            EncodingName::Cp437 => "CP437",
            EncodingName::Utf8 => "UTF-8",
            EncodingName::Iso8859_1 => "ISO-8859-1",
            EncodingName::Windows1252 => "Windows-1252",
        }
    }
}

impl fmt::Display for EncodingName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EncodingName {
    type Err = EncodeError;

    /// Parse an encoding name (case-insensitive, common aliases accepted)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CP437" | "IBM437" | "437" => Ok(EncodingName::Cp437),
            "UTF-8" | "UTF8" => Ok(EncodingName::Utf8),
            "ISO-8859-1" | "ISO8859-1" | "ISO_8859_1" | "LATIN1" => Ok(EncodingName::Iso8859_1),
            "WINDOWS-1252" | "CP1252" => Ok(EncodingName::Windows1252),
            _ => Err(EncodeError::UnknownEncoding(s.to_string())),
        }
    }
}

/// What to do with a character the target encoding cannot represent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unmappable {
    /// Fail the whole encode
    #[default]
    Strict,
    /// Substitute `?`
    Replace,
}

/// Byte written in place of an unmappable character under [`Unmappable::Replace`]
pub const REPLACEMENT_BYTE: u8 = b'?';

/// Encode text with the given encoding
///
/// Either every character is converted or the call fails; characters are
/// never silently dropped.
#[instrument(skip(text), fields(chars = text.chars().count()))]
pub fn encode_text(text: &str, encoding: EncodingName, policy: Unmappable) -> EncodeResult<Vec<u8>> {
    if encoding == EncodingName::Utf8 {
        return Ok(text.as_bytes().to_vec());
    }

    let mut out = Vec::with_capacity(text.len());
    for (position, ch) in text.chars().enumerate() {
        let byte = match encoding {
            EncodingName::Cp437 => unicode_to_cp437(ch),
            EncodingName::Iso8859_1 => u8::try_from(u32::from(ch)).ok(),
            EncodingName::Windows1252 => unicode_to_windows1252(ch),
            EncodingName::Utf8 => unreachable!("handled above"),
        };
        match (byte, policy) {
            (Some(b), _) => out.push(b),
            (None, Unmappable::Replace) => {
                tracing::debug!(?ch, position, %encoding, "unmappable character replaced");
                out.push(REPLACEMENT_BYTE);
            }
            (None, Unmappable::Strict) => {
                return Err(EncodeError::UnsupportedCharacter {
                    ch,
                    position,
                    encoding: encoding.as_str(),
                });
            }
        }
    }
    Ok(out)
}

/// Decode bytes produced by [`encode_text`] back into a string
///
/// Invalid UTF-8 sequences decode to U+FFFD.
pub fn decode_text(bytes: &[u8], encoding: EncodingName) -> String {
    match encoding {
        EncodingName::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
        EncodingName::Iso8859_1 => bytes.iter().map(|&b| char::from(b)).collect(),
        EncodingName::Windows1252 => {
            let (text, _) = encoding_rs::WINDOWS_1252.decode_without_bom_handling(bytes);
            text.into_owned()
        }
        EncodingName::Cp437 => bytes.iter().map(|&b| cp437_to_unicode(b)).collect(),
    }
}

fn unicode_to_windows1252(ch: char) -> Option<u8> {
    // Undefined in the code page; encoding_rs passes them through as C1 bytes
    if matches!(ch, '\u{81}' | '\u{8D}' | '\u{8F}' | '\u{90}' | '\u{9D}') {
        return None;
    }
    let mut buf = [0u8; 4];
    let (bytes, _, had_errors) = encoding_rs::WINDOWS_1252.encode(ch.encode_utf8(&mut buf));
    // Single-byte code page: a mapped char is exactly one byte
    match (had_errors, bytes.as_ref()) {
        (false, [b]) => Some(*b),
        _ => None,
    }
}

/// CP437 upper half (0x80..=0xFF). ASCII passes through unchanged.
const CP437_HIGH: [char; 128] = [
    // 0x80
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å',
    // 0x90
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ',
    // 0xA0
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»',
    // 0xB0
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐',
    // 0xC0
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧',
    // 0xD0
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀',
    // 0xE0
    'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩',
    // 0xF0
    '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{00A0}',
];

fn unicode_to_cp437(ch: char) -> Option<u8> {
    if ch.is_ascii() {
        return Some(ch as u8);
    }
    CP437_HIGH
        .iter()
        .position(|&c| c == ch)
        .map(|idx| 0x80 + idx as u8)
}

fn cp437_to_unicode(b: u8) -> char {
    if b < 0x80 {
        char::from(b)
    } else {
        CP437_HIGH[usize::from(b - 0x80)]
    }
}
