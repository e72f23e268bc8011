//! ESC/POS command encoder
//!
//! Turns a text and a formatting snapshot into one self-contained print job:
//!
//! ```text
//! ESC @                      initialize
//! ESC E n                    bold
//! ESC a n                    alignment (left / center)
//! ESC ! n                    print mode (double height)
//! ESC - n                    underline
//! <text>                     encoded with the selected code page
//! LF
//! GS V A 0                   feed and cut (only when requested)
//! ```
//!
//! Every toggle is always written, as its "on" or "off" variant, so each job
//! fully specifies the printer mode regardless of what the previous job left.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::encoding::{EncodingName, Unmappable, encode_text};
use crate::error::EncodeResult;

const ESC: u8 = 0x1B;
const GS: u8 = 0x1D;
const LF: u8 = 0x0A;

/// ESC @
pub const INIT: [u8; 2] = [ESC, 0x40];
/// GS V A 0 - feed to cutting position and full cut
pub const CUT: [u8; 4] = [GS, 0x56, 0x41, 0x00];

/// Length of the init command plus the four formatting toggles
pub const PROLOGUE_LEN: usize = INIT.len() + 4 * 3;

/// Formatting snapshot for one print job
///
/// Taken when the request is created; later changes in the UI never reach an
/// in-flight job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormattingOptions {
    pub bold: bool,
    pub centered: bool,
    pub double_height: bool,
    pub underline: bool,
    pub cut_paper: bool,
}

impl Default for FormattingOptions {
    /// Plain text, paper cut after the job
    fn default() -> Self {
        Self {
            bold: false,
            centered: false,
            double_height: false,
            underline: false,
            cut_paper: true,
        }
    }
}

/// A complete, immutable print job
///
/// Built once per request and submitted verbatim for every copy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandPayload(Vec<u8>);

impl CommandPayload {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Encoded text between the formatting prologue and the line feed
    pub fn text_segment(&self) -> &[u8] {
        let end = if self.0.ends_with(&CUT) {
            self.0.len() - CUT.len()
        } else {
            self.0.len()
        };
        // Terminating LF is always present in encoded payloads
        self.0
            .get(PROLOGUE_LEN..end.saturating_sub(1))
            .unwrap_or_default()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl AsRef<[u8]> for CommandPayload {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Encode a print job, failing on any character the encoding cannot represent
pub fn encode(
    text: &str,
    encoding: EncodingName,
    options: FormattingOptions,
) -> EncodeResult<CommandPayload> {
    encode_with(text, encoding, options, Unmappable::Strict)
}

/// Encode a print job with an explicit unmappable-character policy
#[instrument(skip(text), fields(text_len = text.len()))]
pub fn encode_with(
    text: &str,
    encoding: EncodingName,
    options: FormattingOptions,
    policy: Unmappable,
) -> EncodeResult<CommandPayload> {
    let text_bytes = encode_text(text, encoding, policy)?;

    let mut b = EscPosBuilder::with_capacity(PROLOGUE_LEN + text_bytes.len() + 1 + CUT.len());
    b.init()
        .bold(options.bold)
        .center(options.centered)
        .double_height(options.double_height)
        .underline(options.underline)
        .raw(&text_bytes)
        .newline();
    if options.cut_paper {
        b.cut();
    }

    let payload = b.build();
    tracing::debug!(bytes = payload.len(), "payload encoded");
    Ok(payload)
}

/// ESC/POS command builder
///
/// Low-level byte accumulator; text must already be encoded.
#[derive(Debug, Default)]
pub struct EscPosBuilder {
    buf: Vec<u8>,
}

impl EscPosBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Initialize printer (ESC @)
    pub fn init(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&INIT);
        self
    }

    /// Bold on/off (ESC E n)
    pub fn bold(&mut self, on: bool) -> &mut Self {
        self.buf.extend_from_slice(&[ESC, 0x45, u8::from(on)]);
        self
    }

    /// Center or left alignment (ESC a n)
    pub fn center(&mut self, on: bool) -> &mut Self {
        self.buf.extend_from_slice(&[ESC, 0x61, u8::from(on)]);
        self
    }

    /// Double height on/off (ESC ! n, bit 4)
    pub fn double_height(&mut self, on: bool) -> &mut Self {
        self.buf
            .extend_from_slice(&[ESC, 0x21, if on { 0x10 } else { 0x00 }]);
        self
    }

    /// Underline on/off (ESC - n)
    pub fn underline(&mut self, on: bool) -> &mut Self {
        self.buf.extend_from_slice(&[ESC, 0x2D, u8::from(on)]);
        self
    }

    /// Write raw bytes directly
    pub fn raw(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn newline(&mut self) -> &mut Self {
        self.buf.push(LF);
        self
    }

    /// Feed and full cut (GS V A 0)
    pub fn cut(&mut self) -> &mut Self {
        self.buf.extend_from_slice(&CUT);
        self
    }

    pub fn build(self) -> CommandPayload {
        CommandPayload(self.buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::decode_text;
    use crate::error::EncodeError;

    fn all_options() -> Vec<FormattingOptions> {
        (0u8..32)
            .map(|bits| FormattingOptions {
                bold: bits & 1 != 0,
                centered: bits & 2 != 0,
                double_height: bits & 4 != 0,
                underline: bits & 8 != 0,
                cut_paper: bits & 16 != 0,
            })
            .collect()
    }

    #[test]
    fn test_reference_payload() {
        let options = FormattingOptions {
            bold: true,
            centered: false,
            double_height: false,
            underline: false,
            cut_paper: true,
        };
        let payload = encode("HI", EncodingName::Utf8, options).unwrap();
        assert_eq!(
            payload.as_bytes(),
            [
                0x1B, 0x40, 0x1B, 0x45, 0x01, 0x1B, 0x61, 0x00, 0x1B, 0x21, 0x00, 0x1B, 0x2D,
                0x00, 0x48, 0x49, 0x0A, 0x1D, 0x56, 0x41, 0x00
            ]
        );
    }

    #[test]
    fn test_prologue_for_every_combination() {
        for options in all_options() {
            let payload = encode("x", EncodingName::Cp437, options).unwrap();
            let b = payload.as_bytes();
            assert_eq!(&b[..2], &INIT);
            assert_eq!(&b[2..4], &[0x1B, 0x45]);
            assert_eq!(b[4], u8::from(options.bold));
            assert_eq!(&b[5..7], &[0x1B, 0x61]);
            assert_eq!(b[7], u8::from(options.centered));
            assert_eq!(&b[8..10], &[0x1B, 0x21]);
            assert_eq!(b[10], if options.double_height { 0x10 } else { 0x00 });
            assert_eq!(&b[11..13], &[0x1B, 0x2D]);
            assert_eq!(b[13], u8::from(options.underline));
        }
    }

    #[test]
    fn test_cut_is_only_optional_tail() {
        for options in all_options() {
            let payload = encode("receipt", EncodingName::Utf8, options).unwrap();
            let b = payload.as_bytes();
            if options.cut_paper {
                assert_eq!(&b[b.len() - 4..], &CUT);
                assert_eq!(b[b.len() - 5], 0x0A);
            } else {
                assert_eq!(*b.last().unwrap(), 0x0A);
                assert_eq!(b.len(), PROLOGUE_LEN + "receipt".len() + 1);
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let options = FormattingOptions {
            underline: true,
            ..Default::default()
        };
        let a = encode("Línea 1\nLínea 2", EncodingName::Windows1252, options).unwrap();
        let b = encode("Línea 1\nLínea 2", EncodingName::Windows1252, options).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_text_segment_roundtrip() {
        let text = "Café 2× ½";
        for enc in [EncodingName::Utf8, EncodingName::Iso8859_1, EncodingName::Windows1252] {
            for options in all_options() {
                let payload = encode(text, enc, options).unwrap();
                assert_eq!(decode_text(payload.text_segment(), enc), text);
            }
        }
    }

    #[test]
    fn test_unsupported_character_is_atomic() {
        let err = encode("Tot: 5€", EncodingName::Cp437, FormattingOptions::default()).unwrap_err();
        assert!(matches!(
            err,
            EncodeError::UnsupportedCharacter { ch: '€', position: 6, .. }
        ));
    }

    #[test]
    fn test_replace_policy_keeps_length() {
        let payload = encode_with(
            "Tot: 5€",
            EncodingName::Cp437,
            FormattingOptions::default(),
            Unmappable::Replace,
        )
        .unwrap();
        assert_eq!(payload.text_segment(), b"Tot: 5?");
    }

    #[test]
    fn test_default_options_cut_paper() {
        let options = FormattingOptions::default();
        assert!(options.cut_paper);
        assert!(!options.bold && !options.centered && !options.double_height && !options.underline);
    }

    #[test]
    fn test_options_deserialize_partial() {
        let options: FormattingOptions =
            serde_json::from_str(r#"{"bold":true,"doubleHeight":true}"#).unwrap();
        assert!(options.bold);
        assert!(options.double_height);
        assert!(options.cut_paper);
    }
}
