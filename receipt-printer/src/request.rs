//! Print request snapshot

use serde::{Deserialize, Serialize};

use crate::encoding::{EncodingName, Unmappable};
use crate::error::RequestError;
use crate::escpos::{CommandPayload, FormattingOptions, encode_with};

/// Number of copies in a request, always within [`Copies::MIN`]..=[`Copies::MAX`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Copies(u8);

impl Copies {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 10;
    pub const ONE: Copies = Copies(1);

    pub fn new(n: u32) -> Result<Self, RequestError> {
        if (Self::MIN..=Self::MAX).contains(&n) {
            Ok(Self(n as u8))
        } else {
            Err(RequestError::CopiesOutOfRange(n))
        }
    }

    pub fn get(self) -> u32 {
        u32::from(self.0)
    }
}

impl Default for Copies {
    fn default() -> Self {
        Self::ONE
    }
}

impl TryFrom<u32> for Copies {
    type Error = RequestError;

    fn try_from(n: u32) -> Result<Self, Self::Error> {
        Self::new(n)
    }
}

impl From<Copies> for u32 {
    fn from(c: Copies) -> Self {
        c.get()
    }
}

/// One user print action, frozen at creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintRequest {
    text: String,
    encoding: EncodingName,
    #[serde(default)]
    options: FormattingOptions,
    #[serde(default)]
    copies: Copies,
    #[serde(default)]
    unmappable: Unmappable,
}

impl PrintRequest {
    /// Create a request, checking the caller-side preconditions
    pub fn new(
        text: impl Into<String>,
        encoding: EncodingName,
        options: FormattingOptions,
        copies: Copies,
    ) -> Result<Self, RequestError> {
        let text = text.into();
        if text.is_empty() {
            return Err(RequestError::EmptyText);
        }
        Ok(Self {
            text,
            encoding,
            options,
            copies,
            unmappable: Unmappable::Strict,
        })
    }

    /// Substitute `?` for unmappable characters instead of failing
    pub fn with_unmappable(mut self, policy: Unmappable) -> Self {
        self.unmappable = policy;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn encoding(&self) -> EncodingName {
        self.encoding
    }

    pub fn options(&self) -> FormattingOptions {
        self.options
    }

    pub fn copies(&self) -> Copies {
        self.copies
    }

    pub fn unmappable(&self) -> Unmappable {
        self.unmappable
    }

    /// Build the payload shared by every copy
    pub fn encode(&self) -> Result<CommandPayload, RequestError> {
        if self.text.is_empty() {
            return Err(RequestError::EmptyText);
        }
        Ok(encode_with(
            &self.text,
            self.encoding,
            self.options,
            self.unmappable,
        )?)
    }
}
