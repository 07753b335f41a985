//! Decoding of image uploads sent as data URLs.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;

const BASE64_MARKER: &str = ";base64,";

// Browsers and hand-written clients disagree on padding, so accept either.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// A decoded upload: the declared media type (if any) and the raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub media_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl DataUrl {
    /// Parses `data:<type>[;params];base64,<payload>`.
    ///
    /// The payload is whatever follows the last `;base64,` marker; without a marker the whole
    /// string is treated as base64.
    pub fn parse(raw: &str) -> Result<Self, String> {
        let (header, payload) = match raw.rfind(BASE64_MARKER) {
            Some(idx) => (Some(&raw[..idx]), &raw[idx + BASE64_MARKER.len()..]),
            None => (None, raw),
        };

        let media_type = header
            .and_then(|h| h.trim().strip_prefix("data:"))
            .and_then(|h| h.split(';').next())
            .map(|t| t.trim().to_ascii_lowercase())
            .filter(|t| !t.is_empty());

        // Tolerate line-wrapped and URL-safe payloads.
        let cleaned: String = payload
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .map(|c| match c {
                '-' => '+',
                '_' => '/',
                other => other,
            })
            .collect();

        let bytes = LENIENT
            .decode(cleaned.as_bytes())
            .map_err(|e| format!("payload is not valid base64 ({})", e))?;
        if bytes.is_empty() {
            return Err("payload is empty".to_string());
        }

        Ok(Self { media_type, bytes })
    }

    /// File extension for the stored image. Unknown types are stored as `png`.
    pub fn extension(&self) -> &'static str {
        match self.media_type.as_deref() {
            Some("image/jpeg") | Some("image/jpg") | Some("image/pjpeg") => "jpg",
            Some("image/gif") => "gif",
            Some("image/webp") => "webp",
            Some("image/svg+xml") => "svg",
            Some("image/avif") => "avif",
            Some("image/bmp") => "bmp",
            _ => "png",
        }
    }
}
