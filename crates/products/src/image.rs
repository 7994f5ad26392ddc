//! Uploaded image payloads and the formats we accept.

use serde::{Deserialize, Serialize};

use catalog_core::{DomainError, DomainResult};

/// Default upload limit: 2048 KiB.
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 2048 * 1024;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageFormat {
    /// Detect the format from the leading magic bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [0xFF, 0xD8, 0xFF, ..] => Some(Self::Jpeg),
            [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some(Self::Png),
            [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Some(Self::Gif),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some(Self::Webp),
            _ => None,
        }
    }

    pub fn from_content_type(content_type: &str) -> Option<Self> {
        match content_type {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/gif" => Some(Self::Gif),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Webp => "image/webp",
        }
    }
}

/// Raw upload as received from a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Check that the payload is a readable image within `max_bytes`.
    ///
    /// The sniffed format wins; a declared content type must agree with it.
    pub fn validate(&self, max_bytes: usize) -> DomainResult<ImageFormat> {
        if self.bytes.is_empty() {
            return Err(DomainError::invalid_input(format!(
                "{}: image is empty",
                self.file_name
            )));
        }
        if self.bytes.len() > max_bytes {
            return Err(DomainError::invalid_input(format!(
                "{}: image is {} bytes, limit is {max_bytes}",
                self.file_name,
                self.bytes.len()
            )));
        }
        let format = ImageFormat::sniff(&self.bytes).ok_or_else(|| {
            DomainError::invalid_input(format!(
                "{}: not a jpeg, png, gif or webp image",
                self.file_name
            ))
        })?;
        if let Some(declared) = self.content_type.as_deref() {
            if ImageFormat::from_content_type(declared) != Some(format) {
                return Err(DomainError::invalid_input(format!(
                    "{}: declared {declared} but content is {}",
                    self.file_name,
                    format.content_type()
                )));
            }
        }
        Ok(format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
    const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10];

    #[test]
    fn sniffs_supported_formats() {
        assert_eq!(ImageFormat::sniff(PNG), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::sniff(JPEG), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::sniff(b"GIF89a...."), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::sniff(b"RIFF\x10\0\0\0WEBPVP8 "), Some(ImageFormat::Webp));
        assert_eq!(ImageFormat::sniff(b"%PDF-1.7"), None);
        assert_eq!(ImageFormat::sniff(&[]), None);
    }

    #[test]
    fn validate_rejects_unreadable_payloads() {
        let empty = ImageUpload::new("a.png", vec![]);
        assert!(matches!(empty.validate(1024), Err(DomainError::InvalidInput(_))));

        let text = ImageUpload::new("a.png", b"hello".to_vec());
        assert!(matches!(text.validate(1024), Err(DomainError::InvalidInput(_))));

        let big = ImageUpload::new("a.png", PNG.to_vec());
        assert!(matches!(big.validate(4), Err(DomainError::InvalidInput(_))));
    }

    #[test]
    fn validate_checks_declared_content_type() {
        let ok = ImageUpload::new("a.jpg", JPEG.to_vec()).with_content_type("image/jpeg");
        assert_eq!(ok.validate(1024).unwrap(), ImageFormat::Jpeg);

        let lying = ImageUpload::new("a.png", JPEG.to_vec()).with_content_type("image/png");
        assert!(matches!(lying.validate(1024), Err(DomainError::InvalidInput(_))));
    }
}
