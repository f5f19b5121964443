//! Image payloads for inserted pictures.

use base64::{Engine, engine::general_purpose::STANDARD};

/// Raster formats accepted for insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
}

impl ImageFormat {
    /// Get MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
        }
    }

    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "webp" => Some(ImageFormat::WebP),
            _ => None,
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 4 {
            return None;
        }
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }
        // RIFF....WEBP
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }
        None
    }
}

/// A picture ready to be placed on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSource {
    /// URL or `data:` URL stored in the shape's `src`.
    pub src: String,
    /// Natural width in pixels.
    pub width: u32,
    /// Natural height in pixels.
    pub height: u32,
}

impl ImageSource {
    pub fn new(src: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            src: src.into(),
            width,
            height,
        }
    }

    /// Build a base64 data URL from raw file bytes.
    ///
    /// Returns `None` when the bytes are not a recognised format.
    pub fn from_bytes(data: &[u8], width: u32, height: u32) -> Option<Self> {
        let format = ImageFormat::from_magic_bytes(data)?;
        let src = format!("data:{};base64,{}", format.mime_type(), STANDARD.encode(data));
        Some(Self::new(src, width, height))
    }

    /// Decode the payload of a base64 data URL.
    pub fn data(&self) -> Option<Vec<u8>> {
        let (_, payload) = self.src.strip_prefix("data:")?.split_once(";base64,")?;
        STANDARD.decode(payload).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

    #[test]
    fn test_format_detection() {
        assert_eq!(ImageFormat::from_magic_bytes(&PNG_HEADER), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_magic_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_magic_bytes(b"GIF89a"), None);
        assert_eq!(ImageFormat::from_extension("JPG"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension("gif"), None);
    }

    #[test]
    fn test_data_url_roundtrip() {
        let source = ImageSource::from_bytes(&PNG_HEADER, 1, 1).unwrap();
        assert!(source.src.starts_with("data:image/png;base64,"));
        assert_eq!(source.data().unwrap(), PNG_HEADER.to_vec());
    }

    #[test]
    fn test_unknown_bytes_rejected() {
        assert!(ImageSource::from_bytes(b"not an image", 1, 1).is_none());
    }
}
