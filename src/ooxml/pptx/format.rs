//! Format types for PPTX presentations.

use crate::ooxml::opc::constants::content_type as ct;

/// Image format types an image part can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Tiff,
}

impl ImageFormat {
    /// Get the content type for this image format.
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Png => ct::PNG,
            Self::Jpeg => ct::JPEG,
            Self::Gif => ct::GIF,
            Self::Bmp => ct::BMP,
            Self::Tiff => ct::TIFF,
        }
    }

    /// Default file extension, used when a source carries no filename.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
        }
    }

    /// Map a file extension (case-insensitive, without the period).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" | "jpe" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            "bmp" | "dib" => Some(Self::Bmp),
            "tif" | "tiff" => Some(Self::Tiff),
            _ => None,
        }
    }

    /// Map an image content type.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        match content_type {
            ct::PNG => Some(Self::Png),
            ct::JPEG => Some(Self::Jpeg),
            ct::GIF => Some(Self::Gif),
            ct::BMP => Some(Self::Bmp),
            ct::TIFF => Some(Self::Tiff),
            _ => None,
        }
    }

    /// Detect image format from bytes (magic number detection).
    pub fn detect_from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }

        // PNG: 89 50 4E 47
        if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // GIF8
        if bytes.starts_with(b"GIF8") {
            return Some(Self::Gif);
        }

        // BM
        if bytes.starts_with(b"BM") {
            return Some(Self::Bmp);
        }

        // TIFF, little-endian or big-endian
        if bytes.starts_with(&[0x49, 0x49, 0x2A, 0x00])
            || bytes.starts_with(&[0x4D, 0x4D, 0x00, 0x2A])
        {
            return Some(Self::Tiff);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_from_bytes() {
        assert_eq!(
            ImageFormat::detect_from_bytes(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A]),
            Some(ImageFormat::Png)
        );
        assert_eq!(
            ImageFormat::detect_from_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(ImageFormat::detect_from_bytes(b"GIF89a"), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::detect_from_bytes(b"BM\0\0"), Some(ImageFormat::Bmp));
        assert_eq!(ImageFormat::detect_from_bytes(b"abc"), None);
        assert_eq!(ImageFormat::detect_from_bytes(b"plain text"), None);
    }

    #[test]
    fn test_extension_mapping() {
        assert_eq!(ImageFormat::from_extension("JPG"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension("tif"), Some(ImageFormat::Tiff));
        assert_eq!(ImageFormat::from_extension("svg"), None);
        assert_eq!(
            ImageFormat::from_content_type(ImageFormat::Gif.content_type()),
            Some(ImageFormat::Gif)
        );
    }
}
