//! Accepted image formats and content-type detection.

use serde::{Deserialize, Serialize};

/// Image formats accepted for upload.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Bmp,
    WebP,
}

impl ImageFormat {
    /// Detect the format from a declared content type (e.g. "image/jpeg").
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        // Strip any parameters ("image/jpeg; charset=...").
        let mime = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match mime.as_str() {
            "image/jpeg" | "image/jpg" => Some(ImageFormat::Jpeg),
            "image/png" => Some(ImageFormat::Png),
            "image/gif" => Some(ImageFormat::Gif),
            "image/bmp" => Some(ImageFormat::Bmp),
            "image/webp" => Some(ImageFormat::WebP),
            _ => None,
        }
    }

    /// Detect the format from a filename extension.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let ext = filename.rsplit('.').next()?.to_ascii_lowercase();
        match ext.as_str() {
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "png" => Some(ImageFormat::Png),
            "gif" => Some(ImageFormat::Gif),
            "bmp" => Some(ImageFormat::Bmp),
            "webp" => Some(ImageFormat::WebP),
            _ => None,
        }
    }

    /// Returns the MIME type used in data URIs.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
            ImageFormat::Gif => "image/gif",
            ImageFormat::Bmp => "image/bmp",
            ImageFormat::WebP => "image/webp",
        }
    }

    /// Human-readable list of accepted content types, for error messages.
    pub fn supported_types() -> &'static str {
        "image/jpeg, image/jpg, image/png, image/gif, image/bmp, image/webp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_content_type() {
        assert_eq!(
            ImageFormat::from_content_type("image/jpeg"),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(
            ImageFormat::from_content_type("image/jpg"),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(
            ImageFormat::from_content_type("IMAGE/PNG"),
            Some(ImageFormat::Png)
        );
        assert_eq!(
            ImageFormat::from_content_type("image/webp; q=0.9"),
            Some(ImageFormat::WebP)
        );
        assert_eq!(ImageFormat::from_content_type("text/plain"), None);
        assert_eq!(ImageFormat::from_content_type("application/pdf"), None);
    }

    #[test]
    fn test_from_filename() {
        assert_eq!(
            ImageFormat::from_filename("photo.JPG"),
            Some(ImageFormat::Jpeg)
        );
        assert_eq!(
            ImageFormat::from_filename("a.b.c.png"),
            Some(ImageFormat::Png)
        );
        assert_eq!(ImageFormat::from_filename("notes.txt"), None);
        assert_eq!(ImageFormat::from_filename("no_extension"), None);
    }

    #[test]
    fn test_mime_type_round_trip() {
        for format in [
            ImageFormat::Jpeg,
            ImageFormat::Png,
            ImageFormat::Gif,
            ImageFormat::Bmp,
            ImageFormat::WebP,
        ] {
            assert_eq!(ImageFormat::from_content_type(format.mime_type()), Some(format));
        }
    }
}
