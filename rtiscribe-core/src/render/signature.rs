use crate::error::{Result, ScribeError};
use base64::{engine::general_purpose, Engine as _};

const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
}

impl ImageFormat {
    /// Identify the format from the file signature
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(PNG_MAGIC) {
            Some(ImageFormat::Png)
        } else if bytes.starts_with(JPEG_MAGIC) {
            Some(ImageFormat::Jpeg)
        } else {
            None
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
        }
    }
}

/// Decoded signature image ready for embedding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureImage {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

impl SignatureImage {
    /// Decode base64 image data, bare or wrapped in a `data:` URL
    pub fn decode(data: &str) -> Result<Self> {
        let data = data.trim();
        let payload = match data.strip_prefix("data:") {
            Some(url) => url
                .split_once(',')
                .map(|(_, payload)| payload)
                .ok_or_else(|| ScribeError::Signature("data URL has no payload".to_string()))?,
            None => data,
        };
        let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return Err(ScribeError::Signature("empty image data".to_string()));
        }

        let bytes = general_purpose::STANDARD
            .decode(compact.as_bytes())
            .map_err(|e| ScribeError::Signature(format!("invalid base64: {e}")))?;
        let format = ImageFormat::sniff(&bytes)
            .ok_or_else(|| ScribeError::Signature("not a PNG or JPEG image".to_string()))?;

        Ok(Self { bytes, format })
    }

    pub fn data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.mime_type(),
            general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// 1x1 transparent PNG
    pub const TINY_PNG: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    #[test]
    fn decodes_bare_and_data_url_forms() {
        let bare = SignatureImage::decode(TINY_PNG).unwrap();
        assert_eq!(bare.format, ImageFormat::Png);

        let url = format!("data:image/png;base64,{TINY_PNG}");
        let wrapped = SignatureImage::decode(&url).unwrap();
        assert_eq!(wrapped, bare);
        assert_eq!(wrapped.data_url(), url);
    }

    #[test]
    fn sniffs_jpeg() {
        let jpeg = general_purpose::STANDARD.encode([0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]);
        assert_eq!(SignatureImage::decode(&jpeg).unwrap().format, ImageFormat::Jpeg);
    }

    #[test]
    fn rejects_garbage() {
        assert!(SignatureImage::decode("not base64 at all!").is_err());
        assert!(SignatureImage::decode("data:image/png;base64").is_err());
        assert!(SignatureImage::decode("").is_err());
        // valid base64, but a GIF
        let gif = general_purpose::STANDARD.encode(b"GIF89a....");
        assert!(matches!(
            SignatureImage::decode(&gif),
            Err(ScribeError::Signature(_))
        ));
    }
}
