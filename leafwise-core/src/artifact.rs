//! Normalized image artifacts produced by acquisition.
//!
//! Both acquisition paths (file upload and camera capture) end in the same
//! place: one [`ImageArtifact`] holding the raw bytes, their mime type, and
//! a self-contained displayable encoding. Artifacts are immutable once
//! produced.

use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which acquisition path produced an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageOrigin {
    Upload,
    Capture,
}

impl std::fmt::Display for ImageOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Upload => write!(f, "upload"),
            Self::Capture => write!(f, "capture"),
        }
    }
}

/// A selected file could not be accepted as an image.
///
/// Recoverable: the user corrects the input and selects again.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("selected file is empty")]
    Empty,

    #[error("selected file is not a recognizable image: {0}")]
    NotAnImage(String),
}

/// The normalized, immutable image produced by acquisition.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageArtifact {
    bytes: Vec<u8>,
    mime_type: String,
    display_encoding: String,
    origin: ImageOrigin,
}

impl ImageArtifact {
    /// Validate and wrap uploaded file bytes.
    ///
    /// The payload must both sniff as a known image format and fully decode;
    /// a recognizable header over broken pixel data is rejected the same as
    /// a text file.
    pub fn from_upload(bytes: Vec<u8>) -> Result<Self, ValidationError> {
        if bytes.is_empty() {
            return Err(ValidationError::Empty);
        }

        let format = image::guess_format(&bytes)
            .map_err(|e| ValidationError::NotAnImage(e.to_string()))?;
        image::load_from_memory(&bytes).map_err(|e| ValidationError::NotAnImage(e.to_string()))?;

        Ok(Self::assemble(
            bytes,
            format.to_mime_type().to_string(),
            ImageOrigin::Upload,
        ))
    }

    /// Wrap freshly encoded PNG bytes from a camera snapshot.
    pub(crate) fn from_capture_png(bytes: Vec<u8>) -> Self {
        Self::assemble(bytes, "image/png".to_string(), ImageOrigin::Capture)
    }

    fn assemble(bytes: Vec<u8>, mime_type: String, origin: ImageOrigin) -> Self {
        let display_encoding = encode_data_url(&mime_type, &bytes);
        Self {
            bytes,
            mime_type,
            display_encoding,
            origin,
        }
    }

    /// Raw image bytes exactly as acquired.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Self-contained `data:` URL rendering of the bytes.
    pub fn display_encoding(&self) -> &str {
        &self.display_encoding
    }

    pub fn origin(&self) -> ImageOrigin {
        self.origin
    }
}

/// Build a `data:<mime>;base64,<payload>` URL for the given content.
fn encode_data_url(mime_type: &str, bytes: &[u8]) -> String {
    let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{mime_type};base64,{payload}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny_png() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([20, 160, 40, 255]));
        let mut buf = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    #[test]
    fn upload_accepts_valid_png() {
        let bytes = tiny_png();
        let artifact = ImageArtifact::from_upload(bytes.clone()).unwrap();

        assert_eq!(artifact.bytes(), bytes.as_slice());
        assert_eq!(artifact.mime_type(), "image/png");
        assert_eq!(artifact.origin(), ImageOrigin::Upload);
    }

    #[test]
    fn upload_rejects_non_image() {
        let result = ImageArtifact::from_upload(b"definitely not an image".to_vec());
        assert!(matches!(result, Err(ValidationError::NotAnImage(_))));
    }

    #[test]
    fn upload_rejects_empty_input() {
        let result = ImageArtifact::from_upload(Vec::new());
        assert!(matches!(result, Err(ValidationError::Empty)));
    }

    #[test]
    fn upload_rejects_truncated_png() {
        let mut bytes = tiny_png();
        bytes.truncate(16); // valid magic, broken pixel data
        let result = ImageArtifact::from_upload(bytes);
        assert!(matches!(result, Err(ValidationError::NotAnImage(_))));
    }

    #[test]
    fn display_encoding_is_a_data_url() {
        let artifact = ImageArtifact::from_upload(tiny_png()).unwrap();
        assert!(artifact
            .display_encoding()
            .starts_with("data:image/png;base64,"));

        let payload = artifact
            .display_encoding()
            .split_once(',')
            .map(|(_, p)| p)
            .unwrap();
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(payload)
            .unwrap();
        assert_eq!(decoded, artifact.bytes());
    }

    #[test]
    fn capture_artifacts_are_tagged_png() {
        let artifact = ImageArtifact::from_capture_png(tiny_png());
        assert_eq!(artifact.origin(), ImageOrigin::Capture);
        assert_eq!(artifact.mime_type(), "image/png");
    }
}
