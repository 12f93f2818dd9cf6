//! Encoded image handed over by the file/camera picker.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::result::InferenceError;

/// Image bytes plus their MIME type.
///
/// The core never inspects the pixels; size and type checks belong to the
/// picker.
#[derive(Clone, PartialEq, Eq)]
pub struct ImagePayload {
    bytes: Vec<u8>,
    mime_type: String,
}

impl ImagePayload {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// JPEG is what phone cameras hand back.
    pub fn jpeg(bytes: Vec<u8>) -> Self {
        Self::new(bytes, "image/jpeg")
    }

    /// Parse a `data:<mime>;base64,<payload>` URI as produced by browser file readers.
    pub fn from_data_uri(uri: &str) -> Result<Self, InferenceError> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| InferenceError::malformed("image is not a data URI"))?;
        let (header, data) = rest
            .split_once(',')
            .ok_or_else(|| InferenceError::malformed("data URI has no payload"))?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| InferenceError::malformed("data URI is not base64-encoded"))?;
        let bytes = STANDARD
            .decode(data)
            .map_err(|e| InferenceError::malformed(format!("base64 decode error: {e}")))?;
        Ok(Self::new(bytes, mime_type))
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Base64 body as sent in the detection request.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// Displayable form for preview and result screens.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }
}

impl core::fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ImagePayload")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_uri_round_trips() {
        let image = ImagePayload::new(vec![0xff, 0xd8, 0xff, 0xe0], "image/jpeg");
        let uri = image.data_uri();
        assert_eq!(uri, "data:image/jpeg;base64,/9j/4A==");
        assert_eq!(ImagePayload::from_data_uri(&uri).unwrap(), image);
    }

    #[test]
    fn rejects_non_base64_uris() {
        assert!(ImagePayload::from_data_uri("https://example.com/leaf.jpg").is_err());
        assert!(ImagePayload::from_data_uri("data:image/png,rawbytes").is_err());
        assert!(ImagePayload::from_data_uri("data:image/png;base64,***").is_err());
    }

    #[test]
    fn debug_does_not_dump_bytes() {
        let image = ImagePayload::jpeg(vec![1; 4096]);
        assert_eq!(format!("{image:?}"), "ImagePayload { mime_type: \"image/jpeg\", len: 4096 }");
    }
}
