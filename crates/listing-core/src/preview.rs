//! Local preview decoding
//!
//! A NEW attachment is only staged once its preview is fully decoded, so the
//! staging list never holds a pending descriptor.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use listing_model::{LocalFile, Preview};

/// Preview decoding failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreviewError {
    /// Content could not be decoded
    #[error("cannot read {name}: {reason}")]
    Unreadable {
        /// File name
        name: String,
        /// Decoder message
        reason: String,
    },
}

/// Turns a raw file into a displayable preview
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PreviewDecoder: Send + Sync {
    /// Decode a preview for `file`
    async fn decode(&self, file: &LocalFile) -> Result<Preview, PreviewError>;
}

/// Encodes the file as a `data:<mime>;base64,` URL
#[derive(Debug, Clone, Copy, Default)]
pub struct DataUrlDecoder;

#[async_trait]
impl PreviewDecoder for DataUrlDecoder {
    async fn decode(&self, file: &LocalFile) -> Result<Preview, PreviewError> {
        let encoded = STANDARD.encode(file.bytes());
        Ok(Preview::new(format!("data:{};base64,{encoded}", file.mime_type())))
    }
}
