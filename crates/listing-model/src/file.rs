//! Local file candidates and decoded previews

use std::fmt;
use std::sync::Arc;

/// A file picked by the actor, not yet uploaded
///
/// Content is reference-counted so staging, previewing and uploading share
/// one buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct LocalFile {
    name: String,
    mime_type: String,
    bytes: Arc<[u8]>,
}

impl LocalFile {
    /// Create a local file
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    /// File name as picked (no directory component)
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared MIME type
    #[inline]
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Raw content
    #[inline]
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size in bytes
    #[inline]
    #[must_use]
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Same (name, size) identity used for in-session duplicate detection
    #[inline]
    #[must_use]
    pub fn same_identity(&self, other: &LocalFile) -> bool {
        self.name == other.name && self.size() == other.size()
    }
}

impl fmt::Debug for LocalFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalFile")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

/// Fully decoded, displayable preview of a local file
#[derive(Clone, PartialEq, Eq)]
pub struct Preview {
    data_url: String,
}

impl Preview {
    /// Wrap a decoded data URL
    #[inline]
    pub fn new(data_url: impl Into<String>) -> Self {
        Self {
            data_url: data_url.into(),
        }
    }

    /// The `data:` URL
    #[inline]
    #[must_use]
    pub fn data_url(&self) -> &str {
        &self.data_url
    }
}

impl fmt::Debug for Preview {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let head: String = self.data_url.chars().take(32).collect();
        write!(f, "Preview({head}..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_name_and_size() {
        let a = LocalFile::new("a.png", "image/png", vec![0u8; 10]);
        let b = LocalFile::new("a.png", "image/jpeg", vec![1u8; 10]);
        let c = LocalFile::new("a.png", "image/png", vec![0u8; 11]);

        assert!(a.same_identity(&b));
        assert!(!a.same_identity(&c));
        assert_eq!(a.size(), 10);
    }

    #[test]
    fn debug_omits_content() {
        let file = LocalFile::new("a.png", "image/png", vec![7u8; 4096]);
        let rendered = format!("{file:?}");
        assert!(rendered.contains("size: 4096"));
        assert!(rendered.len() < 100);
    }
}
