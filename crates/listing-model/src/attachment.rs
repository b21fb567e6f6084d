//! Staged attachments
//!
//! An attachment is either a NEW local file awaiting upload or a PERSISTED
//! image already referenced by the entry. A NEW attachment always carries a
//! completed [`Preview`]; there is no pending state to observe.

use crate::file::{LocalFile, Preview};
use crate::ids::AssetId;
use serde::{Deserialize, Serialize};

/// Where a staged attachment comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Origin {
    /// Local file, not uploaded yet
    New,
    /// Already stored remotely
    Persisted,
}

/// A local file with its decoded preview
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttachment {
    file: LocalFile,
    preview: Preview,
}

impl NewAttachment {
    /// Pair a file with its decoded preview
    #[inline]
    #[must_use]
    pub fn new(file: LocalFile, preview: Preview) -> Self {
        Self { file, preview }
    }

    /// The local file
    #[inline]
    #[must_use]
    pub fn file(&self) -> &LocalFile {
        &self.file
    }

    /// The decoded preview
    #[inline]
    #[must_use]
    pub fn preview(&self) -> &Preview {
        &self.preview
    }
}

/// An image already referenced by the remote entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedAttachment {
    /// Remote URL
    pub url: String,
    /// Resolved asset identifier; `None` when unresolved
    pub asset_id: Option<AssetId>,
}

impl PersistedAttachment {
    /// Persisted attachment with a resolved asset id
    #[inline]
    pub fn resolved(url: impl Into<String>, asset_id: impl Into<AssetId>) -> Self {
        Self {
            url: url.into(),
            asset_id: Some(asset_id.into()),
        }
    }

    /// Persisted attachment whose asset id is unknown
    #[inline]
    pub fn unresolved(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            asset_id: None,
        }
    }
}

/// One entry of the staging list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attachment {
    /// Pending upload
    New(NewAttachment),
    /// Already stored
    Persisted(PersistedAttachment),
}

impl Attachment {
    /// Origin of this attachment
    #[inline]
    #[must_use]
    pub fn origin(&self) -> Origin {
        match self {
            Attachment::New(_) => Origin::New,
            Attachment::Persisted(_) => Origin::Persisted,
        }
    }

    /// Local file, present iff NEW
    #[inline]
    #[must_use]
    pub fn local_file(&self) -> Option<&LocalFile> {
        match self {
            Attachment::New(new) => Some(new.file()),
            Attachment::Persisted(_) => None,
        }
    }

    /// Remote URL, present iff PERSISTED
    #[inline]
    #[must_use]
    pub fn remote_url(&self) -> Option<&str> {
        match self {
            Attachment::New(_) => None,
            Attachment::Persisted(p) => Some(&p.url),
        }
    }

    /// Remote asset id, present iff PERSISTED and resolved
    #[inline]
    #[must_use]
    pub fn remote_asset_id(&self) -> Option<&AssetId> {
        match self {
            Attachment::New(_) => None,
            Attachment::Persisted(p) => p.asset_id.as_ref(),
        }
    }

    /// URL to display: the remote URL or the decoded preview
    #[inline]
    #[must_use]
    pub fn display_url(&self) -> &str {
        match self {
            Attachment::New(new) => new.preview().data_url(),
            Attachment::Persisted(p) => &p.url,
        }
    }
}

impl From<NewAttachment> for Attachment {
    fn from(new: NewAttachment) -> Self {
        Attachment::New(new)
    }
}

impl From<PersistedAttachment> for Attachment {
    fn from(p: PersistedAttachment) -> Self {
        Attachment::Persisted(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_attachment_accessors() {
        let file = LocalFile::new("a.png", "image/png", vec![1, 2, 3]);
        let att = Attachment::from(NewAttachment::new(file, Preview::new("data:image/png;base64,AQID")));

        assert_eq!(att.origin(), Origin::New);
        assert!(att.local_file().is_some());
        assert!(att.remote_url().is_none());
        assert!(att.remote_asset_id().is_none());
        assert!(att.display_url().starts_with("data:image/png"));
    }

    #[test]
    fn persisted_attachment_accessors() {
        let resolved = Attachment::from(PersistedAttachment::resolved("https://cdn/a.png", "m1"));
        assert_eq!(resolved.origin(), Origin::Persisted);
        assert_eq!(resolved.remote_url(), Some("https://cdn/a.png"));
        assert_eq!(resolved.remote_asset_id().map(AssetId::as_str), Some("m1"));

        let unresolved = Attachment::from(PersistedAttachment::unresolved("https://cdn/b.png"));
        assert!(unresolved.remote_asset_id().is_none());
        assert!(unresolved.local_file().is_none());
    }
}
