//! Submission snapshot and merge rule
//!
//! A snapshot splits the staging list into persisted attachments and pending
//! uploads, each in staging order. The final image list sent to the entry is
//! every persisted URL followed by every uploaded URL. It is NOT the
//! interleaved order shown in the staging list: `[A(persisted), C(new),
//! B(persisted)]` is submitted as `[A, B, C]`.

use crate::list::StagingList;
use listing_model::{Attachment, LocalFile, PersistedAttachment};

/// A NEW attachment waiting to be uploaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpload {
    /// Ordinal in the staging list at snapshot time
    pub ordinal: usize,
    /// File to upload
    pub file: LocalFile,
}

/// Frozen view of a staging list for one submission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionSnapshot {
    persisted: Vec<PersistedAttachment>,
    uploads: Vec<PendingUpload>,
}

impl SubmissionSnapshot {
    /// Capture a staging list
    #[must_use]
    pub fn capture(list: &StagingList) -> Self {
        let mut persisted = Vec::new();
        let mut uploads = Vec::new();

        for (ordinal, attachment) in list.iter() {
            match attachment {
                Attachment::Persisted(p) => persisted.push(p.clone()),
                Attachment::New(new) => uploads.push(PendingUpload {
                    ordinal,
                    file: new.file().clone(),
                }),
            }
        }

        Self { persisted, uploads }
    }

    /// Persisted attachments in staging order
    #[inline]
    #[must_use]
    pub fn persisted(&self) -> &[PersistedAttachment] {
        &self.persisted
    }

    /// Persisted URLs in staging order
    #[must_use]
    pub fn persisted_urls(&self) -> Vec<String> {
        self.persisted.iter().map(|p| p.url.clone()).collect()
    }

    /// Pending uploads in staging order
    #[inline]
    #[must_use]
    pub fn uploads(&self) -> &[PendingUpload] {
        &self.uploads
    }

    /// Whether any NEW attachment needs uploading
    #[inline]
    #[must_use]
    pub fn has_uploads(&self) -> bool {
        !self.uploads.is_empty()
    }

    /// Total attachments captured
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.persisted.len() + self.uploads.len()
    }

    /// Whether nothing was captured
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Final image order given upload results in request order
    #[must_use]
    pub fn merge(&self, uploaded_urls: impl IntoIterator<Item = String>) -> Vec<String> {
        merge_order(self.persisted_urls(), uploaded_urls)
    }
}

/// Persisted URLs first, then uploaded URLs, each keeping its relative order
pub fn merge_order(
    persisted: impl IntoIterator<Item = String>,
    uploaded: impl IntoIterator<Item = String>,
) -> Vec<String> {
    persisted.into_iter().chain(uploaded).collect()
}
