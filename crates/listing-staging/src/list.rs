//! Staging list
//!
//! Owned, ordinal-indexed collection of staged attachments. The ordinal of an
//! attachment is its position: ordinals are always dense, zero-based and
//! strictly increasing, and every operation here preserves that.

use crate::error::StagingError;
use crate::snapshot::SubmissionSnapshot;
use listing_model::{Attachment, LocalFile, Origin, PersistedAttachment};

/// Ordered attachments staged for one draft
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StagingList {
    items: Vec<Attachment>,
}

impl StagingList {
    /// Create empty list
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// List seeded with persisted attachments, in the given order
    pub fn from_persisted(persisted: impl IntoIterator<Item = PersistedAttachment>) -> Self {
        Self {
            items: persisted.into_iter().map(Attachment::Persisted).collect(),
        }
    }

    /// Number of staged attachments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is staged
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Attachment at an ordinal
    #[inline]
    #[must_use]
    pub fn get(&self, ordinal: usize) -> Option<&Attachment> {
        self.items.get(ordinal)
    }

    /// Attachments in ordinal order
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[Attachment] {
        &self.items
    }

    /// `(ordinal, attachment)` pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Attachment)> {
        self.items.iter().enumerate()
    }

    /// Number of attachments with the given origin
    #[must_use]
    pub fn count(&self, origin: Origin) -> usize {
        self.items.iter().filter(|a| a.origin() == origin).count()
    }

    /// Whether a NEW attachment with the same (name, size) is staged
    #[must_use]
    pub fn contains_file(&self, file: &LocalFile) -> bool {
        self.items
            .iter()
            .filter_map(Attachment::local_file)
            .any(|staged| staged.same_identity(file))
    }

    /// Append an attachment, returning its ordinal
    ///
    /// The list does not gate additions; callers run the validation gate first.
    pub fn add(&mut self, attachment: impl Into<Attachment>) -> usize {
        self.items.push(attachment.into());
        self.items.len() - 1
    }

    /// Remove the attachment at an ordinal; later ordinals shift down by one
    ///
    /// # Errors
    /// `StagingError::IndexOutOfRange` if nothing is staged at `ordinal`
    pub fn remove(&mut self, ordinal: usize) -> Result<Attachment, StagingError> {
        if ordinal >= self.items.len() {
            return Err(StagingError::IndexOutOfRange {
                index: ordinal,
                len: self.items.len(),
            });
        }
        Ok(self.items.remove(ordinal))
    }

    /// Swap with the previous attachment; no-op at the first position
    ///
    /// Returns whether anything moved.
    pub fn move_up(&mut self, ordinal: usize) -> bool {
        if ordinal == 0 || ordinal >= self.items.len() {
            return false;
        }
        self.items.swap(ordinal - 1, ordinal);
        true
    }

    /// Swap with the next attachment; no-op at the last position
    ///
    /// Returns whether anything moved.
    pub fn move_down(&mut self, ordinal: usize) -> bool {
        if ordinal.saturating_add(1) >= self.items.len() {
            return false;
        }
        self.items.swap(ordinal, ordinal + 1);
        true
    }

    /// Check the submit-time count bound `1 <= len <= max`
    ///
    /// # Errors
    /// `StagingError::Empty` or `StagingError::OverCapacity`
    pub fn check_count(&self, max: usize) -> Result<(), StagingError> {
        match self.items.len() {
            0 => Err(StagingError::Empty),
            n if n > max => Err(StagingError::OverCapacity { count: n, max }),
            _ => Ok(()),
        }
    }

    /// Freeze the current order for a submission
    #[must_use]
    pub fn snapshot(&self) -> SubmissionSnapshot {
        SubmissionSnapshot::capture(self)
    }

    /// Drop everything
    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
    }
}
