//! Listing Staging
//!
//! Local staging of listing attachments before submission.
//!
//! # Core Concepts
//!
//! - [`ValidationGate`]: Ordered checks deciding whether a file may be staged
//! - [`StagingList`]: Ordinal-indexed attachments with reorder/remove
//! - [`SubmissionSnapshot`]: Frozen list split into persisted and pending uploads
//! - [`merge_order`]: Persisted-first merge of the final image order
//!
//! # Example
//!
//! ```rust
//! use listing_model::{LocalFile, NewAttachment, PersistedAttachment, Preview};
//! use listing_staging::{StagingList, ValidationGate};
//!
//! let gate = ValidationGate::default();
//! let mut list = StagingList::from_persisted([PersistedAttachment::unresolved("https://cdn/a.png")]);
//!
//! let file = LocalFile::new("b.png", "image/png", vec![0u8; 16]);
//! gate.check(&file, &list, None).unwrap();
//! list.add(NewAttachment::new(file, Preview::new("data:image/png;base64,")));
//!
//! let merged = list.snapshot().merge(vec!["https://cdn/b.png".to_string()]);
//! assert_eq!(merged, vec!["https://cdn/a.png", "https://cdn/b.png"]);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod error;
mod gate;
mod limits;
mod list;
mod snapshot;

pub use error::StagingError;
pub use gate::{Rejection, RejectionCode, ValidationGate};
pub use limits::{
    StagingLimits, AVATAR_IMAGE_TYPES, DEFAULT_MAX_ATTACHMENTS, DEFAULT_MAX_IMAGE_BYTES,
    ENTRY_IMAGE_TYPES,
};
pub use list::StagingList;
pub use snapshot::{merge_order, PendingUpload, SubmissionSnapshot};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
