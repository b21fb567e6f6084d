//! Listing Model
//!
//! Data model shared by the draft compositor and the submission coordinator.
//!
//! # Core Concepts
//!
//! - [`Draft`]: Local edit state of an entry, with per-field predicates
//! - [`Attachment`]: A staged image, either [`NewAttachment`] or [`PersistedAttachment`]
//! - [`CatalogEntry`]: Remote, authoritative entry record
//! - [`AssetRecord`]: Remote media asset
//! - [`Actor`]: Caller-asserted identity forwarded with every mutation
//!
//! # Example
//!
//! ```rust
//! use listing_model::Draft;
//!
//! let draft = Draft::new()
//!     .with_name("Mug")
//!     .with_description("Coffee mug")
//!     .with_price(12.5)
//!     .with_quantity(3)
//!     .with_category("kitchen");
//!
//! assert!(draft.is_submittable());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod actor;
mod asset;
mod attachment;
mod draft;
mod entry;
mod file;
mod ids;

pub use actor::{Actor, Role};
pub use asset::{AssetRecord, OwnerType};
pub use attachment::{Attachment, NewAttachment, Origin, PersistedAttachment};
pub use draft::{Draft, DraftError, DraftField, FieldViolation, MIN_PRICE, MIN_QUANTITY};
pub use entry::{CatalogEntry, EntryPayload};
pub use file::{LocalFile, Preview};
pub use ids::{ActorId, AssetId, CategoryId, DraftId, EntryId};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
