//! Listing Core
//!
//! Draft sessions, edit reconciliation and submission coordination for
//! catalog listings.
//!
//! - [`DraftSession`]: local draft fields, staging list and rejection notice
//! - [`EditReconciler`]: resolves an entry's image URLs to asset ids
//! - [`SubmissionCoordinator`]: create/edit state machines over the remote
//!   catalog-entry and asset services
//! - [`InMemoryCatalog`] / [`InMemoryAssets`]: deterministic service stand-ins
//!
//! # Example
//!
//! ```rust,no_run
//! use listing_core::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let services = Services::new(Arc::new(InMemoryCatalog::new()), Arc::new(InMemoryAssets::default()));
//! let config = ListingConfig::default();
//! let coordinator = SubmissionCoordinator::new(&services, &config);
//!
//! let mut session = DraftSession::create(&services, &config);
//! *session.draft_mut() = Draft::new()
//!     .with_name("Desk lamp")
//!     .with_description("Brass, 40cm")
//!     .with_price(25.0)
//!     .with_quantity(3)
//!     .with_category("home");
//! session.stage(LocalFile::new("lamp.png", "image/png", vec![0u8; 64])).await?;
//!
//! let report = coordinator.submit(&mut session, Some(&Actor::seller("seller-1"))).await?;
//! println!("saved {} with {} images", report.entry.id, report.entry.image_urls.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod coordinator;
pub mod error;
pub mod memory;
pub mod notice;
pub mod preview;
pub mod reconciler;
pub mod services;
pub mod session;
pub mod state;

// Re-exports for convenience
pub use config::{ConfigError, ListingConfig, DEFAULT_NOTICE_TTL};
pub use coordinator::{SubmitReport, Submission, SubmissionCoordinator};
pub use error::{RequestError, SessionError, SubmitError};
pub use memory::{CatalogCall, InMemoryAssets, InMemoryCatalog};
pub use notice::Notice;
pub use preview::{DataUrlDecoder, PreviewDecoder, PreviewError};
pub use reconciler::{resolve_persisted, EditReconciler, ReconcileState, Reconciliation};
pub use services::{AssetService, CatalogService, ServiceError, Services};
pub use session::{DraftSession, Mode, Removal};
pub use state::{allowed_transitions, validate_transition, StateTrace, SubmitState, TransitionError};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for building and submitting listings
    pub use crate::{
        AssetService, CatalogService, DraftSession, InMemoryAssets, InMemoryCatalog, ListingConfig,
        Mode, Services, SubmitError, SubmitReport, SubmitState, SubmissionCoordinator,
    };
    pub use listing_model::{Actor, CatalogEntry, Draft, LocalFile, Role};
    pub use listing_staging::{Rejection, StagingList};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
