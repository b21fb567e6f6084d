//! External service seams
//!
//! The catalog-entry service and the asset service are owned elsewhere and
//! consumed here through async traits. Every mutating call carries the
//! caller-asserted [`Actor`]; this crate never verifies it.

use async_trait::async_trait;
use listing_model::{Actor, AssetId, AssetRecord, CatalogEntry, EntryId, EntryPayload, LocalFile, OwnerType};
use std::fmt;
use std::sync::Arc;

use crate::preview::{DataUrlDecoder, PreviewDecoder};

/// Failure of a remote call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// Request never produced a response
    #[error("transport error: {0}")]
    Transport(String),

    /// Service answered with an error status
    #[error("request rejected ({status}): {message}")]
    Rejected {
        /// HTTP-style status code
        status: u16,
        /// Service message
        message: String,
    },

    /// Addressed record does not exist
    #[error("not found: {0}")]
    NotFound(String),
}

impl ServiceError {
    /// Rejected with status and message
    #[inline]
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }
}

/// Catalog-entry service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Create an entry
    async fn create(&self, payload: &EntryPayload, actor: &Actor) -> Result<CatalogEntry, ServiceError>;

    /// Replace an entry's fields and image list
    async fn update(
        &self,
        entry_id: &EntryId,
        payload: &EntryPayload,
        actor: &Actor,
    ) -> Result<CatalogEntry, ServiceError>;

    /// Delete an entry
    async fn delete(&self, entry_id: &EntryId, actor: &Actor) -> Result<(), ServiceError>;
}

/// Media asset service
///
/// Uploads are validated again server-side (type and size).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetService: Send + Sync {
    /// Upload a file owned by an entry or a user
    async fn upload(
        &self,
        owner_id: &str,
        owner_type: OwnerType,
        file: &LocalFile,
        actor: &Actor,
    ) -> Result<AssetRecord, ServiceError>;

    /// All assets owned by `owner_id`
    async fn list(&self, owner_id: &str) -> Result<Vec<AssetRecord>, ServiceError>;

    /// Delete an asset
    async fn delete(&self, asset_id: &AssetId, actor: &Actor) -> Result<(), ServiceError>;
}

/// Shared handles to every collaborator
#[derive(Clone)]
pub struct Services {
    /// Catalog-entry service
    pub catalog: Arc<dyn CatalogService>,
    /// Asset service
    pub assets: Arc<dyn AssetService>,
    /// Local preview decoding
    pub decoder: Arc<dyn PreviewDecoder>,
}

impl Services {
    /// Wire services with the default data-URL preview decoder
    pub fn new(catalog: Arc<dyn CatalogService>, assets: Arc<dyn AssetService>) -> Self {
        Self {
            catalog,
            assets,
            decoder: Arc::new(DataUrlDecoder),
        }
    }

    /// Replace the preview decoder
    #[must_use]
    pub fn with_decoder(mut self, decoder: Arc<dyn PreviewDecoder>) -> Self {
        self.decoder = decoder;
        self
    }
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}
