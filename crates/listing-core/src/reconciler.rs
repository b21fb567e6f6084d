//! Edit reconciliation
//!
//! Entering edit mode lists the assets owned by the entry and pairs each of
//! the entry's image URLs with the first asset carrying that URL:
//!
//! `EnterEdit -> FetchingAssets -> {Resolved | FetchFailed} -> Hydrated`
//!
//! A failed listing never blocks editing; every URL is staged unresolved
//! instead.

use crate::services::{AssetService, ServiceError};
use listing_model::{AssetRecord, CatalogEntry, Draft, PersistedAttachment};
use listing_staging::StagingList;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Reconciler states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReconcileState {
    /// Edit requested
    EnterEdit,
    /// Listing the entry's assets
    FetchingAssets,
    /// Listing succeeded
    Resolved,
    /// Listing failed; URLs staged unresolved
    FetchFailed,
    /// Draft and staging list populated
    Hydrated,
}

impl fmt::Display for ReconcileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::EnterEdit => "ENTER_EDIT",
            Self::FetchingAssets => "FETCHING_ASSETS",
            Self::Resolved => "RESOLVED",
            Self::FetchFailed => "FETCH_FAILED",
            Self::Hydrated => "HYDRATED",
        };
        f.write_str(name)
    }
}

/// Result of entering edit mode
#[derive(Debug, Clone)]
pub struct Reconciliation {
    /// Draft hydrated from the entry's fields
    pub draft: Draft,
    /// Persisted attachments in the entry's image order
    pub staging: StagingList,
    /// `Resolved` or `FetchFailed`
    pub outcome: ReconcileState,
    /// Listing failure, when `outcome` is `FetchFailed`
    pub fetch_error: Option<ServiceError>,
    /// Every state visited
    pub states: Vec<ReconcileState>,
}

impl Reconciliation {
    /// Number of attachments that carry an asset id
    #[must_use]
    pub fn resolved_count(&self) -> usize {
        self.staging
            .as_slice()
            .iter()
            .filter(|a| a.remote_asset_id().is_some())
            .count()
    }
}

/// Resolves persisted image URLs to asset ids
#[derive(Clone)]
pub struct EditReconciler {
    assets: Arc<dyn AssetService>,
}

impl EditReconciler {
    /// Create reconciler over an asset service
    pub fn new(assets: Arc<dyn AssetService>) -> Self {
        Self { assets }
    }

    /// Hydrate a draft and staging list from `entry`
    pub async fn reconcile(&self, entry: &CatalogEntry) -> Reconciliation {
        let mut states = vec![ReconcileState::EnterEdit, ReconcileState::FetchingAssets];

        let (persisted, outcome, fetch_error) = match self.assets.list(entry.id.as_str()).await {
            Ok(records) => {
                let persisted = resolve_persisted(&entry.image_urls, &records);
                tracing::debug!(
                    entry = %entry.id,
                    images = entry.image_urls.len(),
                    assets = records.len(),
                    "resolved persisted images"
                );
                (persisted, ReconcileState::Resolved, None)
            }
            Err(e) => {
                tracing::warn!(entry = %entry.id, error = %e, "asset listing failed, staging images unresolved");
                let persisted = entry
                    .image_urls
                    .iter()
                    .map(PersistedAttachment::unresolved)
                    .collect();
                (persisted, ReconcileState::FetchFailed, Some(e))
            }
        };

        states.push(outcome);
        states.push(ReconcileState::Hydrated);

        Reconciliation {
            draft: Draft::from_entry(entry),
            staging: StagingList::from_persisted(persisted),
            outcome,
            fetch_error,
            states,
        }
    }
}

impl fmt::Debug for EditReconciler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditReconciler").finish_non_exhaustive()
    }
}

/// Pair each URL, in order, with the first record carrying it
#[must_use]
pub fn resolve_persisted(urls: &[String], records: &[AssetRecord]) -> Vec<PersistedAttachment> {
    urls.iter()
        .map(|url| match records.iter().find(|r| &r.url == url) {
            Some(record) => PersistedAttachment::resolved(url.clone(), record.id.clone()),
            None => PersistedAttachment::unresolved(url.clone()),
        })
        .collect()
}
