//! Testing utilities for the listing workspace
//!
//! Shared fixtures and a harness wiring the in-memory services.

#![allow(missing_docs)]

use listing_core::{DraftSession, InMemoryAssets, InMemoryCatalog, ListingConfig, Services, SubmissionCoordinator};
use listing_model::{Actor, ActorId, AssetRecord, CatalogEntry, CategoryId, Draft, EntryId, LocalFile};
use std::sync::Arc;
use std::time::Duration;

pub const SELLER: &str = "seller-1";

pub fn seller() -> Actor {
    Actor::seller(SELLER)
}

/// PNG of `size` bytes; content depends on the name so previews differ
pub fn png(name: &str, size: usize) -> LocalFile {
    let fill = name.bytes().fold(0u8, u8::wrapping_add);
    LocalFile::new(name, "image/png", vec![fill; size])
}

pub fn jpeg(name: &str, size: usize) -> LocalFile {
    LocalFile::new(name, "image/jpeg", vec![0xFF; size])
}

pub fn valid_draft() -> Draft {
    Draft::new()
        .with_name("Desk lamp")
        .with_description("Brass desk lamp, 40cm")
        .with_price(25.0)
        .with_quantity(3)
        .with_category("home")
}

/// Entry owned by [`SELLER`] with the given image URLs
pub fn entry(id: &str, urls: &[&str]) -> CatalogEntry {
    CatalogEntry {
        id: EntryId::new(id),
        owner_id: ActorId::new(SELLER),
        name: "Desk lamp".into(),
        description: "Brass desk lamp, 40cm".into(),
        price: 25.0,
        quantity: 3,
        category_id: CategoryId::new("home"),
        image_urls: urls.iter().map(ToString::to_string).collect(),
    }
}

/// In-memory services plus a coordinator over them
pub struct Harness {
    pub catalog: Arc<InMemoryCatalog>,
    pub assets: Arc<InMemoryAssets>,
    pub services: Services,
    pub config: ListingConfig,
    pub coordinator: SubmissionCoordinator,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(ListingConfig::default(), InMemoryCatalog::new(), InMemoryAssets::default())
    }

    /// Every remote call takes `latency`
    pub fn with_latency(latency: Duration) -> Self {
        Self::with(
            ListingConfig::default(),
            InMemoryCatalog::new().with_latency(latency),
            InMemoryAssets::default().with_latency(latency),
        )
    }

    pub fn with(config: ListingConfig, catalog: InMemoryCatalog, assets: InMemoryAssets) -> Self {
        let catalog = Arc::new(catalog);
        let assets = Arc::new(assets);
        let services = Services::new(catalog.clone(), assets.clone());
        let coordinator = SubmissionCoordinator::new(&services, &config);
        Self {
            catalog,
            assets,
            services,
            config,
            coordinator,
        }
    }

    /// Fresh create-mode session with a valid draft
    pub fn create_session(&self) -> DraftSession {
        let mut session = DraftSession::create(&self.services, &self.config);
        *session.draft_mut() = valid_draft();
        session
    }

    /// Store `entry` and one asset per image URL (ids `m1`, `m2`, ...)
    pub fn seed_entry(&self, entry: &CatalogEntry) {
        self.catalog.insert(entry.clone());
        for (i, url) in entry.image_urls.iter().enumerate() {
            self.assets
                .seed(AssetRecord::new(format!("m{}", i + 1), url.clone(), entry.id.as_str()));
        }
    }

    /// Seeded entry `p1` carrying `urls`, opened for editing
    pub async fn edit_session(&self, urls: &[&str]) -> DraftSession {
        let entry = entry("p1", urls);
        self.seed_entry(&entry);
        DraftSession::edit(entry, &self.services, &self.config).await
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}
