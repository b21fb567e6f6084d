//! In-memory service implementations
//!
//! Deterministic stand-ins for the catalog-entry and asset services, with
//! failure injection and optional latency. Used by the simulator and by
//! tests.

use crate::services::{AssetService, CatalogService, ServiceError};
use async_trait::async_trait;
use listing_model::{
    Actor, AssetId, AssetRecord, CatalogEntry, EntryId, EntryPayload, LocalFile, OwnerType, Role,
};
use listing_staging::{StagingLimits, ValidationGate};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::Duration;

/// Call recorded by [`InMemoryCatalog`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogCall {
    /// `create`
    Create,
    /// `update`
    Update(EntryId),
    /// `delete`
    Delete(EntryId),
}

#[derive(Debug, Default)]
struct CatalogState {
    entries: BTreeMap<EntryId, CatalogEntry>,
    next_id: u64,
    calls: Vec<CatalogCall>,
    fail_create: bool,
    fail_update: bool,
    fail_delete: bool,
}

/// Catalog-entry service backed by a map
///
/// Ids are `entry-1`, `entry-2`, ... in creation order. Updates and deletes
/// by anyone but the owner (or an admin) are rejected with status 403.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    state: Mutex<CatalogState>,
    latency: Option<Duration>,
}

impl InMemoryCatalog {
    /// Empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call by `latency`
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Insert an entry as if it had been created earlier
    pub fn insert(&self, entry: CatalogEntry) {
        self.state.lock().entries.insert(entry.id.clone(), entry);
    }

    /// Stored entry
    #[must_use]
    pub fn get(&self, id: &EntryId) -> Option<CatalogEntry> {
        self.state.lock().entries.get(id).cloned()
    }

    /// All stored entries, by id
    #[must_use]
    pub fn entries(&self) -> Vec<CatalogEntry> {
        self.state.lock().entries.values().cloned().collect()
    }

    /// Calls received, in order
    #[must_use]
    pub fn calls(&self) -> Vec<CatalogCall> {
        self.state.lock().calls.clone()
    }

    /// Fail the next `create`
    pub fn fail_create(&self) {
        self.state.lock().fail_create = true;
    }

    /// Fail the next `update`
    pub fn fail_update(&self) {
        self.state.lock().fail_update = true;
    }

    /// Fail the next `delete`
    pub fn fail_delete(&self) {
        self.state.lock().fail_delete = true;
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

fn may_modify(entry: &CatalogEntry, actor: &Actor) -> bool {
    actor.role == Role::Admin || entry.owner_id == actor.id
}

fn injected(flag: &mut bool, what: &str) -> Result<(), ServiceError> {
    if std::mem::take(flag) {
        return Err(ServiceError::Transport(format!("injected {what} failure")));
    }
    Ok(())
}

#[async_trait]
impl CatalogService for InMemoryCatalog {
    async fn create(&self, payload: &EntryPayload, actor: &Actor) -> Result<CatalogEntry, ServiceError> {
        let fail = {
            let mut state = self.state.lock();
            state.calls.push(CatalogCall::Create);
            injected(&mut state.fail_create, "create")
        };
        self.delay().await;
        fail?;

        let mut state = self.state.lock();
        state.next_id += 1;
        let entry = CatalogEntry {
            id: EntryId::new(format!("entry-{}", state.next_id)),
            owner_id: actor.id.clone(),
            name: payload.name.clone(),
            description: payload.description.clone(),
            price: payload.price,
            quantity: payload.quantity,
            category_id: payload.category_id.clone(),
            image_urls: payload.images.clone(),
        };
        state.entries.insert(entry.id.clone(), entry.clone());
        Ok(entry)
    }

    async fn update(
        &self,
        entry_id: &EntryId,
        payload: &EntryPayload,
        actor: &Actor,
    ) -> Result<CatalogEntry, ServiceError> {
        let fail = {
            let mut state = self.state.lock();
            state.calls.push(CatalogCall::Update(entry_id.clone()));
            injected(&mut state.fail_update, "update")
        };
        self.delay().await;
        fail?;

        let mut state = self.state.lock();
        let entry = state
            .entries
            .get_mut(entry_id)
            .ok_or_else(|| ServiceError::NotFound(entry_id.to_string()))?;
        if !may_modify(entry, actor) {
            return Err(ServiceError::rejected(403, "not the owner of this entry"));
        }
        entry.name.clone_from(&payload.name);
        entry.description.clone_from(&payload.description);
        entry.price = payload.price;
        entry.quantity = payload.quantity;
        entry.category_id = payload.category_id.clone();
        entry.image_urls.clone_from(&payload.images);
        Ok(entry.clone())
    }

    async fn delete(&self, entry_id: &EntryId, actor: &Actor) -> Result<(), ServiceError> {
        let fail = {
            let mut state = self.state.lock();
            state.calls.push(CatalogCall::Delete(entry_id.clone()));
            injected(&mut state.fail_delete, "delete")
        };
        self.delay().await;
        fail?;

        let mut state = self.state.lock();
        let entry = state
            .entries
            .get(entry_id)
            .ok_or_else(|| ServiceError::NotFound(entry_id.to_string()))?;
        if !may_modify(entry, actor) {
            return Err(ServiceError::rejected(403, "not the owner of this entry"));
        }
        state.entries.remove(entry_id);
        Ok(())
    }
}

#[derive(Debug, Default)]
struct AssetState {
    records: Vec<AssetRecord>,
    next_id: u64,
    attempts: usize,
    fail_upload_at: BTreeSet<usize>,
    upload_delays: HashMap<usize, Duration>,
    fail_list: bool,
    fail_delete: bool,
    delete_attempts: Vec<AssetId>,
    deleted: Vec<AssetId>,
}

/// Asset service backed by a list
///
/// URLs look like `memory://assets/<owner>/<id>-<file name>`. Uploads are
/// validated again here: entry images against the entry profile, avatars
/// against the avatar profile (415 for the type, 413 for the size).
#[derive(Debug)]
pub struct InMemoryAssets {
    state: Mutex<AssetState>,
    entry_gate: ValidationGate,
    avatar_gate: ValidationGate,
    latency: Option<Duration>,
}

impl Default for InMemoryAssets {
    fn default() -> Self {
        Self::new(StagingLimits::entry_images(), StagingLimits::avatars())
    }
}

impl InMemoryAssets {
    /// Asset store enforcing the given upload limits
    #[must_use]
    pub fn new(entry_limits: StagingLimits, avatar_limits: StagingLimits) -> Self {
        Self {
            state: Mutex::new(AssetState::default()),
            entry_gate: ValidationGate::new(entry_limits),
            avatar_gate: ValidationGate::new(avatar_limits),
            latency: None,
        }
    }

    /// Delay every call by `latency`
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Add a record as if it had been uploaded earlier
    pub fn seed(&self, record: AssetRecord) {
        self.state.lock().records.push(record);
    }

    /// Every stored record
    #[must_use]
    pub fn records(&self) -> Vec<AssetRecord> {
        self.state.lock().records.clone()
    }

    /// Records owned by `owner_id`
    #[must_use]
    pub fn owned_by(&self, owner_id: &str) -> Vec<AssetRecord> {
        self.state
            .lock()
            .records
            .iter()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect()
    }

    /// Upload attempts so far, failed ones included
    #[must_use]
    pub fn upload_attempts(&self) -> usize {
        self.state.lock().attempts
    }

    /// Asset ids a delete was requested for
    #[must_use]
    pub fn delete_attempts(&self) -> Vec<AssetId> {
        self.state.lock().delete_attempts.clone()
    }

    /// Asset ids actually deleted
    #[must_use]
    pub fn deleted(&self) -> Vec<AssetId> {
        self.state.lock().deleted.clone()
    }

    /// Fail the `attempt`-th upload (1-based, counted across all uploads)
    pub fn fail_upload_at(&self, attempt: usize) {
        self.state.lock().fail_upload_at.insert(attempt);
    }

    /// Extra delay for the `attempt`-th upload (1-based)
    pub fn delay_upload_at(&self, attempt: usize, delay: Duration) {
        self.state.lock().upload_delays.insert(attempt, delay);
    }

    /// Fail every `list` until cleared
    pub fn set_fail_list(&self, fail: bool) {
        self.state.lock().fail_list = fail;
    }

    /// Fail every `delete` until cleared
    pub fn set_fail_delete(&self, fail: bool) {
        self.state.lock().fail_delete = fail;
    }

    fn gate(&self, owner_type: OwnerType) -> &ValidationGate {
        match owner_type {
            OwnerType::Entry => &self.entry_gate,
            OwnerType::User => &self.avatar_gate,
        }
    }

    async fn delay(&self, extra: Option<Duration>) {
        let total = self.latency.unwrap_or_default() + extra.unwrap_or_default();
        if !total.is_zero() {
            tokio::time::sleep(total).await;
        }
    }
}

#[async_trait]
impl AssetService for InMemoryAssets {
    async fn upload(
        &self,
        owner_id: &str,
        owner_type: OwnerType,
        file: &LocalFile,
        _actor: &Actor,
    ) -> Result<AssetRecord, ServiceError> {
        let (attempt, fail, extra, id) = {
            let mut state = self.state.lock();
            state.attempts += 1;
            state.next_id += 1;
            let attempt = state.attempts;
            (
                attempt,
                state.fail_upload_at.contains(&attempt),
                state.upload_delays.get(&attempt).copied(),
                AssetId::new(format!("asset-{}", state.next_id)),
            )
        };
        self.delay(extra).await;

        if let Err(rejection) = self.gate(owner_type).check_content(file) {
            let status = match rejection {
                listing_staging::Rejection::TooLarge { .. } => 413,
                _ => 415,
            };
            return Err(ServiceError::rejected(status, rejection.to_string()));
        }
        if fail {
            return Err(ServiceError::Transport(format!("injected failure on upload {attempt}")));
        }

        let record = AssetRecord::new(
            id.clone(),
            format!("memory://assets/{owner_id}/{id}-{}", file.name()),
            owner_id,
        );
        self.state.lock().records.push(record.clone());
        Ok(record)
    }

    async fn list(&self, owner_id: &str) -> Result<Vec<AssetRecord>, ServiceError> {
        let fail = self.state.lock().fail_list;
        self.delay(None).await;
        if fail {
            return Err(ServiceError::Transport("injected list failure".into()));
        }
        Ok(self.owned_by(owner_id))
    }

    async fn delete(&self, asset_id: &AssetId, _actor: &Actor) -> Result<(), ServiceError> {
        let fail = {
            let mut state = self.state.lock();
            state.delete_attempts.push(asset_id.clone());
            state.fail_delete
        };
        self.delay(None).await;
        if fail {
            return Err(ServiceError::Transport("injected delete failure".into()));
        }

        let mut state = self.state.lock();
        let before = state.records.len();
        state.records.retain(|r| &r.id != asset_id);
        if state.records.len() == before {
            return Err(ServiceError::NotFound(asset_id.to_string()));
        }
        state.deleted.push(asset_id.clone());
        Ok(())
    }
}
