//! Media asset records

use crate::ids::AssetId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of record owns an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OwnerType {
    /// A catalog entry's image
    Entry,
    /// A user's avatar
    User,
}

impl fmt::Display for OwnerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OwnerType::Entry => f.write_str("ENTRY"),
            OwnerType::User => f.write_str("USER"),
        }
    }
}

/// Remote media asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRecord {
    /// Asset identifier
    pub id: AssetId,
    /// Public URL
    pub url: String,
    /// Owning record (entry id or user id)
    pub owner_id: String,
}

impl AssetRecord {
    /// Create an asset record
    #[inline]
    pub fn new(id: impl Into<AssetId>, url: impl Into<String>, owner_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            owner_id: owner_id.into(),
        }
    }
}
