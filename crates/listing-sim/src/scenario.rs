//! Scenario files
//!
//! ```toml
//! name = "edit with a new image"
//!
//! [actor]
//! id = "seller-1"
//! role = "SELLER"
//!
//! [entry]
//! id = "p1"
//! name = "Desk lamp"
//! description = "Brass"
//! price = 25.0
//! quantity = 3
//! category_id = "home"
//! images = ["https://cdn/a.png", "https://cdn/b.png"]
//!
//! [[files]]
//! name = "c.png"
//! size = 1024
//!
//! [[ops]]
//! op = "move_up"
//! index = 2
//!
//! [failures]
//! fail_upload_at = [2]
//! ```

use listing_model::{Actor, AssetRecord, CatalogEntry, Draft, EntryId, LocalFile, Role};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Scenario loading errors
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// File could not be read
    #[error("cannot read scenario {}: {source}", path.display())]
    Io {
        /// Scenario path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// TOML did not parse
    #[error("invalid scenario: {0}")]
    Parse(#[from] toml::de::Error),
}

/// One replayable listing flow
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Scenario {
    /// Label shown in the report
    pub name: Option<String>,
    /// Authenticated actor; absent means not logged in
    pub actor: Option<ActorSpec>,
    /// Existing entry; present means edit mode
    pub entry: Option<EntrySpec>,
    /// Draft field overrides, applied after hydration
    pub draft: DraftSpec,
    /// Files staged one by one, in order
    pub files: Vec<FileSpec>,
    /// Stage `files` as a single selection instead
    pub batch: bool,
    /// Reorder and remove operations, applied after staging
    pub ops: Vec<Op>,
    /// Injected service failures
    pub failures: FailureSpec,
}

impl Scenario {
    /// Parse from TOML text
    ///
    /// # Errors
    /// `ScenarioError::Parse`
    pub fn from_toml_str(text: &str) -> Result<Self, ScenarioError> {
        Ok(toml::from_str(text)?)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// `ScenarioError::Io` or `ScenarioError::Parse`
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

/// Actor of a scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActorSpec {
    /// Actor id
    pub id: String,
    /// Role; defaults to `SELLER`
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::Seller
}

impl ActorSpec {
    /// Model actor
    #[must_use]
    pub fn to_actor(&self) -> Actor {
        Actor::new(self.id.as_str(), self.role)
    }
}

/// Entry that exists before the scenario starts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntrySpec {
    /// Entry id
    pub id: String,
    /// Owner; defaults to the scenario actor
    pub owner_id: Option<String>,
    /// Name
    pub name: String,
    /// Description
    pub description: String,
    /// Price
    pub price: f64,
    /// Quantity
    pub quantity: u32,
    /// Category
    pub category_id: String,
    /// Image URLs in order
    #[serde(default)]
    pub images: Vec<String>,
    /// Assets the asset service knows for this entry; one per image if absent
    pub assets: Option<Vec<AssetSpec>>,
}

impl EntrySpec {
    /// Model entry, owned by `owner` unless `owner_id` is set
    #[must_use]
    pub fn to_entry(&self, owner: Option<&str>) -> CatalogEntry {
        let owner_id = self.owner_id.as_deref().or(owner).unwrap_or_default();
        CatalogEntry {
            id: EntryId::new(self.id.as_str()),
            owner_id: owner_id.into(),
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price,
            quantity: self.quantity,
            category_id: self.category_id.as_str().into(),
            image_urls: self.images.clone(),
        }
    }

    /// Asset records to seed
    #[must_use]
    pub fn asset_records(&self) -> Vec<AssetRecord> {
        match &self.assets {
            Some(assets) => assets
                .iter()
                .map(|a| AssetRecord::new(a.id.as_str(), a.url.as_str(), self.id.as_str()))
                .collect(),
            None => self
                .images
                .iter()
                .enumerate()
                .map(|(i, url)| AssetRecord::new(format!("m{}", i + 1), url.as_str(), self.id.as_str()))
                .collect(),
        }
    }
}

/// Asset known to the asset service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetSpec {
    /// Asset id
    pub id: String,
    /// Asset URL
    pub url: String,
}

/// Draft field overrides
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DraftSpec {
    /// Name
    pub name: Option<String>,
    /// Description
    pub description: Option<String>,
    /// Price
    pub price: Option<f64>,
    /// Quantity
    pub quantity: Option<u32>,
    /// Category
    pub category_id: Option<String>,
}

impl DraftSpec {
    /// Overwrite the fields set here
    pub fn apply(&self, draft: &mut Draft) {
        if let Some(name) = &self.name {
            draft.name.clone_from(name);
        }
        if let Some(description) = &self.description {
            draft.description.clone_from(description);
        }
        if let Some(price) = self.price {
            draft.price = Some(price);
        }
        if let Some(quantity) = self.quantity {
            draft.quantity = Some(quantity);
        }
        if let Some(category) = &self.category_id {
            draft.category_id = Some(category.as_str().into());
        }
    }
}

/// Local file to stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileSpec {
    /// File name
    pub name: String,
    /// MIME type; defaults to `image/png`
    #[serde(default = "default_mime")]
    pub mime_type: String,
    /// Size in bytes
    pub size: usize,
}

fn default_mime() -> String {
    "image/png".to_string()
}

impl FileSpec {
    /// File filled with a byte derived from its name
    #[must_use]
    pub fn to_file(&self) -> LocalFile {
        let fill = self.name.bytes().fold(0u8, u8::wrapping_add);
        LocalFile::new(self.name.as_str(), self.mime_type.as_str(), vec![fill; self.size])
    }
}

/// Staging-list operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op {
    /// Swap with the previous attachment
    MoveUp {
        /// Ordinal
        index: usize,
    },
    /// Swap with the next attachment
    MoveDown {
        /// Ordinal
        index: usize,
    },
    /// Remove an attachment (deleting its asset if resolved)
    Remove {
        /// Ordinal
        index: usize,
    },
}

/// Injected failures
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FailureSpec {
    /// Fail the entry create
    pub fail_create: bool,
    /// Fail the next entry update
    pub fail_update: bool,
    /// Fail asset listing
    pub fail_list: bool,
    /// Fail asset deletes
    pub fail_delete: bool,
    /// Fail these upload attempts (1-based)
    pub fail_upload_at: Vec<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const EDIT: &str = r#"
        name = "edit"

        [actor]
        id = "seller-1"

        [entry]
        id = "p1"
        name = "Lamp"
        description = "Brass"
        price = 25.0
        quantity = 3
        category_id = "home"
        images = ["A", "B"]

        [[files]]
        name = "c.png"
        size = 10

        [[ops]]
        op = "move_up"
        index = 2

        [failures]
        fail_upload_at = [1]
    "#;

    #[test]
    fn parses_edit_scenario() {
        let scenario = Scenario::from_toml_str(EDIT).unwrap();

        assert_eq!(scenario.actor.as_ref().map(|a| a.role), Some(Role::Seller));
        assert_eq!(scenario.ops, vec![Op::MoveUp { index: 2 }]);
        assert_eq!(scenario.files[0].mime_type, "image/png");
        assert_eq!(scenario.failures.fail_upload_at, vec![1]);

        let entry = scenario.entry.as_ref().unwrap();
        assert_eq!(entry.to_entry(Some("seller-1")).owner_id.as_str(), "seller-1");
        assert_eq!(entry.asset_records()[1], AssetRecord::new("m2", "B", "p1"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = Scenario::from_toml_str("colour = \"red\"").unwrap_err();
        assert!(matches!(err, ScenarioError::Parse(_)));
    }

    #[test]
    fn draft_overrides_only_given_fields() {
        let mut draft = Draft::new().with_name("Old").with_price(2.0);
        DraftSpec {
            price: Some(9.0),
            ..DraftSpec::default()
        }
        .apply(&mut draft);
        assert_eq!(draft.name, "Old");
        assert_eq!(draft.price, Some(9.0));
    }
}
