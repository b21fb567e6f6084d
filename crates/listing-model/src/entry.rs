//! Catalog entry records
//!
//! [`CatalogEntry`] is the remote, authoritative record. After a submission the
//! attachment order lives only in [`CatalogEntry::image_urls`].

use crate::ids::{ActorId, CategoryId, EntryId};
use serde::{Deserialize, Serialize};

/// Remote catalog entry snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    /// Entry identifier
    pub id: EntryId,
    /// Owning actor
    #[serde(rename = "userId")]
    pub owner_id: ActorId,
    /// Display name
    pub name: String,
    /// Free-form description
    pub description: String,
    /// Unit price
    pub price: f64,
    /// Units in stock
    pub quantity: u32,
    /// Category
    pub category_id: CategoryId,
    /// Ordered image URLs
    #[serde(rename = "images", default)]
    pub image_urls: Vec<String>,
}

impl CatalogEntry {
    /// Fields of this entry as a payload carrying the given image list
    #[must_use]
    pub fn payload_with_images(&self, images: Vec<String>) -> EntryPayload {
        EntryPayload {
            name: self.name.clone(),
            description: self.description.clone(),
            price: self.price,
            quantity: self.quantity,
            category_id: self.category_id.clone(),
            images,
        }
    }
}

/// Create/update request body for the catalog-entry service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPayload {
    /// Display name
    pub name: String,
    /// Free-form description
    pub description: String,
    /// Unit price
    pub price: f64,
    /// Units in stock
    pub quantity: u32,
    /// Category
    pub category_id: CategoryId,
    /// Ordered image URLs (empty on create; linked afterwards)
    pub images: Vec<String>,
}

impl EntryPayload {
    /// Replace the image list
    #[inline]
    #[must_use]
    pub fn with_images(mut self, images: Vec<String>) -> Self {
        self.images = images;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_uses_remote_field_names() {
        let json = r#"{
            "id": "p1",
            "userId": "s1",
            "name": "Mug",
            "description": "Coffee mug",
            "price": 12.5,
            "quantity": 3,
            "categoryId": "c1",
            "images": ["https://cdn/x.png"]
        }"#;
        let entry: CatalogEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.owner_id.as_str(), "s1");
        assert_eq!(entry.image_urls, vec!["https://cdn/x.png".to_string()]);

        let payload = entry.payload_with_images(vec![]);
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["categoryId"], "c1");
        assert!(value["images"].as_array().unwrap().is_empty());
    }
}
