//! Draft entry fields
//!
//! A [`Draft`] is the local, not-yet-persisted edit state of a catalog entry.
//! Every field has a validity predicate; the draft is submittable only when
//! all of them hold.

use crate::entry::{CatalogEntry, EntryPayload};
use crate::ids::CategoryId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest accepted unit price
pub const MIN_PRICE: f64 = 1.0;

/// Lowest accepted quantity
pub const MIN_QUANTITY: u32 = 1;

/// Draft field names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DraftField {
    /// Display name
    Name,
    /// Description
    Description,
    /// Unit price
    Price,
    /// Units in stock
    Quantity,
    /// Category
    CategoryId,
}

impl DraftField {
    /// All fields, in form order
    pub const ALL: [DraftField; 5] = [
        DraftField::Name,
        DraftField::Description,
        DraftField::Price,
        DraftField::Quantity,
        DraftField::CategoryId,
    ];
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DraftField::Name => "name",
            DraftField::Description => "description",
            DraftField::Price => "price",
            DraftField::Quantity => "quantity",
            DraftField::CategoryId => "categoryId",
        };
        f.write_str(name)
    }
}

/// Why a field is invalid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldViolation {
    /// Field is empty or blank
    Required(DraftField),
    /// Numeric field below its minimum
    BelowMinimum(DraftField),
}

impl FieldViolation {
    /// The offending field
    #[inline]
    #[must_use]
    pub fn field(&self) -> DraftField {
        match self {
            FieldViolation::Required(f) | FieldViolation::BelowMinimum(f) => *f,
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldViolation::Required(field) => write!(f, "{field} is required"),
            FieldViolation::BelowMinimum(field) => write!(f, "{field} is below its minimum"),
        }
    }
}

/// Draft validation errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DraftError {
    /// One or more fields failed their predicate
    #[error("draft invalid: {}", join_violations(.0))]
    InvalidFields(Vec<FieldViolation>),
}

impl DraftError {
    /// Violations carried by this error
    #[must_use]
    pub fn violations(&self) -> &[FieldViolation] {
        match self {
            DraftError::InvalidFields(v) => v,
        }
    }
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Mutable entry fields held locally
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Draft {
    /// Display name
    pub name: String,
    /// Description
    pub description: String,
    /// Unit price
    pub price: Option<f64>,
    /// Units in stock
    pub quantity: Option<u32>,
    /// Category
    pub category_id: Option<CategoryId>,
}

impl Draft {
    /// Empty draft (create mode)
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Draft hydrated from an entry snapshot (edit mode)
    #[must_use]
    pub fn from_entry(entry: &CatalogEntry) -> Self {
        Self {
            name: entry.name.clone(),
            description: entry.description.clone(),
            price: Some(entry.price),
            quantity: Some(entry.quantity),
            category_id: Some(entry.category_id.clone()),
        }
    }

    /// With name
    #[inline]
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// With description
    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// With price
    #[inline]
    #[must_use]
    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    /// With quantity
    #[inline]
    #[must_use]
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    /// With category
    #[inline]
    #[must_use]
    pub fn with_category(mut self, category_id: impl Into<CategoryId>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    /// Check a single field
    ///
    /// # Errors
    /// Returns the violation if the field predicate fails
    pub fn check_field(&self, field: DraftField) -> Result<(), FieldViolation> {
        let ok = match field {
            DraftField::Name => !self.name.trim().is_empty(),
            DraftField::Description => !self.description.trim().is_empty(),
            DraftField::Price => match self.price {
                None => return Err(FieldViolation::Required(field)),
                Some(p) => p.is_finite() && p >= MIN_PRICE,
            },
            DraftField::Quantity => match self.quantity {
                None => return Err(FieldViolation::Required(field)),
                Some(q) => q >= MIN_QUANTITY,
            },
            DraftField::CategoryId => self
                .category_id
                .as_ref()
                .is_some_and(|c| !c.as_str().trim().is_empty()),
        };

        if ok {
            Ok(())
        } else if matches!(field, DraftField::Price | DraftField::Quantity) {
            Err(FieldViolation::BelowMinimum(field))
        } else {
            Err(FieldViolation::Required(field))
        }
    }

    /// Validate every field
    ///
    /// # Errors
    /// `DraftError::InvalidFields` listing every failing field in form order
    pub fn validate(&self) -> Result<(), DraftError> {
        let violations: Vec<_> = DraftField::ALL
            .iter()
            .filter_map(|f| self.check_field(*f).err())
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(DraftError::InvalidFields(violations))
        }
    }

    /// Whether every field is valid
    #[inline]
    #[must_use]
    pub fn is_submittable(&self) -> bool {
        self.validate().is_ok()
    }

    /// Build the request payload with the given image list
    ///
    /// # Errors
    /// Same as [`Draft::validate`]
    pub fn to_payload(&self, images: Vec<String>) -> Result<EntryPayload, DraftError> {
        self.validate()?;
        match (self.price, self.quantity, &self.category_id) {
            (Some(price), Some(quantity), Some(category_id)) => Ok(EntryPayload {
                name: self.name.clone(),
                description: self.description.clone(),
                price,
                quantity,
                category_id: category_id.clone(),
                images,
            }),
            _ => Err(DraftError::InvalidFields(vec![FieldViolation::Required(
                DraftField::Price,
            )])),
        }
    }

    /// Reset to an empty draft
    #[inline]
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
