//! Identifier newtypes
//!
//! Remote identifiers are opaque strings issued by the owning service.
//! Draft identifiers are local and use ULIDs for sortability.

use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// Local draft identifier (ULID for sortability)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DraftId(pub Ulid);

impl DraftId {
    /// Generate new draft ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for DraftId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

macro_rules! remote_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Wrap a remote identifier
            #[inline]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the raw identifier
            #[inline]
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

remote_id!(
    /// Catalog entry identifier
    EntryId
);
remote_id!(
    /// Media asset identifier
    AssetId
);
remote_id!(
    /// Authenticated actor identifier
    ActorId
);
remote_id!(
    /// Category identifier
    CategoryId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_ids_are_unique() {
        assert_ne!(DraftId::new(), DraftId::new());
    }

    #[test]
    fn remote_id_serializes_transparently() {
        let id = EntryId::new("p-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"p-1\"");
        assert_eq!(id.to_string(), "p-1");
    }
}
