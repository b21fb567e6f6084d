//! Authenticated actor
//!
//! The actor identity and role are asserted by the caller and forwarded to
//! remote services as request metadata. Nothing here verifies them.

use crate::ids::ActorId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Actor role, forwarded verbatim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Owns catalog entries
    Seller,
    /// Buys from the catalog
    Client,
    /// Platform administrator
    Admin,
}

impl Role {
    /// Wire representation
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Seller => "SELLER",
            Role::Client => "CLIENT",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated actor issuing mutations
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    /// Actor identifier
    pub id: ActorId,
    /// Asserted role
    pub role: Role,
}

impl Actor {
    /// Create an actor
    #[inline]
    pub fn new(id: impl Into<ActorId>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    /// Shorthand for a seller
    #[inline]
    pub fn seller(id: impl Into<ActorId>) -> Self {
        Self::new(id, Role::Seller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_wire_names() {
        assert_eq!(Role::Seller.as_str(), "SELLER");
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ADMIN\"");
        let parsed: Role = serde_json::from_str("\"CLIENT\"").unwrap();
        assert_eq!(parsed, Role::Client);
    }
}
