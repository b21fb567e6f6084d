//! Transient rejection notice

use listing_staging::{Rejection, RejectionCode};
use std::time::Duration;
use tokio::time::Instant;

/// Message shown after a rejected staging attempt; expires on its own
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    message: String,
    code: Option<RejectionCode>,
    expires_at: Instant,
}

impl Notice {
    /// Notice for a gate rejection
    #[must_use]
    pub fn rejected(rejection: &Rejection, ttl: Duration) -> Self {
        Self {
            message: rejection.to_string(),
            code: Some(rejection.code()),
            expires_at: Instant::now() + ttl,
        }
    }

    /// Free-form notice
    #[must_use]
    pub fn message(message: impl Into<String>, ttl: Duration) -> Self {
        Self {
            message: message.into(),
            code: None,
            expires_at: Instant::now() + ttl,
        }
    }

    /// Text to show
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.message
    }

    /// Rejection code, if raised by the gate
    #[inline]
    #[must_use]
    pub fn code(&self) -> Option<RejectionCode> {
        self.code
    }

    /// Whether the notice is still visible
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        Instant::now() < self.expires_at
    }
}
