//! Shopper session marker.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::email::Email;

/// The signed-in shopper.
///
/// This is a local marker, not a credential: nothing is verified against a
/// server. Each login mints a fresh `token`, so two sessions for the same
/// email are still distinguishable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque per-login token.
    pub token: Uuid,
    /// Display identifier of the shopper.
    pub email: Email,
    /// When the session started.
    pub started_at: DateTime<Utc>,
}

impl Session {
    /// Start a session for `email` at `started_at`.
    #[must_use]
    pub fn start(email: Email, started_at: DateTime<Utc>) -> Self {
        Self {
            token: Uuid::new_v4(),
            email,
            started_at,
        }
    }
}
