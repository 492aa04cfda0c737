//! Persistence boundary: the signed-in session and the profile store that
//! holds the saved composition.
//!
//! DESIGN
//! ======
//! The editor core never sees a session. Only the shell receives one, and
//! passes it explicitly to every [`ProfileStore`] call. The store is an async
//! trait so the native HTTP client and in-memory test doubles are
//! interchangeable.

use serde::{Deserialize, Serialize};

/// Errors returned by a [`ProfileStore`].
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    /// The store rejected the session credentials.
    #[error("not authorized to access profile {user_id}")]
    Unauthorized { user_id: String },

    /// No profile exists for the session's user.
    #[error("profile not found: {user_id}")]
    NotFound { user_id: String },

    /// The request could not be delivered or the store failed.
    #[error("profile store request failed: {0}")]
    Transport(String),

    /// The store replied with something that is not a profile.
    #[error("profile store response malformed: {0}")]
    Malformed(String),

    /// A save was requested while another one is still in flight.
    #[error("a save is already in progress")]
    Busy,

    /// The composition could not be flattened for saving.
    #[error(transparent)]
    Export(#[from] crate::export::ExportError),
}

/// The authenticated user the editor acts for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub token: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl Session {
    #[must_use]
    pub fn new(user_id: impl Into<String>, token: impl Into<String>) -> Self {
        Self { user_id: user_id.into(), token: token.into(), name: None, role: None }
    }
}

/// The part of a user profile the editor reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: String,
    /// Last saved composition as a `data:` URL, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whiteboard: Option<String>,
}

/// Reads and updates the current user's profile.
#[async_trait::async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch the profile for `session`.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistError`] if the request fails or the profile is missing.
    async fn fetch_profile(&self, session: &Session) -> Result<ProfileRecord, PersistError>;

    /// Replace the stored composition. Either the value updates or an error is returned.
    ///
    /// # Errors
    ///
    /// Returns a [`PersistError`] if the store did not accept the update.
    async fn update_whiteboard(&self, session: &Session, data_url: &str) -> Result<(), PersistError>;
}
