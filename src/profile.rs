//! [`ProfileStore`] backed by the platform REST API.

use tracing::info;
use whiteboard::persist::{PersistError, ProfileRecord, ProfileStore, Session};

use crate::api::{ApiClient, ApiError, UserUpdate};

pub struct HttpProfileStore {
    api: ApiClient,
}

impl HttpProfileStore {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl ProfileStore for HttpProfileStore {
    async fn fetch_profile(&self, session: &Session) -> Result<ProfileRecord, PersistError> {
        let user = self
            .api
            .authorized(&session.token)
            .get_user(&session.user_id)
            .await
            .map_err(|e| persist_error(e, session))?;
        Ok(ProfileRecord { id: user.id, whiteboard: user.whiteboard })
    }

    async fn update_whiteboard(&self, session: &Session, data_url: &str) -> Result<(), PersistError> {
        let update = UserUpdate { whiteboard: Some(data_url.to_owned()) };
        self.api
            .authorized(&session.token)
            .update_user(&session.user_id, &update)
            .await
            .map_err(|e| persist_error(e, session))?;
        info!(user_id = %session.user_id, bytes = data_url.len(), "whiteboard stored on profile");
        Ok(())
    }
}

fn persist_error(error: ApiError, session: &Session) -> PersistError {
    match error {
        ApiError::Unauthorized => PersistError::Unauthorized { user_id: session.user_id.clone() },
        ApiError::NotFound(_) => PersistError::NotFound { user_id: session.user_id.clone() },
        ApiError::Parse(msg) => PersistError::Malformed(msg),
        other => PersistError::Transport(other.to_string()),
    }
}

#[cfg(test)]
#[path = "profile_test.rs"]
mod tests;
