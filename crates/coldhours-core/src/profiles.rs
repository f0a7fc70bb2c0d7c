//! Profile directory - `Users` snapshots keyed by identity id.

use std::sync::Arc;

use crate::domain::{Identity, IdentityId, UserProfile};
use crate::error::ContentError;
use crate::ports::{DocumentStore, StoreError, USERS, WriteFields};

#[derive(Clone)]
pub struct ProfileDirectory {
    store: Arc<dyn DocumentStore>,
}

impl ProfileDirectory {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, id: &IdentityId) -> Result<Option<UserProfile>, ContentError> {
        match self.store.get(USERS, id.as_str()).await {
            Ok(document) => serde_json::from_value(serde_json::Value::Object(document.fields))
                .map(Some)
                .map_err(|e| ContentError::Schema {
                    id: id.to_string(),
                    reason: e.to_string(),
                }),
            Err(StoreError::NotFound) => Ok(None),
            Err(e) => Err(ContentError::from_store(e, id.as_str())),
        }
    }

    /// Create the profile snapshot unless one exists. Returns whether it was created.
    ///
    /// `fallback_name` is used when the identity carries no display name.
    pub async fn ensure_profile(
        &self,
        identity: &Identity,
        fallback_name: &str,
    ) -> Result<bool, ContentError> {
        if self.get(&identity.id).await?.is_some() {
            return Ok(false);
        }

        let name = identity
            .display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .or(Some(fallback_name.trim()).filter(|name| !name.is_empty()))
            .unwrap_or("Anonymous");

        let write = WriteFields::new()
            .set("name", name)
            .set("email", identity.email.clone().unwrap_or_default())
            .set("photoURL", identity.photo_url.clone().unwrap_or_default())
            .server_timestamp("createdAt");

        self.store
            .put(USERS, identity.id.as_str(), write, Some(&identity.id))
            .await
            .map_err(|e| ContentError::from_store(e, identity.id.as_str()))?;

        tracing::info!(identity_id = %identity.id, "Profile snapshot created");
        Ok(true)
    }
}
