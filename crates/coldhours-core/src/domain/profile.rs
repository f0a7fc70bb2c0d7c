use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Profile snapshot kept in the `Users` collection, keyed by identity id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, rename = "photoURL")]
    pub photo_url: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
