//! Document store port - a remote, collection-oriented persistence service.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use crate::domain::IdentityId;

/// Profile snapshots keyed by identity id.
pub const USERS: &str = "Users";
/// Post documents.
pub const BLOGS: &str = "Blogs";

/// Field map of one document.
pub type Fields = serde_json::Map<String, Value>;

/// A document as read back from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Fields to write, plus fields the store stamps with its own clock.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteFields {
    values: Fields,
    server_timestamps: Vec<String>,
}

impl WriteFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Ask the store to fill `name` with its own timestamp.
    pub fn server_timestamp(mut self, name: impl Into<String>) -> Self {
        self.server_timestamps.push(name.into());
        self
    }

    /// Produce the concrete field map, stamping server timestamps with `now`.
    pub fn resolve(self, now: DateTime<Utc>) -> Fields {
        let Self {
            mut values,
            server_timestamps,
        } = self;
        let stamp = now.to_rfc3339_opts(SecondsFormat::Micros, true);
        for name in server_timestamps {
            values.insert(name, Value::String(stamp.clone()));
        }
        values
    }
}

/// Document store trait - abstraction over the remote document service.
///
/// Mutating calls carry the caller's identity so the store can enforce its
/// own access rules.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one document.
    async fn get(&self, collection: &str, id: &str) -> Result<Document, StoreError>;

    /// All documents of a collection ordered by `order_field`.
    async fn list(
        &self,
        collection: &str,
        order_field: &str,
        direction: SortDirection,
    ) -> Result<Vec<Document>, StoreError>;

    /// Create a document under a store-assigned id.
    async fn create(
        &self,
        collection: &str,
        fields: WriteFields,
        caller: Option<&IdentityId>,
    ) -> Result<String, StoreError>;

    /// Create or replace the document at a known id.
    async fn put(
        &self,
        collection: &str,
        id: &str,
        fields: WriteFields,
        caller: Option<&IdentityId>,
    ) -> Result<(), StoreError>;

    /// Merge `fields` into an existing document.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: WriteFields,
        caller: Option<&IdentityId>,
    ) -> Result<(), StoreError>;

    async fn delete(
        &self,
        collection: &str,
        id: &str,
        caller: Option<&IdentityId>,
    ) -> Result<(), StoreError>;
}

/// Document store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Document not found")]
    NotFound,

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Document already exists")]
    Conflict,

    #[error("Backend error: {0}")]
    Backend(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_resolve_stamps_server_timestamps() {
        let now = Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap();
        let fields = WriteFields::new()
            .set("title", "Hello")
            .server_timestamp("createdAt")
            .resolve(now);

        assert_eq!(fields["title"], "Hello");
        assert_eq!(fields["createdAt"], "2025-03-04T05:06:07.000000Z");
    }
}
