//! In-memory document store - used when no database is configured, and in tests.
//!
//! Data is lost on process restart.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use coldhours_core::domain::IdentityId;
use coldhours_core::ports::{Document, DocumentStore, Fields, SortDirection, StoreError, WriteFields};

use super::order_documents;
use super::rules::AccessRules;

type Collection = HashMap<String, Fields>;

/// Document store backed by a HashMap per collection.
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<String, Collection>>,
    rules: AccessRules,
    online: AtomicBool,
    last_stamp: parking_lot::Mutex<DateTime<Utc>>,
}

impl InMemoryDocumentStore {
    /// Store enforcing [`AccessRules::standard`].
    pub fn new() -> Self {
        Self::with_rules(AccessRules::standard())
    }

    pub fn with_rules(rules: AccessRules) -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            rules,
            online: AtomicBool::new(true),
            last_stamp: parking_lot::Mutex::new(DateTime::<Utc>::MIN_UTC),
        }
    }

    /// Simulate losing or regaining connectivity.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::Release);
    }

    /// Insert a document as-is, bypassing access rules.
    pub async fn seed(&self, collection: &str, id: &str, fields: Fields) {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);
    }

    /// Number of documents in `collection`.
    pub async fn count(&self, collection: &str) -> usize {
        let collections = self.collections.read().await;
        collections.get(collection).map_or(0, HashMap::len)
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.online.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("store is offline".to_string()))
        }
    }

    /// Server clock; strictly increasing so creation order is never ambiguous.
    fn now(&self) -> DateTime<Utc> {
        let mut last = self.last_stamp.lock();
        let mut now = Utc::now().trunc_subsecs(6);
        if now <= *last {
            now = *last + TimeDelta::microseconds(1);
        }
        *last = now;
        now
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Document, StoreError> {
        self.ensure_online()?;
        let collections = self.collections.read().await;

        let fields = collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .ok_or(StoreError::NotFound)?;

        Ok(Document {
            id: id.to_string(),
            fields: fields.clone(),
        })
    }

    async fn list(
        &self,
        collection: &str,
        order_field: &str,
        direction: SortDirection,
    ) -> Result<Vec<Document>, StoreError> {
        self.ensure_online()?;
        let collections = self.collections.read().await;

        let mut documents: Vec<Document> = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| Document {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        order_documents(&mut documents, order_field, direction);

        tracing::debug!(collection = %collection, count = documents.len(), "Listed documents");
        Ok(documents)
    }

    async fn create(
        &self,
        collection: &str,
        fields: WriteFields,
        caller: Option<&IdentityId>,
    ) -> Result<String, StoreError> {
        self.ensure_online()?;
        let id = Uuid::new_v4().simple().to_string();
        let fields = fields.resolve(self.now());
        self.rules.check_create(collection, &id, &fields, caller)?;

        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), fields);

        tracing::debug!(collection = %collection, document_id = %id, "Document created");
        Ok(id)
    }

    async fn put(
        &self,
        collection: &str,
        id: &str,
        fields: WriteFields,
        caller: Option<&IdentityId>,
    ) -> Result<(), StoreError> {
        self.ensure_online()?;
        let fields = fields.resolve(self.now());

        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        match docs.get(id) {
            Some(existing) => {
                self.rules
                    .check_write(collection, id, existing, Some(&fields), caller)?
            }
            None => self.rules.check_create(collection, id, &fields, caller)?,
        }
        docs.insert(id.to_string(), fields);

        tracing::debug!(collection = %collection, document_id = %id, "Document written");
        Ok(())
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: WriteFields,
        caller: Option<&IdentityId>,
    ) -> Result<(), StoreError> {
        self.ensure_online()?;
        let incoming = fields.resolve(self.now());

        let mut collections = self.collections.write().await;
        let existing = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or(StoreError::NotFound)?;
        self.rules
            .check_write(collection, id, existing, Some(&incoming), caller)?;
        existing.extend(incoming);

        tracing::debug!(collection = %collection, document_id = %id, "Document updated");
        Ok(())
    }

    async fn delete(
        &self,
        collection: &str,
        id: &str,
        caller: Option<&IdentityId>,
    ) -> Result<(), StoreError> {
        self.ensure_online()?;

        let mut collections = self.collections.write().await;
        let docs = collections
            .get_mut(collection)
            .ok_or(StoreError::NotFound)?;
        let existing = docs.get(id).ok_or(StoreError::NotFound)?;
        self.rules.check_write(collection, id, existing, None, caller)?;
        docs.remove(id);

        tracing::debug!(collection = %collection, document_id = %id, "Document deleted");
        Ok(())
    }
}
