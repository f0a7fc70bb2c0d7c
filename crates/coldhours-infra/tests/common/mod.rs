#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Notify;

use coldhours_core::domain::{Identity, IdentityId};
use coldhours_core::ports::{
    BLOGS, Document, DocumentStore, Fields, SortDirection, StoreError, WriteFields,
};
use coldhours_core::{ContentRepository, IdentitySession};
use coldhours_infra::{
    Argon2PasswordService, InMemoryDocumentStore, JwtConfig, JwtSessionTokens,
    LocalIdentityProvider,
};

/// Identity provider with cheap password hashing, already resolved as signed out.
pub fn provider() -> Arc<LocalIdentityProvider> {
    let provider = unresolved_provider();
    provider.resolve(None);
    provider
}

pub fn unresolved_provider() -> Arc<LocalIdentityProvider> {
    let passwords = Arc::new(Argon2PasswordService::with_params(8, 1, 1).unwrap());
    Arc::new(LocalIdentityProvider::new(
        passwords,
        JwtSessionTokens::new(JwtConfig::default()),
    ))
}

pub fn session(provider: &Arc<LocalIdentityProvider>) -> IdentitySession {
    IdentitySession::new(provider.clone())
}

pub fn ada() -> Identity {
    Identity::new("ada-id")
        .with_display_name("Ada")
        .with_email("ada@example.com")
}

pub fn bob() -> Identity {
    Identity::new("bob-id")
        .with_display_name("Bob")
        .with_email("bob@example.com")
}

pub fn post_fields(title: &str, author: &str, created_at: Option<&str>) -> Fields {
    let mut fields = json!({
        "title": title,
        "body": format!("{title} body"),
        "published": false,
        "authorId": author,
        "authorName": author,
        "authorEmail": "",
    });
    if let Some(created_at) = created_at {
        fields["createdAt"] = json!(created_at);
    }
    match fields {
        serde_json::Value::Object(map) => map,
        _ => unreachable!(),
    }
}

/// Memory store whose writes can be held until the test releases them.
pub struct GatedStore {
    pub inner: InMemoryDocumentStore,
    hold: AtomicBool,
    entered: Notify,
    release: Notify,
}

impl GatedStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: InMemoryDocumentStore::new(),
            hold: AtomicBool::new(false),
            entered: Notify::new(),
            release: Notify::new(),
        })
    }

    pub fn hold_writes(&self) {
        self.hold.store(true, Ordering::SeqCst);
    }

    /// Wait until a held write has reached the store.
    pub async fn write_arrived(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        self.hold.store(false, Ordering::SeqCst);
        self.release.notify_one();
    }

    async fn gate(&self) {
        if self.hold.load(Ordering::SeqCst) {
            self.entered.notify_one();
            self.release.notified().await;
        }
    }
}

#[async_trait]
impl DocumentStore for GatedStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Document, StoreError> {
        self.inner.get(collection, id).await
    }

    async fn list(
        &self,
        collection: &str,
        order_field: &str,
        direction: SortDirection,
    ) -> Result<Vec<Document>, StoreError> {
        self.inner.list(collection, order_field, direction).await
    }

    async fn create(
        &self,
        collection: &str,
        fields: WriteFields,
        caller: Option<&IdentityId>,
    ) -> Result<String, StoreError> {
        self.gate().await;
        self.inner.create(collection, fields, caller).await
    }

    async fn put(
        &self,
        collection: &str,
        id: &str,
        fields: WriteFields,
        caller: Option<&IdentityId>,
    ) -> Result<(), StoreError> {
        self.gate().await;
        self.inner.put(collection, id, fields, caller).await
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        fields: WriteFields,
        caller: Option<&IdentityId>,
    ) -> Result<(), StoreError> {
        self.gate().await;
        self.inner.update(collection, id, fields, caller).await
    }

    async fn delete(
        &self,
        collection: &str,
        id: &str,
        caller: Option<&IdentityId>,
    ) -> Result<(), StoreError> {
        self.gate().await;
        self.inner.delete(collection, id, caller).await
    }
}

/// Seed one post authored by `author`.
pub async fn seeded(store: &InMemoryDocumentStore, id: &str, title: &str, author: &Identity) {
    store
        .seed(
            BLOGS,
            id,
            post_fields(title, author.id.as_str(), Some("2025-01-01T00:00:00Z")),
        )
        .await;
}

pub fn repository(store: Arc<dyn DocumentStore>) -> ContentRepository {
    ContentRepository::new(store)
}
