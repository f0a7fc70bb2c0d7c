//! Test doubles for the ports.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{Identity, IdentityId};
use crate::ports::{
    AuthError, Document, DocumentStore, IdentityClient, IdentityListener, ListenerId,
    SortDirection, StoreError, WriteFields,
};

/// Provider whose state only changes when a test calls [`ManualIdentityClient::emit`].
pub(crate) struct ManualIdentityClient {
    listeners: Mutex<BTreeMap<ListenerId, IdentityListener>>,
    next_id: AtomicU64,
    current: Mutex<Option<Option<Identity>>>,
}

impl ManualIdentityClient {
    pub(crate) fn new() -> Self {
        Self {
            listeners: Mutex::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
            current: Mutex::new(None),
        }
    }

    pub(crate) fn emit(&self, identity: Option<Identity>) {
        *self.current.lock() = Some(identity.clone());
        let listeners: Vec<_> = self.listeners.lock().values().cloned().collect();
        for listener in listeners {
            listener(identity.clone());
        }
    }

    pub(crate) fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }
}

#[async_trait]
impl IdentityClient for ManualIdentityClient {
    fn add_listener(&self, listener: IdentityListener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.lock().insert(id, listener.clone());
        let resolved = self.current.lock().clone();
        if let Some(identity) = resolved {
            listener(identity);
        }
        id
    }

    fn remove_listener(&self, id: ListenerId) {
        self.listeners.lock().remove(&id);
    }

    async fn sign_in_with_credentials(
        &self,
        email: &str,
        _password: &str,
    ) -> Result<Identity, AuthError> {
        let identity = Identity::new(email).with_email(email);
        self.emit(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_up_with_credentials(
        &self,
        name: &str,
        email: &str,
        _password: &str,
    ) -> Result<Identity, AuthError> {
        let identity = Identity::new(email)
            .with_email(email)
            .with_display_name(name);
        self.emit(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_in_with_federated_provider(&self) -> Result<Identity, AuthError> {
        Err(AuthError::SignInMethodDisabled)
    }

    async fn update_display_name(&self, _name: &str) -> Result<Identity, AuthError> {
        Err(AuthError::NotSignedIn)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.emit(None);
        Ok(())
    }
}

/// Store that answers every call with `Unavailable` and counts the calls.
#[derive(Default)]
pub(crate) struct UnreachableStore {
    calls: AtomicUsize,
}

impl UnreachableStore {
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn refuse<T>(&self) -> Result<T, StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Unavailable("unreachable".to_string()))
    }
}

#[async_trait]
impl DocumentStore for UnreachableStore {
    async fn get(&self, _collection: &str, _id: &str) -> Result<Document, StoreError> {
        self.refuse()
    }

    async fn list(
        &self,
        _collection: &str,
        _order_field: &str,
        _direction: SortDirection,
    ) -> Result<Vec<Document>, StoreError> {
        self.refuse()
    }

    async fn create(
        &self,
        _collection: &str,
        _fields: WriteFields,
        _caller: Option<&IdentityId>,
    ) -> Result<String, StoreError> {
        self.refuse()
    }

    async fn put(
        &self,
        _collection: &str,
        _id: &str,
        _fields: WriteFields,
        _caller: Option<&IdentityId>,
    ) -> Result<(), StoreError> {
        self.refuse()
    }

    async fn update(
        &self,
        _collection: &str,
        _id: &str,
        _fields: WriteFields,
        _caller: Option<&IdentityId>,
    ) -> Result<(), StoreError> {
        self.refuse()
    }

    async fn delete(
        &self,
        _collection: &str,
        _id: &str,
        _caller: Option<&IdentityId>,
    ) -> Result<(), StoreError> {
        self.refuse()
    }
}
