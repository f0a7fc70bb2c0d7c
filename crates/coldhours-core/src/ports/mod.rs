//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod identity;
mod store;

pub use identity::{AuthError, IdentityClient, IdentityListener, ListenerId, PasswordService};
pub use store::{
    BLOGS, Document, DocumentStore, Fields, SortDirection, StoreError, USERS, WriteFields,
};
