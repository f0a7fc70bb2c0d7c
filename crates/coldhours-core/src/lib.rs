//! # ColdHours Core
//!
//! The client-side logic of ColdHours: who is signed in, which views they may
//! reach, and how posts move through their lifecycle against a remote
//! document store. Infrastructure lives behind the traits in [`ports`].

pub mod content;
pub mod domain;
pub mod error;
pub mod guard;
pub mod navigation;
pub mod ports;
pub mod profiles;
pub mod session;
pub mod workflow;

pub use content::ContentRepository;
pub use error::ContentError;
pub use guard::{GuardDecision, RouteGuard};
pub use navigation::{Navigator, Route, Screen};
pub use profiles::ProfileDirectory;
pub use session::{IdentitySession, SessionState, Subscription};

#[cfg(test)]
pub(crate) mod testing;
