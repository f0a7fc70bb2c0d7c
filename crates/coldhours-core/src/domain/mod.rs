//! Domain entities - the core business objects.

mod identity;
mod post;
mod profile;

pub use identity::{Identity, IdentityId, mask_email};
pub use post::{Post, PostDraft, PostFields, PostId, newest_first};
pub use profile::UserProfile;
