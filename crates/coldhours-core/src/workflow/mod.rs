//! Content and account workflows.
//!
//! Each workflow owns the local state of one view. State changes only after
//! the remote call resolves, a second submission while one is in flight is
//! rejected, and responses arriving after `close()` are discarded.

mod account;
mod create;
mod detail;
mod list;

use std::sync::atomic::{AtomicBool, Ordering};

pub use account::{AccountWorkflow, SignUpForm};
pub use create::CreatePostWorkflow;
pub use detail::{DetailState, EditMode, PostDetailWorkflow, PostPanel};
pub use list::{ListState, PostListWorkflow};

/// Path workflows send the visitor to after creating or deleting a post.
pub const POST_LIST_PATH: &str = "/blogs";

/// Marks one remote round-trip as in flight; cleared on drop.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn begin(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
