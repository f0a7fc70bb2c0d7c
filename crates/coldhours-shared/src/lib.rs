//! # ColdHours Shared
//!
//! Presentation-neutral view models. Any front end (the console, a web
//! client) renders posts and messages from these types.

pub mod dto;
pub mod notice;

pub use dto::{PostStatus, PostSummary, PostView};
pub use notice::{Notice, NoticeLevel};
