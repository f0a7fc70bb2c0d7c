//! View models for posts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use coldhours_core::domain::{Identity, Post};

const EXCERPT_CHARS: usize = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostStatus {
    Published,
    Draft,
}

impl PostStatus {
    pub fn label(self) -> &'static str {
        match self {
            PostStatus::Published => "Published",
            PostStatus::Draft => "Draft",
        }
    }
}

/// One row of the post list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub author_name: String,
    pub status: PostStatus,
    /// Empty while the creation time is unknown.
    pub date: String,
}

impl From<&Post> for PostSummary {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id.to_string(),
            title: post.title.clone(),
            excerpt: excerpt(&post.body),
            author_name: post.author_name.clone(),
            status: status(post),
            date: format_date(post.created_at),
        }
    }
}

/// A fully rendered post, with the actions the viewer may take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: String,
    pub title: String,
    pub body: String,
    pub author_name: String,
    pub author_email: String,
    pub status: PostStatus,
    pub date: String,
    /// Edit, delete and publish toggle are offered.
    pub can_manage: bool,
}

impl PostView {
    pub fn new(post: &Post, viewer: Option<&Identity>) -> Self {
        Self {
            id: post.id.to_string(),
            title: post.title.clone(),
            body: post.body.clone(),
            author_name: post.author_name.clone(),
            author_email: post.author_email.clone(),
            status: status(post),
            date: format_date(post.created_at),
            can_manage: viewer.is_some_and(|viewer| post.is_authored_by(viewer)),
        }
    }
}

fn status(post: &Post) -> PostStatus {
    if post.published {
        PostStatus::Published
    } else {
        PostStatus::Draft
    }
}

/// First 150 characters of `body`, with `...` when cut.
pub fn excerpt(body: &str) -> String {
    let mut chars = body.chars();
    let head: String = chars.by_ref().take(EXCERPT_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

/// `Month D, YYYY`, or empty when unknown.
pub fn format_date(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| d.format("%B %-d, %Y").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use coldhours_core::domain::{IdentityId, PostId};

    fn post(published: bool, body: &str) -> Post {
        Post {
            id: PostId::new("p1"),
            title: "Hello".to_string(),
            body: body.to_string(),
            author_id: IdentityId::new("ada-id"),
            author_name: "Ada".to_string(),
            author_email: "ada@example.com".to_string(),
            published,
            created_at: Some(Utc.with_ymd_and_hms(2025, 3, 7, 10, 0, 0).unwrap()),
        }
    }

    #[test]
    fn test_excerpt_cuts_at_150_chars() {
        let long = "é".repeat(151);
        let cut = excerpt(&long);
        assert_eq!(cut.chars().count(), 153);
        assert!(cut.ends_with("..."));

        let exact = "a".repeat(150);
        assert_eq!(excerpt(&exact), exact);
    }

    #[test]
    fn test_summary() {
        let summary = PostSummary::from(&post(true, "World"));
        assert_eq!(summary.status.label(), "Published");
        assert_eq!(summary.excerpt, "World");
        assert_eq!(summary.date, "March 7, 2025");

        let draft = PostSummary::from(&Post {
            created_at: None,
            ..post(false, "World")
        });
        assert_eq!(draft.status.label(), "Draft");
        assert_eq!(draft.date, "");
    }

    #[test]
    fn test_view_offers_actions_to_author_only() {
        let post = post(false, "World");
        let author = Identity::new("ada-id");
        let other = Identity::new("bob-id");

        assert!(PostView::new(&post, Some(&author)).can_manage);
        assert!(!PostView::new(&post, Some(&other)).can_manage);
        assert!(!PostView::new(&post, None).can_manage);
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let value = serde_json::to_value(PostSummary::from(&post(true, "World"))).unwrap();
        assert_eq!(value["authorName"], "Ada");
        assert_eq!(value["status"], "Published");
    }
}
