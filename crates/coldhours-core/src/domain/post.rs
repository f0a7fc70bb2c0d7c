use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::identity::{Identity, IdentityId};
use crate::error::ContentError;
use crate::ports::Document;

/// Store-assigned post identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Post entity - one authored document in the `Blogs` collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub body: String,
    pub author_id: IdentityId,
    pub author_name: String,
    pub author_email: String,
    pub published: bool,
    /// `None` while the server timestamp has not resolved yet.
    pub created_at: Option<DateTime<Utc>>,
}

/// Persisted shape of a post document. Anything else is rejected.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct PostRecord {
    title: String,
    body: String,
    author_id: String,
    #[serde(default)]
    author_name: String,
    #[serde(default)]
    author_email: String,
    published: bool,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl Post {
    pub fn is_authored_by(&self, identity: &Identity) -> bool {
        self.author_id == identity.id
    }

    /// Decode a store document against the fixed post schema.
    pub fn from_document(doc: Document) -> Result<Self, ContentError> {
        let Document { id, fields } = doc;
        let record: PostRecord = serde_json::from_value(serde_json::Value::Object(fields))
            .map_err(|e| ContentError::Schema {
                id: id.clone(),
                reason: e.to_string(),
            })?;

        if record.author_id.is_empty() {
            return Err(ContentError::Schema {
                id,
                reason: "authorId is empty".to_string(),
            });
        }

        Ok(Self {
            id: PostId::new(id),
            title: record.title,
            body: record.body,
            author_id: IdentityId::new(record.author_id),
            author_name: record.author_name,
            author_email: record.author_email,
            published: record.published,
            created_at: record.created_at,
        })
    }
}

/// Raw, unvalidated title/body as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDraft {
    pub title: String,
    pub body: String,
}

impl PostDraft {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    pub fn from_post(post: &Post) -> Self {
        Self::new(post.title.clone(), post.body.clone())
    }

    /// Trim both fields and reject empty ones.
    pub fn validate(&self) -> Result<PostFields, ContentError> {
        let title = self.title.trim();
        let body = self.body.trim();

        if title.is_empty() || body.is_empty() {
            return Err(ContentError::Validation(
                "title and body must not be empty".to_string(),
            ));
        }

        Ok(PostFields {
            title: title.to_string(),
            body: body.to_string(),
        })
    }
}

/// Trimmed, non-empty title/body. Only obtainable through [`PostDraft::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostFields {
    title: String,
    body: String,
}

impl PostFields {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Most recent first; unresolved timestamps last; ties broken by id.
pub fn newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| {
        let by_time = match (a.created_at, b.created_at) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        by_time.then_with(|| a.id.cmp(&b.id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn doc(id: &str, value: serde_json::Value) -> Document {
        Document {
            id: id.to_string(),
            fields: value.as_object().cloned().unwrap_or_default(),
        }
    }

    fn post(id: &str, created_at: Option<DateTime<Utc>>) -> Post {
        Post {
            id: PostId::new(id),
            title: "t".into(),
            body: "b".into(),
            author_id: IdentityId::new("a"),
            author_name: "A".into(),
            author_email: String::new(),
            published: false,
            created_at,
        }
    }

    #[test]
    fn test_validate_trims_fields() {
        let fields = PostDraft::new("  Hello ", "\nWorld\t").validate().unwrap();
        assert_eq!(fields.title(), "Hello");
        assert_eq!(fields.body(), "World");
    }

    #[test]
    fn test_validate_rejects_whitespace_only() {
        let err = PostDraft::new("  ", "body").validate().unwrap_err();
        assert!(matches!(err, ContentError::Validation(_)));

        let err = PostDraft::new("title", "").validate().unwrap_err();
        assert!(matches!(err, ContentError::Validation(_)));
    }

    #[test]
    fn test_from_document() {
        let post = Post::from_document(doc(
            "p1",
            json!({
                "title": "Hello",
                "body": "World",
                "authorId": "u1",
                "authorName": "Ada",
                "authorEmail": "ada@example.com",
                "published": true,
                "createdAt": "2025-01-02T03:04:05.000006Z"
            }),
        ))
        .unwrap();

        assert_eq!(post.id.as_str(), "p1");
        assert_eq!(post.author_id.as_str(), "u1");
        assert!(post.published);
        assert_eq!(
            post.created_at,
            Some(Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap() + chrono::Duration::microseconds(6))
        );
    }

    #[test]
    fn test_from_document_rejects_unknown_fields() {
        let err = Post::from_document(doc(
            "p1",
            json!({
                "title": "Hello",
                "body": "World",
                "authorId": "u1",
                "published": false,
                "likes": 3
            }),
        ))
        .unwrap_err();

        assert!(matches!(err, ContentError::Schema { .. }));
    }

    #[test]
    fn test_from_document_requires_author() {
        let err = Post::from_document(doc(
            "p1",
            json!({ "title": "Hello", "body": "World", "published": false }),
        ))
        .unwrap_err();
        assert!(matches!(err, ContentError::Schema { .. }));
    }

    #[test]
    fn test_newest_first() {
        let t1 = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();

        let mut posts = vec![
            post("c", None),
            post("b", Some(t1)),
            post("a", None),
            post("z", Some(t2)),
            post("y", Some(t1)),
        ];
        newest_first(&mut posts);

        let ids: Vec<_> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["z", "b", "y", "a", "c"]);
    }
}
