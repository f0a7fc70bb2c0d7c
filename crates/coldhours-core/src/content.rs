//! Content repository - the only path from workflows to the `Blogs` collection.

use std::sync::Arc;

use crate::domain::{Identity, Post, PostDraft, PostId, newest_first};
use crate::error::ContentError;
use crate::ports::{BLOGS, DocumentStore, SortDirection, WriteFields};

const CREATED_AT: &str = "createdAt";

/// Validated, ordered access to posts.
///
/// Mutations check authorship before anything is sent to the store. The
/// `*_post` variants work from a post the caller already holds and fail
/// without any network call when the requester is not the author.
#[derive(Clone)]
pub struct ContentRepository {
    store: Arc<dyn DocumentStore>,
}

impl ContentRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// All posts, most recent first.
    pub async fn list(&self) -> Result<Vec<Post>, ContentError> {
        let documents = self
            .store
            .list(BLOGS, CREATED_AT, SortDirection::Descending)
            .await
            .map_err(|e| ContentError::Transport(e.to_string()))?;

        let mut posts = documents
            .into_iter()
            .map(Post::from_document)
            .collect::<Result<Vec<_>, _>>()?;
        newest_first(&mut posts);

        tracing::debug!(count = posts.len(), "Listed posts");
        Ok(posts)
    }

    pub async fn get(&self, id: &PostId) -> Result<Post, ContentError> {
        let document = self
            .store
            .get(BLOGS, id.as_str())
            .await
            .map_err(|e| ContentError::from_store(e, id.as_str()))?;

        Post::from_document(document)
    }

    /// Store a new unpublished post authored by `author`.
    pub async fn create(&self, draft: &PostDraft, author: &Identity) -> Result<PostId, ContentError> {
        let fields = draft.validate()?;

        let write = WriteFields::new()
            .set("title", fields.title())
            .set("body", fields.body())
            .set("published", false)
            .set("authorId", author.id.as_str())
            .set("authorName", author.author_name())
            .set("authorEmail", author.email.clone().unwrap_or_default())
            .server_timestamp(CREATED_AT);

        let id = self
            .store
            .create(BLOGS, write, Some(&author.id))
            .await
            .map_err(|e| ContentError::from_store(e, ""))?;

        tracing::info!(post_id = %id, author_id = %author.id, "Post created");
        Ok(PostId::new(id))
    }

    /// Fetch the post, then [`ContentRepository::update_post`].
    pub async fn update(
        &self,
        id: &PostId,
        draft: &PostDraft,
        requester: &Identity,
    ) -> Result<Post, ContentError> {
        draft.validate()?;
        let post = self.get(id).await?;
        self.update_post(&post, draft, requester).await
    }

    /// Replace title and body; returns the post as now stored.
    pub async fn update_post(
        &self,
        post: &Post,
        draft: &PostDraft,
        requester: &Identity,
    ) -> Result<Post, ContentError> {
        let fields = draft.validate()?;
        authorize(post, requester)?;

        let write = WriteFields::new()
            .set("title", fields.title())
            .set("body", fields.body());
        self.store
            .update(BLOGS, post.id.as_str(), write, Some(&requester.id))
            .await
            .map_err(|e| ContentError::from_store(e, post.id.as_str()))?;

        tracing::info!(post_id = %post.id, "Post updated");
        Ok(Post {
            title: fields.title().to_string(),
            body: fields.body().to_string(),
            ..post.clone()
        })
    }

    /// Fetch the post, then [`ContentRepository::toggle_publish_post`].
    pub async fn toggle_publish(&self, id: &PostId, requester: &Identity) -> Result<bool, ContentError> {
        let post = self.get(id).await?;
        self.toggle_publish_post(&post, requester).await
    }

    /// Flip `published`; returns the new value.
    pub async fn toggle_publish_post(
        &self,
        post: &Post,
        requester: &Identity,
    ) -> Result<bool, ContentError> {
        authorize(post, requester)?;

        let published = !post.published;
        let write = WriteFields::new().set("published", published);
        self.store
            .update(BLOGS, post.id.as_str(), write, Some(&requester.id))
            .await
            .map_err(|e| ContentError::from_store(e, post.id.as_str()))?;

        tracing::info!(post_id = %post.id, published, "Post publish state changed");
        Ok(published)
    }

    /// Fetch the post, then [`ContentRepository::delete_post`].
    pub async fn delete(&self, id: &PostId, requester: &Identity) -> Result<(), ContentError> {
        let post = self.get(id).await?;
        self.delete_post(&post, requester).await
    }

    /// Irreversibly remove the post.
    pub async fn delete_post(&self, post: &Post, requester: &Identity) -> Result<(), ContentError> {
        authorize(post, requester)?;

        self.store
            .delete(BLOGS, post.id.as_str(), Some(&requester.id))
            .await
            .map_err(|e| ContentError::from_store(e, post.id.as_str()))?;

        tracing::info!(post_id = %post.id, "Post deleted");
        Ok(())
    }
}

fn authorize(post: &Post, requester: &Identity) -> Result<(), ContentError> {
    if post.is_authored_by(requester) {
        return Ok(());
    }
    tracing::warn!(
        post_id = %post.id,
        requester_id = %requester.id,
        "Rejected mutation by non-author"
    );
    Err(ContentError::Authorization)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::IdentityId;
    use crate::testing::UnreachableStore;

    fn post_by(author: &str) -> Post {
        Post {
            id: PostId::new("p1"),
            title: "Hello".to_string(),
            body: "World".to_string(),
            author_id: IdentityId::new(author),
            author_name: author.to_string(),
            author_email: String::new(),
            published: false,
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_local_rejections_never_reach_the_store() {
        let store = Arc::new(UnreachableStore::default());
        let repo = ContentRepository::new(store.clone());
        let post = post_by("ada");
        let intruder = Identity::new("bob");

        assert_eq!(
            repo.update_post(&post, &PostDraft::new("Hijacked", "Body"), &intruder).await,
            Err(ContentError::Authorization)
        );
        assert_eq!(
            repo.toggle_publish_post(&post, &intruder).await,
            Err(ContentError::Authorization)
        );
        assert_eq!(
            repo.delete_post(&post, &intruder).await,
            Err(ContentError::Authorization)
        );
        assert!(matches!(
            repo.create(&PostDraft::new(" ", "Body"), &intruder).await,
            Err(ContentError::Validation(_))
        ));
        assert!(matches!(
            repo.update_post(&post, &PostDraft::new("Title", ""), &Identity::new("ada")).await,
            Err(ContentError::Validation(_))
        ));

        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn test_store_failures_are_transport_errors() {
        let store = Arc::new(UnreachableStore::default());
        let repo = ContentRepository::new(store.clone());
        let author = Identity::new("ada");

        assert!(matches!(repo.list().await, Err(ContentError::Transport(_))));
        assert!(matches!(
            repo.toggle_publish_post(&post_by("ada"), &author).await,
            Err(ContentError::Transport(_))
        ));
        assert_eq!(store.calls(), 2);
    }
}
