mod common;

use std::sync::Arc;

use coldhours_core::domain::{PostDraft, PostId};
use coldhours_core::ports::{BLOGS, DocumentStore, IdentityClient, StoreError, WriteFields};
use coldhours_core::{ContentError, ContentRepository};
use coldhours_infra::InMemoryDocumentStore;

use common::{ada, bob, post_fields, seeded};

fn setup() -> (Arc<InMemoryDocumentStore>, ContentRepository) {
    let store = Arc::new(InMemoryDocumentStore::new());
    let repo = ContentRepository::new(store.clone());
    (store, repo)
}

#[tokio::test]
async fn created_post_is_unpublished_and_attributed() {
    let (_, repo) = setup();
    let author = ada();

    let id = repo
        .create(&PostDraft::new("Hello", "World"), &author)
        .await
        .unwrap();
    let post = repo.get(&id).await.unwrap();

    assert_eq!(post.title, "Hello");
    assert_eq!(post.body, "World");
    assert!(!post.published);
    assert_eq!(post.author_id, author.id);
    assert_eq!(post.author_name, "Ada");
    assert_eq!(post.author_email, "ada@example.com");
    assert!(post.created_at.is_some());
}

#[tokio::test]
async fn whitespace_title_writes_nothing() {
    let (store, repo) = setup();

    let result = repo.create(&PostDraft::new("   ", "Body"), &ada()).await;

    assert!(matches!(result, Err(ContentError::Validation(_))));
    assert_eq!(store.count(BLOGS).await, 0);
}

#[tokio::test]
async fn nameless_author_is_recorded_as_anonymous() {
    let (_, repo) = setup();
    let author = coldhours_core::domain::Identity::new("anon-id");

    let id = repo.create(&PostDraft::new("Hi", "There"), &author).await.unwrap();
    let post = repo.get(&id).await.unwrap();

    assert_eq!(post.author_name, "Anonymous");
    assert_eq!(post.author_email, "");
}

#[tokio::test]
async fn non_author_cannot_change_a_post() {
    let (store, repo) = setup();
    seeded(&store, "p1", "Original", &ada()).await;
    let id = PostId::new("p1");
    let before = repo.get(&id).await.unwrap();

    let intruder = bob();
    assert_eq!(
        repo.update(&id, &PostDraft::new("Hijacked", "Body"), &intruder).await,
        Err(ContentError::Authorization)
    );
    assert_eq!(
        repo.toggle_publish(&id, &intruder).await,
        Err(ContentError::Authorization)
    );
    assert_eq!(repo.delete(&id, &intruder).await, Err(ContentError::Authorization));

    assert_eq!(repo.get(&id).await.unwrap(), before);
}

#[tokio::test]
async fn store_rules_reject_foreign_writes() {
    let (store, _) = setup();
    seeded(&store, "p1", "Original", &ada()).await;
    let intruder = bob();

    let update = store
        .update(
            BLOGS,
            "p1",
            WriteFields::new().set("title", "Hijacked"),
            Some(&intruder.id),
        )
        .await;
    assert!(matches!(update, Err(StoreError::PermissionDenied)));

    let delete = store.delete(BLOGS, "p1", None).await;
    assert!(matches!(delete, Err(StoreError::PermissionDenied)));

    // The owner field cannot be handed over either.
    let reassign = store
        .update(
            BLOGS,
            "p1",
            WriteFields::new().set("authorId", intruder.id.as_str()),
            Some(&ada().id),
        )
        .await;
    assert!(matches!(reassign, Err(StoreError::PermissionDenied)));
}

#[tokio::test]
async fn toggling_twice_restores_published() {
    let (_, repo) = setup();
    let author = ada();
    let id = repo
        .create(&PostDraft::new("Hello", "World"), &author)
        .await
        .unwrap();

    assert!(repo.toggle_publish(&id, &author).await.unwrap());
    assert!(repo.get(&id).await.unwrap().published);

    assert!(!repo.toggle_publish(&id, &author).await.unwrap());
    assert!(!repo.get(&id).await.unwrap().published);
}

#[tokio::test]
async fn update_changes_only_title_and_body() {
    let (_, repo) = setup();
    let author = ada();
    let id = repo
        .create(&PostDraft::new("Hello", "World"), &author)
        .await
        .unwrap();
    let before = repo.get(&id).await.unwrap();

    let returned = repo
        .update(&id, &PostDraft::new("  Hello again ", "Still here"), &author)
        .await
        .unwrap();
    let after = repo.get(&id).await.unwrap();

    assert_eq!(returned, after);
    assert_eq!(after.title, "Hello again");
    assert_eq!(after.body, "Still here");
    assert_eq!(after.created_at, before.created_at);
    assert_eq!(after.author_id, before.author_id);
    assert_eq!(after.published, before.published);
}

#[tokio::test]
async fn update_rejects_blank_body_before_fetching() {
    let (_, repo) = setup();

    let result = repo
        .update(&PostId::new("missing"), &PostDraft::new("Title", "\n\t"), &ada())
        .await;

    assert!(matches!(result, Err(ContentError::Validation(_))));
}

#[tokio::test]
async fn delete_is_permanent() {
    let (_, repo) = setup();
    let author = ada();
    let id = repo
        .create(&PostDraft::new("Hello", "World"), &author)
        .await
        .unwrap();

    repo.delete(&id, &author).await.unwrap();

    assert!(matches!(repo.get(&id).await, Err(ContentError::NotFound { .. })));
    assert!(matches!(
        repo.delete(&id, &author).await,
        Err(ContentError::NotFound { .. })
    ));
}

#[tokio::test]
async fn list_is_newest_first_whatever_the_insert_order() {
    let stamps = [
        ("a", "2025-01-01T00:00:00Z"),
        ("b", "2025-02-01T00:00:00Z"),
        ("c", "2025-03-01T00:00:00Z"),
    ];
    let orders = [
        [0, 1, 2],
        [0, 2, 1],
        [1, 0, 2],
        [1, 2, 0],
        [2, 0, 1],
        [2, 1, 0],
    ];

    for order in orders {
        let (store, repo) = setup();
        store.seed(BLOGS, "pending", post_fields("pending", "ada-id", None)).await;
        for index in order {
            let (id, stamp) = stamps[index];
            store.seed(BLOGS, id, post_fields(id, "ada-id", Some(stamp))).await;
        }

        let ids: Vec<String> = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|post| post.id.to_string())
            .collect();

        assert_eq!(ids, ["c", "b", "a", "pending"], "insert order {order:?}");
    }
}

#[tokio::test]
async fn malformed_document_is_a_schema_error() {
    let (store, repo) = setup();
    let mut fields = post_fields("Odd", "ada-id", None);
    fields.insert("rating".to_string(), serde_json::json!(5));
    store.seed(BLOGS, "odd", fields).await;

    assert!(matches!(
        repo.get(&PostId::new("odd")).await,
        Err(ContentError::Schema { .. })
    ));
    assert!(matches!(repo.list().await, Err(ContentError::Schema { .. })));
}

#[tokio::test]
async fn offline_store_is_a_transport_error() {
    let (store, repo) = setup();
    store.set_online(false);

    assert!(matches!(repo.list().await, Err(ContentError::Transport(_))));
    assert!(matches!(
        repo.create(&PostDraft::new("Hello", "World"), &ada()).await,
        Err(ContentError::Transport(_))
    ));
}

#[tokio::test]
async fn hello_world_walkthrough() {
    let provider = common::provider();
    let store = Arc::new(InMemoryDocumentStore::new());
    let repo = ContentRepository::new(store.clone());

    let ada = provider
        .sign_up_with_credentials("Ada", "ada@example.com", "secret1")
        .await
        .unwrap();
    let id = repo
        .create(&PostDraft::new("Hello", "World"), &ada)
        .await
        .unwrap();

    let listed = repo.list().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].title, "Hello");
    assert_eq!(listed[0].author_name, "Ada");
    assert!(!listed[0].published);

    assert!(repo.toggle_publish(&id, &ada).await.unwrap());
    assert!(repo.get(&id).await.unwrap().published);

    provider.sign_out().await.unwrap();
    let bob = provider
        .sign_up_with_credentials("Bob", "bob@example.com", "secret2")
        .await
        .unwrap();

    assert_eq!(repo.list().await.unwrap().len(), 1);
    assert_eq!(repo.delete(&id, &bob).await, Err(ContentError::Authorization));
    assert_eq!(store.count(BLOGS).await, 1);
}
