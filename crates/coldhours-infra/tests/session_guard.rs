mod common;

use std::sync::Arc;

use parking_lot::Mutex;

use coldhours_core::navigation::Location;
use coldhours_core::ports::{AuthError, IdentityClient};
use coldhours_core::workflow::{AccountWorkflow, SignUpForm};
use coldhours_core::{
    GuardDecision, IdentitySession, Navigator, ProfileDirectory, RouteGuard, Screen, SessionState,
};
use coldhours_infra::{Backend, BackendConfig, InMemoryDocumentStore};

fn sign_up_form(name: &str, email: &str) -> SignUpForm {
    SignUpForm {
        name: name.to_string(),
        email: email.to_string(),
        password: "secret1".to_string(),
        confirm: "secret1".to_string(),
    }
}

#[tokio::test]
async fn protected_route_returns_after_sign_in() {
    let provider = common::provider();
    let profiles = ProfileDirectory::new(Arc::new(InMemoryDocumentStore::new()));
    let mut navigator = Navigator::new(common::session(&provider));

    let screen = navigator.visit("/create");
    assert_eq!(
        screen,
        Screen::SignIn {
            redirect_to: "/create".to_string()
        }
    );
    assert_eq!(
        navigator.location(),
        &Location {
            path: "/login".to_string(),
            from: Some("/create".to_string()),
        }
    );

    let account = AccountWorkflow::new(provider.clone(), profiles, navigator.sign_in_target());
    let target = account
        .sign_up(&sign_up_form("Ada", "ada@example.com"))
        .await
        .unwrap();
    assert_eq!(target, "/create");

    match navigator.visit(&target) {
        Screen::CreatePost(identity) => assert_eq!(identity.display_name.as_deref(), Some("Ada")),
        other => panic!("expected the authoring view, got {other:?}"),
    }
}

#[tokio::test]
async fn sign_in_screen_switch_keeps_the_target() {
    let provider = common::provider();
    let mut navigator = Navigator::new(common::session(&provider));

    navigator.visit("/create");
    let screen = navigator.switch_account_screen("/signup");

    assert_eq!(
        screen,
        Screen::SignUp {
            redirect_to: "/create".to_string()
        }
    );
    assert_eq!(navigator.sign_in_target(), "/create");
}

#[tokio::test]
async fn unresolved_identity_shows_a_placeholder() {
    let provider = common::unresolved_provider();
    let session = common::session(&provider);
    let guard = RouteGuard::new(session.clone());
    let mut navigator = Navigator::new(session);

    assert_eq!(guard.check("/create"), GuardDecision::Placeholder);
    assert_eq!(navigator.visit("/create"), Screen::Checking);

    provider.resolve(None);

    assert!(matches!(
        guard.resolve("/create").await,
        GuardDecision::Redirect(redirect) if redirect.from == "/create"
    ));
    assert!(matches!(
        navigator.visit_resolved("/create").await,
        Screen::SignIn { .. }
    ));
}

#[tokio::test]
async fn public_routes_ignore_identity() {
    let provider = common::unresolved_provider();
    let mut navigator = Navigator::new(common::session(&provider));

    assert_eq!(navigator.visit("/"), Screen::Landing);
    assert_eq!(navigator.visit("/blogs"), Screen::PostList);
    assert!(matches!(navigator.visit("/blog/p1"), Screen::PostDetail(id) if id.as_str() == "p1"));
    assert!(matches!(navigator.visit("/nowhere"), Screen::NotFound(_)));
}

#[tokio::test]
async fn subscribers_follow_sign_in_and_out() {
    let provider = common::provider();
    let session = common::session(&provider);
    let seen = Arc::new(Mutex::new(Vec::new()));

    let sink = seen.clone();
    let subscription = session.subscribe(move |state: &SessionState| {
        sink.lock().push(state.identity().map(|i| i.id.to_string()));
    });

    let ada = provider
        .sign_up_with_credentials("Ada", "ada@example.com", "secret1")
        .await
        .unwrap();
    session.sign_out().await.unwrap();

    subscription.unsubscribe();
    provider
        .sign_in_with_credentials("ada@example.com", "secret1")
        .await
        .unwrap();

    assert_eq!(*seen.lock(), vec![None, Some(ada.id.to_string()), None]);
    assert!(session.current().identity().is_some());
}

#[tokio::test]
async fn sign_up_records_a_profile_snapshot() {
    let provider = common::provider();
    let profiles = ProfileDirectory::new(Arc::new(InMemoryDocumentStore::new()));
    let account = AccountWorkflow::new(provider.clone(), profiles.clone(), "/");

    account
        .sign_up(&sign_up_form(" Ada ", "ada@example.com"))
        .await
        .unwrap();

    let session = IdentitySession::new(provider.clone());
    let identity = session.identity().unwrap();
    let profile = profiles.get(&identity.id).await.unwrap().unwrap();
    assert_eq!(profile.name, "Ada");
    assert_eq!(profile.email, "ada@example.com");
    assert!(profile.created_at.is_some());

    // A second sign-in leaves the snapshot alone.
    assert!(!profiles.ensure_profile(&identity, "Other").await.unwrap());
}

#[tokio::test]
async fn account_errors_surface_as_messages() {
    let provider = common::provider();
    let profiles = ProfileDirectory::new(Arc::new(InMemoryDocumentStore::new()));
    let account = AccountWorkflow::new(provider.clone(), profiles, "/");

    account
        .sign_up(&sign_up_form("Ada", "ada@example.com"))
        .await
        .unwrap();
    provider.sign_out().await.unwrap();

    let duplicate = account.sign_up(&sign_up_form("Ada", "ada@example.com")).await;
    assert_eq!(duplicate, Err(AuthError::EmailAlreadyInUse));
    assert_eq!(
        account.error().as_deref(),
        Some("Email already in use. Try logging in.")
    );

    let mismatch = SignUpForm {
        confirm: "secret2".to_string(),
        ..sign_up_form("Bob", "bob@example.com")
    };
    assert_eq!(account.sign_up(&mismatch).await, Err(AuthError::PasswordMismatch));

    let wrong = account.sign_in("ada@example.com", "wrong-password").await;
    assert_eq!(wrong, Err(AuthError::InvalidCredentials));
    assert_eq!(account.error().as_deref(), Some("Incorrect email or password."));

    // A later success clears the message.
    account.sign_in("ada@example.com", "secret1").await.unwrap();
    assert_eq!(account.error(), None);
}

#[tokio::test]
async fn persisted_session_is_restored() {
    let first = Backend::build(&BackendConfig::default()).await.unwrap();
    let ada = first
        .identity
        .sign_up_with_credentials("Ada", "ada@example.com", "secret1")
        .await
        .unwrap();
    let token = first.provider().session_token().unwrap();

    let second = Backend::build(&BackendConfig {
        session_token: token,
        ..BackendConfig::default()
    })
    .await
    .unwrap();
    let session = IdentitySession::new(second.identity.clone());

    assert_eq!(session.current(), SessionState::Authenticated(ada));
}

#[tokio::test]
async fn sign_in_from_redirect_returns_to_create() {
    let provider = common::provider();
    provider
        .sign_up_with_credentials("Ada", "ada@example.com", "secret1")
        .await
        .unwrap();
    provider.sign_out().await.unwrap();

    let profiles = ProfileDirectory::new(Arc::new(InMemoryDocumentStore::new()));
    let mut navigator = Navigator::new(common::session(&provider));
    assert!(matches!(navigator.visit("/create"), Screen::SignIn { .. }));

    let account = AccountWorkflow::new(provider.clone(), profiles, navigator.sign_in_target());
    let target = account.sign_in("ada@example.com", "secret1").await.unwrap();

    assert_eq!(target, "/create");
    assert!(matches!(navigator.visit(&target), Screen::CreatePost(_)));
}
