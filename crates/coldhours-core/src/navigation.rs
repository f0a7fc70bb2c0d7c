//! Navigation surface - routes and the screens they lead to.

use crate::domain::{Identity, PostId};
use crate::guard::{GuardDecision, RouteGuard};
use crate::session::IdentitySession;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Landing,
    Blogs,
    Blog(PostId),
    Create,
    Login,
    Signup,
    NotFound(String),
}

impl Route {
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            [] => Route::Landing,
            ["blogs"] => Route::Blogs,
            ["blog", id] => Route::Blog(PostId::new(*id)),
            ["create"] => Route::Create,
            ["login"] => Route::Login,
            ["signup"] => Route::Signup,
            _ => Route::NotFound(path.to_string()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Landing => "/".to_string(),
            Route::Blogs => "/blogs".to_string(),
            Route::Blog(id) => format!("/blog/{id}"),
            Route::Create => "/create".to_string(),
            Route::Login => "/login".to_string(),
            Route::Signup => "/signup".to_string(),
            Route::NotFound(path) => path.clone(),
        }
    }

    pub fn is_protected(&self) -> bool {
        matches!(self, Route::Create)
    }
}

/// What the front end should show after a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Landing,
    PostList,
    PostDetail(PostId),
    /// Protected authoring view, mounted for the signed-in identity.
    CreatePost(Identity),
    /// Identity still resolving.
    Checking,
    SignIn { redirect_to: String },
    SignUp { redirect_to: String },
    NotFound(String),
}

/// Current location plus the path preserved across a sign-in redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub path: String,
    pub from: Option<String>,
}

pub struct Navigator {
    guard: RouteGuard,
    location: Location,
}

impl Navigator {
    pub fn new(session: IdentitySession) -> Self {
        Self {
            guard: RouteGuard::new(session),
            location: Location {
                path: "/".to_string(),
                from: None,
            },
        }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn session(&self) -> &IdentitySession {
        self.guard.session()
    }

    /// Navigate to `path` against the current identity state.
    pub fn visit(&mut self, path: &str) -> Screen {
        let route = Route::parse(path);
        if route.is_protected() {
            let decision = self.guard.check(&route.path());
            return self.apply(route, decision);
        }
        self.show(route)
    }

    /// Navigate to `path`, waiting for the identity to resolve on protected routes.
    pub async fn visit_resolved(&mut self, path: &str) -> Screen {
        let route = Route::parse(path);
        if route.is_protected() {
            let decision = self.guard.resolve(&route.path()).await;
            return self.apply(route, decision);
        }
        self.show(route)
    }

    /// Go between the sign-in and sign-up screens keeping the preserved target.
    pub fn switch_account_screen(&mut self, path: &str) -> Screen {
        let from = self.location.from.take();
        let screen = self.visit(path);
        if matches!(screen, Screen::SignIn { .. } | Screen::SignUp { .. }) {
            self.location.from = from;
            return self.account_screen(&Route::parse(path));
        }
        screen
    }

    /// Where to go once the visitor has signed in from the current screen.
    pub fn sign_in_target(&self) -> String {
        self.location.from.clone().unwrap_or_else(|| "/".to_string())
    }

    fn apply(&mut self, route: Route, decision: GuardDecision) -> Screen {
        match decision {
            GuardDecision::Placeholder => {
                self.location = Location {
                    path: route.path(),
                    from: None,
                };
                Screen::Checking
            }
            GuardDecision::Redirect(redirect) => {
                self.location = Location {
                    path: redirect.to.clone(),
                    from: Some(redirect.from.clone()),
                };
                Screen::SignIn {
                    redirect_to: redirect.from,
                }
            }
            GuardDecision::Render(identity) => {
                self.location = Location {
                    path: route.path(),
                    from: None,
                };
                Screen::CreatePost(identity)
            }
        }
    }

    fn show(&mut self, route: Route) -> Screen {
        self.location = Location {
            path: route.path(),
            from: None,
        };
        match route {
            Route::Landing => Screen::Landing,
            Route::Blogs => Screen::PostList,
            Route::Blog(id) => Screen::PostDetail(id),
            Route::Login | Route::Signup => self.account_screen(&route),
            Route::NotFound(path) => Screen::NotFound(path),
            Route::Create => Screen::Checking,
        }
    }

    fn account_screen(&self, route: &Route) -> Screen {
        let redirect_to = self.sign_in_target();
        match route {
            Route::Signup => Screen::SignUp { redirect_to },
            _ => Screen::SignIn { redirect_to },
        }
    }
}
