//! Line-driven console front end.
//!
//! Each input line is one [`Command`]. Navigation goes through the
//! [`Navigator`]; every screen is backed by the matching workflow.

use std::io::{self, Write};
use std::sync::Arc;

use coldhours_core::domain::PostDraft;
use coldhours_core::ports::{AuthError, IdentityClient};
use coldhours_core::workflow::{
    AccountWorkflow, CreatePostWorkflow, DetailState, EditMode, ListState, PostDetailWorkflow,
    PostListWorkflow, SignUpForm,
};
use coldhours_core::{
    ContentError, ContentRepository, IdentitySession, Navigator, ProfileDirectory, Route, Screen,
};
use coldhours_shared::{Notice, NoticeLevel, PostSummary, PostView};

const HELP: &str = "\
Navigation:  go <path> | home | list | open <id> | new | login | signup
Account:     login <email> <password>
             signup <email> <password> <confirm> <name...>
             federated | logout | whoami
Writing:     title <text> | body <text> | submit
Post:        edit | save | cancel | publish | delete | yes
Other:       retry | show | help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Go(String),
    Login { email: String, password: String },
    Signup(SignUpForm),
    Federated,
    Logout,
    Whoami,
    Title(String),
    Body(String),
    Submit,
    Edit,
    Cancel,
    Publish,
    Delete,
    Confirm,
    Retry,
    Show,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        let command = match word {
            "go" if !rest.is_empty() => Command::Go(rest.to_string()),
            "home" => Command::Go(Route::Landing.path()),
            "list" | "blogs" => Command::Go(Route::Blogs.path()),
            "open" if !rest.is_empty() => Command::Go(format!("/blog/{rest}")),
            "new" | "create" => Command::Go(Route::Create.path()),
            "login" if rest.is_empty() => Command::Go(Route::Login.path()),
            "login" => match rest.split_whitespace().collect::<Vec<_>>().as_slice() {
                [email, password] => Command::Login {
                    email: email.to_string(),
                    password: password.to_string(),
                },
                _ => return Err("Usage: login <email> <password>".to_string()),
            },
            "signup" if rest.is_empty() => Command::Go(Route::Signup.path()),
            "signup" => {
                let mut parts = rest.splitn(4, char::is_whitespace);
                match (parts.next(), parts.next(), parts.next(), parts.next()) {
                    (Some(email), Some(password), Some(confirm), name) => {
                        Command::Signup(SignUpForm {
                            name: name.unwrap_or_default().trim().to_string(),
                            email: email.to_string(),
                            password: password.to_string(),
                            confirm: confirm.to_string(),
                        })
                    }
                    _ => {
                        return Err(
                            "Usage: signup <email> <password> <confirm> <name...>".to_string()
                        );
                    }
                }
            }
            "federated" => Command::Federated,
            "logout" => Command::Logout,
            "whoami" => Command::Whoami,
            "title" => Command::Title(rest.to_string()),
            "body" => Command::Body(rest.to_string()),
            "submit" | "save" => Command::Submit,
            "edit" => Command::Edit,
            "cancel" => Command::Cancel,
            "publish" | "unpublish" => Command::Publish,
            "delete" => Command::Delete,
            "yes" => Command::Confirm,
            "retry" => Command::Retry,
            "show" | "" => Command::Show,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(format!("Unknown command '{other}'. Type 'help'.")),
        };
        Ok(command)
    }
}

enum View {
    Landing,
    List(PostListWorkflow),
    Detail {
        workflow: PostDetailWorkflow,
        confirming_delete: bool,
    },
    Create(CreatePostWorkflow),
    Account {
        workflow: AccountWorkflow,
        sign_up: bool,
    },
    NotFound(String),
}

impl View {
    fn close(&self) {
        match self {
            View::List(workflow) => workflow.close(),
            View::Detail { workflow, .. } => workflow.close(),
            View::Create(workflow) => workflow.close(),
            View::Landing | View::Account { .. } | View::NotFound(_) => {}
        }
    }
}

pub struct Console<W> {
    navigator: Navigator,
    repo: ContentRepository,
    profiles: ProfileDirectory,
    view: View,
    out: W,
}

impl<W: Write> Console<W> {
    pub fn new(
        session: IdentitySession,
        repo: ContentRepository,
        profiles: ProfileDirectory,
        out: W,
    ) -> Self {
        Self {
            navigator: Navigator::new(session),
            repo,
            profiles,
            view: View::Landing,
            out,
        }
    }

    pub fn into_output(self) -> W {
        self.out
    }

    fn session(&self) -> &IdentitySession {
        self.navigator.session()
    }

    fn client(&self) -> Arc<dyn IdentityClient> {
        self.session().client().clone()
    }

    /// Run one input line. Returns `false` once the user quits.
    pub async fn handle_line(&mut self, line: &str) -> io::Result<bool> {
        match Command::parse(line) {
            Ok(Command::Quit) => Ok(false),
            Ok(command) => {
                self.handle(command).await?;
                Ok(true)
            }
            Err(usage) => {
                self.notice(&Notice::error(usage))?;
                Ok(true)
            }
        }
    }

    pub async fn handle(&mut self, command: Command) -> io::Result<()> {
        // Any other command abandons a pending delete confirmation.
        if let View::Detail {
            confirming_delete, ..
        } = &mut self.view
            && command != Command::Confirm
            && command != Command::Delete
        {
            *confirming_delete = false;
        }

        match command {
            Command::Go(path) => self.go(&path).await,
            Command::Login { email, password } => {
                let account = self.account_workflow();
                let result = account.sign_in(&email, &password).await;
                self.after_account(result).await
            }
            Command::Signup(form) => {
                let account = self.account_workflow();
                let result = account.sign_up(&form).await;
                self.after_account(result).await
            }
            Command::Federated => {
                let account = self.account_workflow();
                let result = account.sign_in_federated().await;
                self.after_account(result).await
            }
            Command::Logout => self.logout().await,
            Command::Whoami => self.whoami().await,
            Command::Title(title) => self.edit_field(Some(title), None),
            Command::Body(body) => self.edit_field(None, Some(body)),
            Command::Submit => self.submit().await,
            Command::Edit => self.detail_action(|detail| detail.begin_edit()),
            Command::Cancel => self.detail_action(|detail| detail.cancel_edit()),
            Command::Publish => self.publish().await,
            Command::Delete => self.request_delete(),
            Command::Confirm => self.confirm_delete().await,
            Command::Retry => self.retry().await,
            Command::Show => self.render(),
            Command::Help => writeln!(self.out, "{HELP}"),
            Command::Quit => Ok(()),
        }
    }

    /// Navigate to `path` and open the screen it leads to.
    pub async fn go(&mut self, path: &str) -> io::Result<()> {
        let switching = matches!(self.view, View::Account { .. })
            && matches!(Route::parse(path), Route::Login | Route::Signup);
        let mut screen = if switching {
            self.navigator.switch_account_screen(path)
        } else {
            self.navigator.visit(path)
        };
        if screen == Screen::Checking {
            writeln!(self.out, "Checking sign-in...")?;
            screen = self.navigator.visit_resolved(path).await;
        }

        self.view.close();
        self.view = match screen {
            Screen::Landing | Screen::Checking => View::Landing,
            Screen::PostList => {
                let workflow = PostListWorkflow::new(self.repo.clone());
                // Failures are kept in the list state.
                let _ = workflow.load().await;
                View::List(workflow)
            }
            Screen::PostDetail(id) => {
                let workflow =
                    PostDetailWorkflow::new(id, self.repo.clone(), self.session().clone());
                let _ = workflow.load().await;
                View::Detail {
                    workflow,
                    confirming_delete: false,
                }
            }
            Screen::CreatePost(author) => View::Create(CreatePostWorkflow::new(
                self.repo.clone(),
                self.session().clone(),
                author,
            )),
            Screen::SignIn { redirect_to } => View::Account {
                workflow: AccountWorkflow::new(self.client(), self.profiles.clone(), redirect_to),
                sign_up: false,
            },
            Screen::SignUp { redirect_to } => View::Account {
                workflow: AccountWorkflow::new(self.client(), self.profiles.clone(), redirect_to),
                sign_up: true,
            },
            Screen::NotFound(path) => View::NotFound(path),
        };
        self.render()
    }

    fn account_workflow(&self) -> AccountWorkflow {
        let redirect_to = match &self.view {
            View::Account { workflow, .. } => workflow.redirect_to().to_string(),
            _ => self.navigator.sign_in_target(),
        };
        AccountWorkflow::new(self.client(), self.profiles.clone(), redirect_to)
    }

    async fn after_account(&mut self, result: Result<String, AuthError>) -> io::Result<()> {
        match result {
            Ok(target) => {
                if let Some(identity) = self.session().identity() {
                    self.notice(&Notice::success(format!(
                        "Signed in as {}",
                        identity.author_name()
                    )))?;
                }
                self.go(&target).await
            }
            Err(e) => self.notice(&Notice::from(&e)),
        }
    }

    async fn logout(&mut self) -> io::Result<()> {
        if let Err(e) = self.session().sign_out().await {
            return self.notice(&Notice::from(&e));
        }
        self.notice(&Notice::info("Signed out"))?;

        // A protected screen must not stay open.
        if matches!(self.view, View::Create(_)) {
            let path = self.navigator.location().path.clone();
            return self.go(&path).await;
        }
        self.render()
    }

    async fn whoami(&mut self) -> io::Result<()> {
        let Some(identity) = self.session().identity() else {
            return writeln!(self.out, "Not signed in.");
        };
        let email = identity.email.clone().unwrap_or_default();
        writeln!(
            self.out,
            "[{}] {} <{}>",
            identity.initial(),
            identity.author_name(),
            email
        )?;

        match self.profiles.get(&identity.id).await {
            Ok(Some(profile)) => writeln!(self.out, "Profile name: {}", profile.name),
            Ok(None) => writeln!(self.out, "No profile snapshot yet."),
            Err(e) => self.notice(&Notice::from(&e)),
        }
    }

    fn edit_field(&mut self, title: Option<String>, body: Option<String>) -> io::Result<()> {
        let result = match &self.view {
            View::Create(create) => {
                if let Some(title) = title {
                    create.set_title(title);
                }
                if let Some(body) = body {
                    create.set_body(body);
                }
                Ok(())
            }
            View::Detail { workflow, .. } => match workflow.state().panel().map(|p| &p.mode) {
                Some(EditMode::Editing(draft)) => workflow.set_draft(PostDraft {
                    title: title.unwrap_or_else(|| draft.title.clone()),
                    body: body.unwrap_or_else(|| draft.body.clone()),
                }),
                Some(EditMode::Saving(_)) => Err(ContentError::Busy),
                _ => Err(ContentError::InvalidTransition("not editing")),
            },
            _ => Err(ContentError::InvalidTransition("nothing to edit here")),
        };
        match result {
            Ok(()) => self.render(),
            Err(e) => self.notice(&Notice::from(&e)),
        }
    }

    async fn submit(&mut self) -> io::Result<()> {
        match &self.view {
            View::Create(create) => match create.submit().await {
                Ok(_) => {
                    self.notice(&Notice::success("Blog created"))?;
                    self.go(&Route::Blogs.path()).await
                }
                Err(e) => {
                    let message = create.error().unwrap_or_else(|| e.user_message().to_string());
                    self.notice(&Notice::error(message))
                }
            },
            View::Detail { workflow, .. } => {
                let result = workflow.save().await;
                self.report(result)
            }
            _ => self.notice(&Notice::from(&ContentError::InvalidTransition("nothing to submit"))),
        }
    }

    fn detail_action(
        &mut self,
        action: impl FnOnce(&PostDetailWorkflow) -> Result<(), ContentError>,
    ) -> io::Result<()> {
        let result = match &self.view {
            View::Detail { workflow, .. } => action(workflow),
            _ => Err(ContentError::InvalidTransition("no post is open")),
        };
        self.report(result)
    }

    async fn publish(&mut self) -> io::Result<()> {
        let result = match &self.view {
            View::Detail { workflow, .. } => workflow.toggle_publish().await.map(|_| ()),
            _ => Err(ContentError::InvalidTransition("no post is open")),
        };
        self.report(result)
    }

    fn request_delete(&mut self) -> io::Result<()> {
        match &mut self.view {
            View::Detail {
                workflow,
                confirming_delete,
            } if workflow.is_author() => {
                *confirming_delete = true;
                writeln!(
                    self.out,
                    "Delete this blog permanently? Type 'yes' to confirm."
                )
            }
            View::Detail { .. } => self.notice(&Notice::from(&ContentError::Authorization)),
            _ => self.notice(&Notice::from(&ContentError::InvalidTransition(
                "no post is open",
            ))),
        }
    }

    async fn confirm_delete(&mut self) -> io::Result<()> {
        let View::Detail {
            workflow,
            confirming_delete,
        } = &mut self.view
        else {
            return writeln!(self.out, "Nothing to confirm.");
        };
        if !std::mem::take(confirming_delete) {
            return writeln!(self.out, "Nothing to confirm.");
        }

        let result = workflow.delete().await;
        if workflow.state().redirect().is_some() {
            if result.is_ok() {
                self.notice(&Notice::success("Blog deleted"))?;
            }
            return self.go(&Route::Blogs.path()).await;
        }
        self.report(result)
    }

    async fn retry(&mut self) -> io::Result<()> {
        let result = match &self.view {
            View::List(list) => list.retry().await,
            _ => Err(ContentError::InvalidTransition("nothing to retry")),
        };
        match result {
            Ok(()) | Err(ContentError::Transport(_)) => self.render(),
            Err(e) => self.notice(&Notice::from(&e)),
        }
    }

    /// Show the outcome of a detail action, then the refreshed view.
    fn report(&mut self, result: Result<(), ContentError>) -> io::Result<()> {
        if let Err(e) = result {
            let panel_error = match &self.view {
                View::Detail { workflow, .. } => {
                    workflow.state().panel().and_then(|p| p.error.clone())
                }
                _ => None,
            };
            self.notice(&panel_error.map_or_else(|| Notice::from(&e), Notice::error))?;
        }
        self.render()
    }

    fn notice(&mut self, notice: &Notice) -> io::Result<()> {
        let tag = match notice.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "ok",
            NoticeLevel::Error => "error",
        };
        writeln!(self.out, "[{tag}] {}", notice.text)
    }

    pub fn render(&mut self) -> io::Result<()> {
        let out = &mut self.out;
        match &self.view {
            View::Landing => {
                writeln!(out, "ColdHours - write when the hours are cold.")?;
                match self.navigator.session().identity() {
                    Some(identity) => writeln!(
                        out,
                        "Welcome back, {}. Type 'list' to read or 'new' to write.",
                        identity.author_name()
                    ),
                    None => writeln!(out, "Type 'list' to read, or 'login' to start writing."),
                }
            }
            View::List(list) => match list.state() {
                ListState::Loading => writeln!(out, "Loading blogs..."),
                ListState::Failed { message } => {
                    writeln!(out, "{message}")?;
                    writeln!(out, "Type 'retry' to try again.")
                }
                ListState::Loaded(posts) if posts.is_empty() => {
                    writeln!(out, "No blogs yet. Be the first to write one!")
                }
                ListState::Loaded(posts) => {
                    for post in &posts {
                        let summary = PostSummary::from(post);
                        writeln!(
                            out,
                            "[{}] {} - by {} {}",
                            summary.status.label(),
                            summary.title,
                            summary.author_name,
                            summary.date
                        )?;
                        writeln!(out, "    {}", summary.excerpt)?;
                        writeln!(out, "    open {}", summary.id)?;
                    }
                    Ok(())
                }
            },
            View::Detail { workflow, .. } => match workflow.state() {
                DetailState::Loading => writeln!(out, "Loading..."),
                DetailState::NotFound => {
                    writeln!(out, "Blog not found. Type 'list' to see all blogs.")
                }
                DetailState::Failed { message } => writeln!(out, "{message}"),
                DetailState::Deleted => writeln!(out, "This blog was deleted."),
                DetailState::Ready(panel) => {
                    let viewer = workflow.viewer();
                    let view = PostView::new(&panel.post, viewer.as_ref());
                    match &panel.mode {
                        EditMode::Viewing => {
                            writeln!(out, "{} [{}]", view.title, view.status.label())?;
                            writeln!(out, "by {} {}", view.author_name, view.date)?;
                            writeln!(out)?;
                            writeln!(out, "{}", view.body)?;
                            if view.can_manage {
                                writeln!(out)?;
                                writeln!(out, "Actions: edit | publish | delete")?;
                            }
                        }
                        EditMode::Editing(draft) => {
                            writeln!(out, "Editing (title/body to change, save or cancel)")?;
                            writeln!(out, "Title: {}", draft.title)?;
                            writeln!(out, "Body:  {}", draft.body)?;
                        }
                        EditMode::Saving(_) => writeln!(out, "Saving...")?,
                    }
                    if panel.pending {
                        writeln!(out, "Working...")?;
                    }
                    if let Some(notice) = &panel.notice {
                        writeln!(out, "[ok] {notice}")?;
                    }
                    Ok(())
                }
            },
            View::Create(create) => {
                let draft = create.draft();
                writeln!(out, "New blog by {}", create.author().author_name())?;
                writeln!(out, "Title: {}", draft.title)?;
                writeln!(out, "Body:  {}", draft.body)?;
                if create.is_submitting() {
                    writeln!(out, "Publishing...")?;
                }
                writeln!(out, "Use 'title <text>', 'body <text>', then 'submit'.")
            }
            View::Account { workflow, sign_up } => {
                if *sign_up {
                    writeln!(out, "Create an account:")?;
                    writeln!(out, "  signup <email> <password> <confirm> <name...>")?;
                    writeln!(out, "Already registered? Type 'login'.")?;
                } else {
                    writeln!(out, "Log in:")?;
                    writeln!(out, "  login <email> <password>")?;
                    writeln!(out, "New here? Type 'signup'.")?;
                }
                if workflow.redirect_to() != Route::Landing.path() {
                    writeln!(out, "You will return to {} afterwards.", workflow.redirect_to())?;
                }
                Ok(())
            }
            View::NotFound(path) => writeln!(out, "Nothing at {path}. Type 'home' or 'list'."),
        }
    }
}
