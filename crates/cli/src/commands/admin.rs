//! Admin commands.
//!
//! Every admin command passes the gate first, loads the lists (the admin
//! view shows them), runs one action and signs out again.
//!
//! # Usage
//!
//! ```bash
//! # Publish a post with an image
//! labsite admin news add --title "Best Paper Award" --category award --image poster.png
//!
//! # Add a member
//! labsite admin members add --name "Kim" --tags "AI, Web3"
//!
//! # Delete without the confirmation prompt
//! labsite admin --yes members delete 12
//! ```

use std::io::Write;
use std::path::PathBuf;

use chrono::NaiveDate;
use labsite_client::auth::{self, AdminAccess, AuthGate, AuthStrategy, CallbackListener, Session};
use labsite_client::delete::{Confirm, DeleteOutcome, delete_record};
use labsite_client::error::{clear_sentry_admin, record_admin_action, set_sentry_admin};
use labsite_client::gateway::Table;
use labsite_client::{AppError, ImageFile, ListStore, SiteConfig, Submission, SupabaseClient};
use labsite_core::{Category, MemberForm, PostForm};

use super::prompt::{self, StdinConfirm};

/// Fields for a new post. Unset fields keep the form defaults.
#[derive(Debug, Default)]
pub struct NewPostInput {
    pub title: String,
    pub category: Option<Category>,
    pub date: Option<NaiveDate>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub image: Option<PathBuf>,
}

/// Fields for a new member. Unset fields keep the form defaults.
#[derive(Debug, Default)]
pub struct NewMemberInput {
    pub name: String,
    pub role: Option<String>,
    pub status: Option<String>,
    pub tags: Option<String>,
    pub image: Option<PathBuf>,
}

/// One admin action.
#[derive(Debug)]
pub enum Action {
    AddPost(NewPostInput),
    AddMember(NewMemberInput),
    Delete { table: Table, id: i64 },
    Whoami,
}

/// An admin who passed the gate.
struct Admin {
    client: SupabaseClient,
    session: Option<Session>,
    email: Option<String>,
}

impl Admin {
    /// Revoke the session, if there is one.
    async fn sign_out(self) {
        if let Some(session) = &self.session {
            revoke(&self.client, session).await;
        }
        clear_sentry_admin();
    }
}

async fn revoke(client: &SupabaseClient, session: &Session) {
    if let Err(e) = client.sign_out(session).await {
        tracing::warn!(error = %e, "Failed to sign out");
    }
}

/// Pass the gate, run `action`, sign out.
pub async fn run(config: &SiteConfig, action: Action, yes: bool) -> labsite_client::Result<()> {
    let admin = sign_in(config).await?;
    let result = dispatch(config, &admin, action, yes).await;
    admin.sign_out().await;
    result
}

async fn sign_in(config: &SiteConfig) -> labsite_client::Result<Admin> {
    let client = SupabaseClient::new(&config.supabase);
    let gate = AuthGate::new(config.auth.strategy()?);

    match gate.strategy() {
        AuthStrategy::OAuth { provider, .. } => {
            let listener = CallbackListener::bind(config.callback_addr).await?;
            let session =
                auth::sign_in(&client, provider, listener, prompt::announce_sign_in).await?;

            match gate.check_session(Some(&session)) {
                AdminAccess::Granted { email } => {
                    set_sentry_admin(email.as_deref());
                    Ok(Admin {
                        client: client.with_access_token(session.access_token.clone()),
                        session: Some(session),
                        email,
                    })
                }
                AdminAccess::Denied { email } => {
                    revoke(&client, &session).await;
                    Err(AppError::AccessDenied(
                        email.unwrap_or_else(|| "this account".to_string()),
                    ))
                }
                AdminAccess::SignedOut => {
                    revoke(&client, &session).await;
                    Err(AppError::AccessDenied("this account".to_string()))
                }
            }
        }
        AuthStrategy::SharedSecret { .. } => {
            let input = prompt::read_password()?;
            if gate.check_password(&input).is_granted() {
                set_sentry_admin(None);
                Ok(Admin {
                    client,
                    session: None,
                    email: None,
                })
            } else {
                Err(AppError::WrongPassword)
            }
        }
    }
}

async fn dispatch(
    config: &SiteConfig,
    admin: &Admin,
    action: Action,
    yes: bool,
) -> labsite_client::Result<()> {
    if let Action::Whoami = action {
        let mut out = std::io::stdout().lock();
        match &admin.email {
            Some(email) => writeln!(out, "Signed in as {email} (administrator)")?,
            None => writeln!(out, "Signed in with the shared admin password")?,
        }
        return Ok(());
    }

    let mut store = ListStore::new(config.tables.clone());
    store.load(&admin.client).await;

    match action {
        Action::AddPost(input) => add_post(config, admin, &mut store, input).await,
        Action::AddMember(input) => add_member(admin, &mut store, input).await,
        Action::Delete { table, id } => {
            let mut confirm: Box<dyn Confirm> = if yes {
                Box::new(|_: &str| true)
            } else {
                Box::new(StdinConfirm)
            };
            delete(admin, &mut store, confirm.as_mut(), table, id).await
        }
        Action::Whoami => Ok(()),
    }
}

async fn load_image(path: Option<&PathBuf>) -> labsite_client::Result<Option<ImageFile>> {
    match path {
        Some(path) => Ok(Some(ImageFile::from_path(path).await?)),
        None => Ok(None),
    }
}

async fn add_post(
    config: &SiteConfig,
    admin: &Admin,
    store: &mut ListStore,
    input: NewPostInput,
) -> labsite_client::Result<()> {
    let today = chrono::Local::now().date_naive();
    let mut submission = Submission::new(PostForm::new(today, config.default_author.clone()));

    let form = submission.form_mut();
    form.title = input.title;
    if let Some(category) = input.category {
        form.category = category;
    }
    if let Some(date) = input.date {
        form.date = date;
    }
    if let Some(author) = input.author {
        form.author = author;
    }
    if let Some(description) = input.description {
        form.description = description;
    }
    submission.select_image(load_image(input.image.as_ref()).await?);

    let id = submission.submit(&admin.client, store).await?;
    record_admin_action("created", store.tables().name(Table::Posts), id.as_i64());

    let mut out = std::io::stdout().lock();
    writeln!(out, "News post created (#{id}).")?;
    writeln!(out, "{} posts listed.", store.posts().len())?;
    Ok(())
}

async fn add_member(
    admin: &Admin,
    store: &mut ListStore,
    input: NewMemberInput,
) -> labsite_client::Result<()> {
    let mut submission = Submission::new(MemberForm::default());

    let form = submission.form_mut();
    form.name = input.name;
    if let Some(role) = input.role {
        form.role = role;
    }
    if let Some(status) = input.status {
        form.status = status;
    }
    if let Some(tags) = input.tags {
        form.tags = tags;
    }
    submission.select_image(load_image(input.image.as_ref()).await?);

    let id = submission.submit(&admin.client, store).await?;
    record_admin_action("created", store.tables().name(Table::Members), id.as_i64());

    let mut out = std::io::stdout().lock();
    writeln!(out, "Member added (#{id}).")?;
    writeln!(out, "{} members listed.", store.members().len())?;
    Ok(())
}

async fn delete(
    admin: &Admin,
    store: &mut ListStore,
    confirm: &mut dyn Confirm,
    table: Table,
    id: i64,
) -> labsite_client::Result<()> {
    let outcome = delete_record(&admin.client, store, confirm, table, id).await?;

    let mut out = std::io::stdout().lock();
    match outcome {
        DeleteOutcome::Declined => writeln!(out, "Cancelled.")?,
        DeleteOutcome::Deleted => {
            record_admin_action("deleted", store.tables().name(table), id);
            writeln!(out, "Deleted #{id}.")?;
        }
    }
    Ok(())
}
