//! Unified error handling with Sentry integration.
//!
//! Every failure an invocation can hit funnels into [`AppError`], which knows
//! the short notice to show the admin and whether the failure is worth a
//! Sentry event.

use thiserror::Error;

use crate::auth::AuthError;
use crate::config::ConfigError;
use crate::delete::DeleteError;
use crate::gateway::GatewayError;
use crate::submission::SubmitError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Backend error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Submission failed: {0}")]
    Submit(#[from] SubmitError),

    #[error("Delete failed: {0}")]
    Delete(#[from] DeleteError),

    #[error("Sign-in failed: {0}")]
    Auth(#[from] AuthError),

    /// Signed in, but not an administrator.
    #[error("Access denied for {0}")]
    AccessDenied(String),

    /// Shared-secret mode and the password did not match.
    #[error("Wrong password")]
    WrongPassword,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Short message for the person at the keyboard.
    #[must_use]
    pub fn notice(&self) -> String {
        match self {
            Self::Config(e) => e.to_string(),
            Self::Gateway(e) => format!("Backend error: {e}"),
            Self::Submit(e) => e.notice(),
            Self::Delete(e) => e.to_string(),
            Self::Auth(AuthError::Cancelled) => "Sign-in cancelled".to_string(),
            Self::Auth(e) => format!("Sign-in failed: {e}"),
            Self::AccessDenied(email) => {
                format!("Access denied: {email} is not an administrator")
            }
            Self::WrongPassword => "Wrong password".to_string(),
            Self::Io(e) => format!("I/O error: {e}"),
        }
    }

    /// Whether the failure points at the backend or the program rather than
    /// at the person using it.
    #[must_use]
    pub const fn is_reportable(&self) -> bool {
        matches!(
            self,
            Self::Gateway(_)
                | Self::Delete(_)
                | Self::Io(_)
                | Self::Submit(SubmitError::Upload(_) | SubmitError::Insert(_))
                | Self::Auth(AuthError::Exchange(_) | AuthError::Listener(_))
        )
    }

    /// Send reportable errors to Sentry and log them.
    pub fn report(&self) {
        if self.is_reportable() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Command failed"
            );
        } else {
            tracing::debug!(error = %self, "Command rejected");
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Attach the signed-in admin to later Sentry events.
///
/// Password-mode admins have no email and are reported as `shared-password`.
pub fn set_sentry_admin(email: Option<&str>) {
    let user = admin_user(email);
    sentry::configure_scope(|scope| scope.set_user(Some(user)));
}

/// Detach the admin once the session is revoked.
pub fn clear_sentry_admin() {
    sentry::configure_scope(|scope| scope.set_user(None));
}

/// Leave a trail entry for a completed create or delete.
pub fn record_admin_action(action: &str, table: &str, id: i64) {
    sentry::add_breadcrumb(admin_breadcrumb(action, table, id));
}

fn admin_user(email: Option<&str>) -> sentry::User {
    match email {
        Some(email) => sentry::User {
            email: Some(email.to_owned()),
            ..Default::default()
        },
        None => sentry::User {
            username: Some("shared-password".to_owned()),
            ..Default::default()
        },
    }
}

fn admin_breadcrumb(action: &str, table: &str, id: i64) -> sentry::Breadcrumb {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some("admin".to_owned()),
        message: Some(format!("{action} {table} #{id}")),
        level: sentry::Level::Info,
        ..Default::default()
    };
    breadcrumb
        .data
        .insert("table".to_owned(), serde_json::Value::from(table));
    breadcrumb
        .data
        .insert("id".to_owned(), serde_json::Value::from(id));
    breadcrumb
}
