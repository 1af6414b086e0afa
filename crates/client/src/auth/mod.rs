//! Admin authentication gate.
//!
//! Two strategies are supported, chosen by configuration:
//!
//! - **OAuth + allow-list** (default): identity comes from the hosted auth
//!   service; admin capability is granted only if the session email is on
//!   the configured allow-list (exact, case-sensitive match). Remote writes
//!   are then authorized with the admin's own session token, so the backend's
//!   row-level policies remain the real boundary.
//! - **Shared secret**: one static password compared in cleartext on the
//!   client. This is NOT a security boundary. Anyone holding the binary's
//!   configuration knows the password, and the backend still sees only the
//!   anon key. Use it for local demos only.

mod callback;
mod error;
mod oauth;
mod session;

pub use callback::{CALLBACK_PATH, CallbackListener};
pub use error::AuthError;
pub use oauth::{Pkce, sign_in};
pub use session::Session;

use labsite_core::Email;
use secrecy::{ExposeSecret, SecretString};

/// Identities allowed to administer the site.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList(Vec<Email>);

impl AllowList {
    #[must_use]
    pub const fn new(emails: Vec<Email>) -> Self {
        Self(emails)
    }

    /// Exact, case-sensitive membership test.
    #[must_use]
    pub fn contains(&self, email: &str) -> bool {
        self.0.iter().any(|allowed| allowed.matches(email))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// How admins prove who they are.
#[derive(Debug, Clone)]
pub enum AuthStrategy {
    /// OAuth through the hosted auth service, then an allow-list check.
    OAuth {
        provider: String,
        allow_list: AllowList,
    },
    /// A static shared password. Not a security boundary.
    SharedSecret { password: SecretString },
}

/// Result of passing the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminAccess {
    /// No identity presented yet.
    SignedOut,
    /// Authenticated, but not an administrator (or wrong password).
    Denied { email: Option<String> },
    /// Admin capability granted.
    Granted { email: Option<String> },
}

impl AdminAccess {
    #[must_use]
    pub const fn is_granted(&self) -> bool {
        matches!(self, Self::Granted { .. })
    }
}

/// Decides whether a presented identity gets admin capability.
#[derive(Debug, Clone)]
pub struct AuthGate {
    strategy: AuthStrategy,
}

impl AuthGate {
    #[must_use]
    pub const fn new(strategy: AuthStrategy) -> Self {
        Self { strategy }
    }

    #[must_use]
    pub const fn strategy(&self) -> &AuthStrategy {
        &self.strategy
    }

    /// Check an OAuth session against the allow-list.
    ///
    /// Always `SignedOut` under the shared-secret strategy, which has no
    /// sessions.
    #[must_use]
    pub fn check_session(&self, session: Option<&Session>) -> AdminAccess {
        let AuthStrategy::OAuth { allow_list, .. } = &self.strategy else {
            return AdminAccess::SignedOut;
        };
        let Some(session) = session else {
            return AdminAccess::SignedOut;
        };

        match session.email.as_deref() {
            Some(email) if allow_list.contains(email) => AdminAccess::Granted {
                email: Some(email.to_owned()),
            },
            email => {
                tracing::warn!(email = ?email, "Signed-in account is not on the admin allow-list");
                AdminAccess::Denied {
                    email: email.map(str::to_owned),
                }
            }
        }
    }

    /// Compare a typed password with the shared secret.
    ///
    /// Plain string equality on the client. Always `SignedOut` under the
    /// OAuth strategy.
    #[must_use]
    pub fn check_password(&self, input: &str) -> AdminAccess {
        let AuthStrategy::SharedSecret { password } = &self.strategy else {
            return AdminAccess::SignedOut;
        };

        if input == password.expose_secret() {
            AdminAccess::Granted { email: None }
        } else {
            AdminAccess::Denied { email: None }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn oauth_gate() -> AuthGate {
        AuthGate::new(AuthStrategy::OAuth {
            provider: "google".to_string(),
            allow_list: AllowList::new(vec![
                Email::parse("ojs0ojs@gmail.com").unwrap(),
                Email::parse("semistone97@sogang.ac.kr").unwrap(),
            ]),
        })
    }

    fn session(email: Option<&str>) -> Session {
        Session {
            access_token: SecretString::from("token"),
            refresh_token: None,
            expires_in: None,
            email: email.map(str::to_string),
        }
    }

    #[test]
    fn test_allow_listed_email_is_granted() {
        let access = oauth_gate().check_session(Some(&session(Some("ojs0ojs@gmail.com"))));
        assert_eq!(
            access,
            AdminAccess::Granted {
                email: Some("ojs0ojs@gmail.com".to_string())
            }
        );
        assert!(access.is_granted());
    }

    #[test]
    fn test_unlisted_email_is_denied() {
        let access = oauth_gate().check_session(Some(&session(Some("stranger@gmail.com"))));
        assert_eq!(
            access,
            AdminAccess::Denied {
                email: Some("stranger@gmail.com".to_string())
            }
        );
    }

    #[test]
    fn test_allow_list_is_case_sensitive() {
        let access = oauth_gate().check_session(Some(&session(Some("OJS0OJS@gmail.com"))));
        assert!(!access.is_granted());
    }

    #[test]
    fn test_session_without_email_is_denied() {
        let access = oauth_gate().check_session(Some(&session(None)));
        assert_eq!(access, AdminAccess::Denied { email: None });
    }

    #[test]
    fn test_no_session_is_signed_out() {
        assert_eq!(oauth_gate().check_session(None), AdminAccess::SignedOut);
        assert_eq!(oauth_gate().check_password("anything"), AdminAccess::SignedOut);
    }

    #[test]
    fn test_shared_secret_exact_comparison() {
        let gate = AuthGate::new(AuthStrategy::SharedSecret {
            password: SecretString::from("bvi-lab-2024"),
        });
        assert!(gate.check_password("bvi-lab-2024").is_granted());
        assert_eq!(
            gate.check_password("BVI-LAB-2024"),
            AdminAccess::Denied { email: None }
        );
        assert_eq!(
            gate.check_password("bvi-lab-2024 "),
            AdminAccess::Denied { email: None }
        );
        assert_eq!(
            gate.check_session(Some(&session(Some("ojs0ojs@gmail.com")))),
            AdminAccess::SignedOut
        );
    }
}
