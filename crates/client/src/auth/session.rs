//! Signed-in session returned by the identity provider.

use secrecy::SecretString;

/// A session issued by the hosted auth service.
///
/// Lives only as long as one admin invocation; it is never written to disk.
#[derive(Clone)]
pub struct Session {
    pub access_token: SecretString,
    pub refresh_token: Option<SecretString>,
    /// Seconds until the access token expires, as reported at sign-in.
    pub expires_in: Option<u64>,
    /// Email of the signed-in account, if the provider shared one.
    pub email: Option<String>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("expires_in", &self.expires_in)
            .field("email", &self.email)
            .finish()
    }
}
