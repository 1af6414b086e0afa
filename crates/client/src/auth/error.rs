//! Authentication error types.

use thiserror::Error;

use crate::gateway::GatewayError;

/// Errors that can occur while signing an admin in.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The identity provider reported an error on the callback.
    #[error("provider rejected sign-in: {0}")]
    Provider(String),

    /// The callback arrived without an authorization code.
    #[error("callback is missing the authorization code")]
    MissingCode,

    /// Sign-in was interrupted before the callback arrived.
    #[error("sign-in cancelled")]
    Cancelled,

    /// The loopback listener could not be started.
    #[error("callback listener error: {0}")]
    Listener(#[from] std::io::Error),

    /// Exchanging the code for a session failed.
    #[error("token exchange failed: {0}")]
    Exchange(#[from] GatewayError),
}
