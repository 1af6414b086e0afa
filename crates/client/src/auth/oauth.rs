//! OAuth sign-in with PKCE through the hosted auth service.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;
use sha2::{Digest, Sha256};
use url::Url;

use super::{AuthError, CallbackListener, Session};
use crate::gateway::SupabaseClient;

const VERIFIER_LENGTH: usize = 64;

/// PKCE verifier and its S256 challenge.
#[derive(Debug, Clone)]
pub struct Pkce {
    verifier: String,
    challenge: String,
}

impl Pkce {
    /// Generate a fresh random verifier.
    #[must_use]
    pub fn generate() -> Self {
        const CHARSET: &[u8] =
            b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";
        let mut rng = rand::rng();
        let verifier: String = (0..VERIFIER_LENGTH)
            .filter_map(|_| CHARSET.get(rng.random_range(0..CHARSET.len())))
            .map(|&b| char::from(b))
            .collect();
        Self::from_verifier(verifier)
    }

    /// Derive the challenge for a known verifier.
    #[must_use]
    pub fn from_verifier(verifier: impl Into<String>) -> Self {
        let verifier = verifier.into();
        let challenge = URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()));
        Self {
            verifier,
            challenge,
        }
    }

    #[must_use]
    pub fn verifier(&self) -> &str {
        &self.verifier
    }

    #[must_use]
    pub fn challenge(&self) -> &str {
        &self.challenge
    }
}

/// Run the full browser sign-in.
///
/// Binds the loopback listener first, hands the provider URL to `announce`
/// (the caller shows it to the admin), waits for the callback, then
/// exchanges the code for a session.
///
/// # Errors
///
/// Returns an error if the listener cannot bind, the provider reports an
/// error, the admin cancels, or the code exchange fails.
pub async fn sign_in<F>(
    client: &SupabaseClient,
    provider: &str,
    listener: CallbackListener,
    announce: F,
) -> Result<Session, AuthError>
where
    F: FnOnce(&Url),
{
    let pkce = Pkce::generate();
    let redirect_to = listener.redirect_uri();
    let url = client.authorize_url(provider, &redirect_to, pkce.challenge())?;

    announce(&url);

    let code = listener.wait_for_code().await?;
    let session = client.exchange_code(&code, pkce.verifier()).await?;

    tracing::info!(email = ?session.email, "Signed in");
    Ok(session)
}
