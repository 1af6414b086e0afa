//! Supabase Auth endpoints used by the admin OAuth flow.
//!
//! # OAuth Flow (PKCE)
//!
//! 1. Build the provider URL with [`SupabaseClient::authorize_url`]
//! 2. The admin signs in with the provider in a browser
//! 3. Supabase redirects to the loopback callback with `?code=...`
//! 4. Exchange the code and verifier with [`SupabaseClient::exchange_code`]
//! 5. Revoke the session with [`SupabaseClient::sign_out`] when done

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use super::{SupabaseClient, check};
use crate::auth::Session;
use crate::gateway::GatewayError;

#[derive(Debug, Serialize)]
struct PkceExchange<'a> {
    auth_code: &'a str,
    code_verifier: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: Option<u64>,
    user: Option<TokenUser>,
}

#[derive(Deserialize)]
struct TokenUser {
    email: Option<String>,
}

impl SupabaseClient {
    /// Provider sign-in URL for the PKCE flow.
    ///
    /// # Arguments
    ///
    /// * `provider` - OAuth provider name configured in Supabase (e.g. `google`)
    /// * `redirect_to` - Where Supabase sends the browser afterwards
    /// * `code_challenge` - S256 challenge derived from the verifier
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::Url` if the project URL is unusable.
    pub fn authorize_url(
        &self,
        provider: &str,
        redirect_to: &str,
        code_challenge: &str,
    ) -> Result<Url, GatewayError> {
        self.endpoint_with_query(
            "auth/v1/authorize",
            &[
                ("provider", provider),
                ("redirect_to", redirect_to),
                ("code_challenge", code_challenge),
                ("code_challenge_method", "s256"),
            ],
        )
    }

    /// Exchange an authorization code for a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Supabase rejects the code.
    #[instrument(skip_all)]
    pub async fn exchange_code(
        &self,
        auth_code: &str,
        code_verifier: &str,
    ) -> Result<Session, GatewayError> {
        let url = self.endpoint_with_query("auth/v1/token", &[("grant_type", "pkce")])?;

        let response = self
            .inner
            .client
            .post(url)
            .header("apikey", self.inner.anon_key.expose_secret())
            .json(&PkceExchange {
                auth_code,
                code_verifier,
            })
            .send()
            .await?;

        let token: TokenResponse = check(response).await?.json().await?;
        let email = token.user.and_then(|u| u.email);

        debug!(email = ?email, "Exchanged OAuth code for session");

        Ok(Session {
            access_token: SecretString::from(token.access_token),
            refresh_token: token.refresh_token.map(SecretString::from),
            expires_in: token.expires_in,
            email,
        })
    }

    /// Revoke a session.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Supabase rejects the token.
    #[instrument(skip_all)]
    pub async fn sign_out(&self, session: &Session) -> Result<(), GatewayError> {
        let response = self
            .inner
            .client
            .post(self.endpoint("auth/v1/logout"))
            .header("apikey", self.inner.anon_key.expose_secret())
            .bearer_auth(session.access_token.expose_secret())
            .send()
            .await?;

        check(response).await?;
        debug!("Signed out");
        Ok(())
    }
}
