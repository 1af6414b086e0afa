//! Loopback listener for the OAuth redirect.
//!
//! The hosted auth service redirects the admin's browser to
//! `http://127.0.0.1:<port>/auth/callback?code=...`. A one-shot axum server
//! accepts that single request, hands the code back, and shuts down.

use std::net::SocketAddr;

use axum::Router;
use axum::extract::{Query, State};
use axum::response::Html;
use axum::routing::get;
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tower_http::trace::TraceLayer;

use super::AuthError;

/// Path the provider redirects to.
pub const CALLBACK_PATH: &str = "/auth/callback";

type CodeSender = mpsc::Sender<Result<String, AuthError>>;

/// Query parameters on the OAuth redirect.
#[derive(Debug, Deserialize)]
struct CallbackQuery {
    code: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// A bound, not yet serving, callback listener.
#[derive(Debug)]
pub struct CallbackListener {
    listener: TcpListener,
    addr: SocketAddr,
}

impl CallbackListener {
    /// Bind the loopback address. Port `0` picks a free port.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Listener` if the address is unavailable.
    pub async fn bind(addr: SocketAddr) -> Result<Self, AuthError> {
        let listener = TcpListener::bind(addr).await?;
        let addr = listener.local_addr()?;
        tracing::debug!(%addr, "OAuth callback listener bound");
        Ok(Self { listener, addr })
    }

    #[must_use]
    pub const fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Redirect target to register with the provider.
    #[must_use]
    pub fn redirect_uri(&self) -> String {
        format!("http://{}{CALLBACK_PATH}", self.addr)
    }

    /// Serve until the first callback arrives and return its code.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Provider` or `AuthError::MissingCode` for a bad
    /// callback and `AuthError::Cancelled` on Ctrl+C.
    pub async fn wait_for_code(self) -> Result<String, AuthError> {
        let (code_tx, mut code_rx) = mpsc::channel(1);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let app = Router::new()
            .route(CALLBACK_PATH, get(handle_callback))
            .with_state(code_tx)
            .layer(TraceLayer::new_for_http());

        let server = axum::serve(self.listener, app).with_graceful_shutdown(async {
            let _ = shutdown_rx.await;
        });
        let server = tokio::spawn(async move { server.await });

        let outcome = tokio::select! {
            received = code_rx.recv() => received.unwrap_or(Err(AuthError::Cancelled)),
            _ = tokio::signal::ctrl_c() => Err(AuthError::Cancelled),
        };

        let _ = shutdown_tx.send(());
        if let Err(e) = server.await {
            tracing::warn!(error = %e, "OAuth callback server task failed");
        }

        outcome
    }
}

async fn handle_callback(
    State(tx): State<CodeSender>,
    Query(query): Query<CallbackQuery>,
) -> Html<&'static str> {
    let result = match (query.code, query.error) {
        (_, Some(error)) => {
            let description = query.error_description.unwrap_or_default();
            tracing::warn!("OAuth provider error: {} - {}", error, description);
            Err(AuthError::Provider(if description.is_empty() {
                error
            } else {
                description
            }))
        }
        (Some(code), None) if !code.is_empty() => Ok(code),
        _ => Err(AuthError::MissingCode),
    };

    let page = if result.is_ok() {
        "<h1>Signed in</h1><p>You can close this tab and return to the terminal.</p>"
    } else {
        "<h1>Sign-in failed</h1><p>Return to the terminal for details.</p>"
    };

    // Only the first callback counts.
    let _ = tx.try_send(result);
    Html(page)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn listener() -> CallbackListener {
        CallbackListener::bind("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_redirect_uri_uses_bound_port() {
        let listener = listener().await;
        let port = listener.local_addr().port();
        assert_ne!(port, 0);
        assert_eq!(
            listener.redirect_uri(),
            format!("http://127.0.0.1:{port}/auth/callback")
        );
    }

    #[tokio::test]
    async fn test_code_is_returned() {
        let listener = listener().await;
        let uri = listener.redirect_uri();
        let waiter = tokio::spawn(listener.wait_for_code());

        let body = reqwest::get(format!("{uri}?code=abc123"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(body.contains("Signed in"));

        assert_eq!(waiter.await.unwrap().unwrap(), "abc123");
    }

    #[tokio::test]
    async fn test_provider_error_is_reported() {
        let listener = listener().await;
        let uri = listener.redirect_uri();
        let waiter = tokio::spawn(listener.wait_for_code());

        reqwest::get(format!(
            "{uri}?error=access_denied&error_description=User%20denied"
        ))
        .await
        .unwrap();

        let err = waiter.await.unwrap().unwrap_err();
        assert!(matches!(err, AuthError::Provider(ref d) if d == "User denied"));
    }

    #[tokio::test]
    async fn test_missing_code() {
        let listener = listener().await;
        let uri = listener.redirect_uri();
        let waiter = tokio::spawn(listener.wait_for_code());

        reqwest::get(uri).await.unwrap();

        assert!(matches!(
            waiter.await.unwrap().unwrap_err(),
            AuthError::MissingCode
        ));
    }
}
