//! Supabase client.
//!
//! Talks to the three hosted services behind one project URL:
//!
//! - `PostgREST` (`/rest/v1`) for the `news` and `members` tables
//! - Storage (`/storage/v1`) for the public image bucket
//! - Auth (`/auth/v1`) for the OAuth sign-in used by the admin gate
//!
//! Every request carries the project's anon key. Once an admin has signed in,
//! [`SupabaseClient::with_access_token`] returns a copy that authorizes writes
//! with the admin's session token instead.
//!
//! # Example
//!
//! ```rust,ignore
//! use labsite_client::gateway::{Order, RemoteGateway, SupabaseClient};
//!
//! let client = SupabaseClient::new(&config.supabase);
//! let posts: Vec<Post> = client.select("news", Order::descending("date")).await?;
//! ```

mod auth;

use std::sync::Arc;

use reqwest::Response;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use super::{GatewayError, Order, RemoteGateway};
use crate::config::SupabaseConfig;
use crate::image::ImageFile;

/// Client for a Supabase project.
#[derive(Clone)]
pub struct SupabaseClient {
    inner: Arc<SupabaseClientInner>,
    access_token: Option<SecretString>,
}

struct SupabaseClientInner {
    client: reqwest::Client,
    base_url: String,
    anon_key: SecretString,
    bucket: String,
}

impl std::fmt::Debug for SupabaseClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseClient")
            .field("base_url", &self.inner.base_url)
            .field("bucket", &self.inner.bucket)
            .field("anon_key", &"[REDACTED]")
            .field("signed_in", &self.access_token.is_some())
            .finish()
    }
}

/// Row shape returned by an insert with `return=representation`.
#[derive(Debug, Deserialize)]
struct InsertedRow {
    id: i64,
}

/// Error body shapes used across the Supabase services.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    msg: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.message
            .or(self.msg)
            .or(self.error_description)
            .or(self.error)
    }
}

impl SupabaseClient {
    /// Create a new client for the configured project.
    #[must_use]
    pub fn new(config: &SupabaseConfig) -> Self {
        Self {
            inner: Arc::new(SupabaseClientInner {
                client: reqwest::Client::new(),
                base_url: config.url.as_str().trim_end_matches('/').to_owned(),
                anon_key: config.anon_key.clone(),
                bucket: config.image_bucket.clone(),
            }),
            access_token: None,
        }
    }

    /// A copy of this client that authorizes requests with a user session.
    #[must_use]
    pub fn with_access_token(&self, access_token: SecretString) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            access_token: Some(access_token),
        }
    }

    /// Whether requests carry a user session rather than the anon key.
    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        self.access_token.is_some()
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.inner.base_url)
    }

    fn endpoint_with_query(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Url, GatewayError> {
        let mut url = Url::parse(&self.endpoint(path))?;
        url.query_pairs_mut().extend_pairs(query);
        Ok(url)
    }

    /// Attach the anon key and the bearer token.
    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let bearer = self
            .access_token
            .as_ref()
            .unwrap_or(&self.inner.anon_key)
            .expose_secret();
        builder
            .header("apikey", self.inner.anon_key.expose_secret())
            .bearer_auth(bearer)
    }
}

/// Turn a non-2xx response into [`GatewayError::Remote`].
async fn check(response: Response) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&text)
        .ok()
        .and_then(ErrorBody::into_message)
        .or_else(|| (!text.trim().is_empty()).then(|| text.trim().to_owned()))
        .unwrap_or_else(|| status.to_string());

    debug!(status = status.as_u16(), %message, "Supabase request rejected");
    Err(GatewayError::Remote {
        status: status.as_u16(),
        message,
    })
}

impl RemoteGateway for SupabaseClient {
    #[instrument(skip(self))]
    async fn select<T>(&self, table: &str, order: Order) -> Result<Vec<T>, GatewayError>
    where
        T: DeserializeOwned + Send,
    {
        let order = order.to_string();
        let url = self.endpoint_with_query(
            &format!("rest/v1/{table}"),
            &[("select", "*"), ("order", order.as_str())],
        )?;

        let response = self.authorized(self.inner.client.get(url)).send().await?;
        let rows: Vec<T> = check(response).await?.json().await?;

        debug!(rows = rows.len(), "Fetched table");
        Ok(rows)
    }

    #[instrument(skip(self, record))]
    async fn insert<R>(&self, table: &str, record: &R) -> Result<i64, GatewayError>
    where
        R: Serialize + Sync,
    {
        let response = self
            .authorized(self.inner.client.post(self.endpoint(&format!("rest/v1/{table}"))))
            .header("Prefer", "return=representation")
            .json(&[record])
            .send()
            .await?;

        let rows: Vec<InsertedRow> = check(response).await?.json().await?;
        let id = rows
            .first()
            .map(|row| row.id)
            .ok_or_else(|| GatewayError::Unexpected("insert returned no rows".to_owned()))?;

        debug!(id, "Inserted row");
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn delete(&self, table: &str, id: i64) -> Result<(), GatewayError> {
        let filter = format!("eq.{id}");
        let url = self.endpoint_with_query(&format!("rest/v1/{table}"), &[("id", filter.as_str())])?;

        let response = self.authorized(self.inner.client.delete(url)).send().await?;
        check(response).await?;
        Ok(())
    }

    #[instrument(skip(self, image), fields(bytes = image.bytes().len()))]
    async fn upload(&self, key: &str, image: &ImageFile) -> Result<(), GatewayError> {
        let url = self.endpoint(&format!(
            "storage/v1/object/{}/{key}",
            self.inner.bucket
        ));

        let response = self
            .authorized(self.inner.client.post(url))
            .header("Content-Type", image.content_type())
            .header("x-upsert", "false")
            .body(image.bytes().to_vec())
            .send()
            .await?;

        check(response).await?;
        debug!("Uploaded object");
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        self.endpoint(&format!(
            "storage/v1/object/public/{}/{key}",
            self.inner.bucket
        ))
    }
}
