//! Remote data gateway.
//!
//! The lab site keeps no state of its own: rows live in a hosted table
//! store and images in a hosted object store. [`RemoteGateway`] is the seam
//! between the workflows in this crate and that backend.
//!
//! # Implementations
//!
//! - [`SupabaseClient`] - `PostgREST` tables, Storage buckets and auth over HTTP
//! - an in-memory fake used by unit tests

mod supabase;

#[cfg(test)]
pub(crate) mod fake;

pub use supabase::SupabaseClient;

use std::fmt;
use std::future::Future;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::image::ImageFile;

/// Errors returned by the remote backend or the transport to it.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP request failed before a response was received, or the body
    /// could not be decoded.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend rejected the request. `message` is the backend's own text.
    #[error("{message}")]
    Remote {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the error body.
        message: String,
    },

    /// An endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The backend answered with something we did not expect.
    #[error("Unexpected response: {0}")]
    Unexpected(String),
}

/// Sort order for a table read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Order {
    pub column: &'static str,
    pub ascending: bool,
}

impl Order {
    #[must_use]
    pub const fn ascending(column: &'static str) -> Self {
        Self {
            column,
            ascending: true,
        }
    }

    #[must_use]
    pub const fn descending(column: &'static str) -> Self {
        Self {
            column,
            ascending: false,
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = if self.ascending { "asc" } else { "desc" };
        write!(f, "{}.{direction}", self.column)
    }
}

/// The two collections the site manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Posts,
    Members,
}

/// Remote table names, configurable per deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tables {
    pub posts: String,
    pub members: String,
}

impl Tables {
    /// Remote name of `table`.
    #[must_use]
    pub fn name(&self, table: Table) -> &str {
        match table {
            Table::Posts => &self.posts,
            Table::Members => &self.members,
        }
    }
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            posts: "news".to_owned(),
            members: "members".to_owned(),
        }
    }
}

/// Table and object-store operations offered by the hosted backend.
///
/// Every call is a single request; nothing is retried.
pub trait RemoteGateway: Send + Sync {
    /// Read a whole table, sorted by one column.
    fn select<T>(
        &self,
        table: &str,
        order: Order,
    ) -> impl Future<Output = Result<Vec<T>, GatewayError>> + Send
    where
        T: DeserializeOwned + Send;

    /// Insert one record and return the id the backend assigned.
    fn insert<R>(
        &self,
        table: &str,
        record: &R,
    ) -> impl Future<Output = Result<i64, GatewayError>> + Send
    where
        R: Serialize + Sync;

    /// Delete the row with `id`. A missing row is not an error.
    fn delete(&self, table: &str, id: i64) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Store `image` under `key` in the image bucket.
    fn upload(
        &self,
        key: &str,
        image: &ImageFile,
    ) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Public URL of a previously uploaded object. Never fails.
    fn public_url(&self, key: &str) -> String;
}
