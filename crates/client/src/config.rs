//! Site configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SUPABASE_URL` - Supabase project URL
//! - `SUPABASE_ANON_KEY` - Project anon (public) API key
//!
//! ## Required for admin commands
//! - `LABSITE_ADMIN_EMAILS` - Comma-separated admin allow-list (oauth mode)
//! - `LABSITE_ADMIN_PASSWORD` - Shared admin password (password mode)
//!
//! ## Optional
//! - `LABSITE_AUTH_MODE` - `oauth` or `password` (default: oauth)
//! - `LABSITE_OAUTH_PROVIDER` - OAuth provider (default: google)
//! - `LABSITE_CALLBACK_HOST` - Loopback callback address (default: 127.0.0.1)
//! - `LABSITE_CALLBACK_PORT` - Loopback callback port (default: 54321)
//! - `LABSITE_IMAGE_BUCKET` - Storage bucket for images (default: images)
//! - `LABSITE_POSTS_TABLE` - News table (default: news)
//! - `LABSITE_MEMBERS_TABLE` - Members table (default: members)
//! - `LABSITE_DEFAULT_AUTHOR` - Author prefilled on new posts (default: BVI Lab)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};

use labsite_core::Email;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::auth::{AllowList, AuthStrategy};
use crate::gateway::Tables;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Complete client configuration.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub supabase: SupabaseConfig,
    pub tables: Tables,
    pub auth: AdminAuthConfig,
    /// Where the OAuth callback listener binds.
    pub callback_addr: SocketAddr,
    /// Author prefilled on the new-post form.
    pub default_author: String,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Supabase project configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct SupabaseConfig {
    /// Project URL (e.g., <https://abc.supabase.co>)
    pub url: Url,
    /// Anon (public) API key
    pub anon_key: SecretString,
    /// Storage bucket that holds uploaded images
    pub image_bucket: String,
}

impl std::fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url.as_str())
            .field("anon_key", &"[REDACTED]")
            .field("image_bucket", &self.image_bucket)
            .finish()
    }
}

/// Admin sign-in settings.
///
/// Kept raw so the public listings run without them; [`Self::strategy`]
/// validates them when an admin command starts.
#[derive(Debug, Clone)]
pub struct AdminAuthConfig {
    mode: String,
    provider: String,
    admin_emails: Option<String>,
    admin_password: Option<SecretString>,
}

impl AdminAuthConfig {
    /// Resolve the configured sign-in strategy.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the mode is unknown or its setting is
    /// missing or invalid.
    pub fn strategy(&self) -> Result<AuthStrategy, ConfigError> {
        match self.mode.as_str() {
            "oauth" => {
                let raw = self
                    .admin_emails
                    .as_deref()
                    .ok_or_else(|| ConfigError::MissingEnvVar("LABSITE_ADMIN_EMAILS".to_string()))?;
                Ok(AuthStrategy::OAuth {
                    provider: self.provider.clone(),
                    allow_list: parse_allow_list(raw)?,
                })
            }
            "password" => {
                let password = self.admin_password.clone().ok_or_else(|| {
                    ConfigError::MissingEnvVar("LABSITE_ADMIN_PASSWORD".to_string())
                })?;
                Ok(AuthStrategy::SharedSecret { password })
            }
            other => Err(ConfigError::InvalidEnvVar(
                "LABSITE_AUTH_MODE".to_string(),
                format!("expected 'oauth' or 'password', got '{other}'"),
            )),
        }
    }
}

impl SiteConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let supabase = SupabaseConfig {
            url: env.parse_required("SUPABASE_URL")?,
            anon_key: SecretString::from(env.required("SUPABASE_ANON_KEY")?),
            image_bucket: env.or_default("LABSITE_IMAGE_BUCKET", "images"),
        };

        let tables = Tables {
            posts: env.or_default("LABSITE_POSTS_TABLE", "news"),
            members: env.or_default("LABSITE_MEMBERS_TABLE", "members"),
        };

        let auth = AdminAuthConfig {
            mode: env.or_default("LABSITE_AUTH_MODE", "oauth"),
            provider: env.or_default("LABSITE_OAUTH_PROVIDER", "google"),
            admin_emails: env.optional("LABSITE_ADMIN_EMAILS"),
            admin_password: env.optional("LABSITE_ADMIN_PASSWORD").map(SecretString::from),
        };

        let host: IpAddr = env.parse_or_default("LABSITE_CALLBACK_HOST", "127.0.0.1")?;
        let port: u16 = env.parse_or_default("LABSITE_CALLBACK_PORT", "54321")?;

        Ok(Self {
            supabase,
            tables,
            auth,
            callback_addr: SocketAddr::new(host, port),
            default_author: env.or_default("LABSITE_DEFAULT_AUTHOR", "BVI Lab"),
            sentry_dsn: env.optional("SENTRY_DSN"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    /// Get an optional variable; blank counts as unset.
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|v| !v.trim().is_empty())
    }

    /// Get a required variable.
    fn required(&self, key: &str) -> Result<String, ConfigError> {
        self.optional(key)
            .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
    }

    /// Get a variable with a default value.
    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }

    fn parse_required<T>(&self, key: &str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        parse_value(key, &self.required(key)?)
    }

    fn parse_or_default<T>(&self, key: &str, default: &str) -> Result<T, ConfigError>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        parse_value(key, &self.or_default(key, default))
    }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn parse_allow_list(raw: &str) -> Result<AllowList, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            Email::parse(s).map_err(|e| {
                ConfigError::InvalidEnvVar("LABSITE_ADMIN_EMAILS".to_string(), e.to_string())
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .map(AllowList::new)
}
