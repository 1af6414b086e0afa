//! Core record types for the lab site.
//!
//! Both record kinds are flat rows owned by the remote table store.

pub mod email;
pub mod id;
pub mod member;
pub mod post;

pub use email::{Email, EmailError};
pub use id::*;
pub use member::{Member, MemberStatus, NewMember};
pub use post::{Category, NewPost, Post};

/// Deserialize a nullable text column, mapping `null` to an empty string.
///
/// The remote store allows nulls in most text columns; the UI treats them
/// the same as empty text.
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
