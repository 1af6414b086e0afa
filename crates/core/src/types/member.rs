//! Lab members.

use serde::{Deserialize, Serialize};

use super::MemberId;
use super::null_as_empty;

/// Conventional member statuses.
///
/// The remote column is free text; this enum only drives form defaults and
/// help output. Filtering always compares the raw status string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MemberStatus {
    #[default]
    InProgress,
    Completed,
    Graduated,
    Faculty,
}

impl MemberStatus {
    /// All conventional statuses.
    pub const ALL: [Self; 4] = [
        Self::InProgress,
        Self::Completed,
        Self::Graduated,
        Self::Faculty,
    ];

    /// The stored text for this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "in progress",
            Self::Completed => "completed",
            Self::Graduated => "graduated",
            Self::Faculty => "faculty",
        }
    }
}

impl std::fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lab member as stored in the remote table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub role: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub status: String,
    /// Comma-separated tags, stored raw.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Member {
    /// Tags split on `,` and trimmed. Empty pieces are skipped.
    pub fn tag_list(&self) -> impl Iterator<Item = &str> {
        split_tags(&self.tags)
    }
}

/// Insert payload for a member. The id is assigned by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewMember {
    pub name: String,
    pub role: String,
    pub status: String,
    pub tags: String,
    pub image_url: Option<String>,
}

pub(crate) fn split_tags(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|t| !t.is_empty())
}
