//! News posts.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::PostId;
use super::null_as_empty;

/// Post category offered by the admin form.
///
/// Records read back from the remote store keep the raw category string,
/// so a value outside this set still displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Category {
    #[default]
    News,
    Seminar,
    Conference,
    #[serde(rename = "Paper Accepted")]
    PaperAccepted,
    Award,
}

impl Category {
    /// All categories, in the order the admin form lists them.
    pub const ALL: [Self; 5] = [
        Self::News,
        Self::Seminar,
        Self::Conference,
        Self::PaperAccepted,
        Self::Award,
    ];

    /// The stored text for this category.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::News => "News",
            Self::Seminar => "Seminar",
            Self::Conference => "Conference",
            Self::PaperAccepted => "Paper Accepted",
            Self::Award => "Award",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "invalid category: {s} (expected one of: {})",
                    Self::ALL.map(Self::as_str).join(", ")
                )
            })
    }
}

/// A news post as stored in the remote table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub category: String,
    /// Raw date text, shown as stored. Usually `YYYY-MM-DD`.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub date: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub author: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Insert payload for a post. The id is assigned by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewPost {
    pub title: String,
    pub category: Category,
    pub date: NaiveDate,
    pub author: String,
    pub description: String,
    pub image_url: Option<String>,
}
