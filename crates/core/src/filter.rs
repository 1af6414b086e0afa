//! Member filtering for the public people listing.
//!
//! Everything here is a pure function of the member collection and the
//! filter state, recomputed on every call. Output order always follows the
//! input order.

use std::collections::BTreeSet;

use crate::types::Member;
use crate::types::member::split_tags;

/// Sentinel used by the status and tag selectors to mean "no restriction".
pub const ALL: &str = "All";

/// A status or tag selection: either everything or one literal value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    /// Build a selection from user input, treating `"All"` and blank input as
    /// [`Selection::All`].
    #[must_use]
    pub fn from_input(value: Option<&str>) -> Self {
        match value {
            None => Self::All,
            Some(v) if v.is_empty() || v == ALL => Self::All,
            Some(v) => Self::Only(v.to_owned()),
        }
    }

    /// The label shown for this selection.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::All => ALL,
            Self::Only(v) => v,
        }
    }
}

/// The tuple (status, tag, name query) driving the member filter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterState {
    pub status: Selection,
    pub tag: Selection,
    pub name_query: String,
}

impl FilterState {
    /// Whether a member passes every criterion.
    ///
    /// - status: exact match on the raw status.
    /// - tag: substring of the raw comma-joined `tags` string, so `AI` also
    ///   matches a longer tag containing `AI`.
    /// - name: case-sensitive substring of the name or the role.
    #[must_use]
    pub fn matches(&self, member: &Member) -> bool {
        let status_ok = match &self.status {
            Selection::All => true,
            Selection::Only(status) => member.status == *status,
        };
        let tag_ok = match &self.tag {
            Selection::All => true,
            Selection::Only(tag) => member.tags.contains(tag.as_str()),
        };
        let name_ok = member.name.contains(self.name_query.as_str())
            || member.role.contains(self.name_query.as_str());

        status_ok && tag_ok && name_ok
    }
}

/// Members passing `state`, in input order.
#[must_use]
pub fn filter_members<'a>(members: &'a [Member], state: &FilterState) -> Vec<&'a Member> {
    members.iter().filter(|m| state.matches(m)).collect()
}

/// Selectable tags: `"All"` first, then every distinct trimmed tag sorted.
///
/// A literal `All` tag on a member is folded into the sentinel.
#[must_use]
pub fn tag_universe(members: &[Member]) -> Vec<String> {
    let tags: BTreeSet<&str> = members
        .iter()
        .flat_map(|m| split_tags(&m.tags))
        .filter(|t| *t != ALL)
        .collect();

    std::iter::once(ALL)
        .chain(tags)
        .map(str::to_owned)
        .collect()
}
