//! Email addresses used by the admin allow-list.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// The input string is empty.
    #[error("email cannot be empty")]
    Empty,
    /// The input does not contain an @ symbol.
    #[error("email must contain an @ symbol: {0}")]
    MissingAtSymbol(String),
    /// The local part (before @) or the domain (after @) is empty.
    #[error("email must have a local part and a domain: {0}")]
    Incomplete(String),
}

/// An email address, compared exactly.
///
/// Parsing only checks the rough `local@domain` shape. No case folding or
/// normalization is applied: `Admin@lab.org` and `admin@lab.org` are
/// different addresses for allow-list purposes.
///
/// ```
/// use labsite_core::Email;
///
/// let email = Email::parse("kim@lab.ac.kr").unwrap();
/// assert!(email.matches("kim@lab.ac.kr"));
/// assert!(!email.matches("Kim@lab.ac.kr"));
/// assert!(Email::parse("no-at-symbol").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Parse an `Email` from a string. Surrounding whitespace is trimmed.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty, has no `@`, or has an empty
    /// local part or domain.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(EmailError::Empty);
        }

        let (local, domain) = s
            .split_once('@')
            .ok_or_else(|| EmailError::MissingAtSymbol(s.to_owned()))?;

        if local.is_empty() || domain.is_empty() {
            return Err(EmailError::Incomplete(s.to_owned()));
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Exact, case-sensitive comparison against a raw address.
    #[must_use]
    pub fn matches(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
