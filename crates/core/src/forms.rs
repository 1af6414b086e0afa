//! Admin form state.
//!
//! Forms hold exactly what the admin typed. They are validated before any
//! network call and turned into insert payloads once the image (if any) has
//! been uploaded.

use chrono::NaiveDate;
use thiserror::Error;

use crate::types::{Category, MemberStatus, NewMember, NewPost};

/// Default role offered for new members.
pub const DEFAULT_MEMBER_ROLE: &str = "Ph.D. Student";

/// Validation errors raised before a submission touches the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormError {
    /// A post needs a title.
    #[error("Please enter a title")]
    MissingTitle,
    /// A member needs a name.
    #[error("Please enter a name")]
    MissingName,
}

/// News post form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostForm {
    pub title: String,
    pub category: Category,
    pub date: NaiveDate,
    pub author: String,
    pub description: String,
}

impl PostForm {
    /// A blank form dated `today`, signed by `author`.
    #[must_use]
    pub fn new(today: NaiveDate, author: impl Into<String>) -> Self {
        Self {
            title: String::new(),
            category: Category::default(),
            date: today,
            author: author.into(),
            description: String::new(),
        }
    }

    /// Check required fields.
    ///
    /// # Errors
    ///
    /// Returns `FormError::MissingTitle` if the title is blank.
    pub fn validate(&self) -> Result<(), FormError> {
        if self.title.trim().is_empty() {
            return Err(FormError::MissingTitle);
        }
        Ok(())
    }

    /// Build the insert payload.
    #[must_use]
    pub fn to_record(&self, image_url: Option<String>) -> NewPost {
        NewPost {
            title: self.title.clone(),
            category: self.category,
            date: self.date,
            author: self.author.clone(),
            description: self.description.clone(),
            image_url,
        }
    }
}

/// Lab member form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberForm {
    pub name: String,
    pub role: String,
    pub status: String,
    /// Comma-separated, stored as typed.
    pub tags: String,
}

impl Default for MemberForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            role: DEFAULT_MEMBER_ROLE.to_owned(),
            status: MemberStatus::default().as_str().to_owned(),
            tags: String::new(),
        }
    }
}

impl MemberForm {
    /// Check required fields.
    ///
    /// # Errors
    ///
    /// Returns `FormError::MissingName` if the name is blank.
    pub fn validate(&self) -> Result<(), FormError> {
        if self.name.trim().is_empty() {
            return Err(FormError::MissingName);
        }
        Ok(())
    }

    /// Build the insert payload.
    #[must_use]
    pub fn to_record(&self, image_url: Option<String>) -> NewMember {
        NewMember {
            name: self.name.clone(),
            role: self.role.clone(),
            status: self.status.clone(),
            tags: self.tags.clone(),
            image_url,
        }
    }
}
