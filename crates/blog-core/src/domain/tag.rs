use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validate::{Validate, check_len};
use crate::error::DomainError;

pub const TAG_TITLE_MAX_LEN: usize = 20;

/// Tag entity - a short lowercase label attached to posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub title: String,
}

impl Tag {
    /// Create a tag. The title is normalized by [`Validate::full_clean`].
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
        }
    }

    /// Canonical form of a tag title, used for storage and lookup.
    pub fn normalize_title(title: &str) -> String {
        title.to_lowercase()
    }
}

impl Validate for Tag {
    fn full_clean(&mut self) -> Result<(), DomainError> {
        self.title = Self::normalize_title(&self.title);
        check_len("tag title", &self.title, Some(TAG_TITLE_MAX_LEN))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_clean_lowercases_title() {
        let mut tag = Tag::new("Python");
        tag.full_clean().unwrap();
        assert_eq!(tag.title, "python");
        assert_eq!(tag.to_string(), "python");
    }

    #[test]
    fn test_full_clean_rejects_long_title() {
        let mut tag = Tag::new("a".repeat(TAG_TITLE_MAX_LEN + 1));
        assert!(matches!(tag.full_clean(), Err(DomainError::Validation(_))));

        let mut tag = Tag::new("Б".repeat(TAG_TITLE_MAX_LEN));
        assert!(tag.full_clean().is_ok());
    }

    #[test]
    fn test_normalize_title_only_lowercases() {
        assert_eq!(Tag::normalize_title("Rust"), "rust");
        assert_eq!(Tag::normalize_title(" Web Dev "), " web dev ");
    }

    #[test]
    fn test_full_clean_rejects_blank_title() {
        let mut tag = Tag::new("   ");
        assert!(tag.full_clean().is_err());
    }
}
