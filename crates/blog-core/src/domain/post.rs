use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::User;
use super::validate::{Validate, check_len};
use crate::error::DomainError;

pub const POST_TITLE_MAX_LEN: usize = 200;
pub const POST_SLUG_MAX_LEN: usize = 200;

/// Post entity - a blog article written by a staff user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub text: String,
    /// URL fragment; not unique at this layer.
    pub slug: String,
    /// Path of the cover image in media storage.
    pub image: String,
    pub published_at: DateTime<Utc>,
}

impl Post {
    /// Create a new post authored by `author`.
    ///
    /// Fails with [`DomainError::NotStaff`] when the author lacks the staff flag.
    pub fn new(
        author: &User,
        title: impl Into<String>,
        text: impl Into<String>,
        slug: impl Into<String>,
        image: impl Into<String>,
        published_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if !author.is_staff {
            return Err(DomainError::NotStaff(author.id));
        }

        Ok(Self {
            id: Uuid::new_v4(),
            author_id: author.id,
            title: title.into(),
            text: text.into(),
            slug: slug.into(),
            image: image.into(),
            published_at,
        })
    }
}

fn is_slug(value: &str) -> bool {
    value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl Validate for Post {
    fn full_clean(&mut self) -> Result<(), DomainError> {
        check_len("title", &self.title, Some(POST_TITLE_MAX_LEN))?;
        check_len("text", &self.text, None)?;
        check_len("slug", &self.slug, Some(POST_SLUG_MAX_LEN))?;
        check_len("image", &self.image, None)?;

        if !is_slug(&self.slug) {
            return Err(DomainError::Validation(format!(
                "slug '{}' may only contain letters, numbers, hyphens and underscores",
                self.slug
            )));
        }

        Ok(())
    }
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}
