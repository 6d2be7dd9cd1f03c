use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validate::{Validate, check_len};
use super::{Post, User};
use crate::error::DomainError;

/// Comment entity - a reader's note under a post, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub published_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(
        post_id: Uuid,
        author_id: Uuid,
        text: impl Into<String>,
        published_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            post_id,
            author_id,
            text: text.into(),
            published_at,
        }
    }

    /// Human-readable label, e.g. `ann under Hello world`.
    pub fn caption(&self, author: &User, post: &Post) -> String {
        format!("{} under {}", author.username, post.title)
    }
}

impl Validate for Comment {
    fn full_clean(&mut self) -> Result<(), DomainError> {
        check_len("comment text", &self.text, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caption_names_author_and_post() {
        let editor = User::staff("editor");
        let reader = User::new("ann", false);
        let post = Post::new(&editor, "Hello world", "Body", "hello", "h.png", Utc::now()).unwrap();
        let comment = Comment::new(post.id, reader.id, "Nice", Utc::now());

        assert_eq!(comment.caption(&reader, &post), "ann under Hello world");
    }

    #[test]
    fn test_full_clean_rejects_empty_text() {
        let mut comment = Comment::new(Uuid::new_v4(), Uuid::new_v4(), "", Utc::now());
        assert!(matches!(comment.full_clean(), Err(DomainError::Validation(_))));
    }
}
