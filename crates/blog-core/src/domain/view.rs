//! Enriched read models.
//!
//! Computed aggregates travel next to the record instead of being written
//! onto it, so `Post` and `Tag` always mirror their stored columns.

use serde::{Deserialize, Serialize};

use super::{Post, Tag};

/// A tag together with the number of posts that carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagWithPostsCount {
    pub tag: Tag,
    pub posts_count: u64,
}

/// A post plus whichever enrichments the query asked for.
///
/// A `None` field means the enrichment was not requested, never that the
/// count is zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostView {
    pub post: Post,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub likes_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<TagWithPostsCount>>,
}

impl PostView {
    pub fn new(post: Post) -> Self {
        Self {
            post,
            likes_count: None,
            comments_count: None,
            tags: None,
        }
    }
}

impl From<Post> for PostView {
    fn from(post: Post) -> Self {
        Self::new(post)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::User;

    #[test]
    fn test_unrequested_enrichments_are_not_serialized() {
        let author = User::staff("editor");
        let post = Post::new(&author, "Title", "Text", "title", "a.png", Utc::now()).unwrap();
        let mut view = PostView::from(post);
        view.comments_count = Some(0);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["comments_count"], 0);
        assert!(json.get("likes_count").is_none());
        assert!(json.get("tags").is_none());
    }
}
