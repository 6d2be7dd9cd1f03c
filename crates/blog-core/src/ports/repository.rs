use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Comment, Post, PostView, Tag, TagWithPostsCount, User};
use crate::error::RepoError;
use crate::query::PostQuery;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Validate, then save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID. Dependent rows follow the schema's cascades.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository. Users belong to the identity subsystem.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Tag repository.
#[async_trait]
pub trait TagRepository: BaseRepository<Tag, Uuid> {
    /// All tags, alphabetical.
    async fn all(&self) -> Result<Vec<Tag>, RepoError>;

    /// Case-insensitive lookup by title.
    async fn find_by_title(&self, title: &str) -> Result<Option<Tag>, RepoError>;

    /// Tags ordered by how many distinct posts carry them, most first.
    async fn popular(&self, limit: Option<u64>) -> Result<Vec<TagWithPostsCount>, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Insert a post and its tag links in one transaction.
    ///
    /// The author must exist and be staff.
    async fn create(&self, post: Post, tag_ids: &[Uuid]) -> Result<Post, RepoError>;

    /// Materialize a query description, applying its enrichments.
    async fn list(&self, query: &PostQuery) -> Result<Vec<PostView>, RepoError>;

    /// Newest post with the given slug.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError>;

    /// Attach comment counts to an already-materialized collection.
    ///
    /// Posts without comments get zero. A post missing from the aggregate
    /// (deleted after materialization) fails with [`RepoError::Lookup`].
    async fn fetch_with_comments_count(
        &self,
        posts: Vec<PostView>,
    ) -> Result<Vec<PostView>, RepoError>;

    /// Attach tags, each annotated with its post count, in two batch queries.
    async fn fetch_with_tags(&self, posts: Vec<PostView>) -> Result<Vec<PostView>, RepoError>;

    /// Tags of a single post, alphabetical.
    async fn tags_of(&self, post_id: Uuid) -> Result<Vec<Tag>, RepoError>;

    /// Returns `false` when the post already had the tag.
    async fn add_tag(&self, post_id: Uuid, tag_id: Uuid) -> Result<bool, RepoError>;

    /// Returns `false` when the post did not have the tag.
    async fn remove_tag(&self, post_id: Uuid, tag_id: Uuid) -> Result<bool, RepoError>;

    /// Replace the post's tag set.
    async fn set_tags(&self, post_id: Uuid, tag_ids: &[Uuid]) -> Result<(), RepoError>;

    /// Returns `false` when the user already liked the post.
    async fn add_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError>;

    /// Returns `false` when the user had not liked the post.
    async fn remove_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError>;

    /// IDs of the users who liked the post.
    async fn likers(&self, post_id: Uuid) -> Result<Vec<Uuid>, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Comments under a post, oldest first.
    async fn for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError>;

    async fn count_for_post(&self, post_id: Uuid) -> Result<u64, RepoError>;
}
