//! Comment repository.

use async_trait::async_trait;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use blog_core::domain::Comment;
use blog_core::error::RepoError;
use blog_core::ports::CommentRepository;

use super::entity::comment::{self, Entity as CommentEntity};
use super::error::db_err;
use super::sql_base::SqlBaseRepository;

pub type SqlCommentRepository = SqlBaseRepository<CommentEntity>;

#[async_trait]
impl CommentRepository for SqlCommentRepository {
    async fn for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .order_by_asc(comment::Column::PublishedAt)
            .order_by_asc(comment::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn count_for_post(&self, post_id: Uuid) -> Result<u64, RepoError> {
        CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .count(&self.db)
            .await
            .map_err(db_err)
    }
}
