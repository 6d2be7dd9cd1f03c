//! Tag repository with popularity ranking.

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, EntityTrait, FromQueryResult, QueryFilter, QueryOrder, QuerySelect, Select,
};
use uuid::Uuid;

use blog_core::domain::{Tag, TagWithPostsCount};
use blog_core::error::RepoError;
use blog_core::ports::TagRepository;

use super::entity::post_tag;
use super::entity::tag::{self, Entity as TagEntity};
use super::error::db_err;
use super::sql_base::SqlBaseRepository;

pub type SqlTagRepository = SqlBaseRepository<TagEntity>;

pub(crate) const POSTS_COUNT: &str = "posts_count";

/// Row shape of [`with_posts_count`].
#[derive(Debug, FromQueryResult)]
pub(crate) struct TagCountRow {
    pub id: Uuid,
    pub title: String,
    pub posts_count: i64,
}

impl From<TagCountRow> for TagWithPostsCount {
    fn from(row: TagCountRow) -> Self {
        Self {
            tag: Tag {
                id: row.id,
                title: row.title,
            },
            posts_count: u64::try_from(row.posts_count).unwrap_or_default(),
        }
    }
}

/// Tags annotated with the number of posts carrying them.
///
/// `post_tags` is keyed on `(post_id, tag_id)`, so a plain count over the
/// left join is already a distinct-post count. Tags without posts count 0.
pub(crate) fn with_posts_count() -> Select<TagEntity> {
    TagEntity::find()
        .column_as(
            Expr::col((post_tag::Entity, post_tag::Column::PostId)).count(),
            POSTS_COUNT,
        )
        .left_join(post_tag::Entity)
        .group_by(tag::Column::Id)
        .group_by(tag::Column::Title)
}

#[async_trait]
impl TagRepository for SqlTagRepository {
    async fn all(&self) -> Result<Vec<Tag>, RepoError> {
        let result = TagEntity::find()
            .order_by_asc(tag::Column::Title)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_by_title(&self, title: &str) -> Result<Option<Tag>, RepoError> {
        let title = Tag::normalize_title(title);
        tracing::debug!(%title, "Finding tag by title");

        let result = TagEntity::find()
            .filter(tag::Column::Title.eq(title))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.map(Into::into))
    }

    async fn popular(&self, limit: Option<u64>) -> Result<Vec<TagWithPostsCount>, RepoError> {
        let mut select = with_posts_count()
            .order_by_desc(Expr::cust(POSTS_COUNT))
            .order_by_asc(tag::Column::Title);
        if let Some(limit) = limit {
            select = select.limit(limit);
        }

        let rows = select
            .into_model::<TagCountRow>()
            .all(&self.db)
            .await
            .map_err(db_err)?;

        tracing::debug!(count = rows.len(), "Loaded popular tags");
        Ok(rows.into_iter().map(Into::into).collect())
    }
}
