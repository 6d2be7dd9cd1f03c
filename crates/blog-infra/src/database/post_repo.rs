//! Post repository: query materialization, enrichment and junction edits.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{Expr, OnConflict, Query};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, DbConn, DbErr, EntityTrait,
    FromQueryResult, QueryFilter, QueryOrder, QuerySelect, Select, Set, TransactionTrait,
};
use uuid::Uuid;

use blog_core::domain::{Post, PostView, Tag, TagWithPostsCount, Validate};
use blog_core::error::{DomainError, RepoError};
use blog_core::ports::{BaseRepository, PostRepository};
use blog_core::query::{PostFilter, PostOrder, PostQuery, year_bounds};

use super::entity::post::{self, Entity as PostEntity};
use super::entity::{comment, post_like, post_tag, tag, user};
use super::error::db_err;
use super::sql_base::SqlBaseRepository;
use super::tag_repo::{TagCountRow, with_posts_count};

/// Post storage. Writes check the author's staff flag, so it wraps the
/// generic repository instead of aliasing it.
pub struct SqlPostRepository {
    base: SqlBaseRepository<PostEntity>,
}

impl SqlPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self {
            base: SqlBaseRepository::new(db),
        }
    }
}

const LIKES_COUNT: &str = "likes_count";
const COMMENTS_COUNT: &str = "comments_count";

/// A post row annotated with its like count.
#[derive(Debug, FromQueryResult)]
struct PostLikesRow {
    id: Uuid,
    title: String,
    text: String,
    slug: String,
    image: String,
    published_at: DateTimeWithTimeZone,
    author_id: Uuid,
    likes_count: i64,
}

impl From<PostLikesRow> for PostView {
    fn from(row: PostLikesRow) -> Self {
        let likes_count = u64::try_from(row.likes_count).unwrap_or_default();
        let post = Post {
            id: row.id,
            author_id: row.author_id,
            title: row.title,
            text: row.text,
            slug: row.slug,
            image: row.image,
            published_at: row.published_at.into(),
        };

        Self {
            likes_count: Some(likes_count),
            ..Self::new(post)
        }
    }
}

/// Apply the query's filters and paging. Ordering is left to the caller.
fn filtered(query: &PostQuery) -> Result<Select<PostEntity>, RepoError> {
    let mut select = PostEntity::find();

    for filter in query.filters() {
        select = match filter {
            PostFilter::Year(year) => {
                let (start, end) = year_bounds(*year)?;
                let start: DateTimeWithTimeZone = start.into();
                let end: DateTimeWithTimeZone = end.into();
                select
                    .filter(post::Column::PublishedAt.gte(start))
                    .filter(post::Column::PublishedAt.lt(end))
            }
            PostFilter::Author(author_id) => select.filter(post::Column::AuthorId.eq(*author_id)),
            // Subqueries keep one row per post, so aggregates stay exact.
            PostFilter::Tagged(tag_id) => select.filter(
                post::Column::Id.in_subquery(
                    Query::select()
                        .column(post_tag::Column::PostId)
                        .from(post_tag::Entity)
                        .and_where(post_tag::Column::TagId.eq(*tag_id))
                        .to_owned(),
                ),
            ),
            PostFilter::LikedBy(user_id) => select.filter(
                post::Column::Id.in_subquery(
                    Query::select()
                        .column(post_like::Column::PostId)
                        .from(post_like::Entity)
                        .and_where(post_like::Column::UserId.eq(*user_id))
                        .to_owned(),
                ),
            ),
            PostFilter::Slug(slug) => select.filter(post::Column::Slug.eq(slug.as_str())),
        };
    }

    if let Some(limit) = query.limit_value() {
        select = select.limit(limit);
    }
    if let Some(offset) = query.offset_value() {
        select = select.offset(offset);
    }

    Ok(select)
}

/// Fails unless `author_id` names an existing staff user.
async fn ensure_staff_author(txn: &DatabaseTransaction, author_id: Uuid) -> Result<(), RepoError> {
    let author = user::Entity::find_by_id(author_id)
        .one(txn)
        .await
        .map_err(db_err)?
        .ok_or_else(|| RepoError::Constraint(format!("Author {author_id} does not exist")))?;

    if !author.is_staff {
        return Err(DomainError::NotStaff(author.id).into());
    }
    Ok(())
}

/// Insert `post_tags` rows, ignoring repeated tag ids.
async fn insert_links(
    txn: &DatabaseTransaction,
    post_id: Uuid,
    tag_ids: &[Uuid],
) -> Result<(), RepoError> {
    let mut seen = HashSet::new();
    let links: Vec<post_tag::ActiveModel> = tag_ids
        .iter()
        .copied()
        .filter(|tag_id| seen.insert(*tag_id))
        .map(|tag_id| post_tag::ActiveModel {
            post_id: Set(post_id),
            tag_id: Set(tag_id),
        })
        .collect();

    if links.is_empty() {
        return Ok(());
    }

    post_tag::Entity::insert_many(links)
        .exec_without_returning(txn)
        .await
        .map_err(db_err)?;

    Ok(())
}

#[async_trait]
impl BaseRepository<Post, Uuid> for SqlPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        <SqlBaseRepository<PostEntity> as BaseRepository<Post, Uuid>>::find_by_id(&self.base, id)
            .await
    }

    /// Like the generic save, with the author check `create` also runs.
    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        let mut post = post;
        post.full_clean()?;

        let txn = self.base.db.begin().await.map_err(db_err)?;
        ensure_staff_author(&txn, post.author_id).await?;

        let active_model = post::ActiveModel::from(post);
        let model = match active_model.clone().update(&txn).await {
            Err(DbErr::RecordNotUpdated) => active_model.insert(&txn).await,
            other => other,
        }
        .map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        tracing::debug!(post_id = %model.id, "Post saved");
        Ok(model.into())
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        <SqlBaseRepository<PostEntity> as BaseRepository<Post, Uuid>>::delete(&self.base, id).await
    }
}

#[async_trait]
impl PostRepository for SqlPostRepository {
    async fn create(&self, post: Post, tag_ids: &[Uuid]) -> Result<Post, RepoError> {
        let mut post = post;
        post.full_clean()?;

        let txn = self.base.db.begin().await.map_err(db_err)?;

        ensure_staff_author(&txn, post.author_id).await?;

        let model = post::ActiveModel::from(post)
            .insert(&txn)
            .await
            .map_err(db_err)?;
        insert_links(&txn, model.id, tag_ids).await?;

        txn.commit().await.map_err(db_err)?;

        tracing::debug!(post_id = %model.id, tags = tag_ids.len(), "Post created");
        Ok(model.into())
    }

    async fn list(&self, query: &PostQuery) -> Result<Vec<PostView>, RepoError> {
        tracing::debug!(?query, "Listing posts");

        let select = filtered(query)?;
        let views: Vec<PostView> = match query.order() {
            PostOrder::Popular => select
                .column_as(
                    Expr::col((post_like::Entity, post_like::Column::UserId)).count(),
                    LIKES_COUNT,
                )
                .left_join(post_like::Entity)
                .group_by(post::Column::Id)
                .order_by_desc(Expr::cust(LIKES_COUNT))
                .order_by_desc(post::Column::PublishedAt)
                .into_model::<PostLikesRow>()
                .all(&self.base.db)
                .await
                .map_err(db_err)?
                .into_iter()
                .map(Into::into)
                .collect(),
            order => {
                let select = if order == PostOrder::Oldest {
                    select.order_by_asc(post::Column::PublishedAt)
                } else {
                    select.order_by_desc(post::Column::PublishedAt)
                };
                select
                    .all(&self.base.db)
                    .await
                    .map_err(db_err)?
                    .into_iter()
                    .map(|model| PostView::new(model.into()))
                    .collect()
            }
        };

        // Enrichment runs on the materialized set, never on the description.
        let views = if query.counts_comments() {
            self.fetch_with_comments_count(views).await?
        } else {
            views
        };

        if query.prefetches_tags() {
            self.fetch_with_tags(views).await
        } else {
            Ok(views)
        }
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let result = PostEntity::find()
            .filter(post::Column::Slug.eq(slug))
            .order_by_desc(post::Column::PublishedAt)
            .one(&self.base.db)
            .await
            .map_err(db_err)?;

        Ok(result.map(Into::into))
    }

    async fn fetch_with_comments_count(
        &self,
        posts: Vec<PostView>,
    ) -> Result<Vec<PostView>, RepoError> {
        if posts.is_empty() {
            return Ok(posts);
        }

        // Capture the working set before counting.
        let ids: Vec<Uuid> = posts.iter().map(|view| view.post.id).collect();

        let counts: HashMap<Uuid, i64> = PostEntity::find()
            .select_only()
            .column(post::Column::Id)
            .column_as(
                Expr::col((comment::Entity, comment::Column::Id)).count(),
                COMMENTS_COUNT,
            )
            .left_join(comment::Entity)
            .filter(post::Column::Id.is_in(ids))
            .group_by(post::Column::Id)
            .into_tuple::<(Uuid, i64)>()
            .all(&self.base.db)
            .await
            .map_err(db_err)?
            .into_iter()
            .collect();

        posts
            .into_iter()
            .map(|mut view| -> Result<PostView, RepoError> {
                let id = view.post.id;
                let count = counts.get(&id).copied().ok_or_else(|| {
                    tracing::warn!(post_id = %id, "Post vanished before comments were counted");
                    RepoError::Lookup { entity: "post", id }
                })?;
                view.comments_count = Some(u64::try_from(count).unwrap_or_default());
                Ok(view)
            })
            .collect()
    }

    async fn fetch_with_tags(&self, posts: Vec<PostView>) -> Result<Vec<PostView>, RepoError> {
        if posts.is_empty() {
            return Ok(posts);
        }

        let ids: Vec<Uuid> = posts.iter().map(|view| view.post.id).collect();

        let links = post_tag::Entity::find()
            .filter(post_tag::Column::PostId.is_in(ids))
            .all(&self.base.db)
            .await
            .map_err(db_err)?;

        let mut tags_by_post: HashMap<Uuid, HashSet<Uuid>> = HashMap::new();
        for link in &links {
            tags_by_post
                .entry(link.post_id)
                .or_default()
                .insert(link.tag_id);
        }
        let tag_ids: HashSet<Uuid> = links.iter().map(|link| link.tag_id).collect();

        let tags: Vec<TagWithPostsCount> = if tag_ids.is_empty() {
            Vec::new()
        } else {
            with_posts_count()
                .filter(tag::Column::Id.is_in(tag_ids))
                .order_by_asc(tag::Column::Title)
                .into_model::<TagCountRow>()
                .all(&self.base.db)
                .await
                .map_err(db_err)?
                .into_iter()
                .map(Into::into)
                .collect()
        };

        tracing::debug!(
            posts = posts.len(),
            tags = tags.len(),
            "Prefetched tags with post counts"
        );

        Ok(posts
            .into_iter()
            .map(|mut view| {
                let own = tags_by_post.get(&view.post.id);
                view.tags = Some(
                    tags.iter()
                        .filter(|t| own.is_some_and(|ids| ids.contains(&t.tag.id)))
                        .cloned()
                        .collect(),
                );
                view
            })
            .collect())
    }

    async fn tags_of(&self, post_id: Uuid) -> Result<Vec<Tag>, RepoError> {
        let result = tag::Entity::find()
            .inner_join(post_tag::Entity)
            .filter(post_tag::Column::PostId.eq(post_id))
            .order_by_asc(tag::Column::Title)
            .all(&self.base.db)
            .await
            .map_err(db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn add_tag(&self, post_id: Uuid, tag_id: Uuid) -> Result<bool, RepoError> {
        let link = post_tag::ActiveModel {
            post_id: Set(post_id),
            tag_id: Set(tag_id),
        };

        let inserted = post_tag::Entity::insert(link)
            .on_conflict(
                OnConflict::columns([post_tag::Column::PostId, post_tag::Column::TagId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.base.db)
            .await
            .map_err(db_err)?;

        Ok(inserted > 0)
    }

    async fn remove_tag(&self, post_id: Uuid, tag_id: Uuid) -> Result<bool, RepoError> {
        let result = post_tag::Entity::delete_by_id((post_id, tag_id))
            .exec(&self.base.db)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected > 0)
    }

    async fn set_tags(&self, post_id: Uuid, tag_ids: &[Uuid]) -> Result<(), RepoError> {
        let txn = self.base.db.begin().await.map_err(db_err)?;

        if PostEntity::find_by_id(post_id)
            .one(&txn)
            .await
            .map_err(db_err)?
            .is_none()
        {
            return Err(RepoError::NotFound);
        }

        post_tag::Entity::delete_many()
            .filter(post_tag::Column::PostId.eq(post_id))
            .exec(&txn)
            .await
            .map_err(db_err)?;
        insert_links(&txn, post_id, tag_ids).await?;

        txn.commit().await.map_err(db_err)?;

        tracing::debug!(%post_id, tags = tag_ids.len(), "Post tags replaced");
        Ok(())
    }

    async fn add_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError> {
        let like = post_like::ActiveModel {
            post_id: Set(post_id),
            user_id: Set(user_id),
        };

        let inserted = post_like::Entity::insert(like)
            .on_conflict(
                OnConflict::columns([post_like::Column::PostId, post_like::Column::UserId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.base.db)
            .await
            .map_err(db_err)?;

        Ok(inserted > 0)
    }

    async fn remove_like(&self, post_id: Uuid, user_id: Uuid) -> Result<bool, RepoError> {
        let result = post_like::Entity::delete_by_id((post_id, user_id))
            .exec(&self.base.db)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected > 0)
    }

    async fn likers(&self, post_id: Uuid) -> Result<Vec<Uuid>, RepoError> {
        let result = post_like::Entity::find()
            .filter(post_like::Column::PostId.eq(post_id))
            .order_by_asc(post_like::Column::UserId)
            .all(&self.base.db)
            .await
            .map_err(db_err)?;

        Ok(result.into_iter().map(|like| like.user_id).collect())
    }
}
