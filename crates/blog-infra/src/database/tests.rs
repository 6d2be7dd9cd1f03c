use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{DatabaseBackend, MockDatabase, Value};
use uuid::Uuid;

use blog_core::domain::{Post, PostView, Tag, User};
use blog_core::error::{DomainError, RepoError};
use blog_core::ports::{BaseRepository, PostRepository, TagRepository};
use blog_core::query::PostQuery;

use crate::database::entity::{post, user};
use crate::database::{SqlPostRepository, SqlTagRepository};

fn published(day: u32) -> DateTimeWithTimeZone {
    Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap().into()
}

#[tokio::test]
async fn test_find_post_by_id() {
    let post_id = Uuid::new_v4();
    let author_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post::Model {
            id: post_id,
            title: "Test Post".to_owned(),
            text: "Content".to_owned(),
            slug: "test-post".to_owned(),
            image: "covers/test.png".to_owned(),
            published_at: published(1),
            author_id,
        }]])
        .into_connection();

    let repo = SqlPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

    let post = result.expect("post should be found");
    assert_eq!(post.title, "Test Post");
    assert_eq!(post.id, post_id);
    assert_eq!(post.author_id, author_id);
}

#[tokio::test]
async fn test_popular_posts_carry_like_counts_in_store_order() {
    let author_id = Uuid::new_v4();
    let row = |title: &str, likes: i64, day: u32| {
        BTreeMap::from([
            ("id", Value::from(Uuid::new_v4())),
            ("title", Value::from(title)),
            ("text", Value::from("Body")),
            ("slug", Value::from(title)),
            ("image", Value::from("covers/x.png")),
            ("published_at", Value::from(published(day))),
            ("author_id", Value::from(author_id)),
            ("likes_count", Value::from(likes)),
        ])
    };

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![row("loved", 3, 1), row("ignored", 0, 2)]])
        .into_connection();
    let repo = SqlPostRepository::new(db);

    let views = repo.list(&PostQuery::new().popular()).await.unwrap();

    let summary: Vec<(&str, Option<u64>)> = views
        .iter()
        .map(|v| (v.post.title.as_str(), v.likes_count))
        .collect();
    assert_eq!(summary, vec![("loved", Some(3)), ("ignored", Some(0))]);
    assert!(views.iter().all(|v| v.comments_count.is_none() && v.tags.is_none()));
}

#[tokio::test]
async fn test_popular_tags_map_post_counts() {
    let row = |title: &str, count: i64| {
        BTreeMap::from([
            ("id", Value::from(Uuid::new_v4())),
            ("title", Value::from(title)),
            ("posts_count", Value::from(count)),
        ])
    };

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![row("go", 2), row("rust", 1)]])
        .into_connection();
    let repo = SqlTagRepository::new(db);

    let tags = repo.popular(None).await.unwrap();

    assert_eq!(tags.len(), 2);
    assert_eq!(tags[0].tag.title, "go");
    assert_eq!(tags[0].posts_count, 2);
    assert_eq!(tags[1].tag.title, "rust");
    assert_eq!(tags[1].posts_count, 1);
}

#[tokio::test]
async fn test_comments_count_fails_when_post_vanished() {
    let author = User::staff("editor");
    let post = Post::new(&author, "Gone", "Body", "gone", "g.png", Utc::now()).unwrap();
    let post_id = post.id;

    // The aggregate comes back without the post: it was deleted in between.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<BTreeMap<&str, Value>>::new()])
        .into_connection();
    let repo = SqlPostRepository::new(db);

    let err = repo
        .fetch_with_comments_count(vec![PostView::new(post)])
        .await
        .unwrap_err();

    assert!(matches!(err, RepoError::Lookup { entity: "post", id } if id == post_id));
}

#[tokio::test]
async fn test_enrichment_of_empty_collection_is_a_no_op() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let repo = SqlPostRepository::new(db);

    assert!(repo.fetch_with_comments_count(Vec::new()).await.unwrap().is_empty());
    assert!(repo.fetch_with_tags(Vec::new()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_save_validates_before_touching_the_database() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let repo: Box<dyn TagRepository> = Box::new(SqlTagRepository::new(db));

    let err = repo.save(Tag::new("x".repeat(21))).await.unwrap_err();

    assert!(matches!(err, RepoError::Invalid(DomainError::Validation(_))));
}

#[tokio::test]
async fn test_create_rejects_non_staff_author() {
    let reader_id = Uuid::new_v4();
    let staff = User::staff("editor");
    let mut post = Post::new(&staff, "Title", "Body", "title", "t.png", Utc::now()).unwrap();
    post.author_id = reader_id;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user::Model {
            id: reader_id,
            username: "reader".to_owned(),
            is_staff: false,
        }]])
        .into_connection();
    let repo = SqlPostRepository::new(db);

    let err = repo.create(post, &[]).await.unwrap_err();

    assert!(matches!(err, RepoError::Invalid(DomainError::NotStaff(id)) if id == reader_id));
}
