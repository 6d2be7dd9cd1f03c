//! Composable post query descriptions.
//!
//! A [`PostQuery`] is a plain value: every refinement consumes the query and
//! returns a new one, and a repository turns the finished description into
//! SQL. Nothing here touches storage.
//!
//! ```
//! use blog_core::query::{PostOrder, PostQuery};
//!
//! let query = PostQuery::new().year(2023).popular().fetch_with_tags();
//! assert_eq!(query.order(), PostOrder::Popular);
//! assert!(query.prefetches_tags());
//! ```

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::error::DomainError;

/// Row filters. All filters in a query must match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostFilter {
    /// Published within the calendar year (UTC).
    Year(i32),
    Author(Uuid),
    /// Carries the tag.
    Tagged(Uuid),
    /// Liked by the user.
    LikedBy(Uuid),
    Slug(String),
}

/// Result ordering. The last ordering refinement wins.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PostOrder {
    /// Newest first.
    #[default]
    Newest,
    /// Oldest first.
    Oldest,
    /// Most distinct likers first, newest first among ties.
    Popular,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostQuery {
    filters: Vec<PostFilter>,
    order: PostOrder,
    prefetch_tags: bool,
    comments_count: bool,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl PostQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Posts published in calendar year `year`, oldest first.
    pub fn year(mut self, year: i32) -> Self {
        self.filters.push(PostFilter::Year(year));
        self.order = PostOrder::Oldest;
        self
    }

    /// Order by the number of distinct users who liked each post.
    pub fn popular(mut self) -> Self {
        self.order = PostOrder::Popular;
        self
    }

    /// Attach every post's tags, each annotated with its own post count.
    pub fn fetch_with_tags(mut self) -> Self {
        self.prefetch_tags = true;
        self
    }

    /// Attach comment counts after the posts have been materialized.
    pub fn fetch_with_comments_count(mut self) -> Self {
        self.comments_count = true;
        self
    }

    pub fn by_author(mut self, author_id: Uuid) -> Self {
        self.filters.push(PostFilter::Author(author_id));
        self
    }

    pub fn tagged(mut self, tag_id: Uuid) -> Self {
        self.filters.push(PostFilter::Tagged(tag_id));
        self
    }

    pub fn liked_by(mut self, user_id: Uuid) -> Self {
        self.filters.push(PostFilter::LikedBy(user_id));
        self
    }

    pub fn slug(mut self, slug: impl Into<String>) -> Self {
        self.filters.push(PostFilter::Slug(slug.into()));
        self
    }

    pub fn order_by(mut self, order: PostOrder) -> Self {
        self.order = order;
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn filters(&self) -> &[PostFilter] {
        &self.filters
    }

    pub fn order(&self) -> PostOrder {
        self.order
    }

    pub fn prefetches_tags(&self) -> bool {
        self.prefetch_tags
    }

    pub fn counts_comments(&self) -> bool {
        self.comments_count
    }

    pub fn limit_value(&self) -> Option<u64> {
        self.limit
    }

    pub fn offset_value(&self) -> Option<u64> {
        self.offset
    }
}

/// Half-open UTC range `[Jan 1 year, Jan 1 year+1)`.
pub fn year_bounds(year: i32) -> Result<(DateTime<Utc>, DateTime<Utc>), DomainError> {
    let start_of = |y: i32| Utc.with_ymd_and_hms(y, 1, 1, 0, 0, 0).single();
    let invalid = || DomainError::Validation(format!("year {year} is out of range"));

    let start = start_of(year).ok_or_else(invalid)?;
    let end = year
        .checked_add(1)
        .and_then(start_of)
        .ok_or_else(invalid)?;

    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_query_is_newest_first_without_enrichment() {
        let query = PostQuery::new();
        assert_eq!(query.order(), PostOrder::Newest);
        assert!(query.filters().is_empty());
        assert!(!query.prefetches_tags());
        assert!(!query.counts_comments());
        assert_eq!(query.limit_value(), None);
    }

    #[test]
    fn test_year_filters_and_orders_oldest_first() {
        let query = PostQuery::new().year(2021);
        assert_eq!(query.filters(), &[PostFilter::Year(2021)]);
        assert_eq!(query.order(), PostOrder::Oldest);
    }

    #[test]
    fn test_last_ordering_wins() {
        let query = PostQuery::new().year(2021).popular();
        assert_eq!(query.order(), PostOrder::Popular);

        let query = PostQuery::new().popular().year(2021);
        assert_eq!(query.order(), PostOrder::Oldest);
    }

    #[test]
    fn test_refinements_leave_the_source_query_untouched() {
        let base = PostQuery::new().limit(5);
        let refined = base.clone().popular().fetch_with_comments_count();
        assert_eq!(base.order(), PostOrder::Newest);
        assert!(!base.counts_comments());
        assert!(refined.counts_comments());
        assert_eq!(refined.limit_value(), Some(5));
    }

    #[test]
    fn test_year_bounds_are_half_open_calendar_year() {
        let (start, end) = year_bounds(2024).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_year_bounds_rejects_unrepresentable_year() {
        assert!(matches!(year_bounds(i32::MAX), Err(DomainError::Validation(_))));
    }
}
