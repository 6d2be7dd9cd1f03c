//! Database access: connections, entities and repositories.

mod comment_repo;
mod connections;
mod error;
mod post_repo;
mod sql_base;
mod tag_repo;
mod user_repo;

pub mod entity;

pub use comment_repo::SqlCommentRepository;
pub use connections::{ConfigError, DatabaseConfig, connect};
pub use post_repo::SqlPostRepository;
pub use sql_base::SqlBaseRepository;
pub use tag_repo::SqlTagRepository;
pub use user_repo::SqlUserRepository;

#[cfg(test)]
mod tests;
