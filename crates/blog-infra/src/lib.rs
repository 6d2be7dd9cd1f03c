//! # Blog Infrastructure
//!
//! SeaORM implementations of the repository ports defined in `blog-core`,
//! plus connection configuration.
//!
//! ## Feature Flags
//!
//! - `sqlite` - SQLite driver in addition to PostgreSQL

pub mod database;

pub use database::{
    ConfigError, DatabaseConfig, SqlCommentRepository, SqlPostRepository, SqlTagRepository,
    SqlUserRepository, connect,
};
