//! # Blog Core
//!
//! The domain layer of the blog data layer.
//! Records, validation, composable query descriptions and the repository
//! ports live here; nothing in this crate talks to a database.

pub mod domain;
pub mod error;
pub mod ports;
pub mod query;

pub use error::{DomainError, RepoError};
pub use query::{PostFilter, PostOrder, PostQuery};
