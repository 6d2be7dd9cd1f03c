//! Ports - trait definitions the storage layer must implement.

mod repository;

pub use repository::{
    BaseRepository, CommentRepository, PostRepository, TagRepository, UserRepository,
};
