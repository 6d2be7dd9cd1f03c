//! Domain entities - the core blog records and their enriched views.

mod comment;
mod post;
mod tag;
mod user;
mod validate;
mod view;

pub use comment::Comment;
pub use post::{POST_SLUG_MAX_LEN, POST_TITLE_MAX_LEN, Post};
pub use tag::{TAG_TITLE_MAX_LEN, Tag};
pub use user::User;
pub use validate::Validate;
pub use view::{PostView, TagWithPostsCount};
