//! User repository - read/write access to identity records.

use async_trait::async_trait;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};

use blog_core::domain::User;
use blog_core::error::RepoError;
use blog_core::ports::UserRepository;

use super::entity::user::{self, Entity as UserEntity};
use super::error::db_err;
use super::sql_base::SqlBaseRepository;

pub type SqlUserRepository = SqlBaseRepository<UserEntity>;

#[async_trait]
impl UserRepository for SqlUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(db_err)?;

        Ok(result.map(Into::into))
    }
}
