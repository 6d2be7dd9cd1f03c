use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validate::{Validate, check_len};
use crate::error::DomainError;

/// User record owned by the identity subsystem.
///
/// Only the identifier, the username and the staff flag are read here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub is_staff: bool,
}

impl User {
    pub fn new(username: impl Into<String>, is_staff: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            is_staff,
        }
    }

    /// A user allowed to author posts.
    pub fn staff(username: impl Into<String>) -> Self {
        Self::new(username, true)
    }
}

impl Validate for User {
    fn full_clean(&mut self) -> Result<(), DomainError> {
        check_len("username", &self.username, None)
    }
}
