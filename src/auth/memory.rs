use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::auth::repo::UserStore;
use crate::auth::repo_types::{NewUser, User};
use crate::error::{AppError, AppResult};

#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn users(&self) -> AppResult<MutexGuard<'_, Vec<User>>> {
        self.users
            .lock()
            .map_err(|e| AppError::StoreUnavailable(anyhow::anyhow!("user store poisoned: {e}")))
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: NewUser) -> AppResult<i64> {
        let mut users = self.users()?;
        if users.iter().any(|u| u.email == user.email) {
            return Err(AppError::DuplicateEmail);
        }
        let id = users.last().map_or(1, |u| u.id + 1);
        users.push(User {
            id,
            name: user.name,
            email: user.email,
            hashed_password: user.hashed_password,
            created: user.created,
        });
        Ok(id)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self.users()?.iter().find(|u| u.email == email).cloned())
    }

    async fn find(&self, id: i64) -> AppResult<Option<User>> {
        Ok(self.users()?.iter().find(|u| u.id == id).cloned())
    }

    async fn exists(&self, id: i64) -> AppResult<bool> {
        Ok(self.users()?.iter().any(|u| u.id == id))
    }
}
