use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::auth::repo_types::{NewUser, User};
use crate::error::{AppError, AppResult};

/// Persistence for user accounts. Email is unique and compared exactly as stored.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create a user; fails with `DuplicateEmail` if the email is taken.
    async fn insert(&self, user: NewUser) -> AppResult<i64>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn find(&self, id: i64) -> AppResult<Option<User>>;
    async fn exists(&self, id: i64) -> AppResult<bool>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: NewUser) -> AppResult<i64> {
        let inserted = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (name, email, hashed_password, created)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.hashed_password)
        .bind(user.created)
        .fetch_one(&self.db)
        .await;

        match inserted {
            Ok(id) => Ok(id),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AppError::DuplicateEmail),
            Err(e) => Err(anyhow::Error::new(e).context("insert user").into()),
        }
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, hashed_password, created
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    async fn find(&self, id: i64) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, hashed_password, created
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find user by id")?;
        Ok(user)
    }

    async fn exists(&self, id: i64) -> AppResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT true FROM users WHERE id = $1)")
                .bind(id)
                .fetch_one(&self.db)
                .await
                .context("check user exists")?;
        Ok(exists)
    }
}
