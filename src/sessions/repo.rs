use anyhow::Context;
use async_trait::async_trait;
use sqlx::{types::Json, PgPool};
use time::OffsetDateTime;

use crate::error::AppResult;
use crate::sessions::repo_types::{EditOutcome, SessionData, SessionEdit, SessionWrite};

/// Durable session storage keyed by opaque token.
///
/// A record whose last access is not after `idle_since` is treated exactly like
/// a missing one. Every call is a single transaction, so concurrent requests
/// carrying the same token cannot lose each other's updates.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns the live bag under `token` and refreshes its last access.
    async fn load(
        &self,
        token: &str,
        now: OffsetDateTime,
        idle_since: OffsetDateTime,
    ) -> AppResult<Option<SessionData>>;

    /// Applies `edit` to the bag under `current`. When the edit creates or
    /// rotates the session, the bag is stored under `fresh`.
    async fn apply(
        &self,
        current: Option<&str>,
        fresh: &str,
        edit: &SessionEdit,
        now: OffsetDateTime,
        idle_since: OffsetDateTime,
    ) -> AppResult<EditOutcome>;
}

#[derive(Clone)]
pub struct PgSessionStore {
    db: PgPool,
}

impl PgSessionStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn load(
        &self,
        token: &str,
        now: OffsetDateTime,
        idle_since: OffsetDateTime,
    ) -> AppResult<Option<SessionData>> {
        let data = sqlx::query_scalar::<_, Json<SessionData>>(
            r#"
            UPDATE sessions
               SET last_access = $2
             WHERE token = $1 AND last_access > $3
            RETURNING data
            "#,
        )
        .bind(token)
        .bind(now)
        .bind(idle_since)
        .fetch_optional(&self.db)
        .await
        .context("load session")?;
        Ok(data.map(|Json(data)| data))
    }

    async fn apply(
        &self,
        current: Option<&str>,
        fresh: &str,
        edit: &SessionEdit,
        now: OffsetDateTime,
        idle_since: OffsetDateTime,
    ) -> AppResult<EditOutcome> {
        let mut tx = self.db.begin().await.context("begin session tx")?;

        let live = match current {
            Some(token) => sqlx::query_scalar::<_, Json<SessionData>>(
                r#"
                SELECT data
                  FROM sessions
                 WHERE token = $1 AND last_access > $2
                   FOR UPDATE
                "#,
            )
            .bind(token)
            .bind(idle_since)
            .fetch_optional(&mut *tx)
            .await
            .context("lock session")?
            .map(|Json(data)| (token, data)),
            None => None,
        };

        let (write, flash) = edit.resolve(live);
        let token = match write {
            SessionWrite::Skip => None,
            SessionWrite::Keep { token, data } => {
                sqlx::query("UPDATE sessions SET data = $2, last_access = $3 WHERE token = $1")
                    .bind(token)
                    .bind(Json(&data))
                    .bind(now)
                    .execute(&mut *tx)
                    .await
                    .context("update session")?;
                Some(token.to_owned())
            }
            SessionWrite::Rotate { data } => {
                if let Some(old) = current {
                    sqlx::query("DELETE FROM sessions WHERE token = $1")
                        .bind(old)
                        .execute(&mut *tx)
                        .await
                        .context("delete rotated session")?;
                }
                sqlx::query(
                    "INSERT INTO sessions (token, data, last_access) VALUES ($1, $2, $3)",
                )
                .bind(fresh)
                .bind(Json(&data))
                .bind(now)
                .execute(&mut *tx)
                .await
                .context("insert session")?;
                Some(fresh.to_owned())
            }
        };

        tx.commit().await.context("commit session tx")?;
        Ok(EditOutcome { token, flash })
    }
}
