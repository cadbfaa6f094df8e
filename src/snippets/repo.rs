use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;

use crate::error::AppResult;
use crate::snippets::repo_types::{NewSnippet, Snippet};

/// Persistence for snippets. Visibility is always evaluated against the `now`
/// passed in, never against the store's own clock.
#[async_trait]
pub trait SnippetStore: Send + Sync {
    /// Persist a snippet and return its freshly assigned id.
    async fn insert(&self, snippet: NewSnippet) -> AppResult<i64>;
    /// Fetch a snippet that is still visible at `now`.
    async fn get(&self, id: i64, now: OffsetDateTime) -> AppResult<Option<Snippet>>;
    /// Most recent snippets visible at `now`, newest id first.
    async fn latest(&self, now: OffsetDateTime, limit: i64) -> AppResult<Vec<Snippet>>;
}

#[derive(Clone)]
pub struct PgSnippetStore {
    db: PgPool,
}

impl PgSnippetStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl SnippetStore for PgSnippetStore {
    async fn insert(&self, snippet: NewSnippet) -> AppResult<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO snippets (title, content, created, expires)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&snippet.title)
        .bind(&snippet.content)
        .bind(snippet.created)
        .bind(snippet.expires)
        .fetch_one(&self.db)
        .await
        .context("insert snippet")?;
        Ok(id)
    }

    async fn get(&self, id: i64, now: OffsetDateTime) -> AppResult<Option<Snippet>> {
        let snippet = sqlx::query_as::<_, Snippet>(
            r#"
            SELECT id, title, content, created, expires
            FROM snippets
            WHERE id = $1 AND expires > $2
            "#,
        )
        .bind(id)
        .bind(now)
        .fetch_optional(&self.db)
        .await
        .context("get snippet")?;
        Ok(snippet)
    }

    async fn latest(&self, now: OffsetDateTime, limit: i64) -> AppResult<Vec<Snippet>> {
        let rows = sqlx::query_as::<_, Snippet>(
            r#"
            SELECT id, title, content, created, expires
            FROM snippets
            WHERE expires > $1
            ORDER BY id DESC
            LIMIT $2
            "#,
        )
        .bind(now)
        .bind(limit)
        .fetch_all(&self.db)
        .await
        .context("list latest snippets")?;
        Ok(rows)
    }
}
