use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::error::{AppError, AppResult};
use crate::snippets::repo::SnippetStore;
use crate::snippets::repo_types::{NewSnippet, Snippet};

#[derive(Default)]
pub struct InMemorySnippetStore {
    rows: Mutex<Vec<Snippet>>,
}

impl InMemorySnippetStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn rows(&self) -> AppResult<std::sync::MutexGuard<'_, Vec<Snippet>>> {
        self.rows
            .lock()
            .map_err(|e| AppError::StoreUnavailable(anyhow::anyhow!("snippet store poisoned: {e}")))
    }
}

#[async_trait]
impl SnippetStore for InMemorySnippetStore {
    async fn insert(&self, snippet: NewSnippet) -> AppResult<i64> {
        let mut rows = self.rows()?;
        let id = rows.last().map_or(1, |s| s.id + 1);
        rows.push(Snippet {
            id,
            title: snippet.title,
            content: snippet.content,
            created: snippet.created,
            expires: snippet.expires,
        });
        Ok(id)
    }

    async fn get(&self, id: i64, now: OffsetDateTime) -> AppResult<Option<Snippet>> {
        Ok(self
            .rows()?
            .iter()
            .find(|s| s.id == id && s.is_visible(now))
            .cloned())
    }

    async fn latest(&self, now: OffsetDateTime, limit: i64) -> AppResult<Vec<Snippet>> {
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(self
            .rows()?
            .iter()
            .rev()
            .filter(|s| s.is_visible(now))
            .take(limit)
            .cloned()
            .collect())
    }
}
