use std::sync::Arc;

use time::Duration;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::error::{AppError, AppResult, FieldErrors};
use crate::snippets::repo::SnippetStore;
use crate::snippets::repo_types::{NewSnippet, Snippet};
use crate::validator::{self, BLANK};

pub const TITLE_MAX_CHARS: usize = 100;
pub const LATEST_LIMIT: usize = 10;

/// Snippet lifecycle: validated insertion and expiry-aware reads.
#[derive(Clone)]
pub struct Snippets {
    store: Arc<dyn SnippetStore>,
    clock: Arc<dyn Clock>,
}

impl Snippets {
    pub fn new(store: Arc<dyn SnippetStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn validate(title: &str, content: &str, expires_in: Duration) -> FieldErrors {
        let mut errors = FieldErrors::new();
        errors.check(validator::not_blank(title), "title", BLANK);
        errors.check(
            validator::max_chars(title, TITLE_MAX_CHARS),
            "title",
            "This field cannot be more than 100 characters long",
        );
        errors.check(validator::not_blank(content), "content", BLANK);
        errors.check(
            expires_in.is_positive(),
            "expires",
            "This field must be a positive duration",
        );
        errors
    }

    pub async fn insert(&self, title: &str, content: &str, expires_in: Duration) -> AppResult<i64> {
        Self::validate(title, content, expires_in).into_result()?;

        let created = self.clock.now();
        let expires = created.checked_add(expires_in).ok_or_else(|| {
            let mut errors = FieldErrors::new();
            errors.add("expires", "This field is out of range");
            AppError::Validation(errors)
        })?;

        let id = self
            .store
            .insert(NewSnippet {
                title: title.to_owned(),
                content: content.to_owned(),
                created,
                expires,
            })
            .await?;
        info!(snippet_id = id, %expires, "snippet created");
        Ok(id)
    }

    /// Expired and missing snippets are reported identically.
    pub async fn get(&self, id: i64) -> AppResult<Snippet> {
        let now = self.clock.now();
        match self.store.get(id, now).await?.filter(|s| s.is_visible(now)) {
            Some(snippet) => Ok(snippet),
            None => {
                debug!(snippet_id = id, "snippet not visible");
                Err(AppError::NotFound)
            }
        }
    }

    pub async fn latest(&self, limit: usize) -> AppResult<Vec<Snippet>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.store.latest(self.clock.now(), limit).await
    }
}
