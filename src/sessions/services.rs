use std::sync::Arc;

use time::{Duration, OffsetDateTime};
use tracing::{debug, info};

use crate::clock::Clock;
use crate::error::{AppError, AppResult};
use crate::sessions::repo::SessionStore;
use crate::sessions::repo_types::{EditOutcome, SessionEdit};
use crate::sessions::token;

pub const LOGGED_OUT_FLASH: &str = "You've been logged out successfully!";

/// Session authority. Unknown or idle tokens behave like a brand-new anonymous
/// session; they never produce an error.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self { store, clock, ttl }
    }

    fn window(&self) -> (OffsetDateTime, OffsetDateTime) {
        let now = self.clock.now();
        let idle_since = now
            .checked_sub(self.ttl)
            .unwrap_or(OffsetDateTime::UNIX_EPOCH);
        (now, idle_since)
    }

    pub async fn get_authenticated_user(&self, token: Option<&str>) -> AppResult<Option<i64>> {
        let Some(token) = token else {
            return Ok(None);
        };
        let (now, idle_since) = self.window();
        let data = self.store.load(token, now, idle_since).await?;
        Ok(data.and_then(|d| d.authenticated_user_id))
    }

    /// Marks the session as authenticated under a newly issued token.
    pub async fn login(&self, token: Option<&str>, user_id: i64) -> AppResult<String> {
        let outcome = self.apply(token, SessionEdit::Login(user_id)).await?;
        info!(user_id, "session authenticated");
        issued(outcome)
    }

    /// Drops authentication, rotates the token and leaves a logged-out flash.
    pub async fn logout(&self, token: Option<&str>) -> AppResult<String> {
        let edit = SessionEdit::Logout {
            flash: Some(LOGGED_OUT_FLASH.to_owned()),
        };
        let outcome = self.apply(token, edit).await?;
        info!("session logged out");
        issued(outcome)
    }

    /// Stores a one-shot message; returns the token the session now lives under.
    pub async fn set_flash(&self, token: Option<&str>, message: impl Into<String>) -> AppResult<String> {
        let outcome = self.apply(token, SessionEdit::SetFlash(message.into())).await?;
        issued(outcome)
    }

    pub async fn take_flash(&self, token: Option<&str>) -> AppResult<Option<String>> {
        let Some(token) = token else {
            return Ok(None);
        };
        let outcome = self.apply(Some(token), SessionEdit::TakeFlash).await?;
        Ok(outcome.flash)
    }

    async fn apply(&self, token: Option<&str>, edit: SessionEdit) -> AppResult<EditOutcome> {
        let (now, idle_since) = self.window();
        let fresh = token::generate();
        let outcome = self
            .store
            .apply(token, &fresh, &edit, now, idle_since)
            .await?;
        if outcome.token.as_deref() == Some(fresh.as_str()) {
            debug!(rotated = token.is_some(), "session token issued");
        }
        Ok(outcome)
    }
}

fn issued(outcome: EditOutcome) -> AppResult<String> {
    outcome
        .token
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("session edit left no token")))
}
