use std::sync::Arc;

use crate::auth::repo::{PgUserStore, UserStore};
use crate::auth::services::Credentials;
use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::db;
use crate::sessions::repo::{PgSessionStore, SessionStore};
use crate::sessions::services::SessionManager;
use crate::snippets::repo::{PgSnippetStore, SnippetStore};
use crate::snippets::services::Snippets;

/// Everything a request handler needs, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub snippets: Snippets,
    pub credentials: Credentials,
    pub sessions: SessionManager,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let pool = db::connect(&config).await?;
        db::migrate(&pool).await?;

        Ok(Self::from_parts(
            config,
            Arc::new(PgSnippetStore::new(pool.clone())),
            Arc::new(PgUserStore::new(pool.clone())),
            Arc::new(PgSessionStore::new(pool)),
            Arc::new(SystemClock),
        ))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        snippet_store: Arc<dyn SnippetStore>,
        user_store: Arc<dyn UserStore>,
        session_store: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let ttl = config.session.ttl();
        Self {
            snippets: Snippets::new(snippet_store, clock.clone()),
            credentials: Credentials::new(user_store, clock.clone()),
            sessions: SessionManager::new(session_store, clock, ttl),
            config,
        }
    }

    /// In-memory stores driven by `clock`; touches no database.
    #[cfg(test)]
    pub fn fake(clock: Arc<crate::clock::ManualClock>) -> Self {
        use crate::auth::memory::InMemoryUserStore;
        use crate::sessions::memory::InMemorySessionStore;
        use crate::snippets::memory::InMemorySnippetStore;

        Self::from_parts(
            Arc::new(AppConfig::test()),
            Arc::new(InMemorySnippetStore::new()),
            Arc::new(InMemoryUserStore::new()),
            Arc::new(InMemorySessionStore::new()),
            clock,
        )
    }
}
