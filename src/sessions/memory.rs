use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::error::{AppError, AppResult};
use crate::sessions::repo::SessionStore;
use crate::sessions::repo_types::{EditOutcome, SessionData, SessionEdit, SessionWrite};

struct Record {
    data: SessionData,
    last_access: OffsetDateTime,
}

#[derive(Default)]
pub struct InMemorySessionStore {
    records: Mutex<HashMap<String, Record>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    fn records(&self) -> AppResult<MutexGuard<'_, HashMap<String, Record>>> {
        self.records
            .lock()
            .map_err(|e| AppError::StoreUnavailable(anyhow::anyhow!("session store poisoned: {e}")))
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(
        &self,
        token: &str,
        now: OffsetDateTime,
        idle_since: OffsetDateTime,
    ) -> AppResult<Option<SessionData>> {
        let mut records = self.records()?;
        match records.get_mut(token) {
            Some(record) if record.last_access > idle_since => {
                record.last_access = now;
                Ok(Some(record.data.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn apply(
        &self,
        current: Option<&str>,
        fresh: &str,
        edit: &SessionEdit,
        now: OffsetDateTime,
        idle_since: OffsetDateTime,
    ) -> AppResult<EditOutcome> {
        let mut records = self.records()?;

        let live = current.and_then(|token| {
            records
                .get(token)
                .filter(|r| r.last_access > idle_since)
                .map(|r| (token, r.data.clone()))
        });

        let (write, flash) = edit.resolve(live);
        let token = match write {
            SessionWrite::Skip => None,
            SessionWrite::Keep { token, data } => {
                records.insert(token.to_owned(), Record { data, last_access: now });
                Some(token.to_owned())
            }
            SessionWrite::Rotate { data } => {
                if let Some(old) = current {
                    records.remove(old);
                }
                records.insert(fresh.to_owned(), Record { data, last_access: now });
                Some(fresh.to_owned())
            }
        };
        Ok(EditOutcome { token, flash })
    }
}
