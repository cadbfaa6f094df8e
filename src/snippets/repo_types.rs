use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

/// Snippet record in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Snippet {
    pub id: i64,
    pub title: String,
    pub content: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub expires: OffsetDateTime,
}

impl Snippet {
    pub fn is_visible(&self, now: OffsetDateTime) -> bool {
        self.expires > now
    }
}

/// Validated snippet ready to be persisted.
#[derive(Debug, Clone)]
pub struct NewSnippet {
    pub title: String,
    pub content: String,
    pub created: OffsetDateTime,
    pub expires: OffsetDateTime,
}
