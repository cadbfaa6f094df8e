use serde::{Deserialize, Serialize};

/// Server-side bag attached to a session token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authenticated_user_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flash: Option<String>,
}

/// One read-modify-write step on a session bag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEdit {
    Login(i64),
    Logout { flash: Option<String> },
    SetFlash(String),
    TakeFlash,
}

/// What a store must persist after resolving an edit against the live bag.
#[derive(Debug, PartialEq, Eq)]
pub enum SessionWrite<'a> {
    /// Nothing to persist; no session exists afterwards.
    Skip,
    /// Overwrite the bag under the caller's still-valid token.
    Keep { token: &'a str, data: SessionData },
    /// Drop the caller's token (if any) and store the bag under a fresh one.
    Rotate { data: SessionData },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    /// Token that now refers to the session, if one exists.
    pub token: Option<String>,
    /// Flash message consumed by the edit.
    pub flash: Option<String>,
}

impl SessionEdit {
    /// Login and logout change authentication state, so they always move the
    /// bag to a new token.
    pub fn rotates(&self) -> bool {
        matches!(self, SessionEdit::Login(_) | SessionEdit::Logout { .. })
    }

    /// Applies the edit to `live` (the bag under the caller's token, when that
    /// token is known and not idle past the TTL). Returns the write to perform
    /// and any flash message taken out of the bag.
    pub fn resolve<'a>(
        &self,
        live: Option<(&'a str, SessionData)>,
    ) -> (SessionWrite<'a>, Option<String>) {
        if live.is_none() && *self == SessionEdit::TakeFlash {
            return (SessionWrite::Skip, None);
        }

        let (token, mut data) = match live {
            Some((token, data)) => (Some(token), data),
            None => (None, SessionData::default()),
        };

        let taken = match self {
            SessionEdit::Login(user_id) => {
                data.authenticated_user_id = Some(*user_id);
                None
            }
            SessionEdit::Logout { flash } => {
                data.authenticated_user_id = None;
                if flash.is_some() {
                    data.flash = flash.clone();
                }
                None
            }
            SessionEdit::SetFlash(message) => {
                data.flash = Some(message.clone());
                None
            }
            SessionEdit::TakeFlash => data.flash.take(),
        };

        let write = match token {
            Some(token) if !self.rotates() => SessionWrite::Keep { token, data },
            _ => SessionWrite::Rotate { data },
        };
        (write, taken)
    }
}
