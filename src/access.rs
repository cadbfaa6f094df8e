use tracing::debug;

use crate::auth::services::Credentials;
use crate::error::{AppError, AppResult};
use crate::sessions::services::SessionManager;

/// Operations reachable from the outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListSnippets,
    ViewSnippet,
    ShowCreateForm,
    CreateSnippet,
    Register,
    Login,
    Logout,
    ViewAccount,
}

impl Operation {
    pub fn requires_authentication(self) -> bool {
        match self {
            Operation::ListSnippets
            | Operation::ViewSnippet
            | Operation::Register
            | Operation::Login => false,
            Operation::ShowCreateForm
            | Operation::CreateSnippet
            | Operation::Logout
            | Operation::ViewAccount => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller {
    Anonymous,
    Authenticated(i64),
}

impl Caller {
    pub fn user_id(&self) -> Option<i64> {
        match self {
            Caller::Anonymous => None,
            Caller::Authenticated(id) => Some(*id),
        }
    }
}

/// Why an operation was refused. No resource has an owner, so a caller is
/// never forbidden outright; it can only be asked to log in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    AuthenticationRequired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn into_result(self) -> AppResult<()> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(DenyReason::AuthenticationRequired) => {
                Err(AppError::AuthenticationRequired)
            }
        }
    }
}

pub fn decide(op: Operation, caller: &Caller) -> Decision {
    match (op.requires_authentication(), caller) {
        (true, Caller::Anonymous) => Decision::Deny(DenyReason::AuthenticationRequired),
        _ => Decision::Allow,
    }
}

/// Resolves the caller behind `token`. A session that points at a user who no
/// longer exists counts as anonymous.
pub async fn identify(
    sessions: &SessionManager,
    credentials: &Credentials,
    token: Option<&str>,
) -> AppResult<Caller> {
    let Some(user_id) = sessions.get_authenticated_user(token).await? else {
        return Ok(Caller::Anonymous);
    };
    if credentials.exists(user_id).await? {
        Ok(Caller::Authenticated(user_id))
    } else {
        debug!(user_id, "session references unknown user");
        Ok(Caller::Anonymous)
    }
}
