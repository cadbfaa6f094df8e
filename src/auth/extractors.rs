use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::CookieJar;

use crate::access::{self, Caller};
use crate::error::AppError;
use crate::sessions;
use crate::state::AppState;

/// Resolves the caller from the session cookie. Never rejects for a missing or
/// stale session; only store failures surface as errors.
#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = sessions::token_from(&jar, &state.config.session);
        access::identify(&state.sessions, &state.credentials, token.as_deref()).await
    }
}
