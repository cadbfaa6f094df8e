use axum::{
    extract::{rejection::JsonRejection, State},
    response::Redirect,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::instrument;

use crate::{
    access::{self, Caller, Operation},
    auth::{
        dto::{AccountResponse, LoginRequest, SignupRequest},
        services::Credentials,
    },
    error::{AppError, AppResult},
    sessions,
    state::AppState,
};

pub const SIGNUP_FLASH: &str = "Your signup was successful. Please log in.";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/user/signup", post(signup))
        .route("/user/login", post(login))
        .route("/user/logout", post(logout))
}

pub fn account_routes() -> Router<AppState> {
    Router::new().route("/account/view", get(account))
}

#[instrument(skip(state, jar, payload))]
pub async fn signup(
    State(state): State<AppState>,
    caller: Caller,
    jar: CookieJar,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> AppResult<(CookieJar, Redirect)> {
    access::decide(Operation::Register, &caller).into_result()?;
    let Json(payload) = payload?;

    state
        .credentials
        .register(&payload.name, &payload.email, &payload.password)
        .await?;

    let token = sessions::token_from(&jar, &state.config.session);
    let token = state.sessions.set_flash(token.as_deref(), SIGNUP_FLASH).await?;
    let jar = jar.add(sessions::cookie(&state.config.session, token));
    Ok((jar, Redirect::to("/user/login")))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    caller: Caller,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> AppResult<(CookieJar, Redirect)> {
    access::decide(Operation::Login, &caller).into_result()?;
    let Json(payload) = payload?;
    Credentials::validate_login(&payload.email, &payload.password).into_result()?;

    let user_id = state
        .credentials
        .authenticate(&payload.email, &payload.password)
        .await?;

    let token = sessions::token_from(&jar, &state.config.session);
    let token = state.sessions.login(token.as_deref(), user_id).await?;
    let jar = jar.add(sessions::cookie(&state.config.session, token));
    Ok((jar, Redirect::to("/snippet/create")))
}

#[instrument(skip(state, jar))]
pub async fn logout(
    State(state): State<AppState>,
    caller: Caller,
    jar: CookieJar,
) -> AppResult<(CookieJar, Redirect)> {
    access::decide(Operation::Logout, &caller).into_result()?;

    let token = sessions::token_from(&jar, &state.config.session);
    let token = state.sessions.logout(token.as_deref()).await?;
    let jar = jar.add(sessions::cookie(&state.config.session, token));
    Ok((jar, Redirect::to("/")))
}

#[instrument(skip(state, jar))]
pub async fn account(
    State(state): State<AppState>,
    caller: Caller,
    jar: CookieJar,
) -> AppResult<Json<AccountResponse>> {
    access::decide(Operation::ViewAccount, &caller).into_result()?;
    let user_id = caller.user_id().ok_or(AppError::AuthenticationRequired)?;

    let user = state.credentials.get(user_id).await?;
    let token = sessions::token_from(&jar, &state.config.session);
    let flash = state.sessions.take_flash(token.as_deref()).await?;

    Ok(Json(AccountResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        created: user.created,
        flash,
    }))
}
