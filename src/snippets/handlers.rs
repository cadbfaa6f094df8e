use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Redirect,
    routing::get,
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use time::Duration;
use tracing::instrument;

use crate::{
    access::{self, Caller, Operation},
    error::{AppError, AppResult, FieldErrors},
    sessions,
    snippets::{
        dto::{
            CreateFormResponse, CreateSnippetRequest, HomeResponse, SnippetResponse,
            PERMITTED_EXPIRY_DAYS,
        },
        services::{Snippets, LATEST_LIMIT},
    },
    state::AppState,
    validator,
};

pub const CREATED_FLASH: &str = "Snippet successfully created!";

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/snippet/view/:id", get(view))
}

pub fn write_routes() -> Router<AppState> {
    Router::new().route("/snippet/create", get(create_form).post(create))
}

#[instrument(skip(state, jar))]
pub async fn home(
    State(state): State<AppState>,
    caller: Caller,
    jar: CookieJar,
) -> AppResult<Json<HomeResponse>> {
    access::decide(Operation::ListSnippets, &caller).into_result()?;

    let snippets = state.snippets.latest(LATEST_LIMIT).await?;
    let token = sessions::token_from(&jar, &state.config.session);
    let flash = state.sessions.take_flash(token.as_deref()).await?;
    Ok(Json(HomeResponse { flash, snippets }))
}

#[instrument(skip(state, jar))]
pub async fn view(
    State(state): State<AppState>,
    caller: Caller,
    jar: CookieJar,
    Path(id): Path<String>,
) -> AppResult<Json<SnippetResponse>> {
    access::decide(Operation::ViewSnippet, &caller).into_result()?;

    let id = id
        .parse::<i64>()
        .ok()
        .filter(|id| *id >= 1)
        .ok_or(AppError::NotFound)?;
    let snippet = state.snippets.get(id).await?;

    let token = sessions::token_from(&jar, &state.config.session);
    let flash = state.sessions.take_flash(token.as_deref()).await?;
    Ok(Json(SnippetResponse { flash, snippet }))
}

#[instrument]
pub async fn create_form(caller: Caller) -> AppResult<Json<CreateFormResponse>> {
    access::decide(Operation::ShowCreateForm, &caller).into_result()?;
    Ok(Json(CreateFormResponse { expires: 365 }))
}

#[instrument(skip(state, jar, payload))]
pub async fn create(
    State(state): State<AppState>,
    caller: Caller,
    jar: CookieJar,
    payload: Result<Json<CreateSnippetRequest>, JsonRejection>,
) -> AppResult<(CookieJar, Redirect)> {
    access::decide(Operation::CreateSnippet, &caller).into_result()?;
    let Json(payload) = payload?;

    let mut errors = FieldErrors::new();
    let expires_in = if validator::permitted_value(payload.expires, &PERMITTED_EXPIRY_DAYS) {
        Duration::days(payload.expires)
    } else {
        errors.add("expires", "This field must equal 1, 7 or 365");
        Duration::ZERO
    };
    errors.merge(Snippets::validate(&payload.title, &payload.content, expires_in));
    errors.into_result()?;

    let id = state
        .snippets
        .insert(&payload.title, &payload.content, expires_in)
        .await?;

    let token = sessions::token_from(&jar, &state.config.session);
    let token = state.sessions.set_flash(token.as_deref(), CREATED_FLASH).await?;
    let jar = jar.add(sessions::cookie(&state.config.session, token));
    Ok((jar, Redirect::to(&format!("/snippet/view/{id}"))))
}
