use crate::accounts::{self, Credentials, Registration};
use crate::error::AppError;
use crate::http::error::ok;
use crate::http::types::{json_body, session_token, AppState};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, HeaderValue};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

async fn register(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    // Hashes the password; keep it ahead of the lock.
    let reg = Registration::from_params(&json_body(payload)?)?;
    let user = accounts::register(&state.db.lock(), &reg)?;
    Ok(ok(user))
}

async fn login(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let creds = Credentials::from_params(&json_body(payload)?)?;
    // The password check runs between the two locks.
    let account = accounts::find_account(&state.db.lock(), &creds.email)?;
    let session = accounts::authenticate(account, &creds.password)?;
    let token = accounts::open_session(&state.db.lock(), &session, state.session_ttl)?;
    let cookie = HeaderValue::from_str(&state.session_cookie(&token)).map_err(anyhow::Error::from)?;
    Ok((
        [(SET_COOKIE, cookie)],
        ok(json!({
            "id": session.user_id,
            "name": session.name,
            "role": session.role,
            "class_id": session.class_id,
        })),
    ))
}

async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    accounts::logout(&state.db.lock(), session_token(&headers).as_deref())?;
    let cookie =
        HeaderValue::from_str(&state.cleared_session_cookie()).map_err(anyhow::Error::from)?;
    Ok(([(SET_COOKIE, cookie)], ok(json!({ "logged_out": true }))))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", get(logout))
}
