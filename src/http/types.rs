use crate::accounts;
use crate::error::AppError;
use crate::model::Session;
use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Duration;
use parking_lot::Mutex;
use rusqlite::Connection;
use serde_json::Value;
use std::sync::Arc;

pub const SESSION_COOKIE: &str = "essayd_session";

/// Handed to every handler through axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Connection>>,
    pub session_ttl: Duration,
    pub secure_cookies: bool,
}

impl AppState {
    pub fn new(conn: Connection, session_ttl: Duration, secure_cookies: bool) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            session_ttl,
            secure_cookies,
        }
    }

    pub fn session_cookie(&self, token: &str) -> String {
        self.cookie(token, self.session_ttl.num_seconds())
    }

    pub fn cleared_session_cookie(&self) -> String {
        self.cookie("", 0)
    }

    fn cookie(&self, value: &str, max_age: i64) -> String {
        let mut cookie =
            format!("{SESSION_COOKIE}={value}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age}");
        if self.secure_cookies {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Handlers that take a `Session` only run for signed-in callers; everyone
/// else gets a 401 before the body is even read.
impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = session_token(&parts.headers) else {
            return Err(AppError::unauthorized("sign in first"));
        };
        let session = accounts::resolve_session(&state.db.lock(), &token)?;
        session.ok_or_else(|| AppError::unauthorized("session expired or signed out"))
    }
}

pub fn json_body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    match payload {
        Ok(Json(body)) if body.is_object() => Ok(body),
        Ok(_) => Err(AppError::bad_params("request body must be a JSON object")),
        Err(rejection) => Err(AppError::bad_params(rejection.body_text())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn finds_session_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(
            COOKIE,
            HeaderValue::from_static("lang=pt; essayd_session=abc-123 ; x=y"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("abc-123"));
    }

    #[test]
    fn empty_or_absent_cookie_is_no_session() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_token(&headers), None);
        headers.insert(COOKIE, HeaderValue::from_static("essayd_session="));
        assert_eq!(session_token(&headers), None);
    }

    #[test]
    fn cookies_carry_lifetime_and_secure_flag() {
        let conn = Connection::open_in_memory().expect("db");
        let state = AppState::new(conn, Duration::hours(2), true);
        assert_eq!(
            state.session_cookie("tok"),
            "essayd_session=tok; HttpOnly; SameSite=Lax; Path=/; Max-Age=7200; Secure"
        );
        assert!(state.cleared_session_cookie().contains("Max-Age=0"));
    }
}
