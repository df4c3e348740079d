use crate::classes;
use crate::error::AppError;
use crate::http::error::ok;
use crate::http::types::{json_body, AppState};
use crate::model::{Role, Session};
use crate::params::required_str;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;

async fn list(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let classes = classes::list_classes(&state.db.lock())?;
    Ok(ok(classes))
}

async fn create(
    State(state): State<AppState>,
    session: Session,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    // Role first, so a student gets 401 whatever the body says.
    session.require(Role::Teacher)?;
    let name = required_str(&json_body(payload)?, "name")?;
    let class = classes::create_class(&state.db.lock(), &session, &name)?;
    Ok(ok(class))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/classes", get(list).post(create))
}
