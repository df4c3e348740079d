use crate::error::AppError;
use crate::http::error::ok;
use crate::http::types::{json_body, AppState};
use crate::model::{Role, Session};
use crate::topics::{self, NewTopic};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::Value;

async fn list(State(state): State<AppState>, session: Session) -> Result<Json<Value>, AppError> {
    let topics = topics::list_topics(&state.db.lock(), &session)?;
    Ok(ok(topics))
}

async fn create(
    State(state): State<AppState>,
    session: Session,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    session.require(Role::Teacher)?;
    let new = NewTopic::from_params(&json_body(payload)?)?;
    let topic = topics::create_topic(&state.db.lock(), &session, &new)?;
    Ok(ok(topic))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/topics", get(list).post(create))
}
