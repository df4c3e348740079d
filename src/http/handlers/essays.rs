use crate::error::AppError;
use crate::essays::{self, Grade, Submission};
use crate::http::error::ok;
use crate::http::types::{json_body, AppState};
use crate::model::{Role, Session};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;

async fn list(State(state): State<AppState>, session: Session) -> Result<Json<Value>, AppError> {
    let essays = essays::list_essays(&state.db.lock(), &session)?;
    Ok(ok(essays))
}

async fn submit(
    State(state): State<AppState>,
    session: Session,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    // Role first, so a teacher gets 401 whatever the body says.
    session.require(Role::Student)?;
    let submission = Submission::from_params(&json_body(payload)?)?;
    let essay = essays::submit_essay(&state.db.lock(), &session, &submission)?;
    Ok(ok(essay))
}

async fn grade(
    State(state): State<AppState>,
    session: Session,
    Path(essay_id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    session.require(Role::Teacher)?;
    let grade = Grade::from_params(&json_body(payload)?)?;
    let essay = essays::grade_essay(&state.db.lock(), &session, &essay_id, &grade)?;
    Ok(ok(essay))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/essays", get(list).post(submit))
        .route("/essays/{id}/grade", post(grade))
}
