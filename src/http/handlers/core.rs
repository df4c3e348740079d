use crate::error::AppError;
use crate::essays;
use crate::http::error::ok;
use crate::http::types::AppState;
use crate::model::Session;
use crate::topics;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

async fn health() -> Json<Value> {
    ok(json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn me(session: Session) -> Json<Value> {
    ok(session)
}

/// Everything the signed-in user's landing page shows, in one round trip.
async fn dashboard(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Value>, AppError> {
    let (topics, essays) = {
        let conn = state.db.lock();
        (
            topics::list_topics(&conn, &session)?,
            essays::list_essays(&conn, &session)?,
        )
    };
    Ok(ok(json!({
        "user": session,
        "topics": topics,
        "essays": essays,
    })))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/me", get(me))
        .route("/dashboard", get(dashboard))
}
