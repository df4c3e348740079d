use super::handlers;
use super::types::AppState;
use crate::error::AppError;
use anyhow::Context;
use axum::extract::Request;
use axum::http::Uri;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::Router;
use serde_json::json;
use std::net::SocketAddr;
use std::time::Instant;
use tokio::net::TcpListener;

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(handlers::core::routes())
        .merge(handlers::accounts::routes())
        .merge(handlers::classes::routes())
        .merge(handlers::topics::routes())
        .merge(handlers::essays::routes())
        .fallback(unknown_route)
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

async fn unknown_route(uri: Uri) -> AppError {
    AppError::NotFound(format!("unknown route: {}", uri.path()))
}

async fn log_request(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(req).await;

    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;
    if status.is_server_error() {
        tracing::error!(%method, %path, status = status.as_u16(), elapsed_ms, "request");
    } else {
        tracing::info!(%method, %path, status = status.as_u16(), elapsed_ms, "request");
    }
    response
}

/// Binds `bind`, announces the bound address as one JSON line on stdout and
/// serves until Ctrl-C.
pub async fn serve(bind: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    let addr = listener.local_addr()?;
    tracing::info!(bind = %addr, "listening");
    println!("{}", json!({ "listening": addr.to_string() }));

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown requested"),
        Err(e) => {
            tracing::warn!(error = %e, "cannot listen for Ctrl-C; running until killed");
            std::future::pending::<()>().await;
        }
    }
}
