mod accounts;
mod classes;
mod config;
mod db;
mod error;
mod essays;
mod http;
mod logging;
mod model;
mod params;
mod password;
mod topics;

use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::Config::parse();
    logging::init(config.log_format)?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        database = %config.database.display(),
        "starting"
    );

    let conn = db::open_db(&config.database)?;
    let state = http::AppState::new(conn, config.session_ttl(), config.secure_cookies);
    http::serve(config.bind, state).await
}
