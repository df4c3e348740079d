use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;

const DEFAULT_BIND: &str = "127.0.0.1:8080";
const DEFAULT_DATABASE: &str = "essayd.sqlite3";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Essay submission and grading service.
#[derive(Debug, Clone, Parser)]
#[command(name = "essayd", version, about)]
pub struct Config {
    /// Address to listen on. Port 0 picks a free port.
    #[arg(long, env = "ESSAYD_BIND", default_value = DEFAULT_BIND)]
    pub bind: SocketAddr,

    /// SQLite database file; created along with its directory if missing.
    #[arg(long, env = "ESSAYD_DATABASE", default_value = DEFAULT_DATABASE)]
    pub database: PathBuf,

    /// How long a login stays valid.
    #[arg(
        long,
        env = "ESSAYD_SESSION_TTL_HOURS",
        default_value_t = 24,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub session_ttl_hours: u32,

    /// Mark the session cookie `Secure` (only sent over HTTPS).
    #[arg(long, env = "ESSAYD_SECURE_COOKIES")]
    pub secure_cookies: bool,

    #[arg(long, env = "ESSAYD_LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Config {
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.session_ttl_hours))
    }
}
