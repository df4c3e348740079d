mod error;
mod handlers;
mod router;
mod types;

pub use router::serve;
pub use types::AppState;
