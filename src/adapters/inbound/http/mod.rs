//! REST API under `/api/v1`, served with axum
mod device_handlers;
mod error;
mod middleware;
mod router;
mod scan_handlers;
mod server;
mod state;

pub use error::ApiError;
pub use router::build_router;
pub use server::serve;
pub use state::AppState;
