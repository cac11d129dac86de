#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod config;
pub mod domain;
pub mod error;
pub mod errors;
pub mod logging;
pub mod middleware;
pub mod protocol;
pub mod routes;
pub mod state;
pub mod trace_ctx;
pub mod ws;


pub use config::{GameOptions, ServerConfig};
pub use error::AppError;
pub use errors::{ErrorCode, GameError};
pub use middleware::cors::cors_middleware;
pub use middleware::request_trace::RequestTrace;
pub use middleware::structured_logger::StructuredLogger;
pub use state::app_state::AppState;
pub use ws::hub::GameRegistry;

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    test_bootstrap::logging::init();
}
