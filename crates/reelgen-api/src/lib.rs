//! Axum HTTP API server.
//!
//! This crate provides:
//! - `POST /api/render` in front of the scene assembly pipeline
//! - Static serving of finished videos under `/outputs`
//! - Shared-secret check, CORS and request logging
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
