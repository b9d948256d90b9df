//! Axum HTTP API server for ASL sign prediction.
//!
//! This crate provides:
//! - The `/predict` endpoint running the skeleton classification pipeline
//! - CORS, request-size limiting, request logging
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
