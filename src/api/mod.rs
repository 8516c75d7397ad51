//! HTTP layer: routing, middleware and handlers

pub mod app;
pub mod error;
pub mod middleware;
pub mod services;

pub use app::{AppState, build_app, build_cors};
pub use error::{ApiError, ErrorBody};
