pub mod error_report;
pub mod events;
pub mod health;
pub mod info;
pub mod session;

use actix_web::{HttpResponse, web};

use crate::api::error::ApiError;

pub use events::{IngestSettings, RejectedEvent, partition_events};
pub use health::{HealthService, HealthSettings, health_routes};
pub use info::info_routes;

/// 兜底 404
pub async fn not_found() -> Result<HttpResponse, ApiError> {
    Err(ApiError::NotFound)
}

/// `/api` 下的上报路由
pub fn ingest_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/session", web::post().to(session::record_session))
        .route("/events", web::post().to(events::record_events))
        .route("/errors", web::post().to(error_report::record_error));
}
