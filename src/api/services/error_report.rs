use actix_web::{HttpResponse, web};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;

use crate::api::error::ApiError;
use crate::services::validation::validate_error;
use crate::storage::AnalyticsStore;

/// `POST /api/errors`
pub async fn record_error(
    body: web::Json<Value>,
    store: web::Data<Arc<dyn AnalyticsStore>>,
) -> Result<HttpResponse, ApiError> {
    let report = validate_error(&body)?;

    store.insert_error(&report).await?;
    debug!(
        "Error report {} recorded for session {}",
        report.error_type, report.session_id
    );

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Error recorded successfully",
    })))
}
