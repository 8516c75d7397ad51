use actix_web::{HttpResponse, http::StatusCode, web};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use crate::api::error::ApiError;
use crate::services::validation::{ValidationIssue, validate_event, validate_event_batch};
use crate::storage::{AnalyticsStore, EventRecord};

/// 上报限制
#[derive(Clone, Debug)]
pub struct IngestSettings {
    pub max_batch_size: usize,
}

/// 批量中被拒绝的单个事件
#[derive(Debug, Clone, Serialize)]
pub struct RejectedEvent {
    pub index: usize,
    pub errors: Vec<ValidationIssue>,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub success: bool,
    pub recorded: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<RejectedEvent>>,
    pub message: &'static str,
}

/// 逐个校验事件，分成可写入的事件与被拒绝的下标
pub fn partition_events(events: &[Value]) -> (Vec<EventRecord>, Vec<RejectedEvent>) {
    let mut valid = Vec::with_capacity(events.len());
    let mut rejected = Vec::new();

    for (index, raw) in events.iter().enumerate() {
        match validate_event(raw) {
            Ok(event) => valid.push(event),
            Err(errors) => rejected.push(RejectedEvent { index, errors }),
        }
    }

    (valid, rejected)
}

/// `POST /api/events`
///
/// - 全部有效 → 201
/// - 部分有效 → 207，有效部分作为一个批次写入
/// - 全部无效 → 400，不访问存储
pub async fn record_events(
    body: web::Json<Value>,
    store: web::Data<Arc<dyn AnalyticsStore>>,
    settings: web::Data<IngestSettings>,
) -> Result<HttpResponse, ApiError> {
    let batch = validate_event_batch(&body, settings.max_batch_size)?;
    let (valid, rejected) = partition_events(batch.events);

    if !valid.is_empty() {
        store.insert_events(&valid).await?;
    }

    let recorded = valid.len();
    let failed = rejected.len();

    let (status, response) = if rejected.is_empty() {
        (
            StatusCode::CREATED,
            BatchResponse {
                success: true,
                recorded,
                failed: None,
                errors: None,
                message: "All events recorded successfully",
            },
        )
    } else if recorded > 0 {
        (
            StatusCode::MULTI_STATUS,
            BatchResponse {
                success: true,
                recorded,
                failed: Some(failed),
                errors: Some(rejected),
                message: "Some events recorded successfully",
            },
        )
    } else {
        (
            StatusCode::BAD_REQUEST,
            BatchResponse {
                success: false,
                recorded: 0,
                failed: Some(failed),
                errors: Some(rejected),
                message: "No valid events to record",
            },
        )
    };

    if failed > 0 {
        info!(
            "Event batch for session {}: {} recorded, {} rejected",
            batch.session_id, recorded, failed
        );
    } else {
        debug!(
            "Event batch for session {}: {} recorded",
            batch.session_id, recorded
        );
    }

    Ok(HttpResponse::build(status).json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_partition_keeps_indices() {
        let good = json!({
            "session_id": "6f1c2a9e-3b4d-4c8e-9f10-2a3b4c5d6e7f",
            "event_type": "ui",
            "event_name": "tap",
            "timestamp": "2024-05-01T12:00:00Z"
        });
        let events = vec![good.clone(), json!({"event_type": "ui"}), good, json!(42)];

        let (valid, rejected) = partition_events(&events);
        assert_eq!(valid.len(), 2);
        assert_eq!(
            rejected.iter().map(|r| r.index).collect::<Vec<_>>(),
            vec![1, 3]
        );
        assert!(!rejected[0].errors.is_empty());
    }
}
