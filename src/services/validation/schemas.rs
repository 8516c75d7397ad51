//! 会话、事件批量、单个事件与错误报告的结构定义

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::ValidationResult;
use super::reader::FieldReader;
use crate::storage::{ErrorRecord, EventRecord, SessionRecord};

/// 事件批量的外层结构，元素留给 `validate_event` 逐个校验
#[derive(Debug, Clone, PartialEq)]
pub struct EventBatch<'a> {
    pub session_id: Uuid,
    pub events: &'a [Value],
}

pub fn validate_session(value: &Value) -> ValidationResult<SessionRecord> {
    let mut r = FieldReader::object(value)?;

    let session_id = r.required_uuid("session_id");
    let user_id_hash = r.required_str("user_id_hash");
    let timestamp = r.required_timestamp("timestamp");

    let session = SessionRecord {
        session_id: Uuid::nil(),
        user_id_hash: String::new(),
        timestamp: DateTime::<Utc>::UNIX_EPOCH,

        device_model: r.optional_str("device_model"),
        device_brand: r.optional_str("device_brand"),
        device_manufacturer: r.optional_str("device_manufacturer"),
        device_id_hash: r.optional_str("device_id_hash"),
        screen_width: r.optional_int("screen_width"),
        screen_height: r.optional_int("screen_height"),
        screen_density: r.optional_f64("screen_density"),
        supported_abis: r.optional_string_list("supported_abis"),

        os_name: r.optional_str("os_name"),
        os_version: r.optional_str("os_version"),
        api_level: r.optional_int("api_level"),
        kernel_version: r.optional_str("kernel_version"),

        app_version: r.optional_str("app_version"),
        app_build_number: r.optional_str("app_build_number"),
        package_name: r.optional_str("package_name"),
        is_first_launch: r.optional_bool("is_first_launch"),
        install_source: r.optional_str("install_source"),
        launch_count: r.optional_int("launch_count"),

        network_type: r.optional_str("network_type"),
        carrier_name: r.optional_str("carrier_name"),
        ip_address: r.optional_str("ip_address"),

        locale_language: r.optional_str("locale_language"),
        locale_country: r.optional_str("locale_country"),
        timezone: r.optional_str("timezone"),
        timezone_offset: r.optional_f64("timezone_offset"),
        currency: r.optional_str("currency"),

        startup_time_ms: r.optional_int("startup_time_ms"),
        memory_usage_mb: r.optional_f64("memory_usage_mb"),
        available_storage_gb: r.optional_f64("available_storage_gb"),
    };

    let issues = r.into_issues();
    match (session_id, user_id_hash, timestamp) {
        (Some(session_id), Some(user_id_hash), Some(timestamp)) if issues.is_empty() => {
            Ok(SessionRecord {
                session_id,
                user_id_hash,
                timestamp,
                ..session
            })
        }
        _ => Err(issues),
    }
}

pub fn validate_event(value: &Value) -> ValidationResult<EventRecord> {
    let mut r = FieldReader::object(value)?;

    let session_id = r.required_uuid("session_id");
    let event_type = r.required_str("event_type");
    let event_name = r.required_str("event_name");
    let timestamp = r.required_timestamp("timestamp");
    let properties = r.optional_object("properties");

    let issues = r.into_issues();
    match (session_id, event_type, event_name, timestamp) {
        (Some(session_id), Some(event_type), Some(event_name), Some(timestamp))
            if issues.is_empty() =>
        {
            Ok(EventRecord {
                session_id,
                event_type,
                event_name,
                timestamp,
                properties,
            })
        }
        _ => Err(issues),
    }
}

/// 校验批量外层：`session_id` 与 `events` 数组，数组长度不超过 `max_events`
pub fn validate_event_batch(value: &Value, max_events: usize) -> ValidationResult<EventBatch<'_>> {
    let mut r = FieldReader::object(value)?;

    let session_id = r.required_uuid("session_id");
    let events = r.required_array("events");
    if let Some(events) = events
        && events.len() > max_events
    {
        r.too_big("events", max_events);
    }

    let issues = r.into_issues();
    match (session_id, events) {
        (Some(session_id), Some(events)) if issues.is_empty() => {
            Ok(EventBatch { session_id, events })
        }
        _ => Err(issues),
    }
}

pub fn validate_error(value: &Value) -> ValidationResult<ErrorRecord> {
    let mut r = FieldReader::object(value)?;

    let session_id = r.required_uuid("session_id");
    let timestamp = r.required_timestamp("timestamp");
    let error_type = r.required_str("error_type");
    let error_message = r.required_str("error_message");
    let stack_trace = r.optional_str("stack_trace");
    let context = r.optional_object("context");

    let issues = r.into_issues();
    match (session_id, timestamp, error_type, error_message) {
        (Some(session_id), Some(timestamp), Some(error_type), Some(error_message))
            if issues.is_empty() =>
        {
            Ok(ErrorRecord {
                session_id,
                timestamp,
                error_type,
                error_message,
                stack_trace,
                context,
            })
        }
        _ => Err(issues),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::validation::{IssueCode, PathSegment};
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    const SID: &str = "6f1c2a9e-3b4d-4c8e-9f10-2a3b4c5d6e7f";

    fn paths(issues: &[crate::services::validation::ValidationIssue]) -> Vec<String> {
        let mut p: Vec<String> = issues.iter().map(|i| i.dotted_path()).collect();
        p.sort();
        p
    }

    #[test]
    fn test_minimal_session() {
        let session = validate_session(&json!({
            "session_id": SID,
            "user_id_hash": "abc",
            "timestamp": "2024-05-01T12:00:00Z"
        }))
        .unwrap();

        assert_eq!(session.session_id.to_string(), SID);
        assert_eq!(session.user_id_hash, "abc");
        assert_eq!(
            session.timestamp,
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
        );
        assert!(session.device_model.is_none());
        assert!(session.supported_abis.is_none());
    }

    #[test]
    fn test_full_session_fields_are_typed() {
        let session = validate_session(&json!({
            "session_id": SID,
            "user_id_hash": "abc",
            "timestamp": "2024-05-01T14:00:00+02:00",
            "device_model": "Pixel 8",
            "screen_width": 1080,
            "screen_height": 2400.0,
            "screen_density": 2.75,
            "supported_abis": ["arm64-v8a", "x86_64"],
            "api_level": 34,
            "is_first_launch": false,
            "launch_count": 7,
            "timezone_offset": -5.5,
            "startup_time_ms": 1234,
            "memory_usage_mb": 512.5,
            "unknown_field": {"nested": true}
        }))
        .unwrap();

        // 时区偏移被规范化为 UTC
        assert_eq!(
            session.timestamp,
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
        );
        assert_eq!(session.screen_width, Some(1080));
        assert_eq!(session.screen_height, Some(2400));
        assert_eq!(session.screen_density, Some(2.75));
        assert_eq!(
            session.supported_abis,
            Some(vec!["arm64-v8a".to_string(), "x86_64".to_string()])
        );
        assert_eq!(session.is_first_launch, Some(false));
        assert_eq!(session.startup_time_ms, Some(1234));
        assert_eq!(session.timezone_offset, Some(-5.5));
    }

    #[test]
    fn test_null_optional_fields_are_accepted() {
        let session = validate_session(&json!({
            "session_id": SID,
            "user_id_hash": "abc",
            "timestamp": "2024-05-01T12:00:00Z",
            "device_model": null,
            "screen_width": null,
            "supported_abis": null
        }))
        .unwrap();
        assert!(session.device_model.is_none());
        assert!(session.screen_width.is_none());
    }

    #[test]
    fn test_one_issue_per_violated_field() {
        let issues = validate_session(&json!({
            "session_id": "not-a-uuid",
            "timestamp": "yesterday",
            "screen_width": 10.5,
            "api_level": "34",
            "supported_abis": ["arm64-v8a", 7]
        }))
        .unwrap_err();

        assert_eq!(
            paths(&issues),
            vec![
                "api_level",
                "screen_width",
                "session_id",
                "supported_abis.1",
                "timestamp",
                "user_id_hash"
            ]
        );

        let by_path = |p: &str| issues.iter().find(|i| i.dotted_path() == p).unwrap();
        assert_eq!(by_path("session_id").code, IssueCode::InvalidString);
        assert_eq!(by_path("user_id_hash").message, "Required");
        assert_eq!(by_path("api_level").message, "Expected number, received string");
        assert_eq!(by_path("screen_width").message, "Expected integer, received float");
        assert_eq!(
            by_path("supported_abis.1").path,
            vec![PathSegment::Key("supported_abis".into()), PathSegment::Index(1)]
        );
    }

    #[test]
    fn test_int_out_of_range() {
        let issues = validate_session(&json!({
            "session_id": SID,
            "user_id_hash": "abc",
            "timestamp": "2024-05-01T12:00:00Z",
            "screen_width": 5_000_000_000i64
        }))
        .unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, IssueCode::InvalidNumber);
    }

    #[test]
    fn test_root_must_be_object() {
        let issues = validate_session(&json!([1, 2, 3])).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].path.is_empty());
        assert_eq!(issues[0].message, "Expected object, received array");
    }

    #[test]
    fn test_validation_is_idempotent() {
        let input = json!({
            "session_id": SID,
            "user_id_hash": 42,
            "timestamp": "2024-05-01T12:00:00Z"
        });
        assert_eq!(validate_session(&input), validate_session(&input));

        let ok = json!({
            "session_id": SID,
            "event_type": "ui",
            "event_name": "tap",
            "timestamp": "2024-05-01T12:00:00Z"
        });
        assert_eq!(validate_event(&ok), validate_event(&ok));
    }

    #[test]
    fn test_event_properties_must_be_object() {
        let issues = validate_event(&json!({
            "session_id": SID,
            "event_type": "ui",
            "event_name": "tap",
            "timestamp": "2024-05-01T12:00:00Z",
            "properties": ["not", "an", "object"]
        }))
        .unwrap_err();
        assert_eq!(paths(&issues), vec!["properties"]);

        let event = validate_event(&json!({
            "session_id": SID,
            "event_type": "ui",
            "event_name": "tap",
            "timestamp": "2024-05-01T12:00:00Z",
            "properties": {"button": "buy", "price": 9.99}
        }))
        .unwrap();
        assert_eq!(event.properties.unwrap()["button"], json!("buy"));
    }

    #[test]
    fn test_batch_envelope_does_not_validate_elements() {
        let body = json!({
            "session_id": SID,
            "events": [{"garbage": true}, 3, null]
        });
        let batch = validate_event_batch(&body, 500).unwrap();
        assert_eq!(batch.events.len(), 3);
        assert_eq!(batch.session_id.to_string(), SID);
    }

    #[test]
    fn test_batch_envelope_errors() {
        let issues = validate_event_batch(&json!({"events": {}}), 500).unwrap_err();
        assert_eq!(paths(&issues), vec!["events", "session_id"]);

        let too_many = json!({
            "session_id": SID,
            "events": vec![json!({}); 4]
        });
        let issues = validate_event_batch(&too_many, 3).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, IssueCode::TooBig);
    }

    #[test]
    fn test_error_report() {
        let report = validate_error(&json!({
            "session_id": SID,
            "timestamp": "2024-05-01T12:00:00.123Z",
            "error_type": "NullPointerException",
            "error_message": "boom",
            "stack_trace": "at Main.kt:1",
            "context": {"screen": "checkout"}
        }))
        .unwrap();
        assert_eq!(report.error_type, "NullPointerException");
        assert_eq!(report.stack_trace.as_deref(), Some("at Main.kt:1"));

        let issues = validate_error(&json!({
            "session_id": SID,
            "timestamp": "2024-05-01T12:00:00Z",
            "context": "oops"
        }))
        .unwrap_err();
        assert_eq!(paths(&issues), vec!["context", "error_message", "error_type"]);
    }

    #[test]
    fn test_issue_serializes_path_as_mixed_array() {
        let issues = validate_session(&json!({
            "session_id": SID,
            "user_id_hash": "abc",
            "timestamp": "2024-05-01T12:00:00Z",
            "supported_abis": [1]
        }))
        .unwrap_err();
        let json = serde_json::to_value(&issues[0]).unwrap();
        assert_eq!(json["path"], json!(["supported_abis", 0]));
        assert_eq!(json["code"], json!("invalid_type"));
    }
}
