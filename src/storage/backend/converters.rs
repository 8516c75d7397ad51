//! Record → ActiveModel conversion
//!
//! JSON 类字段（supported_abis / properties / context）序列化为文本存储。

use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::{NotSet, Set};
use serde_json::{Map, Value};

use crate::errors::Result;
use crate::storage::{ErrorRecord, EventRecord, GeoLocation, SessionRecord};
use migration::entities::{app_error, app_event, app_session};

fn json_text(map: Option<&Map<String, Value>>) -> Result<Option<String>> {
    Ok(map.map(serde_json::to_string).transpose()?)
}

pub fn session_to_active_model(
    session: &SessionRecord,
    geo: Option<&GeoLocation>,
    received_at: DateTime<Utc>,
) -> Result<app_session::ActiveModel> {
    let supported_abis = session
        .supported_abis
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;

    Ok(app_session::ActiveModel {
        session_id: Set(session.session_id.to_string()),
        user_id_hash: Set(session.user_id_hash.clone()),
        timestamp: Set(session.timestamp),
        device_model: Set(session.device_model.clone()),
        device_brand: Set(session.device_brand.clone()),
        device_manufacturer: Set(session.device_manufacturer.clone()),
        device_id_hash: Set(session.device_id_hash.clone()),
        screen_width: Set(session.screen_width),
        screen_height: Set(session.screen_height),
        screen_density: Set(session.screen_density),
        supported_abis: Set(supported_abis),
        os_name: Set(session.os_name.clone()),
        os_version: Set(session.os_version.clone()),
        api_level: Set(session.api_level),
        kernel_version: Set(session.kernel_version.clone()),
        app_version: Set(session.app_version.clone()),
        app_build_number: Set(session.app_build_number.clone()),
        package_name: Set(session.package_name.clone()),
        is_first_launch: Set(session.is_first_launch),
        install_source: Set(session.install_source.clone()),
        launch_count: Set(session.launch_count),
        network_type: Set(session.network_type.clone()),
        carrier_name: Set(session.carrier_name.clone()),
        ip_address: Set(session.ip_address.clone()),
        locale_language: Set(session.locale_language.clone()),
        locale_country: Set(session.locale_country.clone()),
        timezone: Set(session.timezone.clone()),
        timezone_offset: Set(session.timezone_offset),
        currency: Set(session.currency.clone()),
        startup_time_ms: Set(session.startup_time_ms),
        memory_usage_mb: Set(session.memory_usage_mb),
        available_storage_gb: Set(session.available_storage_gb),
        geo_country: Set(geo.map(|g| g.country.clone())),
        geo_region: Set(geo.map(|g| g.region.clone())),
        geo_city: Set(geo.map(|g| g.city.clone())),
        geo_latitude: Set(geo.map(|g| g.latitude)),
        geo_longitude: Set(geo.map(|g| g.longitude)),
        received_at: Set(received_at),
    })
}

pub fn event_to_active_model(
    event: &EventRecord,
    received_at: DateTime<Utc>,
) -> Result<app_event::ActiveModel> {
    Ok(app_event::ActiveModel {
        id: NotSet,
        session_id: Set(event.session_id.to_string()),
        event_type: Set(event.event_type.clone()),
        event_name: Set(event.event_name.clone()),
        timestamp: Set(event.timestamp),
        properties: Set(json_text(event.properties.as_ref())?),
        received_at: Set(received_at),
    })
}

pub fn error_to_active_model(
    error: &ErrorRecord,
    received_at: DateTime<Utc>,
) -> Result<app_error::ActiveModel> {
    Ok(app_error::ActiveModel {
        id: NotSet,
        session_id: Set(error.session_id.to_string()),
        timestamp: Set(error.timestamp),
        error_type: Set(error.error_type.clone()),
        error_message: Set(error.error_message.clone()),
        stack_trace: Set(error.stack_trace.clone()),
        context: Set(json_text(error.context.as_ref())?),
        received_at: Set(received_at),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ActiveValue;
    use uuid::Uuid;

    #[test]
    fn test_session_without_geo_leaves_geo_columns_null() {
        let mut session = SessionRecord::new(Uuid::new_v4(), "user-hash", Utc::now());
        session.supported_abis = Some(vec!["arm64-v8a".into(), "armeabi-v7a".into()]);

        let model = session_to_active_model(&session, None, Utc::now()).unwrap();
        assert!(matches!(model.geo_country, ActiveValue::Set(None)));
        assert!(matches!(model.geo_latitude, ActiveValue::Set(None)));
        if let ActiveValue::Set(Some(abis)) = &model.supported_abis {
            assert_eq!(abis, r#"["arm64-v8a","armeabi-v7a"]"#);
        } else {
            panic!("supported_abis should be set");
        }
        if let ActiveValue::Set(id) = &model.session_id {
            assert_eq!(id, &session.session_id.to_string());
        }
    }

    #[test]
    fn test_session_with_geo_sets_all_columns() {
        let session = SessionRecord::new(Uuid::new_v4(), "user-hash", Utc::now());
        let geo = GeoLocation {
            country: "US".into(),
            region: "California".into(),
            city: "Mountain View".into(),
            latitude: 37.386,
            longitude: -122.0838,
        };

        let model = session_to_active_model(&session, Some(&geo), Utc::now()).unwrap();
        assert!(matches!(&model.geo_country, ActiveValue::Set(Some(c)) if c == "US"));
        assert!(matches!(&model.geo_city, ActiveValue::Set(Some(c)) if c == "Mountain View"));
        assert!(matches!(model.geo_longitude, ActiveValue::Set(Some(lon)) if lon == -122.0838));
    }

    #[test]
    fn test_event_properties_serialized_as_text() {
        let mut props = Map::new();
        props.insert("screen".into(), Value::String("home".into()));
        let event = EventRecord {
            session_id: Uuid::new_v4(),
            event_type: "ui".into(),
            event_name: "tap".into(),
            timestamp: Utc::now(),
            properties: Some(props),
        };

        let model = event_to_active_model(&event, Utc::now()).unwrap();
        assert!(matches!(&model.properties, ActiveValue::Set(Some(p)) if p == r#"{"screen":"home"}"#));
        assert!(matches!(model.id, ActiveValue::NotSet));
    }
}
