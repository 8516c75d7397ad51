//! 入库前的规范化记录
//!
//! 由 `services::validation` 构造，生命周期仅限于单个请求。

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

/// 一次应用会话（设备、系统、应用、网络、区域、性能信息）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionRecord {
    pub session_id: Uuid,
    pub user_id_hash: String,
    pub timestamp: DateTime<Utc>,

    // 设备
    pub device_model: Option<String>,
    pub device_brand: Option<String>,
    pub device_manufacturer: Option<String>,
    pub device_id_hash: Option<String>,
    pub screen_width: Option<i32>,
    pub screen_height: Option<i32>,
    pub screen_density: Option<f64>,
    pub supported_abis: Option<Vec<String>>,

    // 系统
    pub os_name: Option<String>,
    pub os_version: Option<String>,
    pub api_level: Option<i32>,
    pub kernel_version: Option<String>,

    // 应用
    pub app_version: Option<String>,
    pub app_build_number: Option<String>,
    pub package_name: Option<String>,
    pub is_first_launch: Option<bool>,
    pub install_source: Option<String>,
    pub launch_count: Option<i32>,

    // 网络
    pub network_type: Option<String>,
    pub carrier_name: Option<String>,
    pub ip_address: Option<String>,

    // 区域
    pub locale_language: Option<String>,
    pub locale_country: Option<String>,
    pub timezone: Option<String>,
    pub timezone_offset: Option<f64>,
    pub currency: Option<String>,

    // 性能
    pub startup_time_ms: Option<i64>,
    pub memory_usage_mb: Option<f64>,
    pub available_storage_gb: Option<f64>,
}

impl SessionRecord {
    /// 只含必填字段的会话
    pub fn new(session_id: Uuid, user_id_hash: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            session_id,
            user_id_hash: user_id_hash.into(),
            timestamp,
            device_model: None,
            device_brand: None,
            device_manufacturer: None,
            device_id_hash: None,
            screen_width: None,
            screen_height: None,
            screen_density: None,
            supported_abis: None,
            os_name: None,
            os_version: None,
            api_level: None,
            kernel_version: None,
            app_version: None,
            app_build_number: None,
            package_name: None,
            is_first_launch: None,
            install_source: None,
            launch_count: None,
            network_type: None,
            carrier_name: None,
            ip_address: None,
            locale_language: None,
            locale_country: None,
            timezone: None,
            timezone_offset: None,
            currency: None,
            startup_time_ms: None,
            memory_usage_mb: None,
            available_storage_gb: None,
        }
    }
}

/// 单个用户事件
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventRecord {
    pub session_id: Uuid,
    pub event_type: String,
    pub event_name: String,
    pub timestamp: DateTime<Utc>,
    pub properties: Option<Map<String, Value>>,
}

/// 客户端上报的错误
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorRecord {
    pub session_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub error_type: String,
    pub error_message: String,
    pub stack_trace: Option<String>,
    pub context: Option<Map<String, Value>>,
}

/// IP 地理位置，要么完整要么没有
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoLocation {
    pub country: String,
    pub region: String,
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoLocation {
    /// 仅有国家码的粗粒度位置
    pub fn country_only(country: impl Into<String>) -> Self {
        Self {
            country: country.into(),
            region: UNKNOWN.to_string(),
            city: UNKNOWN.to_string(),
            latitude: 0.0,
            longitude: 0.0,
        }
    }
}

/// 缺失文本字段的占位值
pub const UNKNOWN: &str = "Unknown";
