//! App session entity, one row per app launch

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "app_sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub session_id: String,
    pub user_id_hash: String,
    pub timestamp: DateTimeUtc,

    // 设备信息
    pub device_model: Option<String>,
    pub device_brand: Option<String>,
    pub device_manufacturer: Option<String>,
    pub device_id_hash: Option<String>,
    pub screen_width: Option<i32>,
    pub screen_height: Option<i32>,
    pub screen_density: Option<f64>,
    /// JSON array of ABI names, serialized as text
    #[sea_orm(column_type = "Text", nullable)]
    pub supported_abis: Option<String>,

    // 系统信息
    pub os_name: Option<String>,
    pub os_version: Option<String>,
    pub api_level: Option<i32>,
    pub kernel_version: Option<String>,

    // 应用信息
    pub app_version: Option<String>,
    pub app_build_number: Option<String>,
    pub package_name: Option<String>,
    pub is_first_launch: Option<bool>,
    pub install_source: Option<String>,
    pub launch_count: Option<i32>,

    // 网络信息
    pub network_type: Option<String>,
    pub carrier_name: Option<String>,
    pub ip_address: Option<String>,

    // 区域设置
    pub locale_language: Option<String>,
    pub locale_country: Option<String>,
    pub timezone: Option<String>,
    pub timezone_offset: Option<f64>,
    pub currency: Option<String>,

    // 性能指标
    pub startup_time_ms: Option<i64>,
    pub memory_usage_mb: Option<f64>,
    pub available_storage_gb: Option<f64>,

    // IP 地理位置（全部为空或全部有值）
    pub geo_country: Option<String>,
    pub geo_region: Option<String>,
    pub geo_city: Option<String>,
    pub geo_latitude: Option<f64>,
    pub geo_longitude: Option<f64>,

    pub received_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
