//! GeoIP 服务模块
//!
//! 提供 IP 地址地理位置查询功能：
//! - ipinfo.io 兼容的外部 API（带缓存）
//! - 边缘节点国家码回退

mod external_api;
mod provider;

pub use crate::storage::GeoLocation;
pub use external_api::{IpInfoProvider, parse_ipinfo_response};
pub use provider::{GeoIpLookup, GeoResolver};
