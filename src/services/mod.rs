//! Domain services
//!
//! - `validation`: inbound payload schemas
//! - `geoip`: IP geolocation with edge-country fallback

pub mod geoip;
pub mod validation;

pub use geoip::{GeoIpLookup, GeoResolver};
