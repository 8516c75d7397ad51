use actix_web::{HttpRequest, HttpResponse, web};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;

use crate::api::error::ApiError;
use crate::services::geoip::GeoResolver;
use crate::services::validation::validate_session;
use crate::storage::AnalyticsStore;
use crate::utils::ip::{edge_country, extract_client_ip};

/// `POST /api/session`
///
/// 服务端观察到的客户端 IP 覆盖请求体中的 `ip_address`，
/// 只有拿到 IP 时才做地理位置查询。
pub async fn record_session(
    req: HttpRequest,
    body: web::Json<Value>,
    store: web::Data<Arc<dyn AnalyticsStore>>,
    geo: web::Data<GeoResolver>,
) -> Result<HttpResponse, ApiError> {
    let mut session = validate_session(&body)?;

    let location = match extract_client_ip(&req) {
        Some(ip) => {
            let country = edge_country(req.headers());
            let location = geo.resolve(&ip, country.as_deref()).await;
            session.ip_address = Some(ip);
            location
        }
        None => None,
    };

    store.insert_session(&session, location.as_ref()).await?;
    debug!(
        "Session {} recorded (geo: {})",
        session.session_id,
        location.as_ref().map_or("none", |g| g.country.as_str())
    );

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "session_id": session.session_id,
        "message": "Session recorded successfully",
    })))
}
