//! HTTP 应用组装
//!
//! 服务器与集成测试共用同一套路由、中间件和共享状态。

use actix_cors::Cors;
use actix_web::{
    App, Error, HttpRequest,
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    http::header,
    middleware::Compress,
    web,
};
use std::sync::Arc;
use std::time::Duration;

use crate::api::error::ApiError;
use crate::api::middleware::{AccessLog, ApiKeyAuth, RequestIdMiddleware};
use crate::api::services::{
    HealthSettings, IngestSettings, health_routes, info_routes, ingest_routes, not_found,
};
use crate::config::StaticConfig;
use crate::services::geoip::GeoResolver;
use crate::storage::AnalyticsStore;

/// CORS 预检缓存时间（秒）
const CORS_MAX_AGE_SECS: usize = 86_400;

/// 启动时构建一次、由所有 worker 共享的状态
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AnalyticsStore>,
    pub geo: GeoResolver,
    pub api_key: Arc<str>,
    pub ingest: IngestSettings,
    pub health: HealthSettings,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(config: &StaticConfig, store: Arc<dyn AnalyticsStore>, geo: GeoResolver) -> Self {
        Self {
            store,
            geo,
            api_key: Arc::from(config.auth.api_key.as_str()),
            ingest: IngestSettings {
                max_batch_size: config.ingest.max_batch_size,
            },
            health: HealthSettings::new(Duration::from_millis(config.server.health_timeout_ms)),
            max_body_bytes: config.ingest.max_body_bytes,
        }
    }
}

/// 任意来源，GET/POST/OPTIONS，Content-Type 与 Authorization
pub fn build_cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .send_wildcard()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(CORS_MAX_AGE_SECS)
}

fn json_error_handler(err: actix_web::error::JsonPayloadError, _req: &HttpRequest) -> Error {
    ApiError::InvalidBody(err.to_string()).into()
}

/// 组装完整应用
///
/// 中间件顺序（外 → 内）：RequestId → AccessLog → CORS → Compress → 路由
pub fn build_app(
    state: AppState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    let json_config = web::JsonConfig::default()
        .limit(state.max_body_bytes)
        .content_type_required(false)
        .error_handler(json_error_handler);

    App::new()
        .app_data(json_config)
        .app_data(web::Data::new(state.store.clone()))
        .app_data(web::Data::new(state.geo.clone()))
        .app_data(web::Data::new(state.ingest.clone()))
        .app_data(web::Data::new(state.health.clone()))
        .wrap(Compress::default())
        .wrap(build_cors())
        .wrap(AccessLog)
        .wrap(RequestIdMiddleware)
        .service(health_routes())
        .service(info_routes())
        .service(
            // 整个 scope（包括未知路径）都先经过认证
            web::scope("/api")
                .wrap(ApiKeyAuth::new(state.api_key.clone()))
                .configure(ingest_routes)
                .default_service(web::to(not_found)),
        )
        .default_service(web::to(not_found))
}
