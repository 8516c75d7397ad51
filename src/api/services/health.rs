use actix_web::{HttpResponse, Responder, http::StatusCode, web};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, trace, warn};

use crate::storage::AnalyticsStore;

/// 健康检查设置（启动时间 + 探测超时）
#[derive(Clone, Debug)]
pub struct HealthSettings {
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub probe_timeout: Duration,
}

impl HealthSettings {
    pub fn new(probe_timeout: Duration) -> Self {
        Self {
            started_at: chrono::Utc::now(),
            probe_timeout,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub database: &'static str,
    pub backend: String,
    /// 运行秒数
    pub uptime: u64,
}

#[derive(Debug, Serialize)]
pub struct UnhealthyResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub error: String,
}

/// Health Service
///
/// 数据库探测有超时保护：
/// - 探测返回 true → 200 healthy
/// - 探测返回 false → 200 degraded
/// - 探测未完成 → 503 unhealthy
pub struct HealthService;

impl HealthService {
    pub async fn health_check(
        store: web::Data<Arc<dyn AnalyticsStore>>,
        settings: web::Data<HealthSettings>,
    ) -> impl Responder {
        let start_time = Instant::now();
        trace!("Received health check request");

        let probe = tokio::time::timeout(settings.probe_timeout, store.health_check()).await;
        let now = chrono::Utc::now();

        let Ok(connected) = probe else {
            error!(
                "Database health probe did not complete within {:?}",
                settings.probe_timeout
            );
            return HttpResponse::build(StatusCode::SERVICE_UNAVAILABLE).json(UnhealthyResponse {
                status: "unhealthy",
                timestamp: now.to_rfc3339(),
                error: format!(
                    "database probe timed out after {} ms",
                    settings.probe_timeout.as_millis()
                ),
            });
        };

        if !connected {
            warn!("Database health probe reported disconnected");
        }

        let body = HealthResponse {
            status: if connected { "healthy" } else { "degraded" },
            timestamp: now.to_rfc3339(),
            database: if connected { "connected" } else { "disconnected" },
            backend: store.backend_name().to_string(),
            uptime: (now - settings.started_at).num_seconds().max(0) as u64,
        };

        info!(
            "Health check completed in {:?}, status: {}",
            start_time.elapsed(),
            body.status
        );

        HttpResponse::Ok().json(body)
    }
}

/// 只接受 GET，其他方法走 JSON 404 而不是 405
pub fn health_routes() -> actix_web::Resource {
    web::resource("/health")
        .route(web::get().to(HealthService::health_check))
        .default_service(web::to(super::not_found))
}
