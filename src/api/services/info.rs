use actix_web::{HttpResponse, Responder, web};
use serde_json::json;

/// `GET /`：服务描述
pub async fn service_info() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "name": "Mobile Analytics API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "GET /health",
            "session": "POST /api/session",
            "events": "POST /api/events",
            "errors": "POST /api/errors",
        },
        "documentation": "See README.md for usage details",
    }))
}

pub fn info_routes() -> actix_web::Resource {
    web::resource("/")
        .route(web::get().to(service_info))
        .default_service(web::to(super::not_found))
}
