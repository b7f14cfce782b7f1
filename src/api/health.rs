use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::database::RecordStore;

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub timestamp: i64,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service and store are healthy", body = HealthResponse),
        (status = 503, description = "Store unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(store: web::Data<dyn RecordStore>) -> HttpResponse {
    let (mut response, status) = match store.ping().await {
        Ok(()) => (HttpResponse::Ok(), "healthy"),
        Err(e) => {
            log::error!("❌ Health check failed: {}", e);
            (HttpResponse::ServiceUnavailable(), "unhealthy")
        }
    };

    response.json(HealthResponse {
        status: status.to_string(),
        service: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}
