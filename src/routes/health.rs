use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::services::HealthService;

static HEALTH_SERVICE: Lazy<HealthService> = Lazy::new(HealthService::new_lazy);

pub async fn health(req: HttpRequest) -> ActixResult<HttpResponse> {
    HEALTH_SERVICE.health(&req).await
}

pub async fn readiness(req: HttpRequest) -> ActixResult<HttpResponse> {
    HEALTH_SERVICE.readiness(&req).await
}

pub async fn liveness() -> ActixResult<HttpResponse> {
    HEALTH_SERVICE.liveness().await
}

// 健康检查不经过限流
pub fn configure_health_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/health")
            .route("", web::get().to(health))
            .route("/ready", web::get().to(readiness))
            .route("/live", web::get().to(liveness)),
    );
}
