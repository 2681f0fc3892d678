use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::models::quality::ValidateContentRequest;
use crate::services::QualityService;

static QUALITY_SERVICE: Lazy<QualityService> = Lazy::new(QualityService::new_lazy);

pub async fn validate_content(
    req: HttpRequest,
    body: web::Json<ValidateContentRequest>,
) -> ActixResult<HttpResponse> {
    QUALITY_SERVICE
        .validate_content(&req, body.into_inner())
        .await
}

pub fn configure_quality_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/v1/quality/validate", web::post().to(validate_content));
}
