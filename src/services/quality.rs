//! 独立的内容质量评估

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use super::{app_state, validation_error};
use crate::models::ApiResponse;
use crate::models::quality::ValidateContentRequest;
use crate::quality::QualityValidator;

pub struct QualityService;

impl QualityService {
    pub fn new_lazy() -> Self {
        Self
    }

    pub(crate) fn get_validator(&self, request: &HttpRequest) -> Arc<QualityValidator> {
        app_state::<QualityValidator>(request)
    }

    pub async fn validate_content(
        &self,
        request: &HttpRequest,
        body: ValidateContentRequest,
    ) -> ActixResult<HttpResponse> {
        let validation = body.validate();
        if !validation.is_valid() {
            return Ok(validation_error(validation));
        }

        let report = self.get_validator(request).evaluate(
            &body.content,
            body.proficiency_level,
            &body.learning_objectives,
        );
        Ok(HttpResponse::Ok().json(ApiResponse::success(
            report,
            "Content validated successfully",
        )))
    }
}
