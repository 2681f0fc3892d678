use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use uuid::Uuid;

use super::CourseService;
use crate::config::AppConfig;
use crate::errors::{CourseGenError, Result};
use crate::models::courses::{requests::SearchQuery, responses::CourseSearchResponse};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{error_response, not_found, validation_error};
use crate::utils::validate::ValidationResult;

const MAX_TOP_K: usize = 50;

pub async fn search_course(
    service: &CourseService,
    request: &HttpRequest,
    course_id: Uuid,
    query: SearchQuery,
) -> ActixResult<HttpResponse> {
    let mut validation = ValidationResult::new();
    validation.check_length("q", &query.q, 1, 500);
    if !validation.is_valid() {
        return Ok(validation_error(validation));
    }

    let storage = service.get_storage(request);
    match storage.get_course_by_id(course_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Ok(not_found(ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => return Ok(error_response(&e, "Search failed")),
    }

    let top_k = query
        .top_k
        .unwrap_or(AppConfig::get().vector.top_k)
        .clamp(1, MAX_TOP_K);
    let text = query.q.trim().to_string();

    match run_search(service, request, course_id, &text, top_k).await {
        Ok(results) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            CourseSearchResponse {
                course_id,
                query: text,
                results,
            },
            "Search completed successfully",
        ))),
        Err(e) => Ok(error_response(&e, "Search failed")),
    }
}

async fn run_search(
    service: &CourseService,
    request: &HttpRequest,
    course_id: Uuid,
    text: &str,
    top_k: usize,
) -> Result<Vec<crate::vector::VectorMatch>> {
    let ai = service.get_ai(request);
    let embedding = ai
        .embed(&[text.to_string()])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| CourseGenError::ai_provider("Embedding provider returned no vectors"))?;

    service
        .get_vector_store(request)
        .search(&embedding, top_k, Some(course_id))
        .await
}
