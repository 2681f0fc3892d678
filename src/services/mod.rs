pub mod chapters;
pub mod courses;
pub mod flashcards;
pub mod health;
pub mod quality;
pub mod quizzes;
pub mod tasks;

pub use chapters::ChapterService;
pub use courses::CourseService;
pub use flashcards::FlashcardService;
pub use health::HealthService;
pub use quality::QualityService;
pub use quizzes::QuizService;
pub use tasks::TaskService;

use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, web};
use tracing::{error, warn};
use uuid::Uuid;

use crate::cache::{ObjectCache, course_detail_key};
use crate::errors::CourseGenError;
use crate::models::{ApiResponse, ErrorCode};
use crate::utils::validate::ValidationResult;

/// 从 app data 中取出共享组件（`web::Data<Arc<T>>`）
pub(crate) fn app_state<T: ?Sized + 'static>(request: &HttpRequest) -> Arc<T> {
    request
        .app_data::<web::Data<Arc<T>>>()
        .unwrap_or_else(|| panic!("{} not found in app data", std::any::type_name::<T>()))
        .get_ref()
        .clone()
}

/// 校验失败：400，data 为全部错误信息
pub(crate) fn validation_error(result: ValidationResult) -> HttpResponse {
    let message = format!("Validation failed: {}", result.error_message());
    HttpResponse::BadRequest().json(ApiResponse::error(
        ErrorCode::ValidationFailed,
        result.errors,
        message,
    ))
}

pub(crate) fn not_found(code: ErrorCode, message: impl Into<String>) -> HttpResponse {
    HttpResponse::NotFound().json(ApiResponse::error_empty(code, message))
}

/// 业务错误转换为 HTTP 响应
///
/// `context` 会拼在错误信息前面，例如 "Failed to update course"。
pub(crate) fn error_response(err: &CourseGenError, context: &str) -> HttpResponse {
    let message = format!("{context}: {}", err.message());
    match err {
        CourseGenError::Validation(_) => HttpResponse::BadRequest()
            .json(ApiResponse::error_empty(ErrorCode::ValidationFailed, message)),
        CourseGenError::NotFound(_) => {
            HttpResponse::NotFound().json(ApiResponse::error_empty(ErrorCode::NotFound, message))
        }
        CourseGenError::Conflict(_) => {
            HttpResponse::Conflict().json(ApiResponse::error_empty(ErrorCode::Conflict, message))
        }
        CourseGenError::AiUnavailable(_) => {
            warn!("{}", message);
            HttpResponse::ServiceUnavailable().json(ApiResponse::error_empty(
                ErrorCode::GenerationUnavailable,
                message,
            ))
        }
        CourseGenError::TaskQueue(_) => {
            warn!("{}", message);
            HttpResponse::ServiceUnavailable().json(ApiResponse::error_empty(
                ErrorCode::GenerationQueueFull,
                message,
            ))
        }
        CourseGenError::AiProvider(_)
        | CourseGenError::AiRateLimited(_)
        | CourseGenError::HttpClient(_) => {
            warn!("{}", message);
            HttpResponse::BadGateway().json(ApiResponse::error_empty(
                ErrorCode::ServiceUnavailable,
                message,
            ))
        }
        CourseGenError::VectorStore(_) => {
            warn!("{}", message);
            HttpResponse::BadGateway().json(ApiResponse::error_empty(
                ErrorCode::VectorSearchFailed,
                message,
            ))
        }
        _ => {
            error!("{} ({})", message, err.code());
            HttpResponse::InternalServerError().json(ApiResponse::error_empty(
                ErrorCode::InternalServerError,
                message,
            ))
        }
    }
}

/// 课程内容发生变化后清掉课程详情缓存
pub(crate) async fn invalidate_course(cache: &Arc<dyn ObjectCache>, course_id: Uuid) {
    cache.remove(&course_detail_key(course_id)).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use actix_web::http::StatusCode;

    async fn body_json(resp: HttpResponse) -> serde_json::Value {
        let bytes = to_bytes(resp.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[actix_web::test]
    async fn test_error_status_mapping() {
        let cases = [
            (CourseGenError::validation("bad"), StatusCode::BAD_REQUEST),
            (CourseGenError::not_found("gone"), StatusCode::NOT_FOUND),
            (CourseGenError::conflict("busy"), StatusCode::CONFLICT),
            (
                CourseGenError::ai_unavailable("none"),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (CourseGenError::task_queue("full"), StatusCode::SERVICE_UNAVAILABLE),
            (CourseGenError::ai_rate_limited("429"), StatusCode::BAD_GATEWAY),
            (
                CourseGenError::database_operation("boom"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(error_response(&err, "ctx").status(), status, "{err}");
        }
    }

    #[actix_web::test]
    async fn test_queue_full_error_code() {
        let resp = error_response(&CourseGenError::task_queue("full"), "Failed to queue");
        let body = body_json(resp).await;
        assert_eq!(body["code"], ErrorCode::GenerationQueueFull as i32);
        assert_eq!(body["message"], "Failed to queue: full");
    }

    #[actix_web::test]
    async fn test_validation_error_lists_all_messages() {
        let mut result = ValidationResult::new();
        result.push("title too short");
        result.push("difficulty_score out of band");
        let resp = validation_error(result);
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = body_json(resp).await;
        assert_eq!(body["data"].as_array().map(|a| a.len()), Some(2));
        assert_eq!(body["code"], ErrorCode::ValidationFailed as i32);
    }
}
