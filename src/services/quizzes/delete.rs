use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;
use uuid::Uuid;

use super::QuizService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{error_response, invalidate_course, not_found};

pub async fn delete_quiz(
    service: &QuizService,
    request: &HttpRequest,
    quiz_id: Uuid,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let quiz = match storage.get_quiz_by_id(quiz_id).await {
        Ok(Some(quiz)) => quiz,
        Ok(None) => return Ok(not_found(ErrorCode::QuizNotFound, "Quiz not found")),
        Err(e) => return Ok(error_response(&e, "Failed to delete quiz")),
    };

    match storage.delete_quiz(quiz_id).await {
        Ok(true) => {
            invalidate_course(&service.get_cache(request), quiz.course_id).await;
            info!("Quiz {} deleted", quiz_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Quiz deleted successfully")))
        }
        Ok(false) => Ok(not_found(ErrorCode::QuizNotFound, "Quiz not found")),
        Err(e) => Ok(error_response(&e, "Failed to delete quiz")),
    }
}
