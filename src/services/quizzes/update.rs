use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use uuid::Uuid;

use super::{QuizService, chapter_belongs_to_course};
use crate::models::quizzes::requests::UpdateQuizRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{error_response, not_found, validation_error};

pub async fn update_quiz(
    service: &QuizService,
    request: &HttpRequest,
    quiz_id: Uuid,
    update_data: UpdateQuizRequest,
) -> ActixResult<HttpResponse> {
    let validation = update_data.validate();
    if !validation.is_valid() {
        return Ok(validation_error(validation));
    }

    let storage = service.get_storage(request);
    let quiz = match storage.get_quiz_by_id(quiz_id).await {
        Ok(Some(quiz)) => quiz,
        Ok(None) => return Ok(not_found(ErrorCode::QuizNotFound, "Quiz not found")),
        Err(e) => return Ok(error_response(&e, "Failed to update quiz")),
    };

    if let Some(chapter_id) = update_data.chapter_id {
        match chapter_belongs_to_course(&storage, chapter_id, quiz.course_id).await {
            Ok(true) => {}
            Ok(false) => {
                return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::ValidationFailed,
                    "chapter_id does not refer to a chapter of this course",
                )));
            }
            Err(e) => return Ok(error_response(&e, "Failed to update quiz")),
        }
    }

    match storage.update_quiz(quiz_id, update_data).await {
        Ok(Some(quiz)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            quiz,
            "Quiz updated successfully",
        ))),
        Ok(None) => Ok(not_found(ErrorCode::QuizNotFound, "Quiz not found")),
        Err(e) => Ok(error_response(&e, "Failed to update quiz")),
    }
}
