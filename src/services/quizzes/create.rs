use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;
use uuid::Uuid;

use super::{QuizService, chapter_belongs_to_course};
use crate::models::quizzes::requests::CreateQuizRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{error_response, invalidate_course, not_found, validation_error};

pub async fn create_quiz(
    service: &QuizService,
    request: &HttpRequest,
    course_id: Uuid,
    quiz_data: CreateQuizRequest,
) -> ActixResult<HttpResponse> {
    let validation = quiz_data.validate();
    if !validation.is_valid() {
        return Ok(validation_error(validation));
    }

    let storage = service.get_storage(request);
    match storage.get_course_by_id(course_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Ok(not_found(ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => return Ok(error_response(&e, "Quiz creation failed")),
    }

    if let Some(chapter_id) = quiz_data.chapter_id {
        match chapter_belongs_to_course(&storage, chapter_id, course_id).await {
            Ok(true) => {}
            Ok(false) => {
                return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::ValidationFailed,
                    "chapter_id does not refer to a chapter of this course",
                )));
            }
            Err(e) => return Ok(error_response(&e, "Quiz creation failed")),
        }
    }

    match storage.create_quiz(course_id, quiz_data).await {
        Ok(detail) => {
            invalidate_course(&service.get_cache(request), course_id).await;
            info!(
                "Quiz {} created for course {} with {} questions",
                detail.quiz.id,
                course_id,
                detail.questions.len()
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                detail,
                "Quiz created successfully",
            )))
        }
        Err(e) => Ok(error_response(&e, "Quiz creation failed")),
    }
}
