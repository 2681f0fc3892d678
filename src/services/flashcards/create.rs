use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;
use uuid::Uuid;

use super::FlashcardService;
use crate::models::flashcards::requests::CreateFlashcardRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::quizzes::chapter_belongs_to_course;
use crate::services::{error_response, invalidate_course, not_found, validation_error};

pub async fn create_flashcard(
    service: &FlashcardService,
    request: &HttpRequest,
    course_id: Uuid,
    card: CreateFlashcardRequest,
) -> ActixResult<HttpResponse> {
    let validation = card.validate();
    if !validation.is_valid() {
        return Ok(validation_error(validation));
    }

    let storage = service.get_storage(request);
    match storage.get_course_by_id(course_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Ok(not_found(ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => return Ok(error_response(&e, "Flashcard creation failed")),
    }

    if let Some(chapter_id) = card.chapter_id {
        match chapter_belongs_to_course(&storage, chapter_id, course_id).await {
            Ok(true) => {}
            Ok(false) => {
                return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::ValidationFailed,
                    "chapter_id does not refer to a chapter of this course",
                )));
            }
            Err(e) => return Ok(error_response(&e, "Flashcard creation failed")),
        }
    }

    match storage.create_flashcard(course_id, card).await {
        Ok(card) => {
            invalidate_course(&service.get_cache(request), course_id).await;
            info!("Flashcard {} created for course {}", card.id, course_id);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                card,
                "Flashcard created successfully",
            )))
        }
        Err(e) => Ok(error_response(&e, "Flashcard creation failed")),
    }
}
