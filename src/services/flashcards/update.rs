use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;
use uuid::Uuid;

use super::FlashcardService;
use crate::models::flashcards::requests::UpdateFlashcardRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::quizzes::chapter_belongs_to_course;
use crate::services::{error_response, invalidate_course, not_found, validation_error};

pub async fn update_flashcard(
    service: &FlashcardService,
    request: &HttpRequest,
    flashcard_id: Uuid,
    update_data: UpdateFlashcardRequest,
) -> ActixResult<HttpResponse> {
    let validation = update_data.validate();
    if !validation.is_valid() {
        return Ok(validation_error(validation));
    }

    let storage = service.get_storage(request);
    let current = match storage.get_flashcard_by_id(flashcard_id).await {
        Ok(Some(card)) => card,
        Ok(None) => return Ok(not_found(ErrorCode::FlashcardNotFound, "Flashcard not found")),
        Err(e) => return Ok(error_response(&e, "Failed to update flashcard")),
    };

    if let Some(chapter_id) = update_data.chapter_id {
        match chapter_belongs_to_course(&storage, chapter_id, current.course_id).await {
            Ok(true) => {}
            Ok(false) => {
                return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                    ErrorCode::ValidationFailed,
                    "chapter_id does not refer to a chapter of this course",
                )));
            }
            Err(e) => return Ok(error_response(&e, "Failed to update flashcard")),
        }
    }

    match storage.update_flashcard(flashcard_id, update_data).await {
        Ok(Some(card)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            card,
            "Flashcard updated successfully",
        ))),
        Ok(None) => Ok(not_found(ErrorCode::FlashcardNotFound, "Flashcard not found")),
        Err(e) => Ok(error_response(&e, "Failed to update flashcard")),
    }
}

pub async fn delete_flashcard(
    service: &FlashcardService,
    request: &HttpRequest,
    flashcard_id: Uuid,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let card = match storage.get_flashcard_by_id(flashcard_id).await {
        Ok(Some(card)) => card,
        Ok(None) => return Ok(not_found(ErrorCode::FlashcardNotFound, "Flashcard not found")),
        Err(e) => return Ok(error_response(&e, "Failed to delete flashcard")),
    };

    match storage.delete_flashcard(flashcard_id).await {
        Ok(true) => {
            invalidate_course(&service.get_cache(request), card.course_id).await;
            info!("Flashcard {} deleted", flashcard_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
                "Flashcard deleted successfully",
            )))
        }
        Ok(false) => Ok(not_found(ErrorCode::FlashcardNotFound, "Flashcard not found")),
        Err(e) => Ok(error_response(&e, "Failed to delete flashcard")),
    }
}
