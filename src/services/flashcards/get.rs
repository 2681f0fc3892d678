use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use uuid::Uuid;

use super::FlashcardService;
use crate::models::flashcards::requests::FlashcardQueryParams;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{error_response, not_found};

pub async fn list_flashcards(
    service: &FlashcardService,
    request: &HttpRequest,
    course_id: Uuid,
    query: FlashcardQueryParams,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_course_by_id(course_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Ok(not_found(ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => return Ok(error_response(&e, "Failed to list flashcards")),
    }

    match storage
        .list_flashcards_with_pagination(course_id, query.into())
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            response,
            "Flashcards retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, "Failed to list flashcards")),
    }
}

pub async fn get_flashcard(
    service: &FlashcardService,
    request: &HttpRequest,
    flashcard_id: Uuid,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_flashcard_by_id(flashcard_id).await {
        Ok(Some(card)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            card,
            "Flashcard retrieved successfully",
        ))),
        Ok(None) => Ok(not_found(ErrorCode::FlashcardNotFound, "Flashcard not found")),
        Err(e) => Ok(error_response(&e, "Failed to get flashcard")),
    }
}
