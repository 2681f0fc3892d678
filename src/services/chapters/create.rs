use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;
use uuid::Uuid;

use super::ChapterService;
use crate::errors::CourseGenError;
use crate::models::chapters::requests::CreateChapterRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{error_response, invalidate_course, not_found, validation_error};

pub async fn create_chapter(
    service: &ChapterService,
    request: &HttpRequest,
    course_id: Uuid,
    chapter_data: CreateChapterRequest,
) -> ActixResult<HttpResponse> {
    let validation = chapter_data.validate();
    if !validation.is_valid() {
        return Ok(validation_error(validation));
    }

    let storage = service.get_storage(request);
    match storage.get_course_by_id(course_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Ok(not_found(ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => return Ok(error_response(&e, "Chapter creation failed")),
    }

    let sequence_number = chapter_data.sequence_number;
    match storage.create_chapter(course_id, chapter_data).await {
        Ok(chapter) => {
            invalidate_course(&service.get_cache(request), course_id).await;
            info!(
                "Chapter {} created as #{} of course {}",
                chapter.id, chapter.sequence_number, course_id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                chapter,
                "Chapter created successfully",
            )))
        }
        Err(CourseGenError::Conflict(_)) => Ok(sequence_conflict(sequence_number)),
        Err(e) => Ok(error_response(&e, "Chapter creation failed")),
    }
}

pub(super) fn sequence_conflict(sequence_number: i32) -> HttpResponse {
    HttpResponse::Conflict().json(ApiResponse::error_empty(
        ErrorCode::ChapterSequenceConflict,
        format!("Sequence number {sequence_number} is already used by another chapter"),
    ))
}
