use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;
use uuid::Uuid;

use super::ChapterService;
use super::create::sequence_conflict;
use crate::errors::CourseGenError;
use crate::models::chapters::requests::UpdateChapterRequest;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{error_response, invalidate_course, not_found, validation_error};

pub async fn update_chapter(
    service: &ChapterService,
    request: &HttpRequest,
    chapter_id: Uuid,
    update_data: UpdateChapterRequest,
) -> ActixResult<HttpResponse> {
    let validation = update_data.validate();
    if !validation.is_valid() {
        return Ok(validation_error(validation));
    }

    let storage = service.get_storage(request);
    let current = match storage.get_chapter_by_id(chapter_id).await {
        Ok(Some(chapter)) => chapter,
        Ok(None) => return Ok(not_found(ErrorCode::ChapterNotFound, "Chapter not found")),
        Err(e) => return Ok(error_response(&e, "Failed to update chapter")),
    };

    if let Some(sequence_number) = update_data.sequence_number
        && sequence_number != current.sequence_number
    {
        match storage
            .chapter_sequence_taken(current.course_id, sequence_number, Some(chapter_id))
            .await
        {
            Ok(true) => return Ok(sequence_conflict(sequence_number)),
            Ok(false) => {}
            Err(e) => return Ok(error_response(&e, "Failed to update chapter")),
        }
    }

    let sequence_number = update_data.sequence_number.unwrap_or(current.sequence_number);
    match storage.update_chapter(chapter_id, update_data).await {
        Ok(Some(chapter)) => {
            invalidate_course(&service.get_cache(request), chapter.course_id).await;
            info!("Chapter {} updated", chapter_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                chapter,
                "Chapter updated successfully",
            )))
        }
        Ok(None) => Ok(not_found(ErrorCode::ChapterNotFound, "Chapter not found")),
        Err(CourseGenError::Conflict(_)) => Ok(sequence_conflict(sequence_number)),
        Err(e) => Ok(error_response(&e, "Failed to update chapter")),
    }
}
