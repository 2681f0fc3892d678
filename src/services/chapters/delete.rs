use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;
use uuid::Uuid;

use super::ChapterService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{error_response, invalidate_course, not_found};

pub async fn delete_chapter(
    service: &ChapterService,
    request: &HttpRequest,
    chapter_id: Uuid,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let chapter = match storage.get_chapter_by_id(chapter_id).await {
        Ok(Some(chapter)) => chapter,
        Ok(None) => return Ok(not_found(ErrorCode::ChapterNotFound, "Chapter not found")),
        Err(e) => return Ok(error_response(&e, "Failed to delete chapter")),
    };

    match storage.delete_chapter(chapter_id).await {
        Ok(true) => {
            invalidate_course(&service.get_cache(request), chapter.course_id).await;
            info!("Chapter {} deleted from course {}", chapter_id, chapter.course_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Chapter deleted successfully")))
        }
        Ok(false) => Ok(not_found(ErrorCode::ChapterNotFound, "Chapter not found")),
        Err(e) => Ok(error_response(&e, "Failed to delete chapter")),
    }
}
