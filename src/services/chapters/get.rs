use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use uuid::Uuid;

use super::ChapterService;
use crate::models::chapters::{entities::ChapterWithSubchapters, responses::ChapterListResponse};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{error_response, not_found};

pub async fn list_chapters(
    service: &ChapterService,
    request: &HttpRequest,
    course_id: Uuid,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_course_by_id(course_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Ok(not_found(ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => return Ok(error_response(&e, "Failed to list chapters")),
    }

    match storage.list_chapters(course_id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            ChapterListResponse { course_id, items },
            "Chapters retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, "Failed to list chapters")),
    }
}

pub async fn get_chapter(
    service: &ChapterService,
    request: &HttpRequest,
    chapter_id: Uuid,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let chapter = match storage.get_chapter_by_id(chapter_id).await {
        Ok(Some(chapter)) => chapter,
        Ok(None) => return Ok(not_found(ErrorCode::ChapterNotFound, "Chapter not found")),
        Err(e) => return Ok(error_response(&e, "Failed to get chapter")),
    };

    match storage.list_subchapters(chapter_id).await {
        Ok(subchapters) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            ChapterWithSubchapters {
                chapter,
                subchapters,
            },
            "Chapter retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, "Failed to get chapter")),
    }
}
