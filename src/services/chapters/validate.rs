use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{info, warn};
use uuid::Uuid;

use super::ChapterService;
use crate::models::chapters::responses::ChapterValidationResponse;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{error_response, invalidate_course, not_found};

pub async fn validate_chapter(
    service: &ChapterService,
    request: &HttpRequest,
    chapter_id: Uuid,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let chapter = match storage.get_chapter_by_id(chapter_id).await {
        Ok(Some(chapter)) => chapter,
        Ok(None) => return Ok(not_found(ErrorCode::ChapterNotFound, "Chapter not found")),
        Err(e) => return Ok(error_response(&e, "Chapter validation failed")),
    };

    if chapter.content.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
            ErrorCode::ChapterHasNoContent,
            "Chapter has no content to validate",
        )));
    }

    let course = match storage.get_course_by_id(chapter.course_id).await {
        Ok(Some(course)) => course,
        Ok(None) => return Ok(not_found(ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => return Ok(error_response(&e, "Chapter validation failed")),
    };

    let objectives = if chapter.learning_objectives.is_empty() {
        &course.learning_objectives
    } else {
        &chapter.learning_objectives
    };
    let report = service.get_validator(request).evaluate(
        &chapter.content,
        course.proficiency_level(),
        objectives,
    );

    match storage.set_chapter_quality_score(chapter_id, report.overall).await {
        Ok(_) => invalidate_course(&service.get_cache(request), course.id).await,
        Err(e) => warn!("Failed to store quality score of chapter {}: {}", chapter_id, e),
    }
    info!(
        "Chapter {} validated: overall {:.2}, passed {}",
        chapter_id, report.overall, report.passed
    );

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        ChapterValidationResponse {
            chapter_id,
            quality_score: report.overall,
            report,
        },
        "Chapter validated successfully",
    )))
}
