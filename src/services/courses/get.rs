use std::sync::Arc;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::debug;
use uuid::Uuid;

use super::CourseService;
use crate::cache::course_detail_key;
use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::chapters::entities::ChapterSummary;
use crate::models::courses::responses::{CourseDetail, CourseQualityResponse};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{error_response, not_found};
use crate::storage::Storage;

pub async fn get_course(
    service: &CourseService,
    request: &HttpRequest,
    course_id: Uuid,
) -> ActixResult<HttpResponse> {
    let cache = service.get_cache(request);
    let cache_key = course_detail_key(course_id);

    if let Some(detail) = cache.get_json::<CourseDetail>(&cache_key).await {
        debug!("Course detail {} served from cache", course_id);
        return Ok(HttpResponse::Ok().json(ApiResponse::success(
            detail,
            "Course retrieved successfully",
        )));
    }

    let storage = service.get_storage(request);
    match load_course_detail(&storage, course_id).await {
        Ok(Some(detail)) => {
            let ttl = AppConfig::get().cache.default_ttl;
            cache.insert_json(cache_key, &detail, ttl).await;
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                detail,
                "Course retrieved successfully",
            )))
        }
        Ok(None) => Ok(not_found(ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => Ok(error_response(&e, "Failed to get course")),
    }
}

async fn load_course_detail(
    storage: &Arc<dyn Storage>,
    course_id: Uuid,
) -> Result<Option<CourseDetail>> {
    let Some(course) = storage.get_course_by_id(course_id).await? else {
        return Ok(None);
    };
    let chapters = storage.list_chapters(course_id).await?;
    let quiz_count = storage.count_quizzes(course_id).await?;
    let flashcard_count = storage.count_flashcards(course_id).await?;

    Ok(Some(CourseDetail {
        course,
        chapter_count: chapters.len() as u64,
        chapters: chapters.iter().map(ChapterSummary::from).collect(),
        quiz_count,
        flashcard_count,
    }))
}

pub async fn get_course_quality(
    service: &CourseService,
    request: &HttpRequest,
    course_id: Uuid,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_course_by_id(course_id).await {
        Ok(Some(course)) => {
            let message = if course.quality_metrics.is_some() {
                "Quality metrics retrieved successfully"
            } else {
                "Course has not been evaluated yet"
            };
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                CourseQualityResponse {
                    course_id: course.id,
                    status: course.status,
                    version: course.version,
                    quality_metrics: course.quality_metrics,
                },
                message,
            )))
        }
        Ok(None) => Ok(not_found(ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => Ok(error_response(&e, "Failed to get course quality")),
    }
}
