use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;
use uuid::Uuid;

use super::CourseService;
use crate::models::courses::{entities::CourseStatus, requests::UpdateCourseRequest};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{error_response, invalidate_course, not_found, validation_error};

pub async fn update_course(
    service: &CourseService,
    request: &HttpRequest,
    course_id: Uuid,
    update_data: UpdateCourseRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let current = match storage.get_course_by_id(course_id).await {
        Ok(Some(course)) => course,
        Ok(None) => return Ok(not_found(ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => return Ok(error_response(&e, "Failed to update course")),
    };

    // 难度区间按合并后的值校验
    let validation = update_data.validate(current.proficiency_level(), current.difficulty_score);
    if !validation.is_valid() {
        return Ok(validation_error(validation));
    }

    if current.status == CourseStatus::Generating
        && (update_data.touches_content() || update_data.status.is_some())
    {
        return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
            ErrorCode::GenerationInProgress,
            "Course content is being generated; try again when generation finishes",
        )));
    }

    match storage.update_course(course_id, update_data).await {
        Ok(Some(course)) => {
            invalidate_course(&service.get_cache(request), course_id).await;
            info!("Course {} updated to version {}", course_id, course.version);
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                course,
                "Course updated successfully",
            )))
        }
        Ok(None) => Ok(not_found(ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => Ok(error_response(&e, "Failed to update course")),
    }
}
