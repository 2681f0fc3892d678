use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use uuid::Uuid;

use super::CourseService;
use crate::errors::CourseGenError;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{error_response, not_found};

pub async fn generate_course(
    service: &CourseService,
    request: &HttpRequest,
    course_id: Uuid,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_course_by_id(course_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Ok(not_found(ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => return Ok(error_response(&e, "Failed to queue generation")),
    }

    let task_manager = service.get_task_manager(request);
    match task_manager.submit(course_id).await {
        Ok(task) => Ok(HttpResponse::Accepted().json(ApiResponse::success(
            task,
            "Course generation queued",
        ))),
        Err(CourseGenError::Conflict(msg)) => Ok(HttpResponse::Conflict().json(
            ApiResponse::error_empty(ErrorCode::GenerationInProgress, msg),
        )),
        Err(e) => Ok(error_response(&e, "Failed to queue generation")),
    }
}

pub async fn generation_status(
    service: &CourseService,
    request: &HttpRequest,
    course_id: Uuid,
) -> ActixResult<HttpResponse> {
    let task_manager = service.get_task_manager(request);

    match task_manager.status(course_id).await {
        Ok(Some(task)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            task,
            "Generation status retrieved successfully",
        ))),
        Ok(None) => Ok(not_found(
            ErrorCode::TaskNotFound,
            "No generation task found for this course",
        )),
        Err(e) => Ok(error_response(&e, "Failed to get generation status")),
    }
}
