use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{info, warn};
use uuid::Uuid;

use super::CourseService;
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{error_response, invalidate_course, not_found};

pub async fn delete_course(
    service: &CourseService,
    request: &HttpRequest,
    course_id: Uuid,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    // 执行中的生成任务会继续写入内容，先拒绝删除
    match storage.active_generation_task(course_id).await {
        Ok(Some(task)) => {
            return Ok(HttpResponse::Conflict().json(ApiResponse::error_empty(
                ErrorCode::GenerationInProgress,
                format!(
                    "Course has an active generation task {} ({}); cancel it or wait for it to finish",
                    task.id, task.status
                ),
            )));
        }
        Ok(None) => {}
        Err(e) => return Ok(error_response(&e, "Failed to delete course")),
    }

    match storage.delete_course(course_id).await {
        Ok(true) => {
            let vector_store = service.get_vector_store(request);
            if let Err(e) = vector_store.delete_course(course_id).await {
                warn!(
                    "Failed to remove vectors of course {} from '{}': {}",
                    course_id,
                    vector_store.name(),
                    e
                );
            }
            invalidate_course(&service.get_cache(request), course_id).await;
            info!("Course {} deleted", course_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("Course deleted successfully")))
        }
        Ok(false) => Ok(not_found(ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => Ok(error_response(&e, "Failed to delete course")),
    }
}
