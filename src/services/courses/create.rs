use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{info, warn};

use super::CourseService;
use crate::models::ApiResponse;
use crate::models::courses::{requests::CreateCourseRequest, responses::CreateCourseResponse};
use crate::services::{error_response, validation_error};

pub async fn create_course(
    service: &CourseService,
    request: &HttpRequest,
    course_data: CreateCourseRequest,
) -> ActixResult<HttpResponse> {
    let validation = course_data.validate();
    if !validation.is_valid() {
        return Ok(validation_error(validation));
    }

    let generate = course_data.generate;
    let storage = service.get_storage(request);

    let course = match storage.create_course(course_data).await {
        Ok(course) => course,
        Err(e) => return Ok(error_response(&e, "Course creation failed")),
    };
    info!("Course {} created: {}", course.id, course.title);

    if !generate {
        return Ok(HttpResponse::Created().json(ApiResponse::success(
            CreateCourseResponse { course, task: None },
            "Course created successfully",
        )));
    }

    let task_manager = service.get_task_manager(request);
    if !task_manager.is_available() {
        return Ok(HttpResponse::Created().json(ApiResponse::success(
            CreateCourseResponse { course, task: None },
            "Course created as draft; generation is disabled because no AI provider is configured",
        )));
    }

    match task_manager.submit(course.id).await {
        Ok(task) => Ok(HttpResponse::Created().json(ApiResponse::success(
            CreateCourseResponse {
                course,
                task: Some(task),
            },
            "Course created and generation queued",
        ))),
        Err(e) => {
            warn!("Course {} created but generation was not queued: {}", course.id, e);
            let message = format!(
                "Course created, but generation could not be queued: {}",
                e.message()
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                CreateCourseResponse { course, task: None },
                message,
            )))
        }
    }
}
