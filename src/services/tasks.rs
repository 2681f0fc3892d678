//! 生成任务管理

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use uuid::Uuid;

use super::{app_state, error_response, not_found};
use crate::errors::CourseGenError;
use crate::generation::TaskManager;
use crate::models::{ApiResponse, ErrorCode};

pub struct TaskService;

impl TaskService {
    pub fn new_lazy() -> Self {
        Self
    }

    pub(crate) fn get_task_manager(&self, request: &HttpRequest) -> Arc<TaskManager> {
        app_state::<TaskManager>(request)
    }

    // 取消排队中的任务
    pub async fn cancel_task(
        &self,
        request: &HttpRequest,
        task_id: Uuid,
    ) -> ActixResult<HttpResponse> {
        match self.get_task_manager(request).cancel(task_id).await {
            Ok(task) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                task,
                "Generation task cancelled",
            ))),
            Err(CourseGenError::NotFound(_)) => {
                Ok(not_found(ErrorCode::TaskNotFound, "Generation task not found"))
            }
            Err(CourseGenError::Conflict(msg)) => Ok(HttpResponse::Conflict().json(
                ApiResponse::error_empty(ErrorCode::TaskNotCancellable, msg),
            )),
            Err(e) => Ok(error_response(&e, "Failed to cancel task")),
        }
    }
}
