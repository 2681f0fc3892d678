use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::services::TaskService;
use crate::utils::SafeTaskId;

static TASK_SERVICE: Lazy<TaskService> = Lazy::new(TaskService::new_lazy);

pub async fn cancel_task(req: HttpRequest, task_id: SafeTaskId) -> ActixResult<HttpResponse> {
    TASK_SERVICE.cancel_task(&req, task_id.0).await
}

pub fn configure_task_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/v1/tasks/{task_id}").route(web::delete().to(cancel_task)));
}
