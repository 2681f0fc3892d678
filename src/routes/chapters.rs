use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::models::chapters::requests::{CreateChapterRequest, UpdateChapterRequest};
use crate::services::ChapterService;
use crate::utils::{SafeChapterId, SafeCourseId};

// 懒加载的全局 CHAPTER_SERVICE 实例
static CHAPTER_SERVICE: Lazy<ChapterService> = Lazy::new(ChapterService::new_lazy);

pub async fn list_chapters(req: HttpRequest, course_id: SafeCourseId) -> ActixResult<HttpResponse> {
    CHAPTER_SERVICE.list_chapters(&req, course_id.0).await
}

pub async fn create_chapter(
    req: HttpRequest,
    course_id: SafeCourseId,
    chapter_data: web::Json<CreateChapterRequest>,
) -> ActixResult<HttpResponse> {
    CHAPTER_SERVICE
        .create_chapter(&req, course_id.0, chapter_data.into_inner())
        .await
}

pub async fn get_chapter(req: HttpRequest, chapter_id: SafeChapterId) -> ActixResult<HttpResponse> {
    CHAPTER_SERVICE.get_chapter(&req, chapter_id.0).await
}

pub async fn update_chapter(
    req: HttpRequest,
    chapter_id: SafeChapterId,
    update_data: web::Json<UpdateChapterRequest>,
) -> ActixResult<HttpResponse> {
    CHAPTER_SERVICE
        .update_chapter(&req, chapter_id.0, update_data.into_inner())
        .await
}

pub async fn delete_chapter(
    req: HttpRequest,
    chapter_id: SafeChapterId,
) -> ActixResult<HttpResponse> {
    CHAPTER_SERVICE.delete_chapter(&req, chapter_id.0).await
}

pub async fn validate_chapter(
    req: HttpRequest,
    chapter_id: SafeChapterId,
) -> ActixResult<HttpResponse> {
    CHAPTER_SERVICE.validate_chapter(&req, chapter_id.0).await
}

/// 挂在 `/api/v1/courses` 作用域下
pub fn configure_course_chapter_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/{course_id}/chapters")
            .route(web::get().to(list_chapters))
            .route(web::post().to(create_chapter)),
    );
}

// 配置路由
pub fn configure_chapter_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/chapters")
            .service(
                web::resource("/{chapter_id}")
                    .route(web::get().to(get_chapter))
                    .route(web::put().to(update_chapter))
                    .route(web::delete().to(delete_chapter)),
            )
            .route("/{chapter_id}/validate", web::post().to(validate_chapter)),
    );
}
