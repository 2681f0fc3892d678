use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use super::{chapters, flashcards, quizzes};
use crate::models::courses::requests::{
    CourseQueryParams, CreateCourseRequest, ExportQuery, SearchQuery, UpdateCourseRequest,
};
use crate::services::CourseService;
use crate::utils::SafeCourseId;

// 懒加载的全局 COURSE_SERVICE 实例
static COURSE_SERVICE: Lazy<CourseService> = Lazy::new(CourseService::new_lazy);

// HTTP处理程序
pub async fn list_courses(
    req: HttpRequest,
    query: web::Query<CourseQueryParams>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.list_courses(&req, query.into_inner()).await
}

pub async fn create_course(
    req: HttpRequest,
    course_data: web::Json<CreateCourseRequest>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .create_course(&req, course_data.into_inner())
        .await
}

pub async fn get_course(req: HttpRequest, course_id: SafeCourseId) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.get_course(&req, course_id.0).await
}

pub async fn update_course(
    req: HttpRequest,
    course_id: SafeCourseId,
    update_data: web::Json<UpdateCourseRequest>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .update_course(&req, course_id.0, update_data.into_inner())
        .await
}

pub async fn delete_course(req: HttpRequest, course_id: SafeCourseId) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.delete_course(&req, course_id.0).await
}

pub async fn generate_course(
    req: HttpRequest,
    course_id: SafeCourseId,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.generate_course(&req, course_id.0).await
}

pub async fn generation_status(
    req: HttpRequest,
    course_id: SafeCourseId,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.generation_status(&req, course_id.0).await
}

pub async fn get_course_quality(
    req: HttpRequest,
    course_id: SafeCourseId,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE.get_course_quality(&req, course_id.0).await
}

pub async fn search_course(
    req: HttpRequest,
    course_id: SafeCourseId,
    query: web::Query<SearchQuery>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .search_course(&req, course_id.0, query.into_inner())
        .await
}

pub async fn export_course(
    req: HttpRequest,
    course_id: SafeCourseId,
    query: web::Query<ExportQuery>,
) -> ActixResult<HttpResponse> {
    COURSE_SERVICE
        .export_course(&req, course_id.0, query.into_inner())
        .await
}

// 配置路由
pub fn configure_course_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/courses")
            .service(
                web::resource("")
                    .route(web::get().to(list_courses))
                    .route(web::post().to(create_course)),
            )
            .service(
                web::resource("/{course_id}")
                    .route(web::get().to(get_course))
                    .route(web::put().to(update_course))
                    .route(web::delete().to(delete_course)),
            )
            .route("/{course_id}/generate", web::post().to(generate_course))
            .route(
                "/{course_id}/generation-status",
                web::get().to(generation_status),
            )
            .route("/{course_id}/quality", web::get().to(get_course_quality))
            .route("/{course_id}/search", web::get().to(search_course))
            .route("/{course_id}/export", web::get().to(export_course))
            // 课程下的章节、测验和闪卡集合
            .configure(chapters::configure_course_chapter_routes)
            .configure(quizzes::configure_course_quiz_routes)
            .configure(flashcards::configure_course_flashcard_routes),
    );
}
