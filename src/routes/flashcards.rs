use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::models::flashcards::requests::{
    CreateFlashcardRequest, FlashcardQueryParams, UpdateFlashcardRequest,
};
use crate::services::FlashcardService;
use crate::utils::{SafeCourseId, SafeFlashcardId};

// 懒加载的全局 FLASHCARD_SERVICE 实例
static FLASHCARD_SERVICE: Lazy<FlashcardService> = Lazy::new(FlashcardService::new_lazy);

pub async fn list_flashcards(
    req: HttpRequest,
    course_id: SafeCourseId,
    query: web::Query<FlashcardQueryParams>,
) -> ActixResult<HttpResponse> {
    FLASHCARD_SERVICE
        .list_flashcards(&req, course_id.0, query.into_inner())
        .await
}

pub async fn create_flashcard(
    req: HttpRequest,
    course_id: SafeCourseId,
    card: web::Json<CreateFlashcardRequest>,
) -> ActixResult<HttpResponse> {
    FLASHCARD_SERVICE
        .create_flashcard(&req, course_id.0, card.into_inner())
        .await
}

pub async fn get_flashcard(
    req: HttpRequest,
    flashcard_id: SafeFlashcardId,
) -> ActixResult<HttpResponse> {
    FLASHCARD_SERVICE.get_flashcard(&req, flashcard_id.0).await
}

pub async fn update_flashcard(
    req: HttpRequest,
    flashcard_id: SafeFlashcardId,
    update_data: web::Json<UpdateFlashcardRequest>,
) -> ActixResult<HttpResponse> {
    FLASHCARD_SERVICE
        .update_flashcard(&req, flashcard_id.0, update_data.into_inner())
        .await
}

pub async fn delete_flashcard(
    req: HttpRequest,
    flashcard_id: SafeFlashcardId,
) -> ActixResult<HttpResponse> {
    FLASHCARD_SERVICE.delete_flashcard(&req, flashcard_id.0).await
}

/// 挂在 `/api/v1/courses` 作用域下
pub fn configure_course_flashcard_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/{course_id}/flashcards")
            .route(web::get().to(list_flashcards))
            .route(web::post().to(create_flashcard)),
    );
}

// 配置路由
pub fn configure_flashcard_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/v1/flashcards/{flashcard_id}")
            .route(web::get().to(get_flashcard))
            .route(web::put().to(update_flashcard))
            .route(web::delete().to(delete_flashcard)),
    );
}
