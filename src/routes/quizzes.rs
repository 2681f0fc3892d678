use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::models::quizzes::requests::{
    CreateQuestionRequest, CreateQuizRequest, UpdateQuestionRequest, UpdateQuizRequest,
};
use crate::services::QuizService;
use crate::utils::{SafeCourseId, SafeQuestionId, SafeQuizId};

// 懒加载的全局 QUIZ_SERVICE 实例
static QUIZ_SERVICE: Lazy<QuizService> = Lazy::new(QuizService::new_lazy);

pub async fn list_quizzes(req: HttpRequest, course_id: SafeCourseId) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE.list_quizzes(&req, course_id.0).await
}

pub async fn create_quiz(
    req: HttpRequest,
    course_id: SafeCourseId,
    quiz_data: web::Json<CreateQuizRequest>,
) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE
        .create_quiz(&req, course_id.0, quiz_data.into_inner())
        .await
}

pub async fn get_quiz(req: HttpRequest, quiz_id: SafeQuizId) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE.get_quiz(&req, quiz_id.0).await
}

pub async fn update_quiz(
    req: HttpRequest,
    quiz_id: SafeQuizId,
    update_data: web::Json<UpdateQuizRequest>,
) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE
        .update_quiz(&req, quiz_id.0, update_data.into_inner())
        .await
}

pub async fn delete_quiz(req: HttpRequest, quiz_id: SafeQuizId) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE.delete_quiz(&req, quiz_id.0).await
}

pub async fn add_question(
    req: HttpRequest,
    quiz_id: SafeQuizId,
    question: web::Json<CreateQuestionRequest>,
) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE
        .add_question(&req, quiz_id.0, question.into_inner())
        .await
}

pub async fn update_question(
    req: HttpRequest,
    question_id: SafeQuestionId,
    update_data: web::Json<UpdateQuestionRequest>,
) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE
        .update_question(&req, question_id.0, update_data.into_inner())
        .await
}

pub async fn delete_question(
    req: HttpRequest,
    question_id: SafeQuestionId,
) -> ActixResult<HttpResponse> {
    QUIZ_SERVICE.delete_question(&req, question_id.0).await
}

/// 挂在 `/api/v1/courses` 作用域下
pub fn configure_course_quiz_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/{course_id}/quizzes")
            .route(web::get().to(list_quizzes))
            .route(web::post().to(create_quiz)),
    );
}

// 配置路由
pub fn configure_quiz_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/quizzes")
            .service(
                web::resource("/{quiz_id}")
                    .route(web::get().to(get_quiz))
                    .route(web::put().to(update_quiz))
                    .route(web::delete().to(delete_quiz)),
            )
            .route("/{quiz_id}/questions", web::post().to(add_question)),
    )
    .service(
        web::resource("/api/v1/questions/{question_id}")
            .route(web::put().to(update_question))
            .route(web::delete().to(delete_question)),
    );
}
