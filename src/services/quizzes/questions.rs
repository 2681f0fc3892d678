use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;
use uuid::Uuid;

use super::QuizService;
use crate::models::quizzes::requests::{CreateQuestionRequest, UpdateQuestionRequest};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{error_response, not_found, validation_error};

pub async fn add_question(
    service: &QuizService,
    request: &HttpRequest,
    quiz_id: Uuid,
    question: CreateQuestionRequest,
) -> ActixResult<HttpResponse> {
    let validation = question.validate();
    if !validation.is_valid() {
        return Ok(validation_error(validation));
    }

    let storage = service.get_storage(request);
    match storage.get_quiz_by_id(quiz_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Ok(not_found(ErrorCode::QuizNotFound, "Quiz not found")),
        Err(e) => return Ok(error_response(&e, "Failed to add question")),
    }

    match storage.add_question(quiz_id, question).await {
        Ok(question) => {
            info!("Question {} added to quiz {}", question.id, quiz_id);
            Ok(HttpResponse::Created().json(ApiResponse::success(
                question,
                "Question added successfully",
            )))
        }
        Err(e) => Ok(error_response(&e, "Failed to add question")),
    }
}

pub async fn update_question(
    service: &QuizService,
    request: &HttpRequest,
    question_id: Uuid,
    update_data: UpdateQuestionRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let current = match storage.get_question_by_id(question_id).await {
        Ok(Some(question)) => question,
        Ok(None) => return Ok(not_found(ErrorCode::QuestionNotFound, "Question not found")),
        Err(e) => return Ok(error_response(&e, "Failed to update question")),
    };

    // 题型、选项与答案相互约束，合并后整体校验
    let merged = update_data.merge_with(&current);
    let validation = merged.validate();
    if !validation.is_valid() {
        return Ok(validation_error(validation));
    }

    match storage.update_question(question_id, merged).await {
        Ok(Some(question)) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            question,
            "Question updated successfully",
        ))),
        Ok(None) => Ok(not_found(ErrorCode::QuestionNotFound, "Question not found")),
        Err(e) => Ok(error_response(&e, "Failed to update question")),
    }
}

pub async fn delete_question(
    service: &QuizService,
    request: &HttpRequest,
    question_id: Uuid,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.delete_question(question_id).await {
        Ok(true) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty(
            "Question deleted successfully",
        ))),
        Ok(false) => Ok(not_found(ErrorCode::QuestionNotFound, "Question not found")),
        Err(e) => Ok(error_response(&e, "Failed to delete question")),
    }
}
