use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use uuid::Uuid;

use super::QuizService;
use crate::models::quizzes::responses::{QuizDetail, QuizListResponse};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{error_response, not_found};

pub async fn list_quizzes(
    service: &QuizService,
    request: &HttpRequest,
    course_id: Uuid,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_course_by_id(course_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return Ok(not_found(ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => return Ok(error_response(&e, "Failed to list quizzes")),
    }

    match storage.list_quizzes(course_id).await {
        Ok(items) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            QuizListResponse { course_id, items },
            "Quizzes retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, "Failed to list quizzes")),
    }
}

pub async fn get_quiz(
    service: &QuizService,
    request: &HttpRequest,
    quiz_id: Uuid,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    let quiz = match storage.get_quiz_by_id(quiz_id).await {
        Ok(Some(quiz)) => quiz,
        Ok(None) => return Ok(not_found(ErrorCode::QuizNotFound, "Quiz not found")),
        Err(e) => return Ok(error_response(&e, "Failed to get quiz")),
    };

    match storage.list_questions(quiz_id).await {
        Ok(questions) => Ok(HttpResponse::Ok().json(ApiResponse::success(
            QuizDetail { quiz, questions },
            "Quiz retrieved successfully",
        ))),
        Err(e) => Ok(error_response(&e, "Failed to get quiz")),
    }
}
