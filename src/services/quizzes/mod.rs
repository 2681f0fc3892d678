pub mod create;
pub mod delete;
pub mod get;
pub mod questions;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use uuid::Uuid;

use super::app_state;
use crate::cache::ObjectCache;
use crate::errors::Result;
use crate::models::quizzes::requests::{
    CreateQuestionRequest, CreateQuizRequest, UpdateQuestionRequest, UpdateQuizRequest,
};
use crate::storage::Storage;

pub struct QuizService {
    storage: Option<Arc<dyn Storage>>,
}

impl QuizService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Arc<dyn Storage> {
        if let Some(storage) = &self.storage {
            storage.clone()
        } else {
            app_state::<dyn Storage>(request)
        }
    }

    pub(crate) fn get_cache(&self, request: &HttpRequest) -> Arc<dyn ObjectCache> {
        app_state::<dyn ObjectCache>(request)
    }

    pub async fn list_quizzes(
        &self,
        request: &HttpRequest,
        course_id: Uuid,
    ) -> ActixResult<HttpResponse> {
        get::list_quizzes(self, request, course_id).await
    }

    // 创建测验，可同时创建题目
    pub async fn create_quiz(
        &self,
        request: &HttpRequest,
        course_id: Uuid,
        quiz_data: CreateQuizRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_quiz(self, request, course_id, quiz_data).await
    }

    // 测验详情，包含题目
    pub async fn get_quiz(&self, request: &HttpRequest, quiz_id: Uuid) -> ActixResult<HttpResponse> {
        get::get_quiz(self, request, quiz_id).await
    }

    pub async fn update_quiz(
        &self,
        request: &HttpRequest,
        quiz_id: Uuid,
        update_data: UpdateQuizRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_quiz(self, request, quiz_id, update_data).await
    }

    pub async fn delete_quiz(
        &self,
        request: &HttpRequest,
        quiz_id: Uuid,
    ) -> ActixResult<HttpResponse> {
        delete::delete_quiz(self, request, quiz_id).await
    }

    pub async fn add_question(
        &self,
        request: &HttpRequest,
        quiz_id: Uuid,
        question: CreateQuestionRequest,
    ) -> ActixResult<HttpResponse> {
        questions::add_question(self, request, quiz_id, question).await
    }

    pub async fn update_question(
        &self,
        request: &HttpRequest,
        question_id: Uuid,
        update_data: UpdateQuestionRequest,
    ) -> ActixResult<HttpResponse> {
        questions::update_question(self, request, question_id, update_data).await
    }

    pub async fn delete_question(
        &self,
        request: &HttpRequest,
        question_id: Uuid,
    ) -> ActixResult<HttpResponse> {
        questions::delete_question(self, request, question_id).await
    }
}

/// 测验关联的章节必须属于同一课程
pub(crate) async fn chapter_belongs_to_course(
    storage: &Arc<dyn Storage>,
    chapter_id: Uuid,
    course_id: Uuid,
) -> Result<bool> {
    Ok(storage
        .get_chapter_by_id(chapter_id)
        .await?
        .is_some_and(|chapter| chapter.course_id == course_id))
}
