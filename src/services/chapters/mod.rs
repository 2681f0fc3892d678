pub mod create;
pub mod delete;
pub mod get;
pub mod update;
pub mod validate;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use uuid::Uuid;

use super::app_state;
use crate::cache::ObjectCache;
use crate::models::chapters::requests::{CreateChapterRequest, UpdateChapterRequest};
use crate::quality::QualityValidator;
use crate::storage::Storage;

pub struct ChapterService {
    storage: Option<Arc<dyn Storage>>,
}

impl ChapterService {
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

    pub(crate) fn get_validator(&self, request: &HttpRequest) -> Arc<QualityValidator> {
        app_state::<QualityValidator>(request)
    }

    // 按序号列出课程的章节
    pub async fn list_chapters(
        &self,
        request: &HttpRequest,
        course_id: Uuid,
    ) -> ActixResult<HttpResponse> {
        get::list_chapters(self, request, course_id).await
    }

    pub async fn create_chapter(
        &self,
        request: &HttpRequest,
        course_id: Uuid,
        chapter_data: CreateChapterRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_chapter(self, request, course_id, chapter_data).await
    }

    // 章节详情，包含子章节
    pub async fn get_chapter(
        &self,
        request: &HttpRequest,
        chapter_id: Uuid,
    ) -> ActixResult<HttpResponse> {
        get::get_chapter(self, request, chapter_id).await
    }

    pub async fn update_chapter(
        &self,
        request: &HttpRequest,
        chapter_id: Uuid,
        update_data: UpdateChapterRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_chapter(self, request, chapter_id, update_data).await
    }

    pub async fn delete_chapter(
        &self,
        request: &HttpRequest,
        chapter_id: Uuid,
    ) -> ActixResult<HttpResponse> {
        delete::delete_chapter(self, request, chapter_id).await
    }

    // 对已保存的正文做质量评估并写回分数
    pub async fn validate_chapter(
        &self,
        request: &HttpRequest,
        chapter_id: Uuid,
    ) -> ActixResult<HttpResponse> {
        validate::validate_chapter(self, request, chapter_id).await
    }
}
