pub mod create;
pub mod delete;
pub mod export;
pub mod generate;
pub mod get;
pub mod list;
pub mod search;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use uuid::Uuid;

use super::app_state;
use crate::ai::AiClient;
use crate::cache::ObjectCache;
use crate::generation::TaskManager;
use crate::models::courses::requests::{
    CourseQueryParams, CreateCourseRequest, ExportQuery, SearchQuery, UpdateCourseRequest,
};
use crate::storage::Storage;
use crate::vector::VectorStore;

pub struct CourseService {
    storage: Option<Arc<dyn Storage>>,
}

impl CourseService {
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

    pub(crate) fn get_task_manager(&self, request: &HttpRequest) -> Arc<TaskManager> {
        app_state::<TaskManager>(request)
    }

    pub(crate) fn get_ai(&self, request: &HttpRequest) -> Arc<AiClient> {
        app_state::<AiClient>(request)
    }

    pub(crate) fn get_vector_store(&self, request: &HttpRequest) -> Arc<dyn VectorStore> {
        app_state::<dyn VectorStore>(request)
    }

    // 创建课程，默认同时排队生成内容
    pub async fn create_course(
        &self,
        request: &HttpRequest,
        course_data: CreateCourseRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_course(self, request, course_data).await
    }

    pub async fn list_courses(
        &self,
        request: &HttpRequest,
        query: CourseQueryParams,
    ) -> ActixResult<HttpResponse> {
        list::list_courses(self, request, query).await
    }

    // 课程详情（带缓存）
    pub async fn get_course(
        &self,
        request: &HttpRequest,
        course_id: Uuid,
    ) -> ActixResult<HttpResponse> {
        get::get_course(self, request, course_id).await
    }

    pub async fn update_course(
        &self,
        request: &HttpRequest,
        course_id: Uuid,
        update_data: UpdateCourseRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_course(self, request, course_id, update_data).await
    }

    pub async fn delete_course(
        &self,
        request: &HttpRequest,
        course_id: Uuid,
    ) -> ActixResult<HttpResponse> {
        delete::delete_course(self, request, course_id).await
    }

    // 排队（重新）生成课程内容
    pub async fn generate_course(
        &self,
        request: &HttpRequest,
        course_id: Uuid,
    ) -> ActixResult<HttpResponse> {
        generate::generate_course(self, request, course_id).await
    }

    pub async fn generation_status(
        &self,
        request: &HttpRequest,
        course_id: Uuid,
    ) -> ActixResult<HttpResponse> {
        generate::generation_status(self, request, course_id).await
    }

    pub async fn get_course_quality(
        &self,
        request: &HttpRequest,
        course_id: Uuid,
    ) -> ActixResult<HttpResponse> {
        get::get_course_quality(self, request, course_id).await
    }

    pub async fn search_course(
        &self,
        request: &HttpRequest,
        course_id: Uuid,
        query: SearchQuery,
    ) -> ActixResult<HttpResponse> {
        search::search_course(self, request, course_id, query).await
    }

    pub async fn export_course(
        &self,
        request: &HttpRequest,
        course_id: Uuid,
        query: ExportQuery,
    ) -> ActixResult<HttpResponse> {
        export::export_course(self, request, course_id, query).await
    }
}
