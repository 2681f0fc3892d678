pub mod create;
pub mod get;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;
use uuid::Uuid;

use super::app_state;
use crate::cache::ObjectCache;
use crate::models::flashcards::requests::{
    CreateFlashcardRequest, FlashcardQueryParams, UpdateFlashcardRequest,
};
use crate::storage::Storage;

pub struct FlashcardService {
    storage: Option<Arc<dyn Storage>>,
}

impl FlashcardService {
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

    pub async fn list_flashcards(
        &self,
        request: &HttpRequest,
        course_id: Uuid,
        query: FlashcardQueryParams,
    ) -> ActixResult<HttpResponse> {
        get::list_flashcards(self, request, course_id, query).await
    }

    pub async fn create_flashcard(
        &self,
        request: &HttpRequest,
        course_id: Uuid,
        card: CreateFlashcardRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_flashcard(self, request, course_id, card).await
    }

    pub async fn get_flashcard(
        &self,
        request: &HttpRequest,
        flashcard_id: Uuid,
    ) -> ActixResult<HttpResponse> {
        get::get_flashcard(self, request, flashcard_id).await
    }

    pub async fn update_flashcard(
        &self,
        request: &HttpRequest,
        flashcard_id: Uuid,
        update_data: UpdateFlashcardRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_flashcard(self, request, flashcard_id, update_data).await
    }

    pub async fn delete_flashcard(
        &self,
        request: &HttpRequest,
        flashcard_id: Uuid,
    ) -> ActixResult<HttpResponse> {
        update::delete_flashcard(self, request, flashcard_id).await
    }
}
