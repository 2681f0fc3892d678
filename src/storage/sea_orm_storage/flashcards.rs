//! 闪卡存储操作

use super::SeaOrmStorage;
use crate::entity::flashcards::{ActiveModel, Column, Entity as Flashcards};
use crate::entity::to_json;
use crate::errors::{CourseGenError, Result};
use crate::models::{
    PaginationInfo,
    common::pagination::normalize_page,
    flashcards::{
        entities::Flashcard,
        requests::{CreateFlashcardRequest, FlashcardListQuery, UpdateFlashcardRequest},
        responses::FlashcardListResponse,
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

/// 标签去空白、转小写、去重
pub(super) fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().to_lowercase();
        if !tag.is_empty() && !normalized.contains(&tag) {
            normalized.push(tag);
        }
    }
    normalized
}

impl SeaOrmStorage {
    pub async fn create_flashcard_impl(
        &self,
        course_id: Uuid,
        req: CreateFlashcardRequest,
    ) -> Result<Flashcard> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            course_id: Set(course_id),
            chapter_id: Set(req.chapter_id),
            front: Set(req.front.trim().to_string()),
            back: Set(req.back.trim().to_string()),
            difficulty: Set(req.difficulty.to_string()),
            tags: Set(to_json(&normalize_tags(req.tags))),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("创建闪卡失败: {e}")))?;

        Ok(result.into_flashcard())
    }

    pub async fn get_flashcard_by_id_impl(&self, card_id: Uuid) -> Result<Option<Flashcard>> {
        let result = Flashcards::find_by_id(card_id)
            .one(&self.db)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("查询闪卡失败: {e}")))?;

        Ok(result.map(|m| m.into_flashcard()))
    }

    /// 分页列出课程闪卡
    pub async fn list_flashcards_with_pagination_impl(
        &self,
        course_id: Uuid,
        query: FlashcardListQuery,
    ) -> Result<FlashcardListResponse> {
        let (page, size) = normalize_page(query.page, query.size);

        let mut select = Flashcards::find().filter(Column::CourseId.eq(course_id));

        if let Some(chapter_id) = query.chapter_id {
            select = select.filter(Column::ChapterId.eq(chapter_id));
        }

        if let Some(difficulty) = query.difficulty {
            select = select.filter(Column::Difficulty.eq(difficulty.as_str()));
        }

        select = select.order_by_asc(Column::CreatedAt);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| CourseGenError::database_operation(format!("查询闪卡总数失败: {e}")))?;

        let items = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("查询闪卡列表失败: {e}")))?
            .into_iter()
            .map(|m| m.into_flashcard())
            .collect();

        Ok(FlashcardListResponse {
            pagination: PaginationInfo::new(page, size, total),
            items,
        })
    }

    /// 导出用：不分页
    pub async fn list_all_flashcards_impl(&self, course_id: Uuid) -> Result<Vec<Flashcard>> {
        let results = Flashcards::find()
            .filter(Column::CourseId.eq(course_id))
            .order_by_asc(Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("查询闪卡列表失败: {e}")))?;

        Ok(results.into_iter().map(|m| m.into_flashcard()).collect())
    }

    pub async fn count_flashcards_impl(&self, course_id: Uuid) -> Result<u64> {
        Flashcards::find()
            .filter(Column::CourseId.eq(course_id))
            .count(&self.db)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("统计闪卡数量失败: {e}")))
    }

    pub async fn update_flashcard_impl(
        &self,
        card_id: Uuid,
        update: UpdateFlashcardRequest,
    ) -> Result<Option<Flashcard>> {
        let existing = self.get_flashcard_by_id_impl(card_id).await?;
        if existing.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(card_id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(chapter_id) = update.chapter_id {
            model.chapter_id = Set(Some(chapter_id));
        }

        if let Some(front) = update.front {
            model.front = Set(front.trim().to_string());
        }

        if let Some(back) = update.back {
            model.back = Set(back.trim().to_string());
        }

        if let Some(difficulty) = update.difficulty {
            model.difficulty = Set(difficulty.to_string());
        }

        if let Some(tags) = update.tags {
            model.tags = Set(to_json(&normalize_tags(tags)));
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("更新闪卡失败: {e}")))?;

        Ok(Some(result.into_flashcard()))
    }

    pub async fn delete_flashcard_impl(&self, card_id: Uuid) -> Result<bool> {
        let result = Flashcards::delete_by_id(card_id)
            .exec(&self.db)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("删除闪卡失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_tags;

    #[test]
    fn test_normalize_tags_dedupes_case_insensitively() {
        let tags = vec![
            " Ownership ".to_string(),
            "ownership".to_string(),
            "".to_string(),
            "Borrowing".to_string(),
        ];
        assert_eq!(normalize_tags(tags), vec!["ownership", "borrowing"]);
    }
}
