//! 章节存储操作

use super::{SeaOrmStorage, is_unique_violation};
use crate::entity::chapters::{ActiveModel, Column, Entity as Chapters};
use crate::entity::subchapters::{Column as SubchapterColumn, Entity as Subchapters};
use crate::entity::to_json;
use crate::errors::{CourseGenError, Result};
use crate::generation::parsing::split_content_blocks;
use crate::models::chapters::{
    entities::{Chapter, Subchapter},
    requests::{CreateChapterRequest, UpdateChapterRequest},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};
use uuid::Uuid;

fn map_write_error(err: DbErr, action: &str) -> CourseGenError {
    if is_unique_violation(&err) {
        CourseGenError::conflict("A chapter with this sequence_number already exists in the course")
    } else {
        CourseGenError::database_operation(format!("{action}失败: {err}"))
    }
}

impl SeaOrmStorage {
    /// 手动创建章节
    pub async fn create_chapter_impl(
        &self,
        course_id: Uuid,
        req: CreateChapterRequest,
    ) -> Result<Chapter> {
        let now = chrono::Utc::now().timestamp();
        let blocks = split_content_blocks(&req.content);

        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            course_id: Set(course_id),
            sequence_number: Set(req.sequence_number),
            title: Set(req.title.trim().to_string()),
            learning_objectives: Set(to_json(&req.learning_objectives)),
            content_type: Set(req.content_type.to_string()),
            estimated_duration_minutes: Set(req.estimated_duration_minutes),
            complexity_level: Set(req.complexity_level),
            prerequisites: Set(to_json(&req.prerequisites)),
            content: Set(req.content),
            content_blocks: Set(to_json(&blocks)),
            quality_score: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| map_write_error(e, "创建章节"))?;

        Ok(result.into_chapter())
    }

    /// 通过 ID 获取章节
    pub async fn get_chapter_by_id_impl(&self, chapter_id: Uuid) -> Result<Option<Chapter>> {
        let result = Chapters::find_by_id(chapter_id)
            .one(&self.db)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("查询章节失败: {e}")))?;

        Ok(result.map(|m| m.into_chapter()))
    }

    /// 按序号列出课程的全部章节
    pub async fn list_chapters_impl(&self, course_id: Uuid) -> Result<Vec<Chapter>> {
        let results = Chapters::find()
            .filter(Column::CourseId.eq(course_id))
            .order_by_asc(Column::SequenceNumber)
            .all(&self.db)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("查询章节列表失败: {e}")))?;

        Ok(results.into_iter().map(|m| m.into_chapter()).collect())
    }

    pub async fn list_subchapters_impl(&self, chapter_id: Uuid) -> Result<Vec<Subchapter>> {
        let results = Subchapters::find()
            .filter(SubchapterColumn::ChapterId.eq(chapter_id))
            .order_by_asc(SubchapterColumn::SequenceNumber)
            .all(&self.db)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("查询子章节失败: {e}")))?;

        Ok(results.into_iter().map(|m| m.into_subchapter()).collect())
    }

    /// 更新章节；正文变化时重新切分内容块并清空质量分
    pub async fn update_chapter_impl(
        &self,
        chapter_id: Uuid,
        update: UpdateChapterRequest,
    ) -> Result<Option<Chapter>> {
        let existing = self.get_chapter_by_id_impl(chapter_id).await?;
        if existing.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(chapter_id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(sequence_number) = update.sequence_number {
            model.sequence_number = Set(sequence_number);
        }

        if let Some(title) = update.title {
            model.title = Set(title.trim().to_string());
        }

        if let Some(objectives) = update.learning_objectives {
            model.learning_objectives = Set(to_json(&objectives));
        }

        if let Some(content_type) = update.content_type {
            model.content_type = Set(content_type.to_string());
        }

        if let Some(minutes) = update.estimated_duration_minutes {
            model.estimated_duration_minutes = Set(minutes);
        }

        if let Some(complexity) = update.complexity_level {
            model.complexity_level = Set(complexity);
        }

        if let Some(prerequisites) = update.prerequisites {
            model.prerequisites = Set(to_json(&prerequisites));
        }

        if let Some(content) = update.content {
            model.content_blocks = Set(to_json(&split_content_blocks(&content)));
            model.content = Set(content);
            model.quality_score = Set(None);
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| map_write_error(e, "更新章节"))?;

        Ok(Some(result.into_chapter()))
    }

    /// 删除章节（子章节及关联的测验、闪卡级联删除）
    pub async fn delete_chapter_impl(&self, chapter_id: Uuid) -> Result<bool> {
        let result = Chapters::delete_by_id(chapter_id)
            .exec(&self.db)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("删除章节失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn set_chapter_quality_score_impl(&self, chapter_id: Uuid, score: f64) -> Result<bool> {
        let result = Chapters::update_many()
            .col_expr(Column::QualityScore, sea_orm::sea_query::Expr::value(score))
            .filter(Column::Id.eq(chapter_id))
            .exec(&self.db)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("保存章节质量分失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 序号是否已被同一课程的其他章节占用
    pub async fn chapter_sequence_taken_impl(
        &self,
        course_id: Uuid,
        sequence_number: i32,
        exclude_chapter: Option<Uuid>,
    ) -> Result<bool> {
        let mut select = Chapters::find()
            .filter(Column::CourseId.eq(course_id))
            .filter(Column::SequenceNumber.eq(sequence_number));

        if let Some(exclude) = exclude_chapter {
            select = select.filter(Column::Id.ne(exclude));
        }

        let count = select
            .count(&self.db)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("查询章节序号失败: {e}")))?;

        Ok(count > 0)
    }
}
