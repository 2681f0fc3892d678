//! 生成内容的整体替换

use std::collections::HashMap;

use super::SeaOrmStorage;
use super::flashcards::normalize_tags;
use super::quizzes::question_model;
use crate::entity::chapters::{
    ActiveModel as ChapterActiveModel, Column as ChapterColumn, Entity as Chapters,
};
use crate::entity::flashcards::{
    ActiveModel as FlashcardActiveModel, Column as FlashcardColumn, Entity as Flashcards,
};
use crate::entity::quizzes::{
    ActiveModel as QuizActiveModel, Column as QuizColumn, Entity as Quizzes,
};
use crate::entity::subchapters::ActiveModel as SubchapterActiveModel;
use crate::entity::to_json;
use crate::errors::{CourseGenError, Result};
use crate::models::generation::entities::GeneratedContent;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait};
use uuid::Uuid;

impl SeaOrmStorage {
    /// 在一个事务内删除课程旧内容并写入新生成的内容
    ///
    /// 测验和闪卡通过 `chapter_sequence` 关联到新章节。
    pub async fn replace_course_content_impl(
        &self,
        course_id: Uuid,
        content: GeneratedContent,
    ) -> Result<()> {
        let now = chrono::Utc::now().timestamp();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| CourseGenError::database_operation(format!("开启事务失败: {e}")))?;

        Flashcards::delete_many()
            .filter(FlashcardColumn::CourseId.eq(course_id))
            .exec(&txn)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("删除旧闪卡失败: {e}")))?;

        Quizzes::delete_many()
            .filter(QuizColumn::CourseId.eq(course_id))
            .exec(&txn)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("删除旧测验失败: {e}")))?;

        Chapters::delete_many()
            .filter(ChapterColumn::CourseId.eq(course_id))
            .exec(&txn)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("删除旧章节失败: {e}")))?;

        let mut chapter_ids: HashMap<i32, Uuid> = HashMap::new();
        for chapter in content.chapters {
            let chapter_id = Uuid::new_v4();
            ChapterActiveModel {
                id: Set(chapter_id),
                course_id: Set(course_id),
                sequence_number: Set(chapter.sequence_number),
                title: Set(chapter.title),
                learning_objectives: Set(to_json(&chapter.learning_objectives)),
                content_type: Set(chapter.content_type.to_string()),
                estimated_duration_minutes: Set(chapter.estimated_duration_minutes),
                complexity_level: Set(chapter.complexity_level),
                prerequisites: Set(to_json(&chapter.prerequisites)),
                content: Set(chapter.content),
                content_blocks: Set(to_json(&chapter.content_blocks)),
                quality_score: Set(chapter.quality_score),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("写入章节失败: {e}")))?;

            for sub in chapter.subchapters {
                SubchapterActiveModel {
                    id: Set(Uuid::new_v4()),
                    chapter_id: Set(chapter_id),
                    sequence_number: Set(sub.sequence_number),
                    title: Set(sub.title),
                    content: Set(sub.content),
                    key_concepts: Set(to_json(&sub.key_concepts)),
                    summary: Set(sub.summary),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(&txn)
                .await
                .map_err(|e| CourseGenError::database_operation(format!("写入子章节失败: {e}")))?;
            }

            chapter_ids.insert(chapter.sequence_number, chapter_id);
        }

        for quiz in content.quizzes {
            let quiz_id = Uuid::new_v4();
            QuizActiveModel {
                id: Set(quiz_id),
                course_id: Set(course_id),
                chapter_id: Set(quiz
                    .chapter_sequence
                    .and_then(|seq| chapter_ids.get(&seq).copied())),
                title: Set(quiz.title),
                description: Set(quiz.description),
                quiz_type: Set(quiz.quiz_type.to_string()),
                passing_score: Set(quiz.passing_score),
                time_limit_minutes: Set(None),
                max_attempts: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("写入测验失败: {e}")))?;

            for (idx, question) in quiz.questions.into_iter().enumerate() {
                let sequence = question.sequence_number.unwrap_or(idx as i32 + 1);
                question_model(quiz_id, sequence, question, now)
                    .insert(&txn)
                    .await
                    .map_err(|e| {
                        CourseGenError::database_operation(format!("写入题目失败: {e}"))
                    })?;
            }
        }

        for card in content.flashcards {
            FlashcardActiveModel {
                id: Set(Uuid::new_v4()),
                course_id: Set(course_id),
                chapter_id: Set(card
                    .chapter_sequence
                    .and_then(|seq| chapter_ids.get(&seq).copied())),
                front: Set(card.front),
                back: Set(card.back),
                difficulty: Set(card.difficulty.to_string()),
                tags: Set(to_json(&normalize_tags(card.tags))),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("写入闪卡失败: {e}")))?;
        }

        txn.commit()
            .await
            .map_err(|e| CourseGenError::database_operation(format!("提交事务失败: {e}")))?;

        Ok(())
    }
}
