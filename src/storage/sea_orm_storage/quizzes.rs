//! 测验与题目存储操作

use super::SeaOrmStorage;
use crate::entity::questions::{
    ActiveModel as QuestionActiveModel, Column as QuestionColumn, Entity as Questions,
};
use crate::entity::quizzes::{ActiveModel, Column, Entity as Quizzes};
use crate::entity::to_json;
use crate::errors::{CourseGenError, Result};
use crate::models::quizzes::{
    entities::{Question, QuestionType, Quiz},
    requests::{CreateQuestionRequest, CreateQuizRequest, UpdateQuizRequest},
    responses::QuizDetail,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use uuid::Uuid;

/// 构造题目行；判断题答案统一为小写
pub(super) fn question_model(
    quiz_id: Uuid,
    sequence_number: i32,
    req: CreateQuestionRequest,
    now: i64,
) -> QuestionActiveModel {
    let correct_answer = match req.question_type {
        QuestionType::TrueFalse => req.correct_answer.trim().to_ascii_lowercase(),
        _ => req.correct_answer.trim().to_string(),
    };
    let options: Vec<String> = req.options.iter().map(|o| o.trim().to_string()).collect();

    QuestionActiveModel {
        id: Set(Uuid::new_v4()),
        quiz_id: Set(quiz_id),
        sequence_number: Set(sequence_number),
        question_type: Set(req.question_type.to_string()),
        question_text: Set(req.question_text.trim().to_string()),
        options: Set(to_json(&options)),
        correct_answer: Set(correct_answer),
        explanation: Set(req.explanation),
        difficulty: Set(req.difficulty.to_string()),
        points: Set(req.points),
        created_at: Set(now),
        updated_at: Set(now),
    }
}

impl SeaOrmStorage {
    /// 创建测验，附带的题目在同一事务内写入
    pub async fn create_quiz_impl(
        &self,
        course_id: Uuid,
        req: CreateQuizRequest,
    ) -> Result<QuizDetail> {
        let now = chrono::Utc::now().timestamp();
        let quiz_id = Uuid::new_v4();

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| CourseGenError::database_operation(format!("开启事务失败: {e}")))?;

        let quiz = ActiveModel {
            id: Set(quiz_id),
            course_id: Set(course_id),
            chapter_id: Set(req.chapter_id),
            title: Set(req.title.trim().to_string()),
            description: Set(req.description),
            quiz_type: Set(req.quiz_type.to_string()),
            passing_score: Set(req.passing_score),
            time_limit_minutes: Set(req.time_limit_minutes),
            max_attempts: Set(req.max_attempts),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(|e| CourseGenError::database_operation(format!("创建测验失败: {e}")))?;

        let mut questions = Vec::with_capacity(req.questions.len());
        for (idx, question) in req.questions.into_iter().enumerate() {
            let sequence = question.sequence_number.unwrap_or(idx as i32 + 1);
            let inserted = question_model(quiz_id, sequence, question, now)
                .insert(&txn)
                .await
                .map_err(|e| CourseGenError::database_operation(format!("创建题目失败: {e}")))?;
            questions.push(inserted.into_question());
        }

        txn.commit()
            .await
            .map_err(|e| CourseGenError::database_operation(format!("提交事务失败: {e}")))?;

        questions.sort_by_key(|q| q.sequence_number);
        Ok(QuizDetail {
            quiz: quiz.into_quiz(),
            questions,
        })
    }

    pub async fn get_quiz_by_id_impl(&self, quiz_id: Uuid) -> Result<Option<Quiz>> {
        let result = Quizzes::find_by_id(quiz_id)
            .one(&self.db)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("查询测验失败: {e}")))?;

        Ok(result.map(|m| m.into_quiz()))
    }

    pub async fn list_quizzes_impl(&self, course_id: Uuid) -> Result<Vec<Quiz>> {
        let results = Quizzes::find()
            .filter(Column::CourseId.eq(course_id))
            .order_by_asc(Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("查询测验列表失败: {e}")))?;

        Ok(results.into_iter().map(|m| m.into_quiz()).collect())
    }

    pub async fn count_quizzes_impl(&self, course_id: Uuid) -> Result<u64> {
        Quizzes::find()
            .filter(Column::CourseId.eq(course_id))
            .count(&self.db)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("统计测验数量失败: {e}")))
    }

    pub async fn update_quiz_impl(
        &self,
        quiz_id: Uuid,
        update: UpdateQuizRequest,
    ) -> Result<Option<Quiz>> {
        let existing = self.get_quiz_by_id_impl(quiz_id).await?;
        if existing.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(quiz_id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        if let Some(chapter_id) = update.chapter_id {
            model.chapter_id = Set(Some(chapter_id));
        }

        if let Some(title) = update.title {
            model.title = Set(title.trim().to_string());
        }

        if let Some(description) = update.description {
            model.description = Set(Some(description));
        }

        if let Some(quiz_type) = update.quiz_type {
            model.quiz_type = Set(quiz_type.to_string());
        }

        if let Some(passing_score) = update.passing_score {
            model.passing_score = Set(passing_score);
        }

        if let Some(minutes) = update.time_limit_minutes {
            model.time_limit_minutes = Set(Some(minutes));
        }

        if let Some(attempts) = update.max_attempts {
            model.max_attempts = Set(Some(attempts));
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("更新测验失败: {e}")))?;

        Ok(Some(result.into_quiz()))
    }

    /// 删除测验（题目级联删除）
    pub async fn delete_quiz_impl(&self, quiz_id: Uuid) -> Result<bool> {
        let result = Quizzes::delete_by_id(quiz_id)
            .exec(&self.db)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("删除测验失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn list_questions_impl(&self, quiz_id: Uuid) -> Result<Vec<Question>> {
        let results = Questions::find()
            .filter(QuestionColumn::QuizId.eq(quiz_id))
            .order_by_asc(QuestionColumn::SequenceNumber)
            .all(&self.db)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("查询题目失败: {e}")))?;

        Ok(results.into_iter().map(|m| m.into_question()).collect())
    }

    /// 添加题目；未指定序号时排在最后
    pub async fn add_question_impl(
        &self,
        quiz_id: Uuid,
        req: CreateQuestionRequest,
    ) -> Result<Question> {
        let sequence = match req.sequence_number {
            Some(seq) => seq,
            None => {
                let last = Questions::find()
                    .filter(QuestionColumn::QuizId.eq(quiz_id))
                    .order_by_desc(QuestionColumn::SequenceNumber)
                    .one(&self.db)
                    .await
                    .map_err(|e| {
                        CourseGenError::database_operation(format!("查询题目序号失败: {e}"))
                    })?;
                last.map(|q| q.sequence_number + 1).unwrap_or(1)
            }
        };

        let now = chrono::Utc::now().timestamp();
        let result = question_model(quiz_id, sequence, req, now)
            .insert(&self.db)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("创建题目失败: {e}")))?;

        Ok(result.into_question())
    }

    pub async fn get_question_by_id_impl(&self, question_id: Uuid) -> Result<Option<Question>> {
        let result = Questions::find_by_id(question_id)
            .one(&self.db)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("查询题目失败: {e}")))?;

        Ok(result.map(|m| m.into_question()))
    }

    /// 用合并后的完整数据覆盖题目
    pub async fn update_question_impl(
        &self,
        question_id: Uuid,
        req: CreateQuestionRequest,
    ) -> Result<Option<Question>> {
        let Some(existing) = self.get_question_by_id_impl(question_id).await? else {
            return Ok(None);
        };

        let sequence = req.sequence_number.unwrap_or(existing.sequence_number);
        let mut model = question_model(
            existing.quiz_id,
            sequence,
            req,
            chrono::Utc::now().timestamp(),
        );
        model.id = Set(question_id);
        model.created_at = Set(existing.created_at.timestamp());

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("更新题目失败: {e}")))?;

        Ok(Some(result.into_question()))
    }

    pub async fn delete_question_impl(&self, question_id: Uuid) -> Result<bool> {
        let result = Questions::delete_by_id(question_id)
            .exec(&self.db)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("删除题目失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }
}
