//! 生成任务存储操作

use super::SeaOrmStorage;
use crate::entity::courses::{Column as CourseColumn, Entity as Courses};
use crate::entity::generation_tasks::{ActiveModel, Column, Entity as GenerationTasks};
use crate::errors::{CourseGenError, Result};
use crate::models::courses::entities::CourseStatus;
use crate::models::generation::{
    entities::{GenerationTask, TaskStatus},
    requests::TaskUpdate,
};
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

const ACTIVE_STATUSES: [&str; 2] = ["pending", "running"];

impl SeaOrmStorage {
    /// 新建排队中的生成任务
    pub async fn create_generation_task_impl(&self, course_id: Uuid) -> Result<GenerationTask> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            course_id: Set(course_id),
            status: Set(TaskStatus::Pending.to_string()),
            progress: Set(0),
            current_step: Set("queued".to_string()),
            error: Set(None),
            started_at: Set(None),
            completed_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("创建生成任务失败: {e}")))?;

        Ok(result.into_task())
    }

    pub async fn get_generation_task_impl(&self, task_id: Uuid) -> Result<Option<GenerationTask>> {
        let result = GenerationTasks::find_by_id(task_id)
            .one(&self.db)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("查询生成任务失败: {e}")))?;

        Ok(result.map(|m| m.into_task()))
    }

    pub async fn latest_generation_task_impl(
        &self,
        course_id: Uuid,
    ) -> Result<Option<GenerationTask>> {
        let result = GenerationTasks::find()
            .filter(Column::CourseId.eq(course_id))
            .order_by_desc(Column::CreatedAt)
            .one(&self.db)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("查询生成任务失败: {e}")))?;

        Ok(result.map(|m| m.into_task()))
    }

    /// 课程当前排队或执行中的任务
    pub async fn active_generation_task_impl(
        &self,
        course_id: Uuid,
    ) -> Result<Option<GenerationTask>> {
        let result = GenerationTasks::find()
            .filter(Column::CourseId.eq(course_id))
            .filter(Column::Status.is_in(ACTIVE_STATUSES))
            .order_by_desc(Column::CreatedAt)
            .one(&self.db)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("查询生成任务失败: {e}")))?;

        Ok(result.map(|m| m.into_task()))
    }

    /// 更新任务进度或状态；已结束的任务保持不变
    pub async fn update_generation_task_impl(
        &self,
        task_id: Uuid,
        update: TaskUpdate,
    ) -> Result<Option<GenerationTask>> {
        let Some(existing) = GenerationTasks::find_by_id(task_id)
            .one(&self.db)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("查询生成任务失败: {e}")))?
        else {
            return Ok(None);
        };

        let current = existing
            .status
            .parse::<TaskStatus>()
            .unwrap_or(TaskStatus::Failed);
        if current.is_terminal() {
            return Ok(Some(existing.into_task()));
        }

        let now = chrono::Utc::now().timestamp();
        let mut model = ActiveModel {
            id: Set(task_id),
            updated_at: Set(now),
            ..Default::default()
        };

        if let Some(progress) = update.progress {
            model.progress = Set(progress.clamp(0, 100));
        }

        if let Some(step) = update.current_step {
            model.current_step = Set(step);
        }

        if let Some(error) = update.error {
            model.error = Set(Some(error));
        }

        if let Some(status) = update.status {
            model.status = Set(status.to_string());
            if status == TaskStatus::Running && existing.started_at.is_none() {
                model.started_at = Set(Some(now));
            }
            if status.is_terminal() {
                model.completed_at = Set(Some(now));
            }
            if status == TaskStatus::Completed {
                model.progress = Set(100);
            }
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("更新生成任务失败: {e}")))?;

        Ok(Some(result.into_task()))
    }

    /// 只有排队中的任务可以取消
    pub async fn cancel_pending_task_impl(&self, task_id: Uuid) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();
        let result = GenerationTasks::update_many()
            .col_expr(Column::Status, Expr::value(TaskStatus::Cancelled.as_str()))
            .col_expr(Column::CurrentStep, Expr::value("cancelled"))
            .col_expr(Column::CompletedAt, Expr::value(now))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::Id.eq(task_id))
            .filter(Column::Status.eq(TaskStatus::Pending.as_str()))
            .exec(&self.db)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("取消生成任务失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// worker 开始执行前领取任务，与取消互斥
    pub async fn claim_pending_task_impl(&self, task_id: Uuid) -> Result<bool> {
        let now = chrono::Utc::now().timestamp();
        let result = GenerationTasks::update_many()
            .col_expr(Column::Status, Expr::value(TaskStatus::Running.as_str()))
            .col_expr(Column::CurrentStep, Expr::value("starting"))
            .col_expr(Column::StartedAt, Expr::value(now))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::Id.eq(task_id))
            .filter(Column::Status.eq(TaskStatus::Pending.as_str()))
            .exec(&self.db)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("领取生成任务失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 启动时把上次进程遗留的未完成任务标记为失败，对应课程一并标记
    pub async fn fail_interrupted_tasks_impl(&self) -> Result<u64> {
        let now = chrono::Utc::now().timestamp();
        let result = GenerationTasks::update_many()
            .col_expr(Column::Status, Expr::value(TaskStatus::Failed.as_str()))
            .col_expr(
                Column::Error,
                Expr::value("Interrupted by server restart"),
            )
            .col_expr(Column::CompletedAt, Expr::value(now))
            .col_expr(Column::UpdatedAt, Expr::value(now))
            .filter(Column::Status.is_in(ACTIVE_STATUSES))
            .exec(&self.db)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("清理中断任务失败: {e}")))?;

        Courses::update_many()
            .col_expr(CourseColumn::Status, Expr::value(CourseStatus::Failed.as_str()))
            .col_expr(CourseColumn::UpdatedAt, Expr::value(now))
            .filter(CourseColumn::Status.eq(CourseStatus::Generating.as_str()))
            .exec(&self.db)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("重置课程状态失败: {e}")))?;

        Ok(result.rows_affected)
    }
}
