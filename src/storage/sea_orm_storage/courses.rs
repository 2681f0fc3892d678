//! 课程存储操作

use super::SeaOrmStorage;
use crate::entity::courses::{ActiveModel, Column, Entity as Courses};
use crate::entity::to_json;
use crate::errors::{CourseGenError, Result};
use crate::models::{
    PaginationInfo,
    common::pagination::normalize_page,
    courses::{
        entities::{Course, CourseStatus},
        requests::{CourseListQuery, CreateCourseRequest, UpdateCourseRequest},
        responses::CourseListResponse,
    },
};
use crate::quality::QualityMetrics;
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set, sea_query::LikeExpr,
};
use uuid::Uuid;

impl SeaOrmStorage {
    /// 创建课程（状态为 draft，版本 1）
    pub async fn create_course_impl(&self, req: CreateCourseRequest) -> Result<Course> {
        let now = chrono::Utc::now().timestamp();

        let model = ActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(req.title.trim().to_string()),
            description: Set(req.description.trim().to_string()),
            subject_domain: Set(req.subject_domain.trim().to_string()),
            proficiency_level: Set(req.target_audience.proficiency_level.to_string()),
            target_audience: Set(to_json(&req.target_audience)),
            learning_objectives: Set(to_json(&req.learning_objectives)),
            estimated_duration_hours: Set(req.estimated_duration_hours),
            difficulty_score: Set(req.difficulty_score),
            pacing_preference: Set(req.pacing_preference.to_string()),
            language: Set(req.language),
            status: Set(CourseStatus::Draft.to_string()),
            version: Set(1),
            quality_metrics: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let result = model
            .insert(&self.db)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("创建课程失败: {e}")))?;

        Ok(result.into_course())
    }

    /// 通过 ID 获取课程
    pub async fn get_course_by_id_impl(&self, course_id: Uuid) -> Result<Option<Course>> {
        let result = Courses::find_by_id(course_id)
            .one(&self.db)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("查询课程失败: {e}")))?;

        Ok(result.map(|m| m.into_course()))
    }

    /// 分页列出课程
    pub async fn list_courses_with_pagination_impl(
        &self,
        query: CourseListQuery,
    ) -> Result<CourseListResponse> {
        let (page, size) = normalize_page(query.page, query.size);

        let mut select = Courses::find();

        if let Some(status) = query.status {
            select = select.filter(Column::Status.eq(status.as_str()));
        }

        if let Some(level) = query.proficiency_level {
            select = select.filter(Column::ProficiencyLevel.eq(level.as_str()));
        }

        if let Some(ref domain) = query.subject_domain
            && !domain.trim().is_empty()
        {
            select = select.filter(Column::SubjectDomain.eq(domain.trim()));
        }

        // 搜索条件（标题或描述）
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            // SQLite / Postgres 没有默认转义符，需显式声明 ESCAPE
            let pattern = format!("%{}%", escape_like_pattern(search.trim()));
            select = select.filter(
                Condition::any()
                    .add(Column::Title.like(LikeExpr::new(pattern.clone()).escape('\\')))
                    .add(Column::Description.like(LikeExpr::new(pattern).escape('\\'))),
            );
        }

        select = select.order_by_desc(Column::CreatedAt);

        let paginator = select.paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| CourseGenError::database_operation(format!("查询课程总数失败: {e}")))?;

        let items = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("查询课程列表失败: {e}")))?
            .into_iter()
            .map(|m| m.into_course())
            .collect();

        Ok(CourseListResponse {
            pagination: PaginationInfo::new(page, size, total),
            items,
        })
    }

    /// 更新课程，每次成功更新版本号加一
    pub async fn update_course_impl(
        &self,
        course_id: Uuid,
        update: UpdateCourseRequest,
    ) -> Result<Option<Course>> {
        let Some(existing) = Courses::find_by_id(course_id)
            .one(&self.db)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("查询课程失败: {e}")))?
        else {
            return Ok(None);
        };

        let now = chrono::Utc::now().timestamp();

        let mut model = ActiveModel {
            id: Set(course_id),
            version: Set(existing.version + 1),
            updated_at: Set(now),
            ..Default::default()
        };

        if let Some(title) = update.title {
            model.title = Set(title.trim().to_string());
        }

        if let Some(description) = update.description {
            model.description = Set(description.trim().to_string());
        }

        if let Some(subject_domain) = update.subject_domain {
            model.subject_domain = Set(subject_domain.trim().to_string());
        }

        if let Some(audience) = update.target_audience {
            model.proficiency_level = Set(audience.proficiency_level.to_string());
            model.target_audience = Set(to_json(&audience));
        }

        if let Some(objectives) = update.learning_objectives {
            model.learning_objectives = Set(to_json(&objectives));
        }

        if let Some(hours) = update.estimated_duration_hours {
            model.estimated_duration_hours = Set(hours);
        }

        if let Some(score) = update.difficulty_score {
            model.difficulty_score = Set(score);
        }

        if let Some(pacing) = update.pacing_preference {
            model.pacing_preference = Set(pacing.to_string());
        }

        if let Some(language) = update.language {
            model.language = Set(language);
        }

        if let Some(status) = update.status {
            model.status = Set(status.to_string());
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("更新课程失败: {e}")))?;

        Ok(Some(result.into_course()))
    }

    /// 删除课程（章节、测验、闪卡、任务级联删除）
    pub async fn delete_course_impl(&self, course_id: Uuid) -> Result<bool> {
        let result = Courses::delete_by_id(course_id)
            .exec(&self.db)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("删除课程失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 只修改状态，不增加版本号
    pub async fn set_course_status_impl(
        &self,
        course_id: Uuid,
        status: CourseStatus,
    ) -> Result<bool> {
        let result = Courses::update_many()
            .col_expr(Column::Status, sea_orm::sea_query::Expr::value(status.as_str()))
            .col_expr(
                Column::UpdatedAt,
                sea_orm::sea_query::Expr::value(chrono::Utc::now().timestamp()),
            )
            .filter(Column::Id.eq(course_id))
            .exec(&self.db)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("更新课程状态失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    /// 生成完成：写入质量指标、标记 ready 并增加版本号
    pub async fn complete_course_generation_impl(
        &self,
        course_id: Uuid,
        metrics: QualityMetrics,
    ) -> Result<Option<Course>> {
        let Some(existing) = Courses::find_by_id(course_id)
            .one(&self.db)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("查询课程失败: {e}")))?
        else {
            return Ok(None);
        };

        let model = ActiveModel {
            id: Set(course_id),
            status: Set(CourseStatus::Ready.to_string()),
            quality_metrics: Set(Some(to_json(&metrics))),
            version: Set(existing.version + 1),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| CourseGenError::database_operation(format!("保存质量指标失败: {e}")))?;

        Ok(Some(result.into_course()))
    }
}
