//! 课程实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub subject_domain: String,
    pub target_audience: Json,
    /// 冗余自 target_audience，便于按水平筛选
    pub proficiency_level: String,
    pub learning_objectives: Json,
    pub estimated_duration_hours: f64,
    pub difficulty_score: f64,
    pub pacing_preference: String,
    pub language: String,
    pub status: String,
    pub version: i32,
    pub quality_metrics: Option<Json>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::chapters::Entity")]
    Chapters,
    #[sea_orm(has_many = "super::quizzes::Entity")]
    Quizzes,
    #[sea_orm(has_many = "super::flashcards::Entity")]
    Flashcards,
    #[sea_orm(has_many = "super::generation_tasks::Entity")]
    GenerationTasks,
}

impl Related<super::chapters::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Chapters.def()
    }
}

impl Related<super::quizzes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Quizzes.def()
    }
}

impl Related<super::flashcards::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Flashcards.def()
    }
}

impl Related<super::generation_tasks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GenerationTasks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

// 从数据库模型转换为业务模型
impl Model {
    pub fn into_course(self) -> crate::models::courses::entities::Course {
        use super::{json_or_default, timestamp_to_datetime};
        use crate::models::courses::entities::{Course, CourseStatus, PacingPreference};

        Course {
            id: self.id,
            title: self.title,
            description: self.description,
            subject_domain: self.subject_domain,
            target_audience: json_or_default(self.target_audience),
            learning_objectives: json_or_default(self.learning_objectives),
            estimated_duration_hours: self.estimated_duration_hours,
            difficulty_score: self.difficulty_score,
            pacing_preference: self
                .pacing_preference
                .parse::<PacingPreference>()
                .unwrap_or_default(),
            language: self.language,
            status: self
                .status
                .parse::<CourseStatus>()
                .unwrap_or(CourseStatus::Draft),
            version: self.version,
            quality_metrics: self
                .quality_metrics
                .and_then(|value| serde_json::from_value(value).ok()),
            created_at: timestamp_to_datetime(self.created_at),
            updated_at: timestamp_to_datetime(self.updated_at),
        }
    }
}
