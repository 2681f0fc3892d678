//! 章节实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "chapters")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub course_id: Uuid,
    pub sequence_number: i32,
    pub title: String,
    pub learning_objectives: Json,
    pub content_type: String,
    pub estimated_duration_minutes: i32,
    pub complexity_level: f64,
    pub prerequisites: Json,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub content_blocks: Json,
    pub quality_score: Option<f64>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::courses::Entity",
        from = "Column::CourseId",
        to = "super::courses::Column::Id"
    )]
    Course,
    #[sea_orm(has_many = "super::subchapters::Entity")]
    Subchapters,
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::subchapters::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subchapters.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_chapter(self) -> crate::models::chapters::entities::Chapter {
        use super::{json_or_default, timestamp_to_datetime};
        use crate::models::chapters::entities::{Chapter, ChapterContentType};

        Chapter {
            id: self.id,
            course_id: self.course_id,
            sequence_number: self.sequence_number,
            title: self.title,
            learning_objectives: json_or_default(self.learning_objectives),
            content_type: self
                .content_type
                .parse::<ChapterContentType>()
                .unwrap_or_default(),
            estimated_duration_minutes: self.estimated_duration_minutes,
            complexity_level: self.complexity_level,
            prerequisites: json_or_default(self.prerequisites),
            content: self.content,
            content_blocks: json_or_default(self.content_blocks),
            quality_score: self.quality_score,
            created_at: timestamp_to_datetime(self.created_at),
            updated_at: timestamp_to_datetime(self.updated_at),
        }
    }
}
