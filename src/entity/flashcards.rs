//! 闪卡实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "flashcards")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub course_id: Uuid,
    pub chapter_id: Option<Uuid>,
    #[sea_orm(column_type = "Text")]
    pub front: String,
    #[sea_orm(column_type = "Text")]
    pub back: String,
    pub difficulty: String,
    pub tags: Json,
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
    #[sea_orm(
        belongs_to = "super::chapters::Entity",
        from = "Column::ChapterId",
        to = "super::chapters::Column::Id"
    )]
    Chapter,
}

impl Related<super::courses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::chapters::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Chapter.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_flashcard(self) -> crate::models::flashcards::entities::Flashcard {
        use super::{json_or_default, timestamp_to_datetime};
        use crate::models::quizzes::entities::DifficultyLevel;

        crate::models::flashcards::entities::Flashcard {
            id: self.id,
            course_id: self.course_id,
            chapter_id: self.chapter_id,
            front: self.front,
            back: self.back,
            difficulty: self.difficulty.parse::<DifficultyLevel>().unwrap_or_default(),
            tags: json_or_default(self.tags),
            created_at: timestamp_to_datetime(self.created_at),
            updated_at: timestamp_to_datetime(self.updated_at),
        }
    }
}
