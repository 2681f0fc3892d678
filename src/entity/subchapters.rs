//! 子章节实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "subchapters")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub chapter_id: Uuid,
    pub sequence_number: i32,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub key_concepts: Json,
    #[sea_orm(column_type = "Text", nullable)]
    pub summary: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::chapters::Entity",
        from = "Column::ChapterId",
        to = "super::chapters::Column::Id"
    )]
    Chapter,
}

impl Related<super::chapters::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Chapter.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_subchapter(self) -> crate::models::chapters::entities::Subchapter {
        use super::{json_or_default, timestamp_to_datetime};

        crate::models::chapters::entities::Subchapter {
            id: self.id,
            chapter_id: self.chapter_id,
            sequence_number: self.sequence_number,
            title: self.title,
            content: self.content,
            key_concepts: json_or_default(self.key_concepts),
            summary: self.summary,
            created_at: timestamp_to_datetime(self.created_at),
            updated_at: timestamp_to_datetime(self.updated_at),
        }
    }
}
