//! 题目实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "questions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub sequence_number: i32,
    pub question_type: String,
    #[sea_orm(column_type = "Text")]
    pub question_text: String,
    pub options: Json,
    #[sea_orm(column_type = "Text")]
    pub correct_answer: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub explanation: Option<String>,
    pub difficulty: String,
    pub points: i32,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::quizzes::Entity",
        from = "Column::QuizId",
        to = "super::quizzes::Column::Id"
    )]
    Quiz,
}

impl Related<super::quizzes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Quiz.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_question(self) -> crate::models::quizzes::entities::Question {
        use super::{json_or_default, timestamp_to_datetime};
        use crate::models::quizzes::entities::{DifficultyLevel, Question, QuestionType};

        Question {
            id: self.id,
            quiz_id: self.quiz_id,
            sequence_number: self.sequence_number,
            question_type: self
                .question_type
                .parse::<QuestionType>()
                .unwrap_or(QuestionType::ShortAnswer),
            question_text: self.question_text,
            options: json_or_default(self.options),
            correct_answer: self.correct_answer,
            explanation: self.explanation,
            difficulty: self.difficulty.parse::<DifficultyLevel>().unwrap_or_default(),
            points: self.points,
            created_at: timestamp_to_datetime(self.created_at),
            updated_at: timestamp_to_datetime(self.updated_at),
        }
    }
}
