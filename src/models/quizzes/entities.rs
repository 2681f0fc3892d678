use serde::{Deserialize, Serialize};
use uuid::Uuid;

define_string_enum! {
    QuizType {
        Formative => "formative",
        Summative => "summative",
        Practice => "practice",
    }
}

impl Default for QuizType {
    fn default() -> Self {
        QuizType::Formative
    }
}

define_string_enum! {
    /// 题型
    QuestionType {
        MultipleChoice => "multiple_choice",
        TrueFalse => "true_false",
        ShortAnswer => "short_answer",
        FillInBlank => "fill_in_blank",
    }
}

define_string_enum! {
    /// 题目与闪卡共用的难度
    DifficultyLevel {
        Easy => "easy",
        Medium => "medium",
        Hard => "hard",
    }
}

impl Default for DifficultyLevel {
    fn default() -> Self {
        DifficultyLevel::Medium
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub id: Uuid,
    pub course_id: Uuid,
    pub chapter_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub quiz_type: QuizType,
    pub passing_score: f64,
    pub time_limit_minutes: Option<i32>,
    pub max_attempts: Option<i32>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub sequence_number: i32,
    pub question_type: QuestionType,
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: Option<String>,
    pub difficulty: DifficultyLevel,
    pub points: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
