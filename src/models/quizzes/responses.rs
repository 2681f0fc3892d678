use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entities::{Question, Quiz};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizDetail {
    #[serde(flatten)]
    pub quiz: Quiz,
    pub questions: Vec<Question>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuizListResponse {
    pub course_id: Uuid,
    pub items: Vec<Quiz>,
}
