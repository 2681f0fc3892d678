use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::quizzes::entities::DifficultyLevel;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flashcard {
    pub id: Uuid,
    pub course_id: Uuid,
    pub chapter_id: Option<Uuid>,
    pub front: String,
    pub back: String,
    pub difficulty: DifficultyLevel,
    pub tags: Vec<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
