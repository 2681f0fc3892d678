use serde::Deserialize;
use uuid::Uuid;

use crate::models::common::PaginationQuery;
use crate::models::quizzes::entities::DifficultyLevel;
use crate::utils::validate::ValidationResult;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateFlashcardRequest {
    pub chapter_id: Option<Uuid>,
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub difficulty: DifficultyLevel,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CreateFlashcardRequest {
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        result.check_length("front", &self.front, 1, 500);
        result.check_length("back", &self.back, 1, 2000);
        result.check_list("tags", &self.tags, 0, 10, 1, 50);
        result
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateFlashcardRequest {
    pub chapter_id: Option<Uuid>,
    pub front: Option<String>,
    pub back: Option<String>,
    pub difficulty: Option<DifficultyLevel>,
    pub tags: Option<Vec<String>>,
}

impl UpdateFlashcardRequest {
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        if let Some(front) = &self.front {
            result.check_length("front", front, 1, 500);
        }
        if let Some(back) = &self.back {
            result.check_length("back", back, 1, 2000);
        }
        if let Some(tags) = &self.tags {
            result.check_list("tags", tags, 0, 10, 1, 50);
        }
        result
    }
}

// 闪卡列表查询参数（来自HTTP请求）
#[derive(Debug, Clone, Deserialize)]
pub struct FlashcardQueryParams {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    pub chapter_id: Option<Uuid>,
    pub difficulty: Option<DifficultyLevel>,
}

// 闪卡列表查询参数（用于存储层）
#[derive(Debug, Clone, Default)]
pub struct FlashcardListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub chapter_id: Option<Uuid>,
    pub difficulty: Option<DifficultyLevel>,
}

impl From<FlashcardQueryParams> for FlashcardListQuery {
    fn from(params: FlashcardQueryParams) -> Self {
        Self {
            page: Some(params.pagination.page),
            size: Some(params.pagination.size),
            chapter_id: params.chapter_id,
            difficulty: params.difficulty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flashcard_validation() {
        let req: CreateFlashcardRequest = serde_json::from_str(
            r#"{"front": "Borrow checker", "back": "Enforces reference rules at compile time"}"#,
        )
        .unwrap();
        assert!(req.validate().is_valid());
        assert_eq!(req.difficulty, DifficultyLevel::Medium);

        let req: CreateFlashcardRequest =
            serde_json::from_str(r#"{"front": "   ", "back": "ok"}"#).unwrap();
        assert!(!req.validate().is_valid());
    }

    #[test]
    fn test_too_many_tags() {
        let update = UpdateFlashcardRequest {
            tags: Some((0..11).map(|i| format!("tag{i}")).collect()),
            ..Default::default()
        };
        assert!(!update.validate().is_valid());
    }
}
