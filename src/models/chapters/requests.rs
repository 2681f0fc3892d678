use serde::Deserialize;

use super::entities::ChapterContentType;
use crate::utils::validate::ValidationResult;

fn default_duration() -> i32 {
    30
}

fn default_complexity() -> f64 {
    1.0
}

// 手动创建章节请求
#[derive(Debug, Clone, Deserialize)]
pub struct CreateChapterRequest {
    pub sequence_number: i32,
    pub title: String,
    #[serde(default)]
    pub learning_objectives: Vec<String>,
    #[serde(default)]
    pub content_type: ChapterContentType,
    #[serde(default = "default_duration")]
    pub estimated_duration_minutes: i32,
    #[serde(default = "default_complexity")]
    pub complexity_level: f64,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub content: String,
}

impl CreateChapterRequest {
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        result.check_range_i32("sequence_number", self.sequence_number, 1, i32::MAX);
        result.check_length("title", &self.title, 3, 200);
        result.check_list(
            "learning_objectives",
            &self.learning_objectives,
            0,
            10,
            5,
            300,
        );
        result.check_range_i32(
            "estimated_duration_minutes",
            self.estimated_duration_minutes,
            5,
            600,
        );
        result.check_range_f64("complexity_level", self.complexity_level, 1.0, 5.0);
        result.check_list("prerequisites", &self.prerequisites, 0, 20, 1, 200);
        result
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateChapterRequest {
    pub sequence_number: Option<i32>,
    pub title: Option<String>,
    pub learning_objectives: Option<Vec<String>>,
    pub content_type: Option<ChapterContentType>,
    pub estimated_duration_minutes: Option<i32>,
    pub complexity_level: Option<f64>,
    pub prerequisites: Option<Vec<String>>,
    pub content: Option<String>,
}

impl UpdateChapterRequest {
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        if let Some(sequence_number) = self.sequence_number {
            result.check_range_i32("sequence_number", sequence_number, 1, i32::MAX);
        }
        if let Some(title) = &self.title {
            result.check_length("title", title, 3, 200);
        }
        if let Some(objectives) = &self.learning_objectives {
            result.check_list("learning_objectives", objectives, 0, 10, 5, 300);
        }
        if let Some(minutes) = self.estimated_duration_minutes {
            result.check_range_i32("estimated_duration_minutes", minutes, 5, 600);
        }
        if let Some(level) = self.complexity_level {
            result.check_range_f64("complexity_level", level, 1.0, 5.0);
        }
        if let Some(prerequisites) = &self.prerequisites {
            result.check_list("prerequisites", prerequisites, 0, 20, 1, 200);
        }
        result
    }
}
