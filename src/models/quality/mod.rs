use serde::Deserialize;

use crate::models::courses::entities::ProficiencyLevel;
use crate::utils::validate::ValidationResult;

// 独立内容质量校验请求
#[derive(Debug, Clone, Deserialize)]
pub struct ValidateContentRequest {
    pub content: String,
    #[serde(default)]
    pub proficiency_level: ProficiencyLevel,
    #[serde(default)]
    pub learning_objectives: Vec<String>,
}

impl ValidateContentRequest {
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        result.check_length("content", &self.content, 1, 100_000);
        result.check_list("learning_objectives", &self.learning_objectives, 0, 15, 1, 300);
        result
    }
}
