use serde::Deserialize;

use super::entities::{CourseStatus, PacingPreference, ProficiencyLevel, TargetAudience};
use crate::models::common::PaginationQuery;
use crate::utils::validate::ValidationResult;

fn default_language() -> String {
    "en".to_string()
}

fn default_generate() -> bool {
    true
}

// 创建课程请求
//
// `generate` 为 true（默认）时创建后立即排队生成内容
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCourseRequest {
    pub title: String,
    pub description: String,
    pub subject_domain: String,
    pub target_audience: TargetAudience,
    pub learning_objectives: Vec<String>,
    pub estimated_duration_hours: f64,
    pub difficulty_score: f64,
    #[serde(default)]
    pub pacing_preference: PacingPreference,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_generate")]
    pub generate: bool,
}

impl CreateCourseRequest {
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        result.check_length("title", &self.title, 3, 200);
        result.check_length("description", &self.description, 10, 2000);
        result.check_length("subject_domain", &self.subject_domain, 2, 100);
        result.check_length("language", &self.language, 2, 10);
        result.check_list(
            "learning_objectives",
            &self.learning_objectives,
            1,
            15,
            5,
            300,
        );
        validate_audience(&mut result, &self.target_audience);
        result.check_range_f64(
            "estimated_duration_hours",
            self.estimated_duration_hours,
            0.5,
            500.0,
        );
        result.check_range_f64("difficulty_score", self.difficulty_score, 1.0, 5.0);
        result.check_difficulty_band(
            self.difficulty_score,
            self.target_audience.proficiency_level,
        );
        result
    }
}

fn validate_audience(result: &mut ValidationResult, audience: &TargetAudience) {
    result.check_list(
        "target_audience.prerequisites",
        &audience.prerequisites,
        0,
        20,
        1,
        200,
    );
    result.check_optional_length(
        "target_audience.age_range",
        audience.age_range.as_deref(),
        1,
        50,
    );
    result.check_optional_length(
        "target_audience.professional_context",
        audience.professional_context.as_deref(),
        1,
        300,
    );
}

// 更新课程请求（全部字段可选）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub subject_domain: Option<String>,
    pub target_audience: Option<TargetAudience>,
    pub learning_objectives: Option<Vec<String>>,
    pub estimated_duration_hours: Option<f64>,
    pub difficulty_score: Option<f64>,
    pub pacing_preference: Option<PacingPreference>,
    pub language: Option<String>,
    pub status: Option<CourseStatus>,
}

impl UpdateCourseRequest {
    /// 校验提供的字段；难度区间用合并后的值检查
    pub fn validate(&self, current_level: ProficiencyLevel, current_score: f64) -> ValidationResult {
        let mut result = ValidationResult::new();
        if let Some(title) = &self.title {
            result.check_length("title", title, 3, 200);
        }
        if let Some(description) = &self.description {
            result.check_length("description", description, 10, 2000);
        }
        if let Some(subject_domain) = &self.subject_domain {
            result.check_length("subject_domain", subject_domain, 2, 100);
        }
        if let Some(language) = &self.language {
            result.check_length("language", language, 2, 10);
        }
        if let Some(objectives) = &self.learning_objectives {
            result.check_list("learning_objectives", objectives, 1, 15, 5, 300);
        }
        if let Some(audience) = &self.target_audience {
            validate_audience(&mut result, audience);
        }
        if let Some(hours) = self.estimated_duration_hours {
            result.check_range_f64("estimated_duration_hours", hours, 0.5, 500.0);
        }
        if let Some(score) = self.difficulty_score {
            result.check_range_f64("difficulty_score", score, 1.0, 5.0);
        }
        if matches!(self.status, Some(CourseStatus::Generating)) {
            result.push("status 'generating' is managed by the generation pipeline");
        }

        let level = self
            .target_audience
            .as_ref()
            .map(|a| a.proficiency_level)
            .unwrap_or(current_level);
        let score = self.difficulty_score.unwrap_or(current_score);
        if self.target_audience.is_some() || self.difficulty_score.is_some() {
            result.check_difficulty_band(score, level);
        }
        result
    }

    /// 是否修改了会影响生成内容的字段
    pub fn touches_content(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.subject_domain.is_some()
            || self.target_audience.is_some()
            || self.learning_objectives.is_some()
            || self.difficulty_score.is_some()
    }
}

// 课程列表查询参数（来自HTTP请求）
#[derive(Debug, Clone, Deserialize)]
pub struct CourseQueryParams {
    #[serde(flatten)]
    pub pagination: PaginationQuery,
    pub search: Option<String>,
    pub status: Option<CourseStatus>,
    pub subject_domain: Option<String>,
    pub proficiency_level: Option<ProficiencyLevel>,
}

// 课程列表查询参数（用于存储层）
#[derive(Debug, Clone, Default)]
pub struct CourseListQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub search: Option<String>,
    pub status: Option<CourseStatus>,
    pub subject_domain: Option<String>,
    pub proficiency_level: Option<ProficiencyLevel>,
}

impl From<CourseQueryParams> for CourseListQuery {
    fn from(params: CourseQueryParams) -> Self {
        Self {
            page: Some(params.pagination.page),
            size: Some(params.pagination.size),
            search: params.search,
            status: params.status,
            subject_domain: params.subject_domain,
            proficiency_level: params.proficiency_level,
        }
    }
}

define_string_enum! {
    /// 导出格式
    ExportFormat {
        Json => "json",
        Markdown => "markdown",
    }
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Markdown => "text/markdown; charset=utf-8",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Markdown => "md",
        }
    }
}

// 导出查询参数；format 保留为字符串，未知格式由服务层返回 400
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}

impl ExportQuery {
    pub fn export_format(&self) -> Result<ExportFormat, String> {
        match self.format.as_deref().map(str::trim) {
            None | Some("") => Ok(ExportFormat::Json),
            Some(value) => value.to_ascii_lowercase().parse(),
        }
    }
}

// 相似度检索参数
#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    pub q: String,
    pub top_k: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> CreateCourseRequest {
        serde_json::from_value(serde_json::json!({
            "title": "Introduction to Rust",
            "description": "A practical course on ownership, borrowing and lifetimes.",
            "subject_domain": "Programming",
            "target_audience": {
                "proficiency_level": "beginner",
                "prerequisites": ["Basic programming"]
            },
            "learning_objectives": ["Understand ownership and borrowing"],
            "estimated_duration_hours": 10.0,
            "difficulty_score": 2.0
        }))
        .unwrap()
    }

    #[test]
    fn test_defaults_applied() {
        let req = sample_request();
        assert_eq!(req.language, "en");
        assert!(req.generate);
        assert_eq!(req.pacing_preference, PacingPreference::Moderate);
        assert!(req.validate().is_valid());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut req = sample_request();
        req.title = "Rs".to_string();
        req.learning_objectives.clear();
        req.estimated_duration_hours = 0.0;
        let result = req.validate();
        assert_eq!(result.errors.len(), 3);
    }

    #[test]
    fn test_difficulty_band_cross_field() {
        let mut req = sample_request();
        req.difficulty_score = 4.2;
        let result = req.validate();
        assert!(!result.is_valid());
        assert!(result.error_message().contains("band for beginner"));

        req.target_audience.proficiency_level = ProficiencyLevel::Advanced;
        assert!(req.validate().is_valid());
    }

    #[test]
    fn test_update_uses_merged_values_for_band() {
        let update = UpdateCourseRequest {
            difficulty_score: Some(4.6),
            ..Default::default()
        };
        assert!(!update.validate(ProficiencyLevel::Advanced, 3.5).is_valid());
        assert!(update.validate(ProficiencyLevel::Expert, 4.5).is_valid());

        // 只改标题时不重复检查区间
        let update = UpdateCourseRequest {
            title: Some("Renamed course".to_string()),
            ..Default::default()
        };
        assert!(update.validate(ProficiencyLevel::Beginner, 4.9).is_valid());
        assert!(update.touches_content());
    }

    #[test]
    fn test_export_format_parsing() {
        let query = ExportQuery::default();
        assert_eq!(query.export_format(), Ok(ExportFormat::Json));

        let query = ExportQuery {
            format: Some("Markdown".to_string()),
        };
        assert_eq!(query.export_format(), Ok(ExportFormat::Markdown));
        assert_eq!(ExportFormat::Markdown.extension(), "md");

        let query = ExportQuery {
            format: Some("pdf".to_string()),
        };
        assert!(query.export_format().is_err());
    }

    #[test]
    fn test_update_rejects_generating_status() {
        let update = UpdateCourseRequest {
            status: Some(CourseStatus::Generating),
            ..Default::default()
        };
        assert!(!update.validate(ProficiencyLevel::Beginner, 2.0).is_valid());
    }
}
