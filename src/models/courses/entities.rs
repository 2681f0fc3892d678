use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::quality::QualityMetrics;

define_string_enum! {
    /// 目标受众水平
    ProficiencyLevel {
        Beginner => "beginner",
        Intermediate => "intermediate",
        Advanced => "advanced",
        Expert => "expert",
    }
}

impl ProficiencyLevel {
    /// 该水平允许的难度分数区间（闭区间）
    pub fn difficulty_band(&self) -> (f64, f64) {
        match self {
            ProficiencyLevel::Beginner => (1.0, 2.5),
            ProficiencyLevel::Intermediate => (2.0, 3.5),
            ProficiencyLevel::Advanced => (3.0, 4.5),
            ProficiencyLevel::Expert => (4.0, 5.0),
        }
    }
}

impl Default for ProficiencyLevel {
    fn default() -> Self {
        ProficiencyLevel::Beginner
    }
}

define_string_enum! {
    PacingPreference {
        SelfPaced => "self_paced",
        Moderate => "moderate",
        Intensive => "intensive",
    }
}

impl Default for PacingPreference {
    fn default() -> Self {
        PacingPreference::Moderate
    }
}

define_string_enum! {
    /// 课程状态
    CourseStatus {
        Draft => "draft",
        Generating => "generating",
        Ready => "ready",
        Failed => "failed",
        Published => "published",
        Archived => "archived",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetAudience {
    pub proficiency_level: ProficiencyLevel,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub age_range: Option<String>,
    #[serde(default)]
    pub professional_context: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub subject_domain: String,
    pub target_audience: TargetAudience,
    pub learning_objectives: Vec<String>,
    pub estimated_duration_hours: f64,
    pub difficulty_score: f64,
    pub pacing_preference: PacingPreference,
    pub language: String,
    pub status: CourseStatus,
    pub version: i32,
    pub quality_metrics: Option<QualityMetrics>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Course {
    pub fn proficiency_level(&self) -> ProficiencyLevel {
        self.target_audience.proficiency_level
    }
}
