use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entities::Chapter;
use crate::quality::QualityReport;

#[derive(Debug, Serialize, Deserialize)]
pub struct ChapterListResponse {
    pub course_id: Uuid,
    pub items: Vec<Chapter>,
}

// 章节质量校验结果
#[derive(Debug, Serialize, Deserialize)]
pub struct ChapterValidationResponse {
    pub chapter_id: Uuid,
    pub quality_score: f64,
    pub report: QualityReport,
}
