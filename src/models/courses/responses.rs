use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::entities::{Course, CourseStatus};
use crate::models::chapters::entities::{ChapterSummary, ChapterWithSubchapters};
use crate::models::common::PaginationInfo;
use crate::models::flashcards::entities::Flashcard;
use crate::models::generation::entities::GenerationTask;
use crate::models::quizzes::responses::QuizDetail;
use crate::quality::QualityMetrics;
use crate::vector::VectorMatch;

// 课程列表响应
#[derive(Debug, Serialize, Deserialize)]
pub struct CourseListResponse {
    pub pagination: PaginationInfo,
    pub items: Vec<Course>,
}

// 课程详情：课程本身 + 章节摘要 + 各类内容计数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: Course,
    pub chapters: Vec<ChapterSummary>,
    pub chapter_count: u64,
    pub quiz_count: u64,
    pub flashcard_count: u64,
}

// 创建课程响应；未排队生成时 task 为 null
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateCourseResponse {
    pub course: Course,
    pub task: Option<GenerationTask>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CourseQualityResponse {
    pub course_id: Uuid,
    pub status: CourseStatus,
    pub version: i32,
    pub quality_metrics: Option<QualityMetrics>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CourseSearchResponse {
    pub course_id: Uuid,
    pub query: String,
    pub results: Vec<VectorMatch>,
}

/// 导出用的完整课程树
#[derive(Debug, Serialize, Deserialize)]
pub struct CourseExport {
    pub course: Course,
    pub chapters: Vec<ChapterWithSubchapters>,
    pub quizzes: Vec<QuizDetail>,
    pub flashcards: Vec<Flashcard>,
    pub exported_at: chrono::DateTime<chrono::Utc>,
}
