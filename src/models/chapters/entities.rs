use serde::{Deserialize, Serialize};
use uuid::Uuid;

define_string_enum! {
    /// 章节内容类型
    ChapterContentType {
        Theory => "theory",
        Practical => "practical",
        Mixed => "mixed",
        Assessment => "assessment",
    }
}

impl Default for ChapterContentType {
    fn default() -> Self {
        ChapterContentType::Theory
    }
}

define_string_enum! {
    ContentBlockType {
        Introduction => "introduction",
        Section => "section",
        Example => "example",
        Exercise => "exercise",
        Summary => "summary",
    }
}

/// 章节正文按二级标题切分后的内容块
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentBlock {
    pub block_type: ContentBlockType,
    pub title: Option<String>,
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    pub id: Uuid,
    pub course_id: Uuid,
    pub sequence_number: i32,
    pub title: String,
    pub learning_objectives: Vec<String>,
    pub content_type: ChapterContentType,
    pub estimated_duration_minutes: i32,
    pub complexity_level: f64,
    pub prerequisites: Vec<String>,
    pub content: String,
    pub content_blocks: Vec<ContentBlock>,
    pub quality_score: Option<f64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subchapter {
    pub id: Uuid,
    pub chapter_id: Uuid,
    pub sequence_number: i32,
    pub title: String,
    pub content: String,
    pub key_concepts: Vec<String>,
    pub summary: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

// 课程详情里展示的章节摘要（不含正文）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterSummary {
    pub id: Uuid,
    pub sequence_number: i32,
    pub title: String,
    pub content_type: ChapterContentType,
    pub estimated_duration_minutes: i32,
    pub complexity_level: f64,
    pub quality_score: Option<f64>,
}

impl From<&Chapter> for ChapterSummary {
    fn from(chapter: &Chapter) -> Self {
        Self {
            id: chapter.id,
            sequence_number: chapter.sequence_number,
            title: chapter.title.clone(),
            content_type: chapter.content_type,
            estimated_duration_minutes: chapter.estimated_duration_minutes,
            complexity_level: chapter.complexity_level,
            quality_score: chapter.quality_score,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterWithSubchapters {
    #[serde(flatten)]
    pub chapter: Chapter,
    pub subchapters: Vec<Subchapter>,
}
