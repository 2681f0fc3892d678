use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::chapters::entities::{ChapterContentType, ContentBlock};
use crate::models::quizzes::entities::{DifficultyLevel, QuizType};
use crate::models::quizzes::requests::CreateQuestionRequest;

define_string_enum! {
    /// 生成任务状态
    TaskStatus {
        Pending => "pending",
        Running => "running",
        Completed => "completed",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

impl TaskStatus {
    /// 排队中或执行中
    pub fn is_active(&self) -> bool {
        matches!(self, TaskStatus::Pending | TaskStatus::Running)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_active()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationTask {
    pub id: Uuid,
    pub course_id: Uuid,
    pub status: TaskStatus,
    pub progress: i32,
    pub current_step: String,
    pub error: Option<String>,
    pub started_at: Option<chrono::DateTime<chrono::Utc>>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// 一次生成得到的全部课程内容，由存储层在一个事务里替换旧内容
#[derive(Debug, Clone, Default)]
pub struct GeneratedContent {
    pub chapters: Vec<GeneratedChapter>,
    pub quizzes: Vec<GeneratedQuiz>,
    pub flashcards: Vec<GeneratedFlashcard>,
}

#[derive(Debug, Clone)]
pub struct GeneratedChapter {
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
    pub subchapters: Vec<GeneratedSubchapter>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedSubchapter {
    pub sequence_number: i32,
    pub title: String,
    pub content: String,
    pub key_concepts: Vec<String>,
    pub summary: Option<String>,
}

/// 测验与闪卡通过章节序号关联到刚写入的章节
#[derive(Debug, Clone)]
pub struct GeneratedQuiz {
    pub chapter_sequence: Option<i32>,
    pub title: String,
    pub description: Option<String>,
    pub quiz_type: QuizType,
    pub passing_score: f64,
    pub questions: Vec<CreateQuestionRequest>,
}

#[derive(Debug, Clone)]
pub struct GeneratedFlashcard {
    pub chapter_sequence: Option<i32>,
    pub front: String,
    pub back: String,
    pub difficulty: DifficultyLevel,
    pub tags: Vec<String>,
}
