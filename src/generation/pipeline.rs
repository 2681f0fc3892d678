//! 课程生成流水线
//!
//! 结构规划 → 逐章生成正文（质量不达标时带着问题重写）→ 测验 → 闪卡
//! → 写库 → 向量化 → 汇总质量指标。

use std::sync::Arc;

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::parsing::{
    PlannedChapter, parse_flashcards, parse_questions, parse_structure, split_content_blocks,
    split_subchapters,
};
use super::prompts::{
    SYSTEM_PROMPT, chapter_content_prompt, flashcard_prompt, quiz_prompt, structure_prompt,
    truncate_chars,
};
use crate::ai::{AiClient, extract_json};
use crate::cache::{ObjectCache, course_detail_key};
use crate::config::GenerationConfig;
use crate::errors::{CourseGenError, Result};
use crate::models::courses::entities::{Course, CourseStatus};
use crate::models::generation::{
    entities::{
        GeneratedChapter, GeneratedContent, GeneratedFlashcard, GeneratedQuiz, TaskStatus,
    },
    requests::TaskUpdate,
};
use crate::models::quizzes::entities::QuizType;
use crate::quality::{QualityMetrics, QualityReport, QualityValidator};
use crate::storage::Storage;
use crate::vector::{VectorDocument, VectorStore};

// 各阶段的进度区间
const PROGRESS_STRUCTURE: i32 = 5;
const PROGRESS_CHAPTERS_START: i32 = 10;
const PROGRESS_CHAPTERS_END: i32 = 70;
const PROGRESS_QUIZZES: i32 = 75;
const PROGRESS_FLASHCARDS: i32 = 85;
const PROGRESS_SAVING: i32 = 90;
const PROGRESS_EMBEDDING: i32 = 95;

const MAX_EMBEDDING_CHARS: usize = 8_000;

pub struct GenerationPipeline {
    storage: Arc<dyn Storage>,
    ai: Arc<AiClient>,
    vector_store: Arc<dyn VectorStore>,
    cache: Arc<dyn ObjectCache>,
    validator: QualityValidator,
    config: GenerationConfig,
}

impl GenerationPipeline {
    pub fn new(
        storage: Arc<dyn Storage>,
        ai: Arc<AiClient>,
        vector_store: Arc<dyn VectorStore>,
        cache: Arc<dyn ObjectCache>,
        validator: QualityValidator,
        config: GenerationConfig,
    ) -> Self {
        Self {
            storage,
            ai,
            vector_store,
            cache,
            validator,
            config,
        }
    }

    pub fn ai_available(&self) -> bool {
        self.ai.is_available()
    }

    /// 执行一次生成；失败时课程与任务都标记为 failed
    ///
    /// 任务已不是 pending（被取消或已被领取）时不做任何修改，返回 `Ok(false)`。
    pub async fn run(&self, course_id: Uuid, task_id: Uuid) -> Result<bool> {
        if !self.storage.claim_pending_task(task_id).await? {
            return Ok(false);
        }

        let result = self.execute(course_id, task_id).await;

        if let Err(e) = &result {
            error!(%course_id, %task_id, "Course generation failed: {}", e);
            if let Err(status_err) = self
                .storage
                .set_course_status(course_id, CourseStatus::Failed)
                .await
            {
                warn!("Failed to mark course {} as failed: {}", course_id, status_err);
            }
            let update = TaskUpdate {
                status: Some(TaskStatus::Failed),
                current_step: Some("failed".to_string()),
                error: Some(e.message().to_string()),
                ..Default::default()
            };
            if let Err(task_err) = self.storage.update_generation_task(task_id, update).await {
                warn!("Failed to mark task {} as failed: {}", task_id, task_err);
            }
        }

        self.cache.remove(&course_detail_key(course_id)).await;
        result.map(|_| true)
    }

    async fn execute(&self, course_id: Uuid, task_id: Uuid) -> Result<()> {
        let course = self
            .storage
            .get_course_by_id(course_id)
            .await?
            .ok_or_else(|| CourseGenError::not_found(format!("Course {course_id} not found")))?;

        self.storage
            .set_course_status(course_id, CourseStatus::Generating)
            .await?;
        self.report_progress(task_id, PROGRESS_STRUCTURE, "structure")
            .await;
        self.cache.remove(&course_detail_key(course_id)).await;

        let planned = self.plan_structure(&course).await?;
        info!(%course_id, "Planned {} chapters", planned.len());

        let mut content = GeneratedContent::default();
        let mut reports = Vec::with_capacity(planned.len());
        let span = (PROGRESS_CHAPTERS_END - PROGRESS_CHAPTERS_START) as usize;

        for (idx, chapter) in planned.iter().enumerate() {
            let (generated, report) = self.write_chapter(&course, chapter).await?;
            content.chapters.push(generated);
            reports.push(report);

            let progress = PROGRESS_CHAPTERS_START + (span * (idx + 1) / planned.len()) as i32;
            self.report_progress(
                task_id,
                progress,
                format!("chapter {}/{}", idx + 1, planned.len()),
            )
            .await;
        }

        self.report_progress(task_id, PROGRESS_QUIZZES, "quizzes").await;
        for chapter in &content.chapters {
            if let Some(quiz) = self.write_quiz(&course, chapter).await {
                content.quizzes.push(quiz);
            }
        }

        self.report_progress(task_id, PROGRESS_FLASHCARDS, "flashcards")
            .await;
        for chapter in &content.chapters {
            content
                .flashcards
                .extend(self.write_flashcards(&course, chapter).await);
        }

        self.report_progress(task_id, PROGRESS_SAVING, "saving").await;
        debug!(
            %course_id,
            "Saving {} chapters, {} quizzes, {} flashcards",
            content.chapters.len(),
            content.quizzes.len(),
            content.flashcards.len()
        );
        self.storage
            .replace_course_content(course_id, content)
            .await?;

        self.report_progress(task_id, PROGRESS_EMBEDDING, "embedding")
            .await;
        self.index_course(&course).await;

        let metrics = QualityMetrics::from_reports(&reports);
        self.storage
            .complete_course_generation(course_id, metrics)
            .await?
            .ok_or_else(|| CourseGenError::not_found(format!("Course {course_id} not found")))?;
        self.storage
            .update_generation_task(
                task_id,
                TaskUpdate {
                    status: Some(TaskStatus::Completed),
                    ..TaskUpdate::progress(100, "completed")
                },
            )
            .await?;

        info!(%course_id, %task_id, "Course generation completed");
        Ok(())
    }

    async fn report_progress(&self, task_id: Uuid, progress: i32, step: impl Into<String>) {
        if let Err(e) = self
            .storage
            .update_generation_task(task_id, TaskUpdate::progress(progress, step))
            .await
        {
            warn!("Failed to update progress of task {}: {}", task_id, e);
        }
    }

    async fn plan_structure(&self, course: &Course) -> Result<Vec<PlannedChapter>> {
        let request = self
            .ai
            .request(structure_prompt(course, self.config.max_chapters))
            .with_system(SYSTEM_PROMPT)
            .json();
        let completion = self.ai.generate(&request).await?;
        debug!(
            "Structure generated by {} ({} output tokens)",
            completion.provider, completion.output_tokens
        );
        let value = extract_json(&completion.text)?;
        parse_structure(&value, self.config.max_chapters, course.difficulty_score)
    }

    /// 生成章节正文，未通过质量检查时把问题反馈给模型重写，保留得分最高的版本
    async fn write_chapter(
        &self,
        course: &Course,
        planned: &PlannedChapter,
    ) -> Result<(GeneratedChapter, QualityReport)> {
        let level = course.proficiency_level();
        let objectives = if planned.learning_objectives.is_empty() {
            &course.learning_objectives
        } else {
            &planned.learning_objectives
        };

        let mut best: Option<(String, QualityReport)> = None;
        let mut feedback: Vec<String> = Vec::new();

        for attempt in 0..=self.config.max_regeneration_attempts {
            let prompt = chapter_content_prompt(
                course,
                &planned.title,
                objectives,
                &planned.key_concepts,
                &feedback,
            );
            let request = self.ai.request(prompt).with_system(SYSTEM_PROMPT);
            let text = self.ai.generate(&request).await?.text.trim().to_string();
            let report = self.validator.evaluate(&text, level, objectives);
            let passed = report.passed;

            debug!(
                "Chapter '{}' attempt {}: overall {:.2} (threshold {:.2})",
                planned.title, attempt, report.overall, report.threshold
            );

            feedback = report.issues.clone();
            if best
                .as_ref()
                .is_none_or(|(_, current)| report.overall > current.overall)
            {
                best = Some((text, report));
            }
            if passed {
                break;
            }
        }

        let (text, report) = best.ok_or_else(|| {
            CourseGenError::ai_provider(format!("No content generated for '{}'", planned.title))
        })?;
        if !report.passed {
            warn!(
                "Chapter '{}' kept below the quality threshold ({:.2} < {:.2})",
                planned.title, report.overall, report.threshold
            );
        }

        let chapter = GeneratedChapter {
            sequence_number: planned.sequence_number,
            title: planned.title.clone(),
            learning_objectives: planned.learning_objectives.clone(),
            content_type: planned.content_type,
            estimated_duration_minutes: planned.estimated_duration_minutes,
            complexity_level: planned.complexity_level,
            prerequisites: Vec::new(),
            content_blocks: split_content_blocks(&text),
            subchapters: split_subchapters(&text),
            quality_score: Some(report.overall),
            content: text,
        };
        Ok((chapter, report))
    }

    /// 章节测验；模型调用失败或没有有效题目时跳过
    async fn write_quiz(
        &self,
        course: &Course,
        chapter: &GeneratedChapter,
    ) -> Option<GeneratedQuiz> {
        let count = self.config.quiz_questions_per_chapter;
        if count == 0 {
            return None;
        }
        let request = self
            .ai
            .request(quiz_prompt(course, &chapter.title, &chapter.content, count))
            .with_system(SYSTEM_PROMPT)
            .json();

        let response = self
            .ai
            .generate(&request)
            .await
            .and_then(|c| extract_json(&c.text));
        let questions = match response {
            Ok(value) => parse_questions(&value, count),
            Err(e) => {
                warn!("Quiz generation for '{}' failed: {}", chapter.title, e);
                return None;
            }
        };
        if questions.is_empty() {
            warn!("No valid quiz questions for '{}'", chapter.title);
            return None;
        }

        let title: String = format!("{} Quiz", chapter.title).chars().take(200).collect();
        Some(GeneratedQuiz {
            chapter_sequence: Some(chapter.sequence_number),
            title,
            description: Some(format!(
                "Check your understanding of chapter {}",
                chapter.sequence_number
            )),
            quiz_type: QuizType::Formative,
            passing_score: 70.0,
            questions,
        })
    }

    async fn write_flashcards(
        &self,
        course: &Course,
        chapter: &GeneratedChapter,
    ) -> Vec<GeneratedFlashcard> {
        let count = self.config.flashcards_per_chapter;
        if count == 0 {
            return Vec::new();
        }
        let request = self
            .ai
            .request(flashcard_prompt(course, &chapter.title, &chapter.content, count))
            .with_system(SYSTEM_PROMPT)
            .json();

        let response = self
            .ai
            .generate(&request)
            .await
            .and_then(|c| extract_json(&c.text));
        match response {
            Ok(value) => parse_flashcards(&value, chapter.sequence_number, count),
            Err(e) => {
                warn!("Flashcard generation for '{}' failed: {}", chapter.title, e);
                Vec::new()
            }
        }
    }

    /// 章节正文写入向量库；失败只记录日志
    async fn index_course(&self, course: &Course) {
        if let Err(e) = self.try_index_course(course).await {
            warn!(
                "Indexing course {} into '{}' failed: {}",
                course.id,
                self.vector_store.name(),
                e
            );
        }
    }

    async fn try_index_course(&self, course: &Course) -> Result<()> {
        let chapters = self.storage.list_chapters(course.id).await?;
        let chapters: Vec<_> = chapters
            .into_iter()
            .filter(|c| !c.content.trim().is_empty())
            .collect();

        self.vector_store.delete_course(course.id).await?;
        if chapters.is_empty() {
            return Ok(());
        }

        let texts: Vec<String> = chapters
            .iter()
            .map(|c| truncate_chars(&c.content, MAX_EMBEDDING_CHARS).to_string())
            .collect();
        let embeddings = self.ai.embed(&texts).await?;
        if embeddings.len() != chapters.len() {
            return Err(CourseGenError::vector_store(format!(
                "Expected {} embeddings, got {}",
                chapters.len(),
                embeddings.len()
            )));
        }

        let documents: Vec<VectorDocument> = chapters
            .into_iter()
            .zip(texts)
            .zip(embeddings)
            .map(|((chapter, text), embedding)| VectorDocument {
                id: chapter.id.to_string(),
                course_id: course.id,
                chapter_id: Some(chapter.id),
                text,
                embedding,
                metadata: serde_json::json!({
                    "chapter_title": chapter.title,
                    "sequence_number": chapter.sequence_number,
                }),
            })
            .collect();

        self.vector_store.upsert(&documents).await?;
        debug!("Indexed {} chapters of course {}", documents.len(), course.id);
        Ok(())
    }
}
