//! 课程导出（JSON / Markdown）

use std::fmt::Write as _;
use std::sync::Arc;

use actix_web::http::header::{self, ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;
use uuid::Uuid;

use super::CourseService;
use crate::errors::{CourseGenError, Result};
use crate::models::chapters::entities::ChapterWithSubchapters;
use crate::models::courses::requests::{ExportFormat, ExportQuery};
use crate::models::courses::responses::CourseExport;
use crate::models::quizzes::{entities::QuestionType, responses::QuizDetail};
use crate::models::{ApiResponse, ErrorCode};
use crate::services::{error_response, not_found};
use crate::storage::Storage;

pub async fn export_course(
    service: &CourseService,
    request: &HttpRequest,
    course_id: Uuid,
    query: ExportQuery,
) -> ActixResult<HttpResponse> {
    let format = match query.export_format() {
        Ok(format) => format,
        Err(e) => {
            return Ok(HttpResponse::BadRequest().json(ApiResponse::error_empty(
                ErrorCode::ExportFormatInvalid,
                format!("Unsupported export format: {e}"),
            )));
        }
    };

    let storage = service.get_storage(request);
    let export = match build_export(&storage, course_id).await {
        Ok(Some(export)) => export,
        Ok(None) => return Ok(not_found(ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => return Ok(error_response(&e, "Export failed")),
    };

    let body = match format {
        ExportFormat::Json => match serde_json::to_string_pretty(&export) {
            Ok(json) => json,
            Err(e) => return Ok(error_response(&CourseGenError::from(e), "Export failed")),
        },
        ExportFormat::Markdown => render_markdown(&export),
    };

    let filename = format!("{}.{}", slugify(&export.course.title), format.extension());
    info!(
        "Exported course {} as {} ({} bytes)",
        course_id,
        format,
        body.len()
    );

    Ok(HttpResponse::Ok()
        .content_type(format.content_type())
        .insert_header((
            header::CONTENT_DISPOSITION,
            ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(filename)],
            },
        ))
        .body(body))
}

/// 读取完整课程树
pub(crate) async fn build_export(
    storage: &Arc<dyn Storage>,
    course_id: Uuid,
) -> Result<Option<CourseExport>> {
    let Some(course) = storage.get_course_by_id(course_id).await? else {
        return Ok(None);
    };

    let mut chapters = Vec::new();
    for chapter in storage.list_chapters(course_id).await? {
        let subchapters = storage.list_subchapters(chapter.id).await?;
        chapters.push(ChapterWithSubchapters {
            chapter,
            subchapters,
        });
    }

    let mut quizzes = Vec::new();
    for quiz in storage.list_quizzes(course_id).await? {
        let questions = storage.list_questions(quiz.id).await?;
        quizzes.push(QuizDetail { quiz, questions });
    }

    let flashcards = storage.list_all_flashcards(course_id).await?;

    Ok(Some(CourseExport {
        course,
        chapters,
        quizzes,
        flashcards,
        exported_at: chrono::Utc::now(),
    }))
}

/// 文件名：小写字母数字，其余字符折叠为单个 '-'
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug.truncate(80);
    let slug = slug.trim_end_matches('-').to_string();
    if slug.is_empty() {
        "course".to_string()
    } else {
        slug
    }
}

pub fn render_markdown(export: &CourseExport) -> String {
    let course = &export.course;
    let mut out = String::new();

    let _ = writeln!(out, "# {}\n", course.title);
    let _ = writeln!(out, "{}\n", course.description);
    let _ = writeln!(out, "- **Subject:** {}", course.subject_domain);
    let _ = writeln!(out, "- **Level:** {}", course.proficiency_level());
    let _ = writeln!(out, "- **Difficulty:** {:.1} / 5", course.difficulty_score);
    let _ = writeln!(
        out,
        "- **Estimated duration:** {} hours",
        course.estimated_duration_hours
    );
    let _ = writeln!(out, "- **Language:** {}", course.language);
    let _ = writeln!(out, "- **Version:** {}", course.version);
    if let Some(metrics) = &course.quality_metrics {
        let _ = writeln!(out, "- **Quality score:** {:.2}", metrics.overall_score);
    }

    if !course.learning_objectives.is_empty() {
        out.push_str("\n## Learning Objectives\n\n");
        for objective in &course.learning_objectives {
            let _ = writeln!(out, "- {objective}");
        }
    }

    for entry in &export.chapters {
        let chapter = &entry.chapter;
        let _ = writeln!(
            out,
            "\n## Chapter {}: {}\n",
            chapter.sequence_number, chapter.title
        );
        let _ = writeln!(
            out,
            "_{} · {} minutes · complexity {:.1}_\n",
            chapter.content_type, chapter.estimated_duration_minutes, chapter.complexity_level
        );
        if !chapter.learning_objectives.is_empty() {
            for objective in &chapter.learning_objectives {
                let _ = writeln!(out, "- {objective}");
            }
            out.push('\n');
        }
        if !chapter.content.trim().is_empty() {
            // 正文的标题整体下沉两级
            for line in chapter.content.trim().lines() {
                if line.starts_with('#') {
                    let _ = writeln!(out, "##{line}");
                } else {
                    let _ = writeln!(out, "{line}");
                }
            }
        }
    }

    if !export.quizzes.is_empty() {
        out.push_str("\n## Quizzes\n");
        for detail in &export.quizzes {
            let quiz = &detail.quiz;
            let _ = writeln!(
                out,
                "\n### {}\n\n_{} · passing score {}_\n",
                quiz.title, quiz.quiz_type, quiz.passing_score
            );
            for question in &detail.questions {
                let _ = writeln!(
                    out,
                    "{}. {}",
                    question.sequence_number, question.question_text
                );
                if question.question_type == QuestionType::MultipleChoice {
                    for option in &question.options {
                        let _ = writeln!(out, "   - {option}");
                    }
                }
                let _ = writeln!(out, "   - **Answer:** {}", question.correct_answer);
                if let Some(explanation) = &question.explanation {
                    let _ = writeln!(out, "   - _{explanation}_");
                }
            }
        }
    }

    if !export.flashcards.is_empty() {
        out.push_str("\n## Flashcards\n\n");
        out.push_str("| Front | Back | Difficulty |\n|---|---|---|\n");
        for card in &export.flashcards {
            let _ = writeln!(
                out,
                "| {} | {} | {} |",
                table_cell(&card.front),
                table_cell(&card.back),
                card.difficulty
            );
        }
    }

    out
}

fn table_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::courses::entities::Course;
    use crate::models::flashcards::entities::Flashcard;
    use crate::models::quizzes::entities::DifficultyLevel;

    fn sample_course() -> Course {
        serde_json::from_value(serde_json::json!({
            "id": Uuid::nil(),
            "title": "Rust: Ownership & Borrowing!",
            "description": "Memory safety without a garbage collector.",
            "subject_domain": "Programming",
            "target_audience": {"proficiency_level": "intermediate"},
            "learning_objectives": ["Explain ownership rules"],
            "estimated_duration_hours": 6.0,
            "difficulty_score": 3.0,
            "pacing_preference": "moderate",
            "language": "en",
            "status": "ready",
            "version": 2,
            "quality_metrics": null,
            "created_at": "2025-03-01T00:00:00Z",
            "updated_at": "2025-03-01T00:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Rust: Ownership & Borrowing!"), "rust-ownership-borrowing");
        assert_eq!(slugify("  Intro to ML  "), "intro-to-ml");
        assert_eq!(slugify("机器学习"), "course");
    }

    #[test]
    fn test_markdown_contains_sections() {
        let course = sample_course();
        let export = CourseExport {
            flashcards: vec![Flashcard {
                id: Uuid::nil(),
                course_id: course.id,
                chapter_id: None,
                front: "Borrow | reference".to_string(),
                back: "A reference\nthat does not own".to_string(),
                difficulty: DifficultyLevel::Easy,
                tags: vec![],
                created_at: course.created_at,
                updated_at: course.updated_at,
            }],
            course,
            chapters: vec![],
            quizzes: vec![],
            exported_at: chrono::Utc::now(),
        };

        let markdown = render_markdown(&export);
        assert!(markdown.starts_with("# Rust: Ownership & Borrowing!"));
        assert!(markdown.contains("- **Level:** intermediate"));
        assert!(markdown.contains("## Learning Objectives"));
        assert!(markdown.contains("| Borrow \\| reference | A reference that does not own | easy |"));
        assert!(!markdown.contains("## Quizzes"));
    }
}
