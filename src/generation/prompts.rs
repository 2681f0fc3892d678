//! 生成用的提示词

use crate::models::courses::entities::Course;

pub const SYSTEM_PROMPT: &str = "You are an expert instructional designer. You write accurate, \
well-structured and inclusive learning material that matches the learner's proficiency level.";

fn audience_line(course: &Course) -> String {
    let audience = &course.target_audience;
    let mut line = format!("Proficiency level: {}", audience.proficiency_level);
    if !audience.prerequisites.is_empty() {
        line.push_str(&format!("\nPrerequisites: {}", audience.prerequisites.join(", ")));
    }
    if let Some(age) = &audience.age_range {
        line.push_str(&format!("\nAge range: {age}"));
    }
    if let Some(context) = &audience.professional_context {
        line.push_str(&format!("\nProfessional context: {context}"));
    }
    line
}

fn bullet_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// 课程结构
pub fn structure_prompt(course: &Course, max_chapters: usize) -> String {
    format!(
        r#"Design the chapter structure for the following course.

Title: {title}
Description: {description}
Subject domain: {domain}
Language: {language}
{audience}
Difficulty score (1-5): {difficulty}
Estimated duration: {hours} hours
Pacing: {pacing}

Course learning objectives:
{objectives}

Return a JSON object with this shape and nothing else:
{{"chapters": [{{"title": "...", "learning_objectives": ["..."], "content_type": "theory|practical|mixed|assessment", "estimated_duration_minutes": 45, "complexity_level": 2.0, "key_concepts": ["..."]}}]}}

Use between 1 and {max_chapters} chapters, ordered from foundational to advanced. Every course
objective must be covered by at least one chapter."#,
        title = course.title,
        description = course.description,
        domain = course.subject_domain,
        language = course.language,
        audience = audience_line(course),
        difficulty = course.difficulty_score,
        hours = course.estimated_duration_hours,
        pacing = course.pacing_preference,
        objectives = bullet_list(&course.learning_objectives),
    )
}

/// 章节正文；`feedback` 为上一次质量检查发现的问题
pub fn chapter_content_prompt(
    course: &Course,
    chapter_title: &str,
    objectives: &[String],
    key_concepts: &[String],
    feedback: &[String],
) -> String {
    let mut prompt = format!(
        r###"Write the full content of a chapter for the course "{course_title}" ({domain}).

Chapter title: {chapter_title}
Language: {language}
{audience}

Chapter learning objectives:
{objectives}

Key concepts to cover: {concepts}

Write Markdown. Start with a short introduction, then use "## " headings for each section,
include at least one concrete example and one practice exercise, and finish with a
"## Summary" section listing the key takeaways. Highlight important terms in **bold**."###,
        course_title = course.title,
        domain = course.subject_domain,
        language = course.language,
        audience = audience_line(course),
        objectives = bullet_list(objectives),
        concepts = if key_concepts.is_empty() {
            "(choose the essential ones)".to_string()
        } else {
            key_concepts.join(", ")
        },
    );

    if !feedback.is_empty() {
        prompt.push_str(
            "\n\nA previous draft was rejected by the quality review. Fix these issues:\n",
        );
        prompt.push_str(&bullet_list(feedback));
    }
    prompt
}

/// 章节测验
pub fn quiz_prompt(
    course: &Course,
    chapter_title: &str,
    chapter_content: &str,
    question_count: usize,
) -> String {
    format!(
        r#"Create {question_count} quiz questions for the chapter "{title}" of the course "{course_title}".
{audience}

Chapter content:
{content}

Return a JSON object with this shape and nothing else:
{{"questions": [{{"question_type": "multiple_choice|true_false|short_answer|fill_in_blank", "question_text": "...", "options": ["..."], "correct_answer": "...", "explanation": "...", "difficulty": "easy|medium|hard", "points": 1}}]}}

For multiple_choice give 4 options and make correct_answer exactly one of them. For true_false
the correct_answer is "true" or "false" and options is empty."#,
        title = chapter_title,
        course_title = course.title,
        audience = audience_line(course),
        content = truncate_chars(chapter_content, 6_000),
    )
}

/// 章节闪卡
pub fn flashcard_prompt(
    course: &Course,
    chapter_title: &str,
    chapter_content: &str,
    card_count: usize,
) -> String {
    format!(
        r#"Create {card_count} study flashcards for the chapter "{title}" of the course "{course_title}".
{audience}

Chapter content:
{content}

Return a JSON object with this shape and nothing else:
{{"flashcards": [{{"front": "question or term", "back": "answer or definition", "difficulty": "easy|medium|hard", "tags": ["..."]}}]}}"#,
        title = chapter_title,
        course_title = course.title,
        audience = audience_line(course),
        content = truncate_chars(chapter_content, 6_000),
    )
}

/// 按字符截断，避免把过长的正文塞进提示词
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("机器学习入门", 2), "机器");
        assert_eq!(truncate_chars("short", 100), "short");
    }

    #[test]
    fn test_feedback_is_appended() {
        let course: Course = serde_json::from_value(serde_json::json!({
            "id": uuid::Uuid::nil(),
            "title": "Rust Basics",
            "description": "Learn the fundamentals of Rust",
            "subject_domain": "programming",
            "target_audience": {"proficiency_level": "beginner"},
            "learning_objectives": ["Understand ownership"],
            "estimated_duration_hours": 10.0,
            "difficulty_score": 2.0,
            "pacing_preference": "moderate",
            "language": "en",
            "status": "generating",
            "version": 1,
            "quality_metrics": null,
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-01T00:00:00Z"
        }))
        .unwrap();

        let prompt = chapter_content_prompt(
            &course,
            "Ownership",
            &["Explain moves".to_string()],
            &[],
            &["Content lacks structure".to_string()],
        );
        assert!(prompt.contains("Proficiency level: beginner"));
        assert!(prompt.contains("- Content lacks structure"));
        assert!(prompt.contains("use \"## \" headings"));
        assert!(prompt.contains("\"## Summary\" section"));
        assert!(prompt.contains("Highlight important terms in **bold**."));
        assert!(structure_prompt(&course, 6).contains("between 1 and 6 chapters"));
    }
}
