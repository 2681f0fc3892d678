//! 模型输出解析
//!
//! 模型返回的 JSON 不一定完全符合约定：字段缺失、数值越界、单项无效都很常见。
//! 这里逐项解析，越界的数值截断到合法范围，无效的项直接丢弃。

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::errors::{CourseGenError, Result};
use crate::models::chapters::entities::{ChapterContentType, ContentBlock, ContentBlockType};
use crate::models::flashcards::requests::CreateFlashcardRequest;
use crate::models::generation::entities::{GeneratedFlashcard, GeneratedSubchapter};
use crate::models::quizzes::requests::CreateQuestionRequest;

static BOLD_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*([^*\n]+?)\*\*").expect("Invalid bold term regex"));

const MAX_KEY_CONCEPTS: usize = 10;

/// 结构规划中的一章
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedChapter {
    pub sequence_number: i32,
    pub title: String,
    pub learning_objectives: Vec<String>,
    pub content_type: ChapterContentType,
    pub estimated_duration_minutes: i32,
    pub complexity_level: f64,
    pub key_concepts: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawChapter {
    #[serde(default)]
    title: String,
    #[serde(default)]
    learning_objectives: Vec<String>,
    #[serde(default)]
    content_type: Option<String>,
    #[serde(default)]
    estimated_duration_minutes: Option<f64>,
    #[serde(default)]
    complexity_level: Option<f64>,
    #[serde(default)]
    key_concepts: Vec<String>,
}

/// 取出对象里的某个数组字段；模型直接返回数组时也接受
fn items<'a>(value: &'a Value, field: &str) -> &'a [Value] {
    match value {
        Value::Array(items) => items,
        Value::Object(map) => map
            .get(field)
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[]),
        _ => &[],
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.trim().chars().take(max_chars).collect()
}

fn clean_list(items: Vec<String>, max_items: usize, min_len: usize, max_len: usize) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| {
            let len = item.chars().count();
            len >= min_len && len <= max_len
        })
        .take(max_items)
        .collect()
}

/// 解析课程结构，章节数限制在 1..=max_chapters
pub fn parse_structure(
    value: &Value,
    max_chapters: usize,
    default_complexity: f64,
) -> Result<Vec<PlannedChapter>> {
    let mut chapters = Vec::new();

    for raw in items(value, "chapters") {
        let raw: RawChapter = match serde_json::from_value(raw.clone()) {
            Ok(raw) => raw,
            Err(e) => {
                debug!("Skipping malformed chapter entry: {}", e);
                continue;
            }
        };

        let title = truncate(&raw.title, 200);
        if title.chars().count() < 3 {
            continue;
        }

        chapters.push(PlannedChapter {
            sequence_number: chapters.len() as i32 + 1,
            title,
            learning_objectives: clean_list(raw.learning_objectives, 10, 5, 300),
            content_type: raw
                .content_type
                .and_then(|t| t.trim().to_lowercase().parse().ok())
                .unwrap_or_default(),
            estimated_duration_minutes: raw
                .estimated_duration_minutes
                .filter(|m| m.is_finite())
                .map(|m| m.round().clamp(5.0, 600.0) as i32)
                .unwrap_or(30),
            complexity_level: raw
                .complexity_level
                .filter(|c| c.is_finite())
                .unwrap_or(default_complexity)
                .clamp(1.0, 5.0),
            key_concepts: clean_list(raw.key_concepts, MAX_KEY_CONCEPTS, 1, 100),
        });

        if chapters.len() >= max_chapters.max(1) {
            break;
        }
    }

    if chapters.is_empty() {
        return Err(CourseGenError::ai_provider(
            "The AI response did not contain any usable chapter",
        ));
    }
    Ok(chapters)
}

/// 按 `## ` 二级标题切分章节正文（忽略代码块里的内容）
fn split_sections(content: &str) -> (String, Vec<(String, String)>) {
    let mut intro = String::new();
    let mut sections: Vec<(String, String)> = Vec::new();
    let mut in_fence = false;

    for line in content.lines() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
        }

        if !in_fence && let Some(heading) = line.strip_prefix("## ") {
            sections.push((heading.trim().to_string(), String::new()));
            continue;
        }

        let body = match sections.last_mut() {
            Some((_, body)) => body,
            None => &mut intro,
        };
        body.push_str(line);
        body.push('\n');
    }

    (
        intro.trim().to_string(),
        sections
            .into_iter()
            .map(|(title, body)| (title, body.trim().to_string()))
            .collect(),
    )
}

fn block_type_for(heading: &str) -> ContentBlockType {
    let heading = heading.to_lowercase();
    if ["summary", "conclusion", "key takeaways", "recap"]
        .iter()
        .any(|k| heading.contains(k))
    {
        ContentBlockType::Summary
    } else if heading.contains("example") {
        ContentBlockType::Example
    } else if ["exercise", "practice", "try it", "activity"]
        .iter()
        .any(|k| heading.contains(k))
    {
        ContentBlockType::Exercise
    } else if heading.contains("introduction") || heading.contains("overview") {
        ContentBlockType::Introduction
    } else {
        ContentBlockType::Section
    }
}

/// 正文切分为内容块：标题前的部分是引言，之后每个二级标题一块
pub fn split_content_blocks(content: &str) -> Vec<ContentBlock> {
    let (intro, sections) = split_sections(content);
    let mut blocks = Vec::with_capacity(sections.len() + 1);

    if !intro.is_empty() {
        blocks.push(ContentBlock {
            block_type: ContentBlockType::Introduction,
            title: None,
            body: intro,
        });
    }

    for (title, body) in sections {
        blocks.push(ContentBlock {
            block_type: block_type_for(&title),
            title: Some(title),
            body,
        });
    }
    blocks
}

/// 加粗的术语作为关键概念
pub fn extract_key_concepts(text: &str) -> Vec<String> {
    let mut concepts: Vec<String> = Vec::new();
    for cap in BOLD_REGEX.captures_iter(text) {
        let term = cap[1].trim().trim_end_matches([':', '.', ',']).to_string();
        if term.is_empty() || term.chars().count() > 100 {
            continue;
        }
        if !concepts.iter().any(|c| c.eq_ignore_ascii_case(&term)) {
            concepts.push(term);
        }
        if concepts.len() >= MAX_KEY_CONCEPTS {
            break;
        }
    }
    concepts
}

fn first_sentence(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let end = text
        .find(['.', '!', '?'])
        .map(|idx| idx + 1)
        .unwrap_or(text.len());
    let sentence = truncate(&text[..end], 300);
    (!sentence.is_empty()).then_some(sentence)
}

/// 每个二级标题一个子章节
pub fn split_subchapters(content: &str) -> Vec<GeneratedSubchapter> {
    let (_, sections) = split_sections(content);
    sections
        .into_iter()
        .filter(|(title, _)| !title.is_empty())
        .enumerate()
        .map(|(idx, (title, body))| GeneratedSubchapter {
            sequence_number: idx as i32 + 1,
            title: truncate(&title, 200),
            key_concepts: extract_key_concepts(&body),
            summary: first_sentence(&body),
            content: body,
        })
        .collect()
}

/// 解析测验题目，丢弃无法通过校验的题目
pub fn parse_questions(value: &Value, max_questions: usize) -> Vec<CreateQuestionRequest> {
    let mut questions = Vec::new();
    for raw in items(value, "questions") {
        let mut question: CreateQuestionRequest = match serde_json::from_value(raw.clone()) {
            Ok(q) => q,
            Err(e) => {
                debug!("Skipping malformed question: {}", e);
                continue;
            }
        };
        question.sequence_number = None;
        let validation = question.validate();
        if !validation.is_valid() {
            debug!("Dropping invalid question: {}", validation.error_message());
            continue;
        }
        question.sequence_number = Some(questions.len() as i32 + 1);
        questions.push(question);
        if questions.len() >= max_questions {
            break;
        }
    }
    questions
}

/// 解析闪卡，丢弃无法通过校验的闪卡
pub fn parse_flashcards(
    value: &Value,
    chapter_sequence: i32,
    max_cards: usize,
) -> Vec<GeneratedFlashcard> {
    let mut cards = Vec::new();
    for raw in items(value, "flashcards") {
        let mut card: CreateFlashcardRequest = match serde_json::from_value(raw.clone()) {
            Ok(card) => card,
            Err(e) => {
                debug!("Skipping malformed flashcard: {}", e);
                continue;
            }
        };
        card.tags = clean_list(card.tags, 10, 1, 50);
        let validation = card.validate();
        if !validation.is_valid() {
            debug!("Dropping invalid flashcard: {}", validation.error_message());
            continue;
        }
        cards.push(GeneratedFlashcard {
            chapter_sequence: Some(chapter_sequence),
            front: card.front.trim().to_string(),
            back: card.back.trim().to_string(),
            difficulty: card.difficulty,
            tags: card.tags,
        });
        if cards.len() >= max_cards {
            break;
        }
    }
    cards
}
