//! 教学设计评估：目标对齐、结构、示例、互动、总结

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s{0,3}#{1,6}\s+\S").expect("Invalid heading regex"));
static LIST_ITEM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*(?:[-*+]|\d+[.)])\s+\S").expect("Invalid list regex"));
static PARAGRAPH_SPLIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n").expect("Invalid paragraph regex"));
static KEYWORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\p{L}[\p{L}\p{N}]*").expect("Invalid keyword regex"));
static EXAMPLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bfor example\b|\be\.g\.|\bsuch as\b|\bconsider\b|\bfor instance\b|```")
        .expect("Invalid example regex")
});
static ENGAGEMENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\?|\btry\b|\bexercises?\b|\bpractice\b|\breflect\b|\byour turn\b")
        .expect("Invalid engagement regex")
});
static SUMMARY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bsummary\b|\bkey takeaways?\b|\bin conclusion\b|\bto summarize\b|\brecap\b")
        .expect("Invalid summary regex")
});

const STOP_WORDS: &[&str] = &[
    "able", "about", "also", "after", "before", "being", "between", "both", "build", "could",
    "each", "from", "have", "into", "learn", "learner", "learners", "more", "most", "other",
    "over", "should", "some", "student", "students", "such", "than", "that", "their", "them",
    "then", "there", "these", "they", "this", "those", "through", "understand", "under", "using",
    "what", "when", "where", "which", "while", "will", "with", "within", "would", "your",
];

const ALIGNMENT_WEIGHT: f64 = 0.35;
const STRUCTURE_WEIGHT: f64 = 0.20;
const EXAMPLES_WEIGHT: f64 = 0.20;
const ENGAGEMENT_WEIGHT: f64 = 0.15;
const SUMMARY_WEIGHT: f64 = 0.10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PedagogyReport {
    pub objective_alignment: f64,
    pub structure: f64,
    pub examples: f64,
    pub engagement: f64,
    pub summary: f64,
    pub score: f64,
    /// 正文中找不到对应关键词的学习目标
    pub unmatched_objectives: Vec<String>,
}

/// 学习目标中的关键词：长度 >= 4，去掉停用词
pub fn objective_keywords(objective: &str) -> Vec<String> {
    let stop: HashSet<&str> = STOP_WORDS.iter().copied().collect();
    let mut seen = HashSet::new();
    KEYWORD_RE
        .find_iter(objective)
        .map(|m| m.as_str().to_lowercase())
        .filter(|w| w.chars().count() >= 4 && !stop.contains(w.as_str()))
        .filter(|w| seen.insert(w.clone()))
        .collect()
}

// 关键词至少一半出现在正文中即视为覆盖
fn objective_covered(objective: &str, content_words: &HashSet<String>) -> bool {
    let keywords = objective_keywords(objective);
    if keywords.is_empty() {
        return true;
    }
    let hits = keywords
        .iter()
        .filter(|k| content_words.contains(*k) || content_words.iter().any(|w| w.starts_with(k.as_str())))
        .count();
    hits * 2 >= keywords.len()
}

fn structure_score(content: &str) -> f64 {
    let headings = HEADING_RE.find_iter(content).count();
    let list_items = LIST_ITEM_RE.find_iter(content).count();
    let paragraphs = PARAGRAPH_SPLIT_RE
        .split(content)
        .filter(|p| !p.trim().is_empty())
        .count();

    let heading_part = match headings {
        0 => 0.0,
        1 => 0.2,
        _ => 0.4,
    };
    let paragraph_part = (paragraphs.min(3) as f64) * 0.1;
    let list_part = if list_items > 0 { 0.3 } else { 0.0 };
    heading_part + paragraph_part + list_part
}

fn saturating_ratio(count: usize, saturation: usize) -> f64 {
    (count as f64 / saturation as f64).min(1.0)
}

pub fn analyze(content: &str, objectives: &[String]) -> PedagogyReport {
    let content_words: HashSet<String> = KEYWORD_RE
        .find_iter(content)
        .map(|m| m.as_str().to_lowercase())
        .collect();

    let unmatched_objectives: Vec<String> = objectives
        .iter()
        .filter(|o| !objective_covered(o, &content_words))
        .cloned()
        .collect();
    let objective_alignment = if objectives.is_empty() {
        1.0
    } else {
        (objectives.len() - unmatched_objectives.len()) as f64 / objectives.len() as f64
    };

    let structure = structure_score(content);
    let examples = saturating_ratio(EXAMPLE_RE.find_iter(content).count(), 2);
    let engagement = saturating_ratio(ENGAGEMENT_RE.find_iter(content).count(), 3);
    let summary = if SUMMARY_RE.is_match(content) { 1.0 } else { 0.0 };

    let score = ALIGNMENT_WEIGHT * objective_alignment
        + STRUCTURE_WEIGHT * structure
        + EXAMPLES_WEIGHT * examples
        + ENGAGEMENT_WEIGHT * engagement
        + SUMMARY_WEIGHT * summary;

    PedagogyReport {
        objective_alignment,
        structure,
        examples,
        engagement,
        summary,
        score,
        unmatched_objectives,
    }
}
