//! 可读性指标：Flesch Reading Ease 与 Flesch-Kincaid 年级

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::courses::entities::ProficiencyLevel;

static CODE_FENCE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```.*?```").expect("Invalid code fence regex"));
static SENTENCE_SPLIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+|\n+").expect("Invalid sentence regex"));
static WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\p{L}+(?:['’-]\p{L}+)*").expect("Invalid word regex"));

// 超出目标区间多少分时得分降为 0
const READING_EASE_FALLOFF: f64 = 40.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadabilityReport {
    pub flesch_reading_ease: f64,
    pub flesch_kincaid_grade: f64,
    pub sentence_count: usize,
    pub word_count: usize,
    pub syllable_count: usize,
    pub target_min: f64,
    pub target_max: f64,
    pub score: f64,
}

/// 各水平期望的 Reading Ease 区间
pub fn target_reading_ease(level: ProficiencyLevel) -> (f64, f64) {
    match level {
        ProficiencyLevel::Beginner => (60.0, 100.0),
        ProficiencyLevel::Intermediate => (50.0, 80.0),
        ProficiencyLevel::Advanced => (30.0, 70.0),
        ProficiencyLevel::Expert => (10.0, 60.0),
    }
}

/// 去掉代码块后的纯文本单词
pub fn words(text: &str) -> Vec<&str> {
    WORD_RE.find_iter(text).map(|m| m.as_str()).collect()
}

pub fn strip_code_blocks(text: &str) -> String {
    CODE_FENCE_RE.replace_all(text, " ").into_owned()
}

pub fn count_sentences(text: &str) -> usize {
    SENTENCE_SPLIT_RE
        .split(text)
        .filter(|segment| WORD_RE.is_match(segment))
        .count()
}

/// 元音组计数，处理词尾不发音的 e / es / ed
pub fn count_syllables(word: &str) -> usize {
    let chars: Vec<char> = word
        .chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_lowercase)
        .collect();
    if chars.is_empty() {
        return 0;
    }
    if chars.len() <= 3 {
        return 1;
    }

    let is_vowel = |c: char| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
    let mut end = chars.len();
    let last = chars[end - 1];
    let before_last = chars[end - 2];
    if last == 'e' && !(before_last == 'l' && !is_vowel(chars[end - 3])) {
        end -= 1;
    } else if (last == 's' || last == 'd') && before_last == 'e' {
        let pre = chars[end - 3];
        if !is_vowel(pre) && !(last == 'd' && matches!(pre, 't' | 'd')) && pre != 's' {
            end -= 2;
        }
    }

    let mut count = 0;
    let mut prev_vowel = false;
    for &c in &chars[..end] {
        let vowel = is_vowel(c);
        if vowel && !prev_vowel {
            count += 1;
        }
        prev_vowel = vowel;
    }
    count.max(1)
}

pub fn analyze(text: &str, level: ProficiencyLevel) -> ReadabilityReport {
    let (target_min, target_max) = target_reading_ease(level);
    let prose = strip_code_blocks(text);
    let words = words(&prose);
    let word_count = words.len();
    let sentence_count = count_sentences(&prose);

    if word_count == 0 || sentence_count == 0 {
        return ReadabilityReport {
            flesch_reading_ease: 0.0,
            flesch_kincaid_grade: 0.0,
            sentence_count,
            word_count,
            syllable_count: 0,
            target_min,
            target_max,
            score: 0.0,
        };
    }

    let syllable_count: usize = words.iter().map(|w| count_syllables(w)).sum();
    let words_per_sentence = word_count as f64 / sentence_count as f64;
    let syllables_per_word = syllable_count as f64 / word_count as f64;

    let reading_ease = 206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word;
    let grade = 0.39 * words_per_sentence + 11.8 * syllables_per_word - 15.59;

    // 公式结果可能超出 0..100，按 0..100 计算与目标区间的距离
    let bounded = reading_ease.clamp(0.0, 100.0);
    let distance = if bounded < target_min {
        target_min - bounded
    } else if bounded > target_max {
        bounded - target_max
    } else {
        0.0
    };
    let score = (1.0 - distance / READING_EASE_FALLOFF).clamp(0.0, 1.0);

    ReadabilityReport {
        flesch_reading_ease: round2(reading_ease),
        flesch_kincaid_grade: round2(grade),
        sentence_count,
        word_count,
        syllable_count,
        target_min,
        target_max,
        score,
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
