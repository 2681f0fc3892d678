//! 词汇复杂度：平均词长与长词比例

use serde::{Deserialize, Serialize};

use super::readability::{round2, strip_code_blocks, words};
use crate::models::courses::entities::ProficiencyLevel;

const LONG_WORD_CHARS: usize = 7;
// 平均词长每偏离 1.5 个字符、长词比例每偏离 0.2，得分降为 0
const WORD_LENGTH_FALLOFF: f64 = 1.5;
const LONG_RATIO_FALLOFF: f64 = 0.2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexityReport {
    pub average_word_length: f64,
    pub long_word_ratio: f64,
    pub score: f64,
}

/// (平均词长区间, 长词比例区间)
fn target_bands(level: ProficiencyLevel) -> ((f64, f64), (f64, f64)) {
    match level {
        ProficiencyLevel::Beginner => ((3.5, 5.0), (0.0, 0.20)),
        ProficiencyLevel::Intermediate => ((4.0, 5.5), (0.05, 0.28)),
        ProficiencyLevel::Advanced => ((4.5, 6.2), (0.10, 0.36)),
        ProficiencyLevel::Expert => ((4.8, 7.0), (0.15, 0.45)),
    }
}

fn band_score(value: f64, (min, max): (f64, f64), falloff: f64) -> f64 {
    let distance = if value < min {
        min - value
    } else if value > max {
        value - max
    } else {
        0.0
    };
    (1.0 - distance / falloff).clamp(0.0, 1.0)
}

pub fn analyze(text: &str, level: ProficiencyLevel) -> ComplexityReport {
    let prose = strip_code_blocks(text);
    let words = words(&prose);
    if words.is_empty() {
        return ComplexityReport {
            average_word_length: 0.0,
            long_word_ratio: 0.0,
            score: 0.0,
        };
    }

    let lengths: Vec<usize> = words.iter().map(|w| w.chars().count()).collect();
    let average_word_length = lengths.iter().sum::<usize>() as f64 / lengths.len() as f64;
    let long_word_ratio =
        lengths.iter().filter(|&&len| len >= LONG_WORD_CHARS).count() as f64 / lengths.len() as f64;

    let (length_band, ratio_band) = target_bands(level);
    let score = 0.6 * band_score(average_word_length, length_band, WORD_LENGTH_FALLOFF)
        + 0.4 * band_score(long_word_ratio, ratio_band, LONG_RATIO_FALLOFF);

    ComplexityReport {
        average_word_length: round2(average_word_length),
        long_word_ratio: round2(long_word_ratio),
        score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_score_linear_decay() {
        assert_eq!(band_score(4.0, (3.5, 5.0), 1.5), 1.0);
        assert!((band_score(5.75, (3.5, 5.0), 1.5) - 0.5).abs() < 1e-9);
        assert_eq!(band_score(9.0, (3.5, 5.0), 1.5), 0.0);
    }

    #[test]
    fn test_dense_vocabulary_penalized_for_beginners() {
        let text = "The borrow checker enforces ownership rules so programs avoid dangling references.";
        let beginner = analyze(text, ProficiencyLevel::Beginner);
        let expert = analyze(text, ProficiencyLevel::Expert);
        assert!(beginner.long_word_ratio > 0.5);
        assert!(beginner.score < expert.score);
    }

    #[test]
    fn test_empty() {
        assert_eq!(analyze("", ProficiencyLevel::Advanced).score, 0.0);
    }
}
