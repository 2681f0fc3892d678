//! 内容质量评估
//!
//! 可读性、偏见用语、教学设计、词汇复杂度四类启发式指标，
//! 按权重汇总为 `overall`，再与目标水平的阈值比较。

pub mod bias;
pub mod complexity;
pub mod pedagogy;
pub mod readability;

use serde::{Deserialize, Serialize};

use crate::config::QualityConfig;
use crate::models::courses::entities::ProficiencyLevel;

pub use bias::{BiasCategory, BiasFinding, BiasReport};
pub use complexity::ComplexityReport;
pub use pedagogy::PedagogyReport;
pub use readability::ReadabilityReport;

/// 各水平的通过阈值
pub fn pass_threshold(level: ProficiencyLevel) -> f64 {
    match level {
        ProficiencyLevel::Beginner => 0.70,
        ProficiencyLevel::Intermediate => 0.68,
        ProficiencyLevel::Advanced => 0.65,
        ProficiencyLevel::Expert => 0.62,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub proficiency_level: ProficiencyLevel,
    pub readability: ReadabilityReport,
    pub bias: BiasReport,
    pub pedagogy: PedagogyReport,
    pub complexity: ComplexityReport,
    pub structure_score: f64,
    pub overall: f64,
    pub threshold: f64,
    pub passed: bool,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
}

/// 课程级别的质量汇总（各章节报告的平均）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    pub overall_score: f64,
    pub readability_score: f64,
    pub pedagogy_score: f64,
    pub bias_score: f64,
    pub structure_score: f64,
    pub complexity_score: f64,
    pub chapters_evaluated: usize,
    pub chapters_passed: usize,
    pub evaluated_at: chrono::DateTime<chrono::Utc>,
}

impl QualityMetrics {
    pub fn from_reports(reports: &[QualityReport]) -> Self {
        let n = reports.len();
        let avg = |f: fn(&QualityReport) -> f64| -> f64 {
            if n == 0 {
                0.0
            } else {
                readability::round2(reports.iter().map(f).sum::<f64>() / n as f64)
            }
        };
        Self {
            overall_score: avg(|r| r.overall),
            readability_score: avg(|r| r.readability.score),
            pedagogy_score: avg(|r| r.pedagogy.score),
            bias_score: avg(|r| r.bias.score),
            structure_score: avg(|r| r.structure_score),
            complexity_score: avg(|r| r.complexity.score),
            chapters_evaluated: n,
            chapters_passed: reports.iter().filter(|r| r.passed).count(),
            evaluated_at: chrono::Utc::now(),
        }
    }
}

/// 质量评估器，持有权重配置
#[derive(Debug, Clone)]
pub struct QualityValidator {
    config: QualityConfig,
}

impl Default for QualityValidator {
    fn default() -> Self {
        Self::new(QualityConfig::default())
    }
}

impl QualityValidator {
    pub fn new(config: QualityConfig) -> Self {
        Self { config }
    }

    pub fn evaluate(
        &self,
        content: &str,
        level: ProficiencyLevel,
        objectives: &[String],
    ) -> QualityReport {
        let readability = readability::analyze(content, level);
        let bias = bias::analyze(content);
        let pedagogy = pedagogy::analyze(content, objectives);
        let complexity = complexity::analyze(content, level);
        let structure_score = pedagogy.structure;

        let cfg = &self.config;
        let weighted = [
            (cfg.readability_weight, readability.score),
            (cfg.pedagogy_weight, pedagogy.score),
            (cfg.bias_weight, bias.score),
            (cfg.structure_weight, structure_score),
            (cfg.complexity_weight, complexity.score),
        ];
        let total_weight: f64 = weighted.iter().map(|(w, _)| w.max(0.0)).sum();
        let overall = if total_weight > 0.0 {
            weighted.iter().map(|(w, s)| w.max(0.0) * s).sum::<f64>() / total_weight
        } else {
            0.0
        };
        let overall = readability::round2(overall);

        let threshold = pass_threshold(level);
        let passed = overall >= threshold && bias.score >= cfg.min_bias_score;

        let (issues, recommendations) =
            collect_feedback(&readability, &bias, &pedagogy, &complexity, level);

        QualityReport {
            proficiency_level: level,
            readability,
            bias,
            pedagogy,
            complexity,
            structure_score,
            overall,
            threshold,
            passed,
            issues,
            recommendations,
        }
    }
}

fn collect_feedback(
    readability: &ReadabilityReport,
    bias: &BiasReport,
    pedagogy: &PedagogyReport,
    complexity: &ComplexityReport,
    level: ProficiencyLevel,
) -> (Vec<String>, Vec<String>) {
    let mut issues = Vec::new();
    let mut recommendations = Vec::new();

    if readability.word_count == 0 {
        issues.push("Content is empty".to_string());
        recommendations.push("Write the chapter body before validating it".to_string());
        return (issues, recommendations);
    }

    if readability.score < 1.0 {
        issues.push(format!(
            "Reading ease {:.1} is outside the {}-{} target for {} learners",
            readability.flesch_reading_ease, readability.target_min, readability.target_max, level
        ));
        if readability.flesch_reading_ease < readability.target_min {
            recommendations
                .push("Use shorter sentences and simpler words to improve readability".to_string());
        } else {
            recommendations.push("Add more depth and precise terminology".to_string());
        }
    }

    for finding in &bias.findings {
        issues.push(format!(
            "Potentially biased {} language: '{}' ({} occurrence(s))",
            finding.category, finding.term, finding.occurrences
        ));
        recommendations.push(format!(
            "Replace '{}' with '{}'",
            finding.term, finding.suggestion
        ));
    }

    for objective in &pedagogy.unmatched_objectives {
        issues.push(format!("Learning objective not covered: {objective}"));
    }
    if !pedagogy.unmatched_objectives.is_empty() {
        recommendations.push("Address every learning objective explicitly".to_string());
    }
    if pedagogy.structure < 0.5 {
        issues.push("Content lacks structure".to_string());
        recommendations.push("Organize the content with headings, paragraphs and lists".to_string());
    }
    if pedagogy.examples < 0.5 {
        issues.push("Too few concrete examples".to_string());
        recommendations.push("Add worked examples or code snippets".to_string());
    }
    if pedagogy.engagement < 0.5 {
        issues.push("Little learner engagement".to_string());
        recommendations.push("Add questions or practice exercises".to_string());
    }
    if pedagogy.summary == 0.0 {
        issues.push("Missing summary".to_string());
        recommendations.push("End with a summary or key takeaways section".to_string());
    }
    if complexity.score < 0.5 {
        issues.push(format!(
            "Vocabulary complexity (average word length {:.2}) does not match {} learners",
            complexity.average_word_length, level
        ));
    }

    (issues, recommendations)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHAPTER: &str = "# Variables in Rust\n\nA variable holds a value. You make one with let. By default it can not change.\n\n## Making a value change\n\nFor example, add mut to let a value change. Consider this code:\n\n```rust\nlet mut count = 1;\ncount += 1;\n```\n\n- let makes a variable\n- mut lets it change\n\nTry it now. What do you see when you print count? Practice with the exercise below.\n\n## Summary\n\nKey takeaways: let makes a variable and mut lets the value change.";

    #[test]
    fn test_good_chapter_passes() {
        let validator = QualityValidator::default();
        let objectives = vec!["Declare variables with let".to_string()];
        let report = validator.evaluate(CHAPTER, ProficiencyLevel::Beginner, &objectives);
        assert!(report.overall >= report.threshold, "{report:?}");
        assert!(report.passed);
        assert_eq!(report.threshold, 0.70);
    }

    #[test]
    fn test_bias_blocks_pass_even_with_high_score() {
        let validator = QualityValidator::default();
        let biased = format!("{CHAPTER}\n\nThis is crazy, insane and lame for old people.");
        let report = validator.evaluate(&biased, ProficiencyLevel::Beginner, &[]);
        assert!(report.bias.score < 0.8);
        assert!(!report.passed);
        assert!(report.issues.iter().any(|i| i.contains("biased")));
    }

    #[test]
    fn test_empty_content_fails() {
        let report = QualityValidator::default().evaluate("", ProficiencyLevel::Expert, &[]);
        assert!(!report.passed);
        assert_eq!(report.issues, vec!["Content is empty".to_string()]);
    }

    #[test]
    fn test_metrics_average_reports() {
        let validator = QualityValidator::default();
        let good = validator.evaluate(CHAPTER, ProficiencyLevel::Beginner, &[]);
        let empty = validator.evaluate("", ProficiencyLevel::Beginner, &[]);
        let metrics = QualityMetrics::from_reports(&[good.clone(), empty]);
        assert_eq!(metrics.chapters_evaluated, 2);
        assert_eq!(metrics.chapters_passed, 1);
        assert!(metrics.overall_score < good.overall);

        let none = QualityMetrics::from_reports(&[]);
        assert_eq!(none.overall_score, 0.0);
    }

    #[test]
    fn test_thresholds() {
        assert_eq!(pass_threshold(ProficiencyLevel::Intermediate), 0.68);
        assert_eq!(pass_threshold(ProficiencyLevel::Expert), 0.62);
    }
}
