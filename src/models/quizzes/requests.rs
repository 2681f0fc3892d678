use serde::Deserialize;
use uuid::Uuid;

use super::entities::{DifficultyLevel, Question, QuestionType, QuizType};
use crate::utils::validate::ValidationResult;

fn default_passing_score() -> f64 {
    70.0
}

fn default_points() -> i32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateQuizRequest {
    pub chapter_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub quiz_type: QuizType,
    #[serde(default = "default_passing_score")]
    pub passing_score: f64,
    pub time_limit_minutes: Option<i32>,
    pub max_attempts: Option<i32>,
    /// 可以随测验一起创建题目
    #[serde(default)]
    pub questions: Vec<CreateQuestionRequest>,
}

impl CreateQuizRequest {
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        result.check_length("title", &self.title, 3, 200);
        result.check_optional_length("description", self.description.as_deref(), 0, 2000);
        result.check_range_f64("passing_score", self.passing_score, 0.0, 100.0);
        if let Some(minutes) = self.time_limit_minutes {
            result.check_range_i32("time_limit_minutes", minutes, 1, 600);
        }
        if let Some(attempts) = self.max_attempts {
            result.check_range_i32("max_attempts", attempts, 1, i32::MAX);
        }
        for (idx, question) in self.questions.iter().enumerate() {
            for err in question.validate().errors {
                result.push(format!("questions[{idx}].{err}"));
            }
        }
        result
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateQuizRequest {
    pub chapter_id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub quiz_type: Option<QuizType>,
    pub passing_score: Option<f64>,
    pub time_limit_minutes: Option<i32>,
    pub max_attempts: Option<i32>,
}

impl UpdateQuizRequest {
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        if let Some(title) = &self.title {
            result.check_length("title", title, 3, 200);
        }
        result.check_optional_length("description", self.description.as_deref(), 0, 2000);
        if let Some(score) = self.passing_score {
            result.check_range_f64("passing_score", score, 0.0, 100.0);
        }
        if let Some(minutes) = self.time_limit_minutes {
            result.check_range_i32("time_limit_minutes", minutes, 1, 600);
        }
        if let Some(attempts) = self.max_attempts {
            result.check_range_i32("max_attempts", attempts, 1, i32::MAX);
        }
        result
    }
}

// 创建题目请求；sequence_number 缺省时追加到末尾
#[derive(Debug, Clone, Deserialize)]
pub struct CreateQuestionRequest {
    pub sequence_number: Option<i32>,
    pub question_type: QuestionType,
    pub question_text: String,
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: Option<String>,
    #[serde(default)]
    pub difficulty: DifficultyLevel,
    #[serde(default = "default_points")]
    pub points: i32,
}

impl CreateQuestionRequest {
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::new();
        if let Some(sequence_number) = self.sequence_number {
            result.check_range_i32("sequence_number", sequence_number, 1, i32::MAX);
        }
        result.check_length("question_text", &self.question_text, 5, 2000);
        result.check_optional_length("explanation", self.explanation.as_deref(), 0, 2000);
        result.check_range_i32("points", self.points, 1, 100);

        let answer = self.correct_answer.trim();
        match self.question_type {
            QuestionType::MultipleChoice => {
                result.check_list("options", &self.options, 2, 8, 1, 500);
                if !self.options.iter().any(|opt| opt.trim() == answer) {
                    result.push("correct_answer must be one of the options");
                }
            }
            QuestionType::TrueFalse => {
                if !matches!(answer.to_ascii_lowercase().as_str(), "true" | "false") {
                    result.push("correct_answer must be 'true' or 'false'");
                }
            }
            QuestionType::ShortAnswer | QuestionType::FillInBlank => {
                result.check_length("correct_answer", answer, 1, 500);
            }
        }
        result
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateQuestionRequest {
    pub sequence_number: Option<i32>,
    pub question_type: Option<QuestionType>,
    pub question_text: Option<String>,
    pub options: Option<Vec<String>>,
    pub correct_answer: Option<String>,
    pub explanation: Option<String>,
    pub difficulty: Option<DifficultyLevel>,
    pub points: Option<i32>,
}

impl UpdateQuestionRequest {
    /// 与现有题目合并，得到用于整体校验和写入的完整数据
    pub fn merge_with(&self, current: &Question) -> CreateQuestionRequest {
        CreateQuestionRequest {
            sequence_number: Some(self.sequence_number.unwrap_or(current.sequence_number)),
            question_type: self.question_type.unwrap_or(current.question_type),
            question_text: self
                .question_text
                .clone()
                .unwrap_or_else(|| current.question_text.clone()),
            options: self.options.clone().unwrap_or_else(|| current.options.clone()),
            correct_answer: self
                .correct_answer
                .clone()
                .unwrap_or_else(|| current.correct_answer.clone()),
            explanation: self.explanation.clone().or_else(|| current.explanation.clone()),
            difficulty: self.difficulty.unwrap_or(current.difficulty),
            points: self.points.unwrap_or(current.points),
        }
    }
}
