//! 请求字段校验
//!
//! 每个请求结构体的 `validate()` 把所有问题收集进 [`ValidationResult`]，
//! 服务层一次性返回给客户端。

use crate::models::courses::entities::ProficiencyLevel;

/// 校验结果
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn error_message(&self) -> String {
        self.errors.join("; ")
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// 字符串长度（按字符计，去除首尾空白）
    pub fn check_length(&mut self, field: &str, value: &str, min: usize, max: usize) {
        let len = value.trim().chars().count();
        if len < min || len > max {
            self.errors.push(format!(
                "{field} length must be between {min} and {max} characters (got {len})"
            ));
        }
    }

    pub fn check_optional_length(
        &mut self,
        field: &str,
        value: Option<&str>,
        min: usize,
        max: usize,
    ) {
        if let Some(value) = value {
            self.check_length(field, value, min, max);
        }
    }

    pub fn check_range_f64(&mut self, field: &str, value: f64, min: f64, max: f64) {
        if !value.is_finite() || value < min || value > max {
            self.errors
                .push(format!("{field} must be between {min} and {max} (got {value})"));
        }
    }

    pub fn check_range_i32(&mut self, field: &str, value: i32, min: i32, max: i32) {
        if value < min || value > max {
            self.errors
                .push(format!("{field} must be between {min} and {max} (got {value})"));
        }
    }

    /// 列表项数与每一项的长度
    pub fn check_list(
        &mut self,
        field: &str,
        items: &[String],
        min_items: usize,
        max_items: usize,
        item_min: usize,
        item_max: usize,
    ) {
        if items.len() < min_items || items.len() > max_items {
            self.errors.push(format!(
                "{field} must contain between {min_items} and {max_items} items (got {})",
                items.len()
            ));
        }
        for (idx, item) in items.iter().enumerate() {
            let len = item.trim().chars().count();
            if len < item_min || len > item_max {
                self.errors.push(format!(
                    "{field}[{idx}] length must be between {item_min} and {item_max} characters"
                ));
            }
        }
    }

    /// 难度分数必须落在目标受众水平对应的区间内
    pub fn check_difficulty_band(&mut self, difficulty_score: f64, level: ProficiencyLevel) {
        if !difficulty_score_in_band(difficulty_score, level) {
            let (min, max) = level.difficulty_band();
            self.errors.push(format!(
                "difficulty_score {difficulty_score} is outside the {min}-{max} band for {} audiences",
                level.as_str()
            ));
        }
    }
}

pub fn difficulty_score_in_band(difficulty_score: f64, level: ProficiencyLevel) -> bool {
    let (min, max) = level.difficulty_band();
    difficulty_score >= min && difficulty_score <= max
}
