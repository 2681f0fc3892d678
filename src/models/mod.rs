//! 数据模型定义
//!
//! `entity` 模块是数据库表映射，这里是对外暴露的业务模型、请求与响应结构。

use serde::{Deserialize, Serialize};

/// 定义以字符串形式存储 / 传输的枚举
///
/// 自动生成 serde 名称、`as_str()`、`ALL`、`Display` 与 `FromStr`。
macro_rules! define_string_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident => $value:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $value)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value,)+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> ::std::result::Result<Self, Self::Err> {
                match s {
                    $($value => ::std::result::Result::Ok($name::$variant),)+
                    _ => ::std::result::Result::Err(format!(
                        "invalid {} value '{}', expected one of: {}",
                        stringify!($name),
                        s,
                        [$($value),+].join(", ")
                    )),
                }
            }
        }
    };
}

pub mod chapters;
pub mod common;
pub mod courses;
pub mod flashcards;
pub mod generation;
pub mod health;
pub mod quality;
pub mod quizzes;

pub use common::{ApiResponse, PaginationInfo, PaginationQuery};

/// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// 业务错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误 1xxx
    BadRequest = 1000,
    ValidationFailed = 1001,
    NotFound = 1004,
    Conflict = 1009,
    RateLimitExceeded = 1029,

    // 课程 2xxx
    CourseNotFound = 2001,
    CourseCreationFailed = 2002,
    CourseUpdateFailed = 2003,
    CourseDeleteFailed = 2004,
    DifficultyOutOfBand = 2005,

    // 章节 21xx
    ChapterNotFound = 2101,
    ChapterSequenceConflict = 2102,
    ChapterHasNoContent = 2103,

    // 测验 22xx
    QuizNotFound = 2201,
    QuestionNotFound = 2202,

    // 闪卡 23xx
    FlashcardNotFound = 2301,

    // 生成任务 24xx
    GenerationInProgress = 2401,
    GenerationQueueFull = 2402,
    GenerationUnavailable = 2403,
    TaskNotFound = 2404,
    TaskNotCancellable = 2405,

    // 导出 / 检索 25xx
    ExportFormatInvalid = 2501,
    VectorSearchFailed = 2502,

    // 服务端错误 5xxx
    InternalServerError = 5000,
    ServiceUnavailable = 5003,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::courses::entities::{CourseStatus, ProficiencyLevel};

    #[test]
    fn test_string_enum_round_trip() {
        for level in ProficiencyLevel::ALL {
            assert_eq!(level.as_str().parse::<ProficiencyLevel>(), Ok(*level));
        }
        assert_eq!(CourseStatus::Generating.to_string(), "generating");
    }

    #[test]
    fn test_string_enum_rejects_unknown() {
        let err = "guru".parse::<ProficiencyLevel>().unwrap_err();
        assert!(err.contains("beginner"));
        assert!(err.contains("expert"));
    }

    #[test]
    fn test_string_enum_serde_names() {
        let json = serde_json::to_string(&CourseStatus::Published).unwrap();
        assert_eq!(json, "\"published\"");
        let parsed: ProficiencyLevel = serde_json::from_str("\"advanced\"").unwrap();
        assert_eq!(parsed, ProficiencyLevel::Advanced);
    }

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success as i32, 0);
        assert_eq!(ErrorCode::RateLimitExceeded as i32, 1029);
        assert_eq!(ErrorCode::CourseNotFound as i32, 2001);
    }
}
