//! 统一错误处理模块
//!
//! 使用宏自动生成错误类型，支持错误代码和类型名称。

use std::fmt;

/// 定义错误类型的宏
///
/// 自动生成：
/// - enum 定义
/// - code() 方法 - 返回错误代码
/// - error_type() 方法 - 返回错误类型名称
/// - message() 方法 - 返回错误详情
/// - 便捷构造函数
macro_rules! define_coursegen_errors {
    ($(
        $variant:ident($code:literal, $type_name:literal)
    ),* $(,)?) => {
        #[derive(Debug, Clone)]
        pub enum CourseGenError {
            $($variant(String),)*
        }

        impl CourseGenError {
            /// 获取错误代码
            pub fn code(&self) -> &'static str {
                match self {
                    $(CourseGenError::$variant(_) => $code,)*
                }
            }

            /// 获取错误类型名称
            pub fn error_type(&self) -> &'static str {
                match self {
                    $(CourseGenError::$variant(_) => $type_name,)*
                }
            }

            /// 获取错误详情
            pub fn message(&self) -> &str {
                match self {
                    $(CourseGenError::$variant(msg) => msg,)*
                }
            }
        }

        // 生成便捷构造函数
        paste::paste! {
            impl CourseGenError {
                $(
                    pub fn [<$variant:snake>]<T: Into<String>>(msg: T) -> Self {
                        CourseGenError::$variant(msg.into())
                    }
                )*
            }
        }
    };
}

define_coursegen_errors! {
    CacheConnection("E001", "Cache Connection Error"),
    CachePluginNotFound("E002", "Cache Plugin Not Found"),
    DatabaseConfig("E003", "Database Configuration Error"),
    DatabaseConnection("E004", "Database Connection Error"),
    DatabaseOperation("E005", "Database Operation Error"),
    Validation("E006", "Validation Error"),
    NotFound("E007", "Resource Not Found"),
    Conflict("E008", "Resource Conflict"),
    Serialization("E009", "Serialization Error"),
    AiProvider("E010", "AI Provider Error"),
    AiRateLimited("E011", "AI Provider Rate Limited"),
    AiUnavailable("E012", "AI Provider Unavailable"),
    VectorStore("E013", "Vector Store Error"),
    TaskQueue("E014", "Task Queue Error"),
    Redis("E015", "Redis Error"),
    HttpClient("E016", "HTTP Client Error"),
    Export("E017", "Export Error"),
}

impl CourseGenError {
    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }

    /// 是否属于 AI 提供方的错误（可以尝试备用提供方）
    pub fn is_ai_error(&self) -> bool {
        matches!(
            self,
            CourseGenError::AiProvider(_)
                | CourseGenError::AiRateLimited(_)
                | CourseGenError::AiUnavailable(_)
                | CourseGenError::HttpClient(_)
        )
    }
}

impl fmt::Display for CourseGenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CourseGenError {}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for CourseGenError {
    fn from(err: sea_orm::DbErr) -> Self {
        CourseGenError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for CourseGenError {
    fn from(err: std::io::Error) -> Self {
        CourseGenError::Export(err.to_string())
    }
}

impl From<serde_json::Error> for CourseGenError {
    fn from(err: serde_json::Error) -> Self {
        CourseGenError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for CourseGenError {
    fn from(err: reqwest::Error) -> Self {
        CourseGenError::HttpClient(err.to_string())
    }
}

impl From<redis::RedisError> for CourseGenError {
    fn from(err: redis::RedisError) -> Self {
        CourseGenError::Redis(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CourseGenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(CourseGenError::cache_connection("test").code(), "E001");
        assert_eq!(CourseGenError::database_config("test").code(), "E003");
        assert_eq!(CourseGenError::validation("test").code(), "E006");
        assert_eq!(CourseGenError::ai_provider("test").code(), "E010");
    }

    #[test]
    fn test_error_types() {
        assert_eq!(
            CourseGenError::vector_store("test").error_type(),
            "Vector Store Error"
        );
        assert_eq!(
            CourseGenError::validation("test").error_type(),
            "Validation Error"
        );
    }

    #[test]
    fn test_error_message() {
        let err = CourseGenError::validation("Invalid input");
        assert_eq!(err.message(), "Invalid input");
    }

    #[test]
    fn test_ai_error_classification() {
        assert!(CourseGenError::ai_rate_limited("429").is_ai_error());
        assert!(CourseGenError::http_client("timeout").is_ai_error());
        assert!(!CourseGenError::database_operation("boom").is_ai_error());
    }

    #[test]
    fn test_format_simple() {
        let err = CourseGenError::not_found("course 42");
        let formatted = err.format_simple();
        assert!(formatted.contains("Resource Not Found"));
        assert!(formatted.contains("course 42"));
    }
}
