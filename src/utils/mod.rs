pub mod extractor;
pub mod parameter_error_handler;
pub mod sql;
pub mod text;
pub mod validate;

pub use extractor::{
    SafeChapterId, SafeCourseId, SafeFlashcardId, SafeQuestionId, SafeQuizId, SafeTaskId,
};
pub use parameter_error_handler::json_error_handler;
pub use parameter_error_handler::query_error_handler;
pub use sql::escape_like_pattern;
pub use text::excerpt;
