//! 课程生成：提示词、模型输出解析、流水线与任务队列

pub mod parsing;
pub mod pipeline;
pub mod prompts;
pub mod task_manager;

pub use pipeline::GenerationPipeline;
pub use task_manager::{GenerationJob, TaskManager};
