/// 任务状态更新，只写入 Some 的字段
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub status: Option<super::entities::TaskStatus>,
    pub progress: Option<i32>,
    pub current_step: Option<String>,
    pub error: Option<String>,
}

impl TaskUpdate {
    pub fn progress(progress: i32, step: impl Into<String>) -> Self {
        Self {
            progress: Some(progress.clamp(0, 100)),
            current_step: Some(step.into()),
            ..Default::default()
        }
    }
}
