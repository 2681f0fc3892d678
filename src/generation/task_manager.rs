//! 生成任务队列
//!
//! 有界 mpsc 队列 + N 个 worker 共享接收端。任务行先写入数据库再入队，
//! 取消只修改任务状态，worker 取到非 pending 的任务直接跳过。

use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

use super::pipeline::GenerationPipeline;
use crate::config::GenerationConfig;
use crate::errors::{CourseGenError, Result};
use crate::models::generation::{
    entities::{GenerationTask, TaskStatus},
    requests::TaskUpdate,
};
use crate::storage::Storage;

#[derive(Debug, Clone, Copy)]
pub struct GenerationJob {
    pub task_id: Uuid,
    pub course_id: Uuid,
}

pub struct TaskManager {
    storage: Arc<dyn Storage>,
    sender: mpsc::Sender<GenerationJob>,
    ai_available: bool,
    // 串行化“检查活动任务 → 创建任务”
    submit_lock: Mutex<()>,
    workers: StdMutex<Vec<JoinHandle<()>>>,
}

impl TaskManager {
    /// 创建队列并启动 worker
    pub fn start(
        pipeline: Arc<GenerationPipeline>,
        storage: Arc<dyn Storage>,
        config: &GenerationConfig,
    ) -> Arc<Self> {
        let (sender, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let receiver = Arc::new(Mutex::new(receiver));
        let worker_count = config.workers.max(1);

        let workers = (0..worker_count)
            .map(|worker_id| {
                let worker = Worker {
                    id: worker_id,
                    receiver: receiver.clone(),
                    pipeline: pipeline.clone(),
                };
                tokio::spawn(worker.run())
            })
            .collect();

        info!(
            "Generation task manager started with {} workers (queue capacity {})",
            worker_count,
            config.queue_capacity.max(1)
        );

        Arc::new(Self {
            storage,
            sender,
            ai_available: pipeline.ai_available(),
            submit_lock: Mutex::new(()),
            workers: StdMutex::new(workers),
        })
    }

    pub fn is_available(&self) -> bool {
        self.ai_available
    }

    /// 提交生成任务
    ///
    /// 没有 AI 提供方返回 `AiUnavailable`，已有活动任务返回 `Conflict`，
    /// 队列已满返回 `TaskQueue`（此时任务行标记为 failed）。
    pub async fn submit(&self, course_id: Uuid) -> Result<GenerationTask> {
        if !self.ai_available {
            return Err(CourseGenError::ai_unavailable(
                "No AI provider configured, course generation is disabled",
            ));
        }

        let _guard = self.submit_lock.lock().await;

        if let Some(active) = self.storage.active_generation_task(course_id).await? {
            return Err(CourseGenError::conflict(format!(
                "Course {course_id} already has an active generation task {}",
                active.id
            )));
        }

        let task = self.storage.create_generation_task(course_id).await?;
        let job = GenerationJob {
            task_id: task.id,
            course_id,
        };

        if let Err(e) = self.sender.try_send(job) {
            let reason = match e {
                mpsc::error::TrySendError::Full(_) => "Generation queue is full",
                mpsc::error::TrySendError::Closed(_) => "Generation queue is closed",
            };
            warn!("Rejecting generation task {}: {}", task.id, reason);
            let update = TaskUpdate {
                status: Some(TaskStatus::Failed),
                error: Some(reason.to_string()),
                ..Default::default()
            };
            if let Err(update_err) = self.storage.update_generation_task(task.id, update).await {
                warn!("Failed to mark task {} as failed: {}", task.id, update_err);
            }
            return Err(CourseGenError::task_queue(reason));
        }

        info!(%course_id, task_id = %task.id, "Generation task queued");
        Ok(task)
    }

    /// 取消排队中的任务
    pub async fn cancel(&self, task_id: Uuid) -> Result<GenerationTask> {
        let task = self
            .storage
            .get_generation_task(task_id)
            .await?
            .ok_or_else(|| CourseGenError::not_found(format!("Task {task_id} not found")))?;

        if task.status != TaskStatus::Pending || !self.storage.cancel_pending_task(task_id).await? {
            return Err(CourseGenError::conflict(format!(
                "Task {task_id} is {} and can no longer be cancelled",
                task.status
            )));
        }

        info!(%task_id, "Generation task cancelled");
        self.storage
            .get_generation_task(task_id)
            .await?
            .ok_or_else(|| CourseGenError::not_found(format!("Task {task_id} not found")))
    }

    /// 课程最近一次的生成任务
    pub async fn status(&self, course_id: Uuid) -> Result<Option<GenerationTask>> {
        self.storage.latest_generation_task(course_id).await
    }

    /// 停止所有 worker；执行中的任务在下次启动时被标记为中断
    pub fn shutdown(&self) {
        let workers = {
            let mut guard = self
                .workers
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            std::mem::take(&mut *guard)
        };
        for handle in &workers {
            handle.abort();
        }
        if !workers.is_empty() {
            info!("Stopped {} generation workers", workers.len());
        }
    }
}

struct Worker {
    id: usize,
    receiver: Arc<Mutex<mpsc::Receiver<GenerationJob>>>,
    pipeline: Arc<GenerationPipeline>,
}

impl Worker {
    async fn run(self) {
        debug!("Generation worker {} started", self.id);
        loop {
            // 只在等待消息时持有锁
            let job = { self.receiver.lock().await.recv().await };
            let Some(job) = job else { break };

            let span = info_span!(
                "generation_task",
                worker = self.id,
                task_id = %job.task_id,
                course_id = %job.course_id,
            );
            self.process(job).instrument(span).await;
        }
        debug!("Generation worker {} stopped: channel closed", self.id);
    }

    async fn process(&self, job: GenerationJob) {
        // 失败时流水线已经更新了课程和任务状态
        match self.pipeline.run(job.course_id, job.task_id).await {
            Ok(true) => {}
            Ok(false) => info!("Skipping task that is no longer pending"),
            Err(e) => debug!("Generation task ended with error: {}", e),
        }
    }
}
