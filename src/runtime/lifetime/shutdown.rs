use std::sync::Arc;

use tokio::signal;
use tracing::warn;

use crate::generation::TaskManager;

pub async fn listen_for_shutdown(task_manager: Arc<TaskManager>) {
    // 等待 Ctrl+C 信号
    if let Err(e) = signal::ctrl_c().await {
        // 无法监听信号时交给 actix 自身的信号处理
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    warn!("Shutdown signal received, initiating graceful shutdown...");
    task_manager.shutdown();
}
