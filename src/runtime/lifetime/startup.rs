use std::sync::Arc;
use std::time::Duration;

use actix_web::web;
use tracing::{debug, info, warn};

use crate::ai::AiClient;
use crate::cache::{ObjectCache, register::get_object_cache_plugin};
use crate::config::AppConfig;
use crate::generation::{GenerationPipeline, TaskManager};
use crate::middlewares::rate_limit::longest_window;
use crate::middlewares::{MemoryRateLimitStore, RateLimitStore, build_rate_limit_store};
use crate::quality::QualityValidator;
use crate::storage::Storage;
use crate::vector::{VectorStore, build_vector_store};

const RATE_LIMIT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
    pub ai: Arc<AiClient>,
    pub vector_store: Arc<dyn VectorStore>,
    pub validator: Arc<QualityValidator>,
    pub task_manager: Arc<TaskManager>,
    pub rate_limit_store: Arc<dyn RateLimitStore>,
}

impl StartupContext {
    /// 用已创建的组件组装上下文并启动生成 worker
    pub fn assemble(
        config: &AppConfig,
        storage: Arc<dyn Storage>,
        cache: Arc<dyn ObjectCache>,
        ai: Arc<AiClient>,
        vector_store: Arc<dyn VectorStore>,
        rate_limit_store: Arc<dyn RateLimitStore>,
    ) -> Self {
        let validator = Arc::new(QualityValidator::new(config.quality.clone()));
        let pipeline = Arc::new(GenerationPipeline::new(
            storage.clone(),
            ai.clone(),
            vector_store.clone(),
            cache.clone(),
            (*validator).clone(),
            config.generation.clone(),
        ));
        let task_manager = TaskManager::start(pipeline, storage.clone(), &config.generation);

        Self {
            storage,
            cache,
            ai,
            vector_store,
            validator,
            task_manager,
            rate_limit_store,
        }
    }

    /// 把共享组件注册为 app data
    pub fn configure_app_data(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.storage.clone()))
            .app_data(web::Data::new(self.cache.clone()))
            .app_data(web::Data::new(self.ai.clone()))
            .app_data(web::Data::new(self.vector_store.clone()))
            .app_data(web::Data::new(self.validator.clone()))
            .app_data(web::Data::new(self.task_manager.clone()));
    }
}

/// 创建缓存实例
async fn create_cache() -> Result<Arc<dyn ObjectCache>, Box<dyn std::error::Error>> {
    let config = AppConfig::get();
    let cache_type = &config.cache.cache_type;

    warn!("Attempting to create {} cache backend", cache_type);

    if let Some(constructor) = get_object_cache_plugin(cache_type) {
        match constructor().await {
            Ok(cache) => {
                warn!("Successfully created {} cache backend", cache_type);
                return Ok(Arc::from(cache));
            }
            Err(e) => warn!("Failed to create {} cache: {}", cache_type, e),
        }
    } else {
        warn!("Cache backend '{}' not found in registry", cache_type);
    }

    // 配置的缓存不可用时回退到内存缓存
    if cache_type != "moka" {
        warn!("Falling back to memory cache");
        if let Some(fallback_constructor) = get_object_cache_plugin("moka") {
            match fallback_constructor().await {
                Ok(cache) => {
                    warn!("Successfully created fallback Moka (in-memory) cache backend");
                    return Ok(Arc::from(cache));
                }
                Err(fallback_e) => warn!("Failed to create fallback Moka cache: {}", fallback_e),
            }
        }
    }

    Err(format!("No cache backend available (tried: {cache_type})").into())
}

/// 上次进程退出时还在排队或执行的任务不会再被处理
async fn recover_interrupted_tasks(storage: &Arc<dyn Storage>) {
    match storage.fail_interrupted_tasks().await {
        Ok(0) => debug!("No interrupted generation tasks found"),
        Ok(count) => warn!("Marked {} interrupted generation task(s) as failed", count),
        Err(e) => warn!("Failed to recover interrupted generation tasks: {}", e),
    }
}

/// 定期清理内存限流计数中的空闲客户端
pub fn spawn_rate_limit_cleanup(memory: Arc<MemoryRateLimitStore>, idle: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(RATE_LIMIT_CLEANUP_INTERVAL);
        interval.tick().await;
        loop {
            interval.tick().await;
            let removed = memory.cleanup(idle);
            if removed > 0 {
                debug!(
                    "Rate limit cleanup removed {} idle keys ({} remaining)",
                    removed,
                    memory.len()
                );
            }
        }
    });
}

/// 准备服务器启动的上下文
/// 包括存储、缓存、AI 客户端、向量库、生成队列和限流计数
pub async fn prepare_server_startup() -> StartupContext {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    if cfg!(debug_assertions) {
        crate::cache::register::debug_object_cache_registry();
        debug!("Debug mode: Cache registry is enabled");
    }

    let config = AppConfig::get();

    let storage = crate::storage::create_storage()
        .await
        .expect("Failed to create storage backend");
    warn!("Storage backend initialized and migrations completed");

    recover_interrupted_tasks(&storage).await;

    let cache = create_cache().await.expect("Failed to create cache");
    warn!("Cache backend initialized");

    let ai = Arc::new(AiClient::from_config(&config.ai));
    let vector_store = build_vector_store(&config.vector, config.ai.request_timeout_secs);
    info!("Vector store backend: {}", vector_store.name());

    let (rate_limit_store, rate_limit_memory) = build_rate_limit_store(
        &config.rate_limit.backend,
        &config.cache.redis.url,
        &config.rate_limit.key_prefix,
    );
    if config.rate_limit.enabled {
        spawn_rate_limit_cleanup(rate_limit_memory, longest_window(&config.rate_limit));
        info!("Rate limiting enabled ({} backend)", rate_limit_store.name());
    } else {
        warn!("Rate limiting is disabled");
    }

    StartupContext::assemble(config, storage, cache, ai, vector_store, rate_limit_store)
}
