use serde::{Deserialize, Serialize};

/// 应用配置结构体
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSettings,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub cors: CorsConfig,
    pub rate_limit: RateLimitConfig,
    pub ai: AiConfig,
    pub vector: VectorConfig,
    pub generation: GenerationConfig,
    pub quality: QualityConfig,
}

/// 应用设置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub system_name: String,
    pub environment: String,
    pub log_level: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            system_name: "Course Generator".to_string(),
            environment: "development".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub unix_socket_path: String,
    pub workers: usize,
    pub max_workers: usize,
    pub timeouts: TimeoutConfig,
    pub limits: LimitConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            unix_socket_path: String::new(),
            workers: 0,
            max_workers: 8,
            timeouts: TimeoutConfig::default(),
            limits: LimitConfig::default(),
        }
    }
}

/// 超时配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub client_request: u64,
    pub client_disconnect: u64,
    pub keep_alive: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            client_request: 30_000,
            client_disconnect: 5_000,
            keep_alive: 75,
        }
    }
}

/// 限制配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitConfig {
    pub max_payload_size: usize,
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            max_payload_size: 2 * 1024 * 1024,
        }
    }
}

/// 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,    // 数据库连接 URL（从 scheme 自动推断类型）
    pub pool_size: u32, // 连接池大小
    pub timeout: u64,   // 连接超时 (秒)
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "coursegen.db".to_string(),
            pool_size: 10,
            timeout: 30,
        }
    }
}

/// 缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    #[serde(rename = "type")]
    pub cache_type: String,
    pub default_ttl: u64,
    pub redis: RedisConfig,
    pub memory: MemoryConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_type: "moka".to_string(),
            default_ttl: 300,
            redis: RedisConfig::default(),
            memory: MemoryConfig::default(),
        }
    }
}

/// Redis 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    pub url: String,
    pub key_prefix: String,
    pub pool_size: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            key_prefix: "coursegen:".to_string(),
            pool_size: 10,
        }
    }
}

/// 内存缓存配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryConfig {
    pub max_capacity: u64,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
        }
    }
}

/// CORS 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub max_age: usize,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            max_age: 3600,
        }
    }
}

/// 速率限制配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub enabled: bool,
    /// 计数后端：memory / redis
    pub backend: String,
    pub key_prefix: String,
    pub generation: WindowLimits,
    pub export: WindowLimits,
    pub write: WindowLimits,
    pub read: WindowLimits,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: "memory".to_string(),
            key_prefix: "ratelimit:".to_string(),
            generation: WindowLimits::new(1, 5, 20, 100),
            export: WindowLimits::new(2, 10, 100, 500),
            write: WindowLimits::new(10, 120, 2_000, 20_000),
            read: WindowLimits::new(20, 300, 5_000, 50_000),
        }
    }
}

/// 每个时间窗口允许的最大请求数，0 表示不限制
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowLimits {
    pub per_second: u32,
    pub per_minute: u32,
    pub per_hour: u32,
    pub per_day: u32,
}

impl WindowLimits {
    pub const fn new(per_second: u32, per_minute: u32, per_hour: u32, per_day: u32) -> Self {
        Self {
            per_second,
            per_minute,
            per_hour,
            per_day,
        }
    }
}

impl Default for WindowLimits {
    fn default() -> Self {
        Self::new(0, 0, 0, 0)
    }
}

/// AI 提供方配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// 主提供方：openai / anthropic
    pub primary: String,
    /// 备用提供方，留空表示不启用
    pub fallback: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    pub openai: OpenAiConfig,
    pub anthropic: AnthropicConfig,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            primary: "openai".to_string(),
            fallback: "anthropic".to_string(),
            temperature: 0.7,
            max_tokens: 4096,
            request_timeout_secs: 120,
            max_retries: 2,
            openai: OpenAiConfig::default(),
            anthropic: AnthropicConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    #[serde(skip_serializing, default)]
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub embedding_model: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnthropicConfig {
    #[serde(skip_serializing, default)]
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub api_version: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.anthropic.com/v1".to_string(),
            model: "claude-3-5-sonnet-latest".to_string(),
            api_version: "2023-06-01".to_string(),
        }
    }
}

/// 向量数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorConfig {
    /// memory / chroma / pinecone
    pub provider: String,
    pub top_k: usize,
    pub chroma: ChromaConfig,
    pub pinecone: PineconeConfig,
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            provider: "memory".to_string(),
            top_k: 5,
            chroma: ChromaConfig::default(),
            pinecone: PineconeConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChromaConfig {
    pub url: String,
    pub collection: String,
}

impl Default for ChromaConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8001".to_string(),
            collection: "course_content".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PineconeConfig {
    #[serde(skip_serializing, default)]
    pub api_key: String,
    /// 索引的数据面地址，例如 https://courses-abc123.svc.us-east1-gcp.pinecone.io
    pub index_host: String,
    pub namespace: String,
}

/// 课程生成配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub workers: usize,
    pub queue_capacity: usize,
    pub max_chapters: usize,
    pub max_regeneration_attempts: u32,
    pub quiz_questions_per_chapter: usize,
    pub flashcards_per_chapter: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            workers: 2,
            queue_capacity: 64,
            max_chapters: 12,
            max_regeneration_attempts: 2,
            quiz_questions_per_chapter: 5,
            flashcards_per_chapter: 8,
        }
    }
}

/// 内容质量评估配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityConfig {
    pub readability_weight: f64,
    pub pedagogy_weight: f64,
    pub bias_weight: f64,
    pub structure_weight: f64,
    pub complexity_weight: f64,
    pub min_bias_score: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            readability_weight: 0.25,
            pedagogy_weight: 0.30,
            bias_weight: 0.20,
            structure_weight: 0.15,
            complexity_weight: 0.10,
            min_bias_score: 0.8,
        }
    }
}
