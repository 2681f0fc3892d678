//! 速率限制计数后端
//!
//! 滑动窗口：记录每个请求的时间点，统计落在窗口内的数量。
//! 一次检查覆盖同一客户端、同一端点类别的全部窗口，
//! 任一窗口超限则整个请求被拒绝且不计数。

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use redis::aio::MultiplexedConnection;
use tracing::{debug, warn};

use crate::errors::{CourseGenError, Result};

define_string_enum! {
    /// 统计窗口
    RateWindow {
        Second => "second",
        Minute => "minute",
        Hour => "hour",
        Day => "day",
    }
}

impl RateWindow {
    pub fn duration(&self) -> Duration {
        match self {
            RateWindow::Second => Duration::from_secs(1),
            RateWindow::Minute => Duration::from_secs(60),
            RateWindow::Hour => Duration::from_secs(3_600),
            RateWindow::Day => Duration::from_secs(86_400),
        }
    }
}

/// 单个窗口的限制
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowLimit {
    pub window: RateWindow,
    pub limit: u32,
}

/// 一次检查的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateDecision {
    /// 已计数；`counts` 与传入的窗口一一对应（包含本次请求）
    Allowed { counts: Vec<u32> },
    /// 被 `limit` 对应的窗口拒绝
    Rejected {
        limit: WindowLimit,
        retry_after: Duration,
    },
}

#[async_trait]
pub trait RateLimitStore: Send + Sync {
    fn name(&self) -> &'static str;

    /// 检查并记录一次请求；`limits` 需按窗口从小到大排列
    async fn hit(&self, key: &str, limits: &[WindowLimit]) -> Result<RateDecision>;
}

fn retry_after_from_oldest(age: Duration, window: Duration) -> Duration {
    // 至少 1 秒
    window
        .saturating_sub(age)
        .max(Duration::from_secs(1))
}

/// 内存计数（单实例部署）
#[derive(Default)]
pub struct MemoryRateLimitStore {
    entries: DashMap<String, VecDeque<Instant>>,
}

impl MemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn hit_at(&self, key: &str, limits: &[WindowLimit], now: Instant) -> RateDecision {
        let longest = limits
            .iter()
            .map(|l| l.window.duration())
            .max()
            .unwrap_or(Duration::ZERO);

        let mut entry = self.entries.entry(key.to_string()).or_default();
        let log = entry.value_mut();

        // 超出最长窗口的记录已无用
        while let Some(front) = log.front() {
            if now.duration_since(*front) >= longest {
                log.pop_front();
            } else {
                break;
            }
        }

        let mut counts = Vec::with_capacity(limits.len());
        for limit in limits {
            let window = limit.window.duration();
            // 日志按时间递增，找到第一个仍在窗口内的位置
            let start = log.partition_point(|t| now.duration_since(*t) >= window);
            let count = (log.len() - start) as u32;
            if limit.limit > 0 && count >= limit.limit {
                let age = log
                    .get(start)
                    .map(|oldest| now.duration_since(*oldest))
                    .unwrap_or(Duration::ZERO);
                return RateDecision::Rejected {
                    limit: *limit,
                    retry_after: retry_after_from_oldest(age, window),
                };
            }
            counts.push(count + 1);
        }

        log.push_back(now);
        RateDecision::Allowed { counts }
    }

    /// 清理空闲超过 `idle` 的键
    pub fn cleanup(&self, idle: Duration) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, log| {
            log.back()
                .map(|last| now.duration_since(*last) < idle)
                .unwrap_or(false)
        });
        before - self.entries.len()
    }
}

#[async_trait]
impl RateLimitStore for MemoryRateLimitStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn hit(&self, key: &str, limits: &[WindowLimit]) -> Result<RateDecision> {
        Ok(self.hit_at(key, limits, Instant::now()))
    }
}

/// 多窗口滑动计数
///
/// KEYS: 每个窗口一个有序集合
/// ARGV: now_ms, member, 然后每个窗口依次是 window_ms, limit
/// 返回: {allowed, rejected_index, oldest_ms, count_1, ..., count_n}
static SLIDING_WINDOW_SCRIPT: Lazy<redis::Script> = Lazy::new(|| {
    redis::Script::new(
        r#"
local now = tonumber(ARGV[1])
local member = ARGV[2]
local counts = {}
for i = 1, #KEYS do
    local window = tonumber(ARGV[1 + i * 2])
    local limit = tonumber(ARGV[2 + i * 2])
    redis.call('ZREMRANGEBYSCORE', KEYS[i], '-inf', now - window)
    local count = redis.call('ZCARD', KEYS[i])
    if limit > 0 and count >= limit then
        local oldest = redis.call('ZRANGE', KEYS[i], 0, 0, 'WITHSCORES')
        local oldest_ms = now
        if oldest[2] then
            oldest_ms = tonumber(oldest[2])
        end
        return {0, i, oldest_ms}
    end
    counts[i] = count + 1
end
local result = {1, 0, 0}
for i = 1, #KEYS do
    local window = tonumber(ARGV[1 + i * 2])
    redis.call('ZADD', KEYS[i], now, member)
    redis.call('PEXPIRE', KEYS[i], window)
    result[3 + i] = counts[i]
end
return result
"#,
    )
});

/// Redis 计数（多实例共享），出错时退回内存计数
pub struct RedisRateLimitStore {
    client: redis::Client,
    key_prefix: String,
    fallback: Arc<MemoryRateLimitStore>,
}

impl RedisRateLimitStore {
    pub fn new(url: &str, key_prefix: &str, fallback: Arc<MemoryRateLimitStore>) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| CourseGenError::redis(format!("Invalid Redis URL '{url}': {e}")))?;
        Ok(Self {
            client,
            key_prefix: key_prefix.to_string(),
            fallback,
        })
    }

    /// 每个窗口一个有序集合，命名空间只在这里加一次
    fn window_key(&self, key: &str, window: RateWindow) -> String {
        format!("{}{}:{}", self.key_prefix, key, window)
    }

    async fn get_connection(&self) -> std::result::Result<MultiplexedConnection, redis::RedisError> {
        self.client.get_multiplexed_async_connection().await
    }

    async fn hit_redis(&self, key: &str, limits: &[WindowLimit]) -> Result<RateDecision> {
        let mut conn = self.get_connection().await?;
        let now_ms = chrono::Utc::now().timestamp_millis();
        let member = format!("{now_ms}-{}", uuid::Uuid::new_v4().simple());

        let mut invocation = SLIDING_WINDOW_SCRIPT.prepare_invoke();
        for limit in limits {
            invocation.key(self.window_key(key, limit.window));
        }
        invocation.arg(now_ms).arg(&member);
        for limit in limits {
            invocation
                .arg(limit.window.duration().as_millis() as i64)
                .arg(limit.limit);
        }

        let reply: Vec<i64> = invocation.invoke_async(&mut conn).await?;
        parse_script_reply(&reply, limits, now_ms)
    }
}

fn parse_script_reply(reply: &[i64], limits: &[WindowLimit], now_ms: i64) -> Result<RateDecision> {
    let malformed = || CourseGenError::redis(format!("Unexpected rate limit reply: {reply:?}"));
    let allowed = *reply.first().ok_or_else(malformed)?;

    if allowed == 1 {
        let counts = reply
            .iter()
            .skip(3)
            .map(|c| (*c).max(0) as u32)
            .collect::<Vec<_>>();
        if counts.len() != limits.len() {
            return Err(malformed());
        }
        return Ok(RateDecision::Allowed { counts });
    }

    let index = *reply.get(1).ok_or_else(malformed)?;
    let oldest_ms = *reply.get(2).ok_or_else(malformed)?;
    let limit = usize::try_from(index - 1)
        .ok()
        .and_then(|i| limits.get(i))
        .ok_or_else(malformed)?;
    let age = Duration::from_millis((now_ms - oldest_ms).max(0) as u64);

    Ok(RateDecision::Rejected {
        limit: *limit,
        retry_after: retry_after_from_oldest(age, limit.window.duration()),
    })
}

#[async_trait]
impl RateLimitStore for RedisRateLimitStore {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn hit(&self, key: &str, limits: &[WindowLimit]) -> Result<RateDecision> {
        match self.hit_redis(key, limits).await {
            Ok(decision) => Ok(decision),
            Err(e) => {
                warn!("Redis rate limit check failed, using memory store: {}", e);
                self.fallback.hit(key, limits).await
            }
        }
    }
}

/// 按配置构建计数后端，同时返回需要定期清理的内存计数
pub fn build_rate_limit_store(
    backend: &str,
    redis_url: &str,
    key_prefix: &str,
) -> (Arc<dyn RateLimitStore>, Arc<MemoryRateLimitStore>) {
    let memory = Arc::new(MemoryRateLimitStore::new());
    if backend == "redis" {
        match RedisRateLimitStore::new(redis_url, key_prefix, memory.clone()) {
            Ok(store) => {
                debug!("Rate limit backend: redis");
                return (Arc::new(store), memory);
            }
            Err(e) => warn!("{}, falling back to memory rate limit store", e),
        }
    }
    debug!("Rate limit backend: memory");
    (memory.clone(), memory)
}
