pub mod rate_limit;
pub mod rate_limit_store;
pub mod request_log;
pub mod security_headers;

pub use rate_limit::RateLimit;
pub use rate_limit_store::{
    MemoryRateLimitStore, RateLimitStore, RedisRateLimitStore, build_rate_limit_store,
};
pub use request_log::{RequestId, RequestLog};
pub use security_headers::security_headers;
