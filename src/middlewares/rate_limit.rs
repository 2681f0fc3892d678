/*!
 * 速率限制中间件
 *
 * 按 (客户端, 端点类别) 计数，每个类别在秒 / 分 / 时 / 天四个窗口上各有上限。
 *
 * ## 使用方法
 *
 * ```rust,ignore
 * use actix_web::{web, App};
 * use crate::middlewares::RateLimit;
 *
 * App::new()
 *     .wrap(RateLimit::new(store, config.rate_limit.clone()))
 *     .service(web::scope("/api/v1").configure(configure_course_routes))
 * ```
 *
 * ## 限制规则
 *
 * - 客户端标识依次取 `X-API-Key`、`X-Client-ID`、客户端 IP
 * - `/api/v1/health` 开头的路径不限制
 * - 超过限制返回 429 Too Many Requests，被拒绝的请求不计数
 */

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpResponse,
    body::EitherBody,
    dev::{ServiceRequest, ServiceResponse},
    http::{
        Method, StatusCode,
        header::{CONTENT_TYPE, HeaderName, HeaderValue},
    },
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::rate_limit_store::{RateDecision, RateLimitStore, RateWindow, WindowLimit};
use crate::config::{RateLimitConfig, WindowLimits};
use crate::models::{ApiResponse, ErrorCode};

const HEALTH_PREFIX: &str = "/api/v1/health";

const X_RATELIMIT_LIMIT: &str = "x-ratelimit-limit";
const X_RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";
const X_RATELIMIT_WINDOW: &str = "x-ratelimit-window";

define_string_enum! {
    /// 端点类别
    EndpointClass {
        Generation => "generation",
        Export => "export",
        Write => "write",
        Read => "read",
    }
}

impl EndpointClass {
    /// 按方法和路径归类；健康检查返回 None
    pub fn classify(method: &Method, path: &str) -> Option<Self> {
        let path = path.trim_end_matches('/');
        if path.starts_with(HEALTH_PREFIX) {
            return None;
        }

        if *method == Method::POST && is_generation_path(path) {
            return Some(EndpointClass::Generation);
        }

        if path.ends_with("/export") {
            return Some(EndpointClass::Export);
        }

        if matches!(
            *method,
            Method::POST | Method::PUT | Method::PATCH | Method::DELETE
        ) {
            Some(EndpointClass::Write)
        } else {
            Some(EndpointClass::Read)
        }
    }
}

// POST /api/v1/courses 与 POST /api/v1/courses/{id}/generate
fn is_generation_path(path: &str) -> bool {
    let Some(rest) = path.strip_prefix("/api/v1/courses") else {
        return false;
    };
    if rest.is_empty() {
        return true;
    }
    let segments: Vec<&str> = rest.trim_start_matches('/').split('/').collect();
    segments.len() == 2 && segments[1] == "generate"
}

/// 从小到大排列、忽略 0（不限制）的窗口
fn window_limits(limits: &WindowLimits) -> Vec<WindowLimit> {
    [
        (RateWindow::Second, limits.per_second),
        (RateWindow::Minute, limits.per_minute),
        (RateWindow::Hour, limits.per_hour),
        (RateWindow::Day, limits.per_day),
    ]
    .into_iter()
    .filter(|(_, limit)| *limit > 0)
    .map(|(window, limit)| WindowLimit { window, limit })
    .collect()
}

/// 速率限制中间件
#[derive(Clone)]
pub struct RateLimit {
    store: Arc<dyn RateLimitStore>,
    config: Arc<RateLimitConfig>,
}

impl RateLimit {
    pub fn new(store: Arc<dyn RateLimitStore>, config: RateLimitConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}

fn limits_for(config: &RateLimitConfig, class: EndpointClass) -> Vec<WindowLimit> {
    let limits = match class {
        EndpointClass::Generation => &config.generation,
        EndpointClass::Export => &config.export,
        EndpointClass::Write => &config.write,
        EndpointClass::Read => &config.read,
    };
    window_limits(limits)
}

/// 配置中最长的有效窗口，用于内存计数的空闲清理
pub fn longest_window(config: &RateLimitConfig) -> Duration {
    [
        &config.generation,
        &config.export,
        &config.write,
        &config.read,
    ]
    .into_iter()
    .flat_map(window_limits)
    .map(|l| l.window.duration())
    .max()
    .unwrap_or(RateWindow::Minute.duration())
}

/// 客户端标识
fn extract_client_id(req: &ServiceRequest) -> String {
    if let Some(key) = header_str(req, "X-API-Key") {
        return format!("key:{key}");
    }
    if let Some(client) = header_str(req, "X-Client-ID") {
        return format!("client:{client}");
    }
    format!("ip:{}", extract_client_ip(req))
}

fn header_str<'a>(req: &'a ServiceRequest, name: &str) -> Option<&'a str> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// 从请求中提取客户端 IP
///
/// 部署在反向代理后面时，需要代理正确设置 X-Forwarded-For / X-Real-IP。
fn extract_client_ip(req: &ServiceRequest) -> String {
    let connection_ip = req
        .connection_info()
        .realip_remote_addr()
        .map(|s| s.to_string());

    if let Some(ref ip) = connection_ip
        && is_valid_ip(ip)
    {
        return ip.clone();
    }

    // 只取第一个 IP（最接近客户端的）
    if let Some(value) = header_str(req, "X-Forwarded-For")
        && let Some(ip) = value.split(',').next()
    {
        let ip = ip.trim();
        if is_valid_ip(ip) {
            return ip.to_string();
        }
    }

    if let Some(ip) = header_str(req, "X-Real-IP")
        && is_valid_ip(ip)
    {
        return ip.to_string();
    }

    "unknown".to_string()
}

fn is_valid_ip(ip: &str) -> bool {
    use std::net::IpAddr;
    ip.parse::<IpAddr>().is_ok()
}

/// 创建速率限制错误响应
fn create_rate_limit_response(limit: WindowLimit, retry_after: Duration) -> HttpResponse {
    // 向上取整到秒
    let retry_secs = retry_after.as_millis().div_ceil(1000).max(1);
    HttpResponse::build(StatusCode::TOO_MANY_REQUESTS)
        .insert_header((CONTENT_TYPE, "application/json; charset=utf-8"))
        .insert_header(("Retry-After", retry_secs.to_string()))
        .insert_header((X_RATELIMIT_LIMIT, limit.limit.to_string()))
        .insert_header((X_RATELIMIT_REMAINING, "0"))
        .insert_header((X_RATELIMIT_WINDOW, limit.window.as_str()))
        .json(ApiResponse::<()>::error_empty(
            ErrorCode::RateLimitExceeded,
            format!(
                "Rate limit exceeded: {} requests per {}. Retry after {} seconds",
                limit.limit, limit.window, retry_secs
            ),
        ))
}

/// 剩余额度最少的窗口：(上限, 剩余)
fn tightest_window(limits: &[WindowLimit], counts: &[u32]) -> Option<(u32, u32)> {
    limits
        .iter()
        .zip(counts)
        .map(|(l, c)| (l.limit, l.limit.saturating_sub(*c)))
        .min_by_key(|(_, remaining)| *remaining)
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service: Rc::new(service),
            store: self.store.clone(),
            config: self.config.clone(),
        }))
    }
}

pub struct RateLimitMiddleware<S> {
    service: Rc<S>,
    store: Arc<dyn RateLimitStore>,
    config: Arc<RateLimitConfig>,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(
        &self,
        ctx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = self.service.clone();
        let store = self.store.clone();
        let config = self.config.clone();

        Box::pin(async move {
            let class = if config.enabled {
                EndpointClass::classify(req.method(), req.path())
            } else {
                None
            };
            let Some(class) = class else {
                return Ok(srv.call(req).await?.map_into_left_body());
            };

            let limits = limits_for(&config, class);
            if limits.is_empty() {
                return Ok(srv.call(req).await?.map_into_left_body());
            }

            let client = extract_client_id(&req);
            let key = format!("{}:{}", client, class);

            let counts = match store.hit(&key, &limits).await {
                Ok(RateDecision::Allowed { counts }) => counts,
                Ok(RateDecision::Rejected { limit, retry_after }) => {
                    warn!(
                        "Rate limit exceeded for {} ({} per {}, retry after {:?})",
                        key, limit.limit, limit.window, retry_after
                    );
                    return Ok(req.into_response(
                        create_rate_limit_response(limit, retry_after).map_into_right_body(),
                    ));
                }
                Err(e) => {
                    // 计数失败时放行
                    warn!("Rate limit store '{}' failed: {}", store.name(), e);
                    return Ok(srv.call(req).await?.map_into_left_body());
                }
            };
            debug!("Rate limit {} counts: {:?}", key, counts);

            let mut res = srv.call(req).await?.map_into_left_body();
            if let Some((limit, remaining)) = tightest_window(&limits, &counts) {
                let headers = res.headers_mut();
                headers.insert(
                    HeaderName::from_static(X_RATELIMIT_LIMIT),
                    HeaderValue::from(limit),
                );
                headers.insert(
                    HeaderName::from_static(X_RATELIMIT_REMAINING),
                    HeaderValue::from(remaining),
                );
            }
            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_endpoints() {
        let id = "0b7a3c1e-8f61-4f6c-9a55-2a6a1c0f9f10";
        assert_eq!(
            EndpointClass::classify(&Method::POST, "/api/v1/courses"),
            Some(EndpointClass::Generation)
        );
        assert_eq!(
            EndpointClass::classify(&Method::POST, &format!("/api/v1/courses/{id}/generate")),
            Some(EndpointClass::Generation)
        );
        assert_eq!(
            EndpointClass::classify(&Method::GET, &format!("/api/v1/courses/{id}/export")),
            Some(EndpointClass::Export)
        );
        assert_eq!(
            EndpointClass::classify(&Method::POST, &format!("/api/v1/courses/{id}/chapters")),
            Some(EndpointClass::Write)
        );
        assert_eq!(
            EndpointClass::classify(&Method::DELETE, &format!("/api/v1/tasks/{id}")),
            Some(EndpointClass::Write)
        );
        assert_eq!(
            EndpointClass::classify(&Method::GET, "/api/v1/courses"),
            Some(EndpointClass::Read)
        );
        assert_eq!(EndpointClass::classify(&Method::GET, "/api/v1/health/ready"), None);
    }

    #[test]
    fn test_window_limits_skip_unlimited() {
        let limits = window_limits(&WindowLimits::new(0, 5, 0, 100));
        assert_eq!(
            limits,
            vec![
                WindowLimit {
                    window: RateWindow::Minute,
                    limit: 5
                },
                WindowLimit {
                    window: RateWindow::Day,
                    limit: 100
                },
            ]
        );
    }

    #[test]
    fn test_tightest_window() {
        let limits = window_limits(&WindowLimits::new(2, 10, 0, 0));
        assert_eq!(tightest_window(&limits, &[1, 9]), Some((2, 1)));
        assert_eq!(tightest_window(&limits, &[1, 10]), Some((10, 0)));
    }

    #[test]
    fn test_longest_window_defaults() {
        assert_eq!(
            longest_window(&RateLimitConfig::default()),
            Duration::from_secs(86_400)
        );
    }

    #[test]
    fn test_rejection_headers() {
        let response = create_rate_limit_response(
            WindowLimit {
                window: RateWindow::Minute,
                limit: 5,
            },
            Duration::from_millis(1_500),
        );
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get("Retry-After").unwrap(), "2");
        assert_eq!(response.headers().get("X-RateLimit-Window").unwrap(), "minute");
        assert_eq!(response.headers().get("X-RateLimit-Remaining").unwrap(), "0");
    }
}
