//! 请求日志中间件
//!
//! 读取或生成 `X-Request-ID`，记录方法、路径、状态码和耗时，并在响应头中回传请求 ID。

use actix_service::{Service, Transform};
use actix_web::{
    Error, HttpMessage,
    dev::{ServiceRequest, ServiceResponse},
    http::header::{HeaderName, HeaderValue},
};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use std::rc::Rc;
use std::time::Instant;
use tracing::{info, warn};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// 当前请求的 ID，存放在请求扩展中
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

// 客户端传入的 ID 只接受可打印 ASCII，且不超过 128 个字符
fn sanitize_request_id(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty()
        || value.len() > 128
        || !value.chars().all(|c| c.is_ascii_graphic())
    {
        return None;
    }
    Some(value.to_string())
}

#[derive(Clone, Default)]
pub struct RequestLog;

impl RequestLog {
    pub fn new() -> Self {
        Self
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestLog
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestLogMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLogMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct RequestLogMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for RequestLogMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
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

        Box::pin(async move {
            let started = Instant::now();
            let request_id = req
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|v| v.to_str().ok())
                .and_then(sanitize_request_id)
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            let method = req.method().to_string();
            let path = req.path().to_string();

            req.extensions_mut().insert(RequestId(request_id.clone()));

            let mut res = srv.call(req).await?;

            let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
            let status = res.status();
            if status.is_client_error() || status.is_server_error() {
                warn!(
                    request_id = %request_id,
                    "{} {} -> {} ({:.2} ms)",
                    method,
                    path,
                    status.as_u16(),
                    elapsed_ms
                );
            } else {
                info!(
                    request_id = %request_id,
                    "{} {} -> {} ({:.2} ms)",
                    method,
                    path,
                    status.as_u16(),
                    elapsed_ms
                );
            }

            if let Ok(value) = HeaderValue::from_str(&request_id) {
                res.headers_mut()
                    .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
            }
            Ok(res)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::{TestRequest, call_service, init_service};
    use actix_web::{App, HttpResponse, web};

    #[test]
    fn test_sanitize_request_id() {
        assert_eq!(sanitize_request_id(" abc-123 "), Some("abc-123".to_string()));
        assert_eq!(sanitize_request_id(""), None);
        assert_eq!(sanitize_request_id("has space"), None);
        assert_eq!(sanitize_request_id(&"x".repeat(200)), None);
    }

    #[actix_web::test]
    async fn test_request_id_is_echoed_or_generated() {
        let app = init_service(
            App::new()
                .wrap(RequestLog::new())
                .route("/ping", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let req = TestRequest::get()
            .uri("/ping")
            .insert_header(("X-Request-ID", "trace-42"))
            .to_request();
        let res = call_service(&app, req).await;
        assert_eq!(res.headers().get("x-request-id").unwrap(), "trace-42");

        let req = TestRequest::get().uri("/ping").to_request();
        let res = call_service(&app, req).await;
        let generated = res.headers().get("x-request-id").unwrap().to_str().unwrap();
        assert!(uuid::Uuid::parse_str(generated).is_ok());
    }
}
