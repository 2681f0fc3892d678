#[macro_use]
mod common;

use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::{App, test, web};

use rust_coursegen::config::{RateLimitConfig, WindowLimits};
use rust_coursegen::middlewares::{RateLimit, RequestLog};
use rust_coursegen::routes;

use common::{build_context, course_payload, read_json};

macro_rules! rate_limited_app {
    ($tc:expr, $config:expr) => {
        test::init_service(
            App::new()
                .wrap(RateLimit::new($tc.ctx.rate_limit_store.clone(), $config))
                .wrap(RequestLog::new())
                .configure(|cfg| $tc.ctx.configure_app_data(cfg))
                .app_data(web::Data::new(rust_coursegen::models::AppStartTime {
                    start_datetime: chrono::Utc::now(),
                }))
                .configure(routes::configure_api_routes),
        )
        .await
    };
}

fn header<'a, B>(resp: &'a ServiceResponse<B>, name: &str) -> Option<&'a str> {
    resp.headers().get(name).and_then(|v| v.to_str().ok())
}

fn strict_config() -> RateLimitConfig {
    RateLimitConfig {
        read: WindowLimits::new(0, 2, 0, 0),
        write: WindowLimits::new(0, 0, 0, 0),
        ..RateLimitConfig::default()
    }
}

#[actix_web::test]
async fn test_read_limit_per_client() {
    let tc = build_context(None).await;
    let app = rate_limited_app!(tc, strict_config());

    for expected_remaining in ["1", "0"] {
        let req = test::TestRequest::get()
            .uri("/api/v1/courses")
            .insert_header(("X-API-Key", "alice"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers()
                .get("x-ratelimit-remaining")
                .and_then(|v| v.to_str().ok()),
            Some(expected_remaining)
        );
        assert!(resp.headers().contains_key("x-request-id"));
    }

    let req = test::TestRequest::get()
        .uri("/api/v1/courses")
        .insert_header(("X-API-Key", "alice"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(resp.headers().contains_key("retry-after"));
    let body = read_json(resp).await;
    assert_eq!(
        body["code"],
        rust_coursegen::models::ErrorCode::RateLimitExceeded as i32
    );

    // 其他客户端不受影响
    let req = test::TestRequest::get()
        .uri("/api/v1/courses")
        .insert_header(("X-API-Key", "bob"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    // 写请求没有配置上限
    let req = test::TestRequest::post()
        .uri("/api/v1/quality/validate")
        .insert_header(("X-API-Key", "alice"))
        .set_json(serde_json::json!({"content": "Short text for review."}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    // 健康检查不计数
    for _ in 0..5 {
        let req = test::TestRequest::get()
            .uri("/api/v1/health")
            .insert_header(("X-API-Key", "alice"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }
}

#[actix_web::test]
async fn test_rejection_reports_window_and_limit() {
    let tc = build_context(None).await;
    let config = RateLimitConfig {
        read: WindowLimits::new(0, 1, 0, 0),
        ..RateLimitConfig::default()
    };
    let app = rate_limited_app!(tc, config);

    let req = test::TestRequest::get()
        .uri("/api/v1/courses")
        .insert_header(("X-Client-ID", "carol"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(header(&resp, "x-ratelimit-limit"), Some("1"));
    assert_eq!(header(&resp, "x-ratelimit-remaining"), Some("0"));

    let req = test::TestRequest::get()
        .uri("/api/v1/courses")
        .insert_header(("X-Client-ID", "carol"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(header(&resp, "x-ratelimit-limit"), Some("1"));
    assert_eq!(header(&resp, "x-ratelimit-remaining"), Some("0"));
    assert_eq!(header(&resp, "x-ratelimit-window"), Some("minute"));
    let retry_after: u64 = header(&resp, "retry-after")
        .and_then(|v| v.parse().ok())
        .expect("numeric retry-after");
    assert!((1..=60).contains(&retry_after));
}

#[actix_web::test]
async fn test_generation_budget_is_separate_from_write() {
    let tc = build_context(None).await;
    let config = RateLimitConfig {
        generation: WindowLimits::new(0, 1, 0, 0),
        write: WindowLimits::new(0, 2, 0, 0),
        read: WindowLimits::new(0, 0, 0, 0),
        ..RateLimitConfig::default()
    };
    let app = rate_limited_app!(tc, config);

    let req = test::TestRequest::post()
        .uri("/api/v1/courses")
        .insert_header(("X-API-Key", "dave"))
        .set_json(course_payload(false))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(header(&resp, "x-ratelimit-limit"), Some("1"));

    let req = test::TestRequest::post()
        .uri("/api/v1/courses")
        .insert_header(("X-API-Key", "dave"))
        .set_json(course_payload(false))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(header(&resp, "x-ratelimit-limit"), Some("1"));

    // 生成配额用尽后，普通写请求仍有自己的额度
    for expected_remaining in ["1", "0"] {
        let req = test::TestRequest::post()
            .uri("/api/v1/quality/validate")
            .insert_header(("X-API-Key", "dave"))
            .set_json(serde_json::json!({"content": "Short text for review."}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(header(&resp, "x-ratelimit-limit"), Some("2"));
        assert_eq!(header(&resp, "x-ratelimit-remaining"), Some(expected_remaining));
    }

    let req = test::TestRequest::post()
        .uri("/api/v1/quality/validate")
        .insert_header(("X-API-Key", "dave"))
        .set_json(serde_json::json!({"content": "Short text for review."}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(header(&resp, "x-ratelimit-limit"), Some("2"));

    // 读请求未设上限
    let req = test::TestRequest::get()
        .uri("/api/v1/courses")
        .insert_header(("X-API-Key", "dave"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(header(&resp, "x-ratelimit-limit").is_none());
}

#[actix_web::test]
async fn test_disabled_rate_limit_passes_everything() {
    let tc = build_context(None).await;
    let config = RateLimitConfig {
        enabled: false,
        generation: WindowLimits::new(0, 1, 0, 0),
        read: WindowLimits::new(0, 1, 0, 0),
        ..RateLimitConfig::default()
    };
    let app = rate_limited_app!(tc, config);

    for _ in 0..5 {
        let req = test::TestRequest::get()
            .uri("/api/v1/courses")
            .insert_header(("X-API-Key", "erin"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(header(&resp, "x-ratelimit-remaining").is_none());
    }

    for _ in 0..3 {
        let req = test::TestRequest::post()
            .uri("/api/v1/courses")
            .insert_header(("X-API-Key", "erin"))
            .set_json(course_payload(false))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        assert!(header(&resp, "x-ratelimit-limit").is_none());
    }
}
