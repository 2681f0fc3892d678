//! 健康检查

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use std::sync::Arc;
use tracing::warn;

use super::app_state;
use crate::ai::AiClient;
use crate::models::health::{ComponentHealth, HealthResponse, ReadinessResponse};
use crate::models::{ApiResponse, AppStartTime, ErrorCode};
use crate::storage::Storage;
use crate::vector::VectorStore;

pub struct HealthService;

impl HealthService {
    pub fn new_lazy() -> Self {
        Self
    }

    pub async fn health(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let uptime_seconds = request
            .app_data::<web::Data<AppStartTime>>()
            .map(|start| {
                chrono::Utc::now()
                    .signed_duration_since(start.start_datetime)
                    .num_seconds()
            })
            .unwrap_or_default();

        Ok(HttpResponse::Ok().json(ApiResponse::success(
            HealthResponse {
                status: "ok".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                uptime_seconds,
            },
            "Service is healthy",
        )))
    }

    /// 数据库不可用时返回 503；向量库只作为信息展示
    pub async fn readiness(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        let storage = app_state::<dyn Storage>(request);
        let vector_store = app_state::<dyn VectorStore>(request);
        let ai: Arc<AiClient> = app_state::<AiClient>(request);

        let database = match storage.ping().await {
            Ok(()) => ComponentHealth::up(),
            Err(e) => {
                warn!("Readiness check: database unavailable: {}", e);
                ComponentHealth::down(e.message())
            }
        };
        let vector = match vector_store.health().await {
            Ok(()) => ComponentHealth::up(),
            Err(e) => {
                warn!(
                    "Readiness check: vector store '{}' unavailable: {}",
                    vector_store.name(),
                    e
                );
                ComponentHealth::down(e.message())
            }
        };

        let response = ReadinessResponse {
            ready: database.healthy,
            database,
            vector_store: vector,
            ai_providers: ai.provider_names(),
        };

        if response.ready {
            Ok(HttpResponse::Ok().json(ApiResponse::success(response, "Service is ready")))
        } else {
            Ok(HttpResponse::ServiceUnavailable().json(ApiResponse::error(
                ErrorCode::ServiceUnavailable,
                response,
                "Service is not ready",
            )))
        }
    }

    pub async fn liveness(&self) -> ActixResult<HttpResponse> {
        Ok(HttpResponse::Ok().json(ApiResponse::success_empty("alive")))
    }
}
