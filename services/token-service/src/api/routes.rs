//! API 路由

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, Router, routing::get};
use labzang_bootstrap::Infrastructure;
use labzang_telemetry::HealthStatus;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::sync::Arc;

pub const SERVICE_NAME: &str = "Labzang API";

/// 路由共享状态
pub struct AppState {
    pub infra: Infrastructure,
    pub metrics: PrometheusHandle,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ready", get(readiness_check))
        .route("/metrics", get(render_metrics))
        .with_state(state)
        .merge(info_routes())
}

/// 不依赖存储的路由
pub fn info_routes() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
}

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub service: String,
    pub version: String,
    pub status: String,
    pub docs: String,
    pub health: String,
}

async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "running".to_string(),
        docs: "/docs".to_string(),
        health: "/health".to_string(),
    })
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn readiness_check(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthStatus>) {
    let mut status = HealthStatus::new();

    let pool = state.infra.postgres_pool();
    status.record(
        "postgres",
        labzang_adapter_postgres::check_connection(&pool).await,
    );

    let mut conn = state.infra.redis_connection_manager();
    status.record(
        "redis",
        labzang_adapter_redis::check_connection(&mut conn).await,
    );

    (readiness_code(&status), Json(status))
}

/// 任一存储不可达即 503
fn readiness_code(status: &HealthStatus) -> StatusCode {
    if status.healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

async fn render_metrics(State(state): State<Arc<AppState>>) -> String {
    state.metrics.render()
}
