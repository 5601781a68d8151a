//! 헬스 체크 endpoint.
//!
//! liveness는 프로세스 응답 여부만, readiness는 Redis/PostgreSQL 상태와
//! 프리로더 완료 마커를 확인합니다. `preload.require_gate`가 켜져 있으면
//! 프리로드 검증을 통과하기 전까지 readiness가 503을 반환합니다.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use spartan_data::PreloadStatus;
use std::future::Future;
use std::sync::Arc;

use crate::state::AppState;

/// 서비스 전체 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceHealth {
    Healthy,
    /// 캐시/저장소 장애, 제공자 직접 조회로 응답 가능
    Degraded,
    /// 프리로드 게이트 미통과
    Unhealthy,
}

/// 컴포넌트 상태 값.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentState {
    Up,
    Down,
    /// 아직 결과 없음 (프리로드 마커 부재)
    Pending,
    NotConfigured,
}

/// 컴포넌트 상태와 부가 메시지.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentStatus {
    pub status: ComponentState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ComponentStatus {
    fn new(status: ComponentState, message: Option<String>) -> Self {
        Self { status, message }
    }

    pub fn is_up(&self) -> bool {
        self.status == ComponentState::Up
    }

    pub fn is_down(&self) -> bool {
        self.status == ComponentState::Down
    }
}

/// readiness 컴포넌트 목록.
#[derive(Debug, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub database: ComponentStatus,
    pub redis: ComponentStatus,
    pub preload: ComponentStatus,
}

/// `/health/ready` 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: ServiceHealth,
    pub version: String,
    pub uptime_secs: i64,
    /// RFC 3339
    pub timestamp: String,
    pub components: ComponentHealth,
}

/// 연결 계층 하나를 점검합니다. 미설정이면 probe를 호출하지 않습니다.
async fn probe<F>(configured: bool, healthy: F) -> ComponentStatus
where
    F: Future<Output = bool>,
{
    if !configured {
        return ComponentStatus::new(ComponentState::NotConfigured, None);
    }
    if healthy.await {
        ComponentStatus::new(ComponentState::Up, None)
    } else {
        ComponentStatus::new(ComponentState::Down, Some("연결 실패".to_string()))
    }
}

/// 프리로드 마커를 컴포넌트 상태로 변환.
fn preload_component(marker: Option<&PreloadStatus>) -> ComponentStatus {
    let Some(marker) = marker else {
        return ComponentStatus::new(
            ComponentState::Pending,
            Some("no preload marker".to_string()),
        );
    };

    let summary = format!(
        "{}/{} items present ({:.1}%) at {}",
        marker.present,
        marker.expected,
        marker.success_pct,
        marker.completed_at.to_rfc3339()
    );
    let state = if marker.passed {
        ComponentState::Up
    } else {
        ComponentState::Down
    };
    ComponentStatus::new(state, Some(summary))
}

/// 컴포넌트 상태로 전체 상태와 HTTP 코드를 정합니다.
fn overall(components: &ComponentHealth, gate_required: bool) -> (ServiceHealth, StatusCode) {
    if gate_required && !components.preload.is_up() {
        (ServiceHealth::Unhealthy, StatusCode::SERVICE_UNAVAILABLE)
    } else if components.database.is_down() || components.redis.is_down() {
        (ServiceHealth::Degraded, StatusCode::OK)
    } else {
        (ServiceHealth::Healthy, StatusCode::OK)
    }
}

/// GET /health (liveness)
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /health/ready (readiness)
pub async fn health_ready(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let (database, redis, marker) = futures::join!(
        probe(state.has_database(), state.is_db_healthy()),
        probe(state.has_cache(), state.is_redis_healthy()),
        state.preload_status(),
    );

    let components = ComponentHealth {
        database,
        redis,
        preload: preload_component(marker.as_ref()),
    };
    let (status, code) = overall(&components, state.requires_preload_gate());

    if status != ServiceHealth::Healthy {
        tracing::warn!(status = ?status, components = ?components, "readiness 비정상");
    }

    let response = HealthResponse {
        status,
        version: state.version.clone(),
        uptime_secs: state.uptime_secs(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        components,
    };

    (code, Json(response))
}

/// 헬스 체크 라우터 생성.
pub fn health_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(health_check))
        .route("/ready", get(health_ready))
}
