//! API 라우트.
//!
//! 모든 REST API 엔드포인트를 정의하고 라우터를 구성합니다.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness, 프리로드 게이트)
//! - `/api/v1/quotes` - 단일/다중 시세, 제공자 시도 기록
//! - `/api/v1/market` - 관심 종목 시장 개요
//! - `/api/v1/economic` - FRED 시계열, 헤드라인 지표, 경기침체 확률
//! - `/api/v1/providers` - 제공자 등록 현황

pub mod economic;
pub mod health;
pub mod market;
pub mod providers;
pub mod quotes;

pub use economic::{economic_router, IndicatorsResponse, SeriesQuery};
pub use health::{
    health_router, ComponentHealth, ComponentState, ComponentStatus, HealthResponse, ServiceHealth,
};
pub use market::{market_router, MarketOverviewResponse};
pub use providers::{providers_router, ProviderInfo, ProvidersResponse};
pub use quotes::{quotes_router, BatchQuery, MAX_BATCH_SYMBOLS};

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// 전체 API 라우터 생성.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        // 헬스 체크 엔드포인트
        .nest("/health", health_router())
        // API v1 엔드포인트
        .nest("/api/v1/quotes", quotes_router())
        .nest("/api/v1/market", market_router())
        .nest("/api/v1/economic", economic_router())
        .nest("/api/v1/providers", providers_router())
}
