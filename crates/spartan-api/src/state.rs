//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 Arc로 래핑되어 여러 요청 간에 공유됩니다.

use std::sync::Arc;

use spartan_core::AppConfig;
use spartan_data::{MarketDataService, PreloadStatus};
use tracing::warn;

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 캐시 → 저장소 → 제공자 체인을 조정하는 시장 데이터 서비스
    pub market: Arc<MarketDataService>,

    /// 로드된 애플리케이션 설정
    pub config: Arc<AppConfig>,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 새로운 AppState 생성.
    pub fn new(market: MarketDataService, config: AppConfig) -> Self {
        Self {
            market: Arc::new(market),
            config: Arc::new(config),
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 서버 업타임 (초).
    pub fn uptime_secs(&self) -> i64 {
        (chrono::Utc::now() - self.started_at).num_seconds()
    }

    /// PostgreSQL 계층이 구성되어 있는지 확인.
    pub fn has_database(&self) -> bool {
        self.market.database().is_some()
    }

    /// Redis 계층이 구성되어 있는지 확인.
    pub fn has_cache(&self) -> bool {
        self.market.cache().is_some()
    }

    /// DB 연결 상태 확인.
    pub async fn is_db_healthy(&self) -> bool {
        match self.market.database() {
            Some(db) => db.health_check().await.unwrap_or(false),
            None => false,
        }
    }

    /// Redis 연결 상태 확인.
    pub async fn is_redis_healthy(&self) -> bool {
        match self.market.cache() {
            Some(cache) => cache.health_check().await.unwrap_or(false),
            None => false,
        }
    }

    /// 프리로더가 남긴 완료 마커.
    ///
    /// Redis가 없거나 읽기에 실패하면 None.
    pub async fn preload_status(&self) -> Option<PreloadStatus> {
        let cache = self.market.cache()?;
        match cache.get_preload_status().await {
            Ok(status) => status,
            Err(e) => {
                warn!(error = %e, "프리로드 마커 조회 실패");
                None
            }
        }
    }

    /// readiness가 프리로드 통과를 요구하는지 여부.
    pub fn requires_preload_gate(&self) -> bool {
        self.config.preload.require_gate
    }
}

/// 테스트용 AppState 생성.
///
/// 제공자, Redis, DB가 모두 없는 상태입니다.
#[cfg(test)]
pub fn create_test_state() -> AppState {
    use spartan_data::{FallbackFetcher, RateLimiter};

    let config = AppConfig::default();
    let fetcher = FallbackFetcher::new(
        Vec::new(),
        config.providers.priority.clone(),
        Arc::new(RateLimiter::unlimited()),
    );
    let market = MarketDataService::new(Arc::new(fetcher), config.cache.clone());

    AppState::new(market, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_state_without_layers() {
        let state = create_test_state();

        assert!(!state.has_database());
        assert!(!state.has_cache());
        assert!(!state.is_db_healthy().await);
        assert!(!state.is_redis_healthy().await);
        assert!(state.preload_status().await.is_none());
        assert!(!state.requires_preload_gate());
        assert!(state.uptime_secs() >= 0);
        assert!(!state.version.is_empty());
    }
}
