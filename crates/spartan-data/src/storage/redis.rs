//! Redis 캐시 구현.
//!
//! 시세와 경제 지표 시계열의 1차 캐시 레이어입니다. 값은 JSON 문자열로
//! 저장하며 모든 키에 TTL을 둡니다.

use crate::error::{DataError, Result};
use chrono::{DateTime, Utc};
use redis::{aio::MultiplexedConnection, AsyncCommands, Client};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use spartan_core::{AssetClass, CanonicalSymbol, EconomicSeries, Quote, RedisSettings, SeriesId};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, instrument};

/// 프리로드 완료 마커 키.
pub const PRELOAD_STATUS_KEY: &str = "preload:status";

/// 프리로드 마커 TTL (24시간).
pub const PRELOAD_STATUS_TTL_SECS: u64 = 24 * 60 * 60;

/// 프리로드 결과 마커.
///
/// 프리로더가 검증 후 기록하고, API 서버 readiness가 읽습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreloadStatus {
    /// 완료 시각
    pub completed_at: DateTime<Utc>,
    /// 기대 항목 수
    pub expected: usize,
    /// 캐시/DB에 존재하는 항목 수
    pub present: usize,
    /// 존재 비율 (%)
    pub success_pct: f64,
    /// 기준 통과 여부
    pub passed: bool,
}

/// Redis 연결 래퍼.
#[derive(Clone)]
pub struct RedisCache {
    connection: Arc<RwLock<MultiplexedConnection>>,
    default_ttl_secs: u64,
}

impl RedisCache {
    /// 새로운 Redis 캐시 연결을 생성합니다.
    pub async fn connect(url: &str, default_ttl_secs: u64) -> Result<Self> {
        info!("Connecting to Redis...");

        let client = Client::open(url).map_err(|e| DataError::CacheError(e.to_string()))?;

        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| DataError::CacheError(e.to_string()))?;

        info!("Redis connection established");

        Ok(Self {
            connection: Arc::new(RwLock::new(connection)),
            default_ttl_secs,
        })
    }

    /// 설정에서 연결합니다. URL이 없으면 None.
    pub async fn from_settings(settings: &RedisSettings) -> Result<Option<Self>> {
        match &settings.url {
            Some(url) => Self::connect(url, settings.default_ttl_secs).await.map(Some),
            None => Ok(None),
        }
    }

    /// Redis 상태를 확인합니다.
    pub async fn health_check(&self) -> Result<bool> {
        let mut conn = self.connection.write().await;
        let result: String = redis::cmd("PING")
            .query_async(&mut *conn)
            .await
            .map_err(|e| DataError::CacheError(e.to_string()))?;

        Ok(result == "PONG")
    }

    // =========================================================================
    // 일반 Cache 작업
    // =========================================================================

    /// 캐시에서 값을 가져옵니다.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let mut conn = self.connection.write().await;
        let value: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| DataError::CacheError(e.to_string()))?;

        match value {
            Some(json) => {
                let parsed = serde_json::from_str(&json)
                    .map_err(|e| DataError::SerializationError(e.to_string()))?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    /// 기본 TTL로 캐시에 값을 설정합니다.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.set_with_ttl(key, value, self.default_ttl_secs).await
    }

    /// 사용자 정의 TTL로 캐시에 값을 설정합니다.
    pub async fn set_with_ttl<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl_secs: u64,
    ) -> Result<()> {
        let json = serde_json::to_string(value)
            .map_err(|e| DataError::SerializationError(e.to_string()))?;

        let mut conn = self.connection.write().await;
        let _: () = conn
            .set_ex(key, json, ttl_secs)
            .await
            .map_err(|e| DataError::CacheError(e.to_string()))?;

        Ok(())
    }

    /// 캐시에서 키를 삭제합니다.
    pub async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection.write().await;
        let deleted: i64 = conn
            .del(key)
            .await
            .map_err(|e| DataError::CacheError(e.to_string()))?;

        Ok(deleted > 0)
    }

    /// 키가 존재하는지 확인합니다.
    pub async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.connection.write().await;
        let exists: bool = conn
            .exists(key)
            .await
            .map_err(|e| DataError::CacheError(e.to_string()))?;

        Ok(exists)
    }

    // =========================================================================
    // Quote Cache
    // =========================================================================

    /// 시세 캐시 키.
    pub fn quote_key(asset_class: AssetClass, symbol: &str) -> String {
        format!("quote:{}:{}", asset_class, symbol.to_uppercase())
    }

    /// 시세를 캐시에 저장합니다.
    #[instrument(skip(self, quote), fields(symbol = %quote.symbol))]
    pub async fn set_quote(&self, quote: &Quote, ttl_secs: u64) -> Result<()> {
        let key = Self::quote_key(quote.asset_class, &quote.symbol);
        self.set_with_ttl(&key, quote, ttl_secs).await
    }

    /// 캐시된 시세를 가져옵니다.
    pub async fn get_quote(&self, symbol: &CanonicalSymbol) -> Result<Option<Quote>> {
        let key = Self::quote_key(symbol.asset_class(), &symbol.key());
        self.get(&key).await
    }

    // =========================================================================
    // Economic Series Cache
    // =========================================================================

    /// 시계열 캐시 키. 관측값 개수별로 따로 저장합니다.
    pub fn series_key(series_id: &SeriesId, limit: usize) -> String {
        format!("series:{}:{}", series_id, limit)
    }

    /// 시계열을 캐시에 저장합니다.
    #[instrument(skip(self, series), fields(series_id = %series.series_id))]
    pub async fn set_series(&self, series: &EconomicSeries, limit: usize, ttl_secs: u64) -> Result<()> {
        let key = Self::series_key(&series.series_id, limit);
        self.set_with_ttl(&key, series, ttl_secs).await
    }

    /// 캐시된 시계열을 가져옵니다.
    pub async fn get_series(&self, series_id: &SeriesId, limit: usize) -> Result<Option<EconomicSeries>> {
        self.get(&Self::series_key(series_id, limit)).await
    }

    // =========================================================================
    // Preload Marker
    // =========================================================================

    /// 프리로드 마커를 기록합니다.
    pub async fn set_preload_status(&self, status: &PreloadStatus) -> Result<()> {
        self.set_with_ttl(PRELOAD_STATUS_KEY, status, PRELOAD_STATUS_TTL_SECS)
            .await
    }

    /// 프리로드 마커를 읽습니다.
    pub async fn get_preload_status(&self) -> Result<Option<PreloadStatus>> {
        self.get(PRELOAD_STATUS_KEY).await
    }
}
