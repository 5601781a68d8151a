//! 시장 데이터 서비스.
//!
//! Redis → PostgreSQL → 외부 제공자 순서로 조회하는 cache-or-fetch 체인을
//! 조정합니다. 캐시/저장소 오류는 로그만 남기고 miss로 취급하므로
//! 두 계층이 모두 없거나 장애여도 제공자만으로 동작합니다.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use spartan_core::domain::economic::{DGS10, DGS2, DGS3MO, HEADLINE_SERIES};
use spartan_core::{
    AppConfig, CacheConfig, CanonicalSymbol, EconomicSeries, ProviderId, Quote, QuoteOrigin,
    RecessionOutlook, SeriesId,
};
use tracing::{debug, info, instrument, warn};

use crate::error::{DataError, Result};
use crate::fetcher::{FallbackFetcher, FetchReport};
use crate::provider::{FredClient, SeriesSource};
use crate::rate_limit::RateLimiter;
use crate::storage::{Database, ObservationRepository, QuoteRepository, RedisCache};

/// 시세 조회 결과와 출처 계층.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteLookup {
    #[serde(flatten)]
    pub quote: Quote,
    pub origin: QuoteOrigin,
}

/// 다중 심볼 조회 결과.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuoteBatch {
    pub quotes: Vec<QuoteLookup>,
    /// 어떤 계층에서도 찾지 못한 심볼
    pub missing: Vec<String>,
}

/// 헤드라인 지표의 최신값.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub series_id: SeriesId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub date: NaiveDate,
    pub value: f64,
}

/// Redis, PostgreSQL, 외부 제공자를 조정하는 시장 데이터 서비스.
pub struct MarketDataService {
    fetcher: Arc<FallbackFetcher>,
    series_source: Option<Arc<dyn SeriesSource>>,
    cache: Option<RedisCache>,
    db: Option<Database>,
    quotes: Option<QuoteRepository>,
    observations: Option<ObservationRepository>,
    cache_config: CacheConfig,
    /// 지표/경기침체 계산에 사용하는 관측값 수
    series_limit: usize,
}

impl MarketDataService {
    /// 캐시/저장소 없이 fetcher만으로 생성합니다.
    pub fn new(fetcher: Arc<FallbackFetcher>, cache_config: CacheConfig) -> Self {
        Self {
            fetcher,
            series_source: None,
            cache: None,
            db: None,
            quotes: None,
            observations: None,
            cache_config,
            series_limit: 100,
        }
    }

    /// 경제 지표 소스를 설정합니다.
    pub fn with_series_source(mut self, source: Arc<dyn SeriesSource>) -> Self {
        self.series_source = Some(source);
        self
    }

    /// Redis 캐시를 설정합니다.
    pub fn with_cache(mut self, cache: RedisCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// PostgreSQL 저장소를 설정합니다.
    pub fn with_database(mut self, db: Database) -> Self {
        self.quotes = Some(QuoteRepository::new(db.clone()));
        self.observations = Some(ObservationRepository::new(db.clone()));
        self.db = Some(db);
        self
    }

    /// 지표 계산용 관측값 수를 설정합니다.
    pub fn with_series_limit(mut self, limit: usize) -> Self {
        self.series_limit = limit.max(1);
        self
    }

    /// 설정에서 모든 계층을 구성합니다.
    ///
    /// Redis/DB 연결 실패는 경고 후 해당 계층 없이 계속합니다.
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        info!("Initializing MarketDataService...");

        let limiter = Arc::new(RateLimiter::new(config.providers.min_interval_ms.to_map()));
        let fetcher = Arc::new(FallbackFetcher::from_config(&config.providers, limiter)?);

        let mut service = Self::new(fetcher, config.cache.clone())
            .with_series_limit(config.preload.series_limit);

        match FredClient::from_config(&config.providers)? {
            Some(fred) => service = service.with_series_source(Arc::new(fred)),
            None => warn!("FRED API 키 미설정: 경제 지표 조회 비활성화"),
        }

        match RedisCache::from_settings(&config.redis).await {
            Ok(Some(cache)) => service = service.with_cache(cache),
            Ok(None) => info!("Redis URL 미설정: 캐시 계층 없이 실행"),
            Err(e) => warn!(error = %e, "Redis 연결 실패, 캐시 계층 없이 계속"),
        }

        match Database::from_settings(&config.database).await {
            Ok(Some(db)) => service = service.with_database(db),
            Ok(None) => info!("DATABASE URL 미설정: 저장소 계층 없이 실행"),
            Err(e) => warn!(error = %e, "데이터베이스 연결 실패, 저장소 계층 없이 계속"),
        }

        info!("MarketDataService initialized successfully");
        Ok(service)
    }

    pub fn fetcher(&self) -> &Arc<FallbackFetcher> {
        &self.fetcher
    }

    pub fn cache(&self) -> Option<&RedisCache> {
        self.cache.as_ref()
    }

    pub fn database(&self) -> Option<&Database> {
        self.db.as_ref()
    }

    /// 경제 지표 소스 설정 여부.
    pub fn has_series_source(&self) -> bool {
        self.series_source.is_some()
    }

    // =========================================================================
    // 시세
    // =========================================================================

    /// 캐시 → 저장소 → 제공자 순으로 시세를 조회합니다.
    ///
    /// 어느 계층에서도 찾지 못하면 None.
    #[instrument(skip(self), fields(symbol = %symbol))]
    pub async fn get_quote(&self, symbol: &CanonicalSymbol) -> Option<QuoteLookup> {
        if let Some(cache) = &self.cache {
            match cache.get_quote(symbol).await {
                Ok(Some(quote)) => return Some(record_lookup(quote, QuoteOrigin::Cache)),
                Ok(None) => debug!("캐시 miss"),
                Err(e) => warn!(error = %e, "캐시 조회 실패, miss로 처리"),
            }
        }

        if let Some(repo) = &self.quotes {
            match repo.find_fresh(symbol, self.cache_config.quote_max_age_secs).await {
                Ok(Some(quote)) => {
                    self.cache_quote(&quote).await;
                    return Some(record_lookup(quote, QuoteOrigin::Database));
                }
                Ok(None) => debug!("저장소 miss"),
                Err(e) => warn!(error = %e, "저장소 조회 실패, miss로 처리"),
            }
        }

        match self.fetcher.fetch_quote(symbol).await {
            Some(quote) => {
                self.store_quote(&quote).await;
                Some(record_lookup(quote, QuoteOrigin::Provider))
            }
            None => {
                metrics::counter!("quote_lookups_total", "origin" => "none").increment(1);
                None
            }
        }
    }

    /// 여러 심볼을 순차 조회합니다.
    pub async fn get_quotes(&self, symbols: &[CanonicalSymbol]) -> QuoteBatch {
        let mut batch = QuoteBatch::default();
        for symbol in symbols {
            match self.get_quote(symbol).await {
                Some(lookup) => batch.quotes.push(lookup),
                None => batch.missing.push(symbol.key()),
            }
        }
        batch
    }

    /// 캐시를 건너뛰고 제공자에서 새로 조회한 뒤 캐시/저장소에 기록합니다.
    pub async fn refresh_quote(&self, symbol: &CanonicalSymbol) -> FetchReport {
        let report = self.fetcher.fetch_quote_with_report(symbol).await;
        if let Some(quote) = &report.quote {
            self.store_quote(quote).await;
        }
        report
    }

    /// 캐시 또는 저장소에 시세가 있는지 확인합니다 (나이 무관).
    pub async fn has_quote(&self, symbol: &CanonicalSymbol) -> bool {
        if let Some(cache) = &self.cache {
            let key = RedisCache::quote_key(symbol.asset_class(), &symbol.key());
            if matches!(cache.exists(&key).await, Ok(true)) {
                return true;
            }
        }
        if let Some(repo) = &self.quotes {
            if matches!(repo.exists(symbol).await, Ok(true)) {
                return true;
            }
        }
        false
    }

    async fn cache_quote(&self, quote: &Quote) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set_quote(quote, self.cache_config.quote_ttl_secs).await {
                warn!(symbol = %quote.symbol, error = %e, "시세 캐시 기록 실패");
            }
        }
    }

    async fn store_quote(&self, quote: &Quote) {
        self.cache_quote(quote).await;
        if let Some(repo) = &self.quotes {
            if let Err(e) = repo.upsert(quote).await {
                warn!(symbol = %quote.symbol, error = %e, "시세 저장 실패");
            }
        }
    }

    // =========================================================================
    // 경제 지표
    // =========================================================================

    /// 캐시 → 저장소 → FRED 순으로 시계열을 조회합니다.
    #[instrument(skip(self), fields(series_id = %series_id))]
    pub async fn get_series(&self, series_id: &SeriesId, limit: usize) -> Option<EconomicSeries> {
        if let Some(cache) = &self.cache {
            match cache.get_series(series_id, limit).await {
                Ok(Some(series)) => {
                    debug!("시계열 캐시 hit");
                    metrics::counter!("series_lookups_total", "origin" => "cache").increment(1);
                    return Some(series);
                }
                Ok(None) => {}
                Err(e) => warn!(error = %e, "시계열 캐시 조회 실패, miss로 처리"),
            }
        }

        if let Some(repo) = &self.observations {
            match repo
                .find_fresh(series_id, limit, self.cache_config.series_max_age_secs)
                .await
            {
                Ok(Some(series)) => {
                    debug!("시계열 저장소 hit");
                    self.cache_series(&series, limit).await;
                    metrics::counter!("series_lookups_total", "origin" => "database").increment(1);
                    return Some(series);
                }
                Ok(None) => {}
                Err(e) => warn!(error = %e, "시계열 저장소 조회 실패, miss로 처리"),
            }
        }

        match self.refresh_series(series_id, limit).await {
            Ok(series) => {
                metrics::counter!("series_lookups_total", "origin" => "provider").increment(1);
                Some(series)
            }
            Err(e) => {
                warn!(error = %e, "시계열 조회 실패");
                metrics::counter!("series_lookups_total", "origin" => "none").increment(1);
                None
            }
        }
    }

    /// FRED에서 새로 조회한 뒤 캐시/저장소에 기록합니다.
    pub async fn refresh_series(&self, series_id: &SeriesId, limit: usize) -> Result<EconomicSeries> {
        let source = self.series_source.as_ref().ok_or_else(|| {
            DataError::ConfigError("경제 지표 소스(FRED API 키)가 설정되지 않음".to_string())
        })?;

        self.fetcher.limiter().acquire(ProviderId::Fred).await;
        let result = source.fetch_series(series_id, limit).await;

        metrics::counter!(
            "provider_requests_total",
            "provider" => ProviderId::Fred.as_str(),
            "outcome" => if result.is_ok() { "success" } else { "failed" }
        )
        .increment(1);
        let series = result?;

        self.cache_series(&series, limit).await;
        if let Some(repo) = &self.observations {
            if let Err(e) = repo.upsert_series(&series).await {
                warn!(series_id = %series_id, error = %e, "시계열 저장 실패");
            }
        }

        Ok(series)
    }

    /// 캐시 또는 저장소에 시계열이 있는지 확인합니다 (나이 무관).
    pub async fn has_series(&self, series_id: &SeriesId, limit: usize) -> bool {
        if let Some(cache) = &self.cache {
            if matches!(cache.exists(&RedisCache::series_key(series_id, limit)).await, Ok(true)) {
                return true;
            }
        }
        if let Some(repo) = &self.observations {
            if matches!(repo.latest(series_id, 1).await, Ok(Some(_))) {
                return true;
            }
        }
        false
    }

    async fn cache_series(&self, series: &EconomicSeries, limit: usize) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache
                .set_series(series, limit, self.cache_config.series_ttl_secs)
                .await
            {
                warn!(series_id = %series.series_id, error = %e, "시계열 캐시 기록 실패");
            }
        }
    }

    /// 수익률 곡선 기반 경기침체 확률.
    ///
    /// DGS10 또는 DGS3MO를 구할 수 없으면 None.
    pub async fn recession_outlook(&self) -> Option<RecessionOutlook> {
        let ten_year = self.get_series(&known_series(DGS10)?, self.series_limit).await?;
        let three_month = self.get_series(&known_series(DGS3MO)?, self.series_limit).await?;
        let two_year = match known_series(DGS2) {
            Some(id) => self.get_series(&id, self.series_limit).await,
            None => None,
        };

        let outlook = RecessionOutlook::compute(&ten_year, &three_month, two_year.as_ref());
        if let Some(o) = &outlook {
            info!(
                as_of = %o.as_of,
                spread = o.spread_10y_3m,
                probability = o.probability,
                "경기침체 확률 계산"
            );
        }
        outlook
    }

    /// 헤드라인 지표의 최신 관측값. 조회에 실패한 지표는 제외합니다.
    pub async fn latest_indicators(&self) -> Vec<IndicatorSnapshot> {
        let mut snapshots = Vec::with_capacity(HEADLINE_SERIES.len());

        for (id, title) in HEADLINE_SERIES {
            let Some(series_id) = known_series(id) else {
                continue;
            };
            let Some(series) = self.get_series(&series_id, self.series_limit).await else {
                continue;
            };
            if let Some(latest) = series.latest() {
                snapshots.push(IndicatorSnapshot {
                    series_id: series_id.clone(),
                    title: Some(title.to_string()),
                    date: latest.date,
                    value: latest.value,
                });
            }
        }

        snapshots
    }
}

fn record_lookup(quote: Quote, origin: QuoteOrigin) -> QuoteLookup {
    debug!(origin = %origin, "시세 조회 완료");
    metrics::counter!("quote_lookups_total", "origin" => origin.as_str()).increment(1);
    QuoteLookup { quote, origin }
}

fn known_series(id: &str) -> Option<SeriesId> {
    SeriesId::parse(id).ok()
}
