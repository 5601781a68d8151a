//! 시장 데이터 수집 및 저장.
//!
//! 이 crate는 다음을 제공합니다:
//! - 외부 시세/경제 지표 제공자 클라이언트
//! - 제공자별 최소 간격 rate limiter
//! - 우선순위 기반 fallback 시세 조회
//! - Redis 캐시 및 PostgreSQL 저장소
//! - cache-or-fetch 체인을 조정하는 시장 데이터 서비스

pub mod error;
pub mod fetcher;
pub mod manager;
pub mod provider;
pub mod rate_limit;
pub mod storage;

pub use error::{DataError, Result};
pub use fetcher::{AttemptOutcome, FallbackFetcher, FetchReport, ProviderAttempt};
pub use manager::{IndicatorSnapshot, MarketDataService, QuoteBatch, QuoteLookup};
pub use rate_limit::RateLimiter;

// 제공자 재내보내기
pub use provider::{
    build_quote_providers, AlphaVantageProvider, CoinGeckoProvider, ExchangeRateProvider,
    FredClient, PolygonProvider, QuoteProvider, SeriesSource, YahooProvider,
};

// 저장소 타입 재내보내기
pub use storage::{
    Database, ObservationRepository, PreloadStatus, QuoteRecord, QuoteRepository, RedisCache,
    PRELOAD_STATUS_KEY,
};
