//! 프리로드 워크플로우 통합 테스트.
//!
//! Redis/PostgreSQL 없이 stub 제공자로 구성한 서비스를 사용합니다.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal_macros::dec;
use spartan_core::{
    AppConfig, AssetClass, CanonicalSymbol, EconomicSeries, Observation, PreloadConfig,
    ProviderId, Quote, SeriesId,
};
use spartan_data::{
    DataError, FallbackFetcher, MarketDataService, QuoteProvider, RateLimiter, Result,
    SeriesSource,
};
use spartan_preloader::{modules, workflow, PreloadError, PreloadTargets};
use tokio_util::sync::CancellationToken;

/// 주식만 지원하는 제공자.
struct StockOnly;

#[async_trait]
impl QuoteProvider for StockOnly {
    fn id(&self) -> ProviderId {
        ProviderId::Yahoo
    }

    fn supports(&self, asset_class: AssetClass) -> bool {
        asset_class == AssetClass::Stock
    }

    async fn fetch_quote(&self, symbol: &CanonicalSymbol) -> Result<Quote> {
        Ok(Quote::from_prices(
            symbol.key(),
            symbol.asset_class(),
            dec!(101),
            dec!(100),
            dec!(5000),
            ProviderId::Yahoo,
        ))
    }
}

/// 등록된 시계열만 반환하는 소스.
struct KnownSeries(HashMap<&'static str, f64>);

#[async_trait]
impl SeriesSource for KnownSeries {
    async fn fetch_series(&self, series_id: &SeriesId, _limit: usize) -> Result<EconomicSeries> {
        let value = self
            .0
            .get(series_id.as_str())
            .ok_or_else(|| DataError::NoData {
                provider: ProviderId::Fred,
                symbol: series_id.to_string(),
            })?;
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        Ok(EconomicSeries::new(
            series_id.clone(),
            vec![Observation {
                date,
                value: *value,
            }],
        ))
    }
}

fn service(with_series: bool) -> MarketDataService {
    let config = AppConfig::default();
    let providers: Vec<Arc<dyn QuoteProvider>> = vec![Arc::new(StockOnly)];
    let fetcher = FallbackFetcher::new(
        providers,
        config.providers.priority.clone(),
        Arc::new(RateLimiter::unlimited()),
    );
    let service = MarketDataService::new(Arc::new(fetcher), config.cache);
    if with_series {
        service.with_series_source(Arc::new(KnownSeries(HashMap::from([("DGS10", 4.3)]))))
    } else {
        service
    }
}

fn symbols(raw: &[(&str, AssetClass)]) -> Vec<CanonicalSymbol> {
    raw.iter()
        .map(|(s, class)| CanonicalSymbol::parse(s, *class).unwrap())
        .collect()
}

fn series(raw: &[&str]) -> Vec<SeriesId> {
    raw.iter().map(|s| SeriesId::parse(s).unwrap()).collect()
}

fn preload_config() -> PreloadConfig {
    PreloadConfig {
        request_delay_ms: 0,
        ..PreloadConfig::default()
    }
}

#[tokio::test]
async fn test_preload_quotes_counts_failures() {
    let service = service(false);
    let targets = symbols(&[
        ("AAPL", AssetClass::Stock),
        ("MSFT", AssetClass::Stock),
        ("BTC", AssetClass::Crypto),
    ]);

    let stats = modules::preload_quotes(&service, &targets, Duration::ZERO).await;

    assert_eq!(stats.total, 3);
    assert_eq!(stats.success, 2);
    assert_eq!(stats.errors, 1);
    assert_eq!(stats.by_provider.get(&ProviderId::Yahoo), Some(&2));
}

#[tokio::test(start_paused = true)]
async fn test_preload_quotes_waits_between_items() {
    let service = service(false);
    let targets = symbols(&[
        ("AAPL", AssetClass::Stock),
        ("MSFT", AssetClass::Stock),
        ("NVDA", AssetClass::Stock),
    ]);

    let start = tokio::time::Instant::now();
    let stats = modules::preload_quotes(&service, &targets, Duration::from_millis(250)).await;

    assert_eq!(stats.success, 3);
    assert!(start.elapsed() >= Duration::from_millis(500));
}

#[tokio::test]
async fn test_preload_series_without_source_skips() {
    let service = service(false);

    let stats =
        modules::preload_series(&service, &series(&["DGS10", "UNRATE"]), 100, Duration::ZERO)
            .await;

    assert_eq!(stats.total, 2);
    assert_eq!(stats.skipped, 2);
    assert_eq!(stats.success, 0);
}

#[tokio::test]
async fn test_preload_series_with_source() {
    let service = service(true);

    let stats =
        modules::preload_series(&service, &series(&["DGS10", "UNRATE"]), 100, Duration::ZERO)
            .await;

    assert_eq!(stats.success, 1);
    assert_eq!(stats.errors, 1);
}

#[tokio::test]
async fn test_validate_without_storage_fails() {
    let service = service(true);
    let targets = PreloadTargets {
        quotes: symbols(&[("AAPL", AssetClass::Stock)]),
        series: series(&["DGS10"]),
        ..PreloadTargets::default()
    };

    // 저장소가 없으면 조회에 성공해도 존재 확인은 실패
    let status = modules::validate_preload(&service, &targets, 100, 80.0).await;

    assert_eq!(status.expected, 2);
    assert_eq!(status.present, 0);
    assert!(!status.passed);
    assert!(!modules::write_marker(&service, &status).await);
}

#[tokio::test]
async fn test_validate_excludes_series_without_source() {
    let service = service(false);
    let targets = PreloadTargets {
        quotes: Vec::new(),
        series: series(&["DGS10", "UNRATE"]),
        invalid_quotes: vec!["bad ticker".to_string()],
        ..PreloadTargets::default()
    };

    let status = modules::validate_preload(&service, &targets, 100, 80.0).await;

    assert_eq!(status.expected, 0);
    assert_eq!(status.success_pct, 100.0);
    assert!(status.passed);
}

#[tokio::test]
async fn test_run_all_reports_validation_failure() {
    let service = service(true);
    let targets = PreloadTargets {
        quotes: symbols(&[("AAPL", AssetClass::Stock)]),
        series: Vec::new(),
        ..PreloadTargets::default()
    };

    let result = workflow::run_all(&service, &preload_config(), &targets).await;

    match result {
        Err(PreloadError::ValidationFailed {
            expected, present, ..
        }) => {
            assert_eq!(expected, 1);
            assert_eq!(present, 0);
        }
        other => panic!("expected validation failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_run_all_with_empty_targets_passes() {
    let service = service(false);

    let status = workflow::run_all(&service, &preload_config(), &PreloadTargets::default())
        .await
        .unwrap();

    assert!(status.passed);
}

#[tokio::test(start_paused = true)]
async fn test_daemon_stops_on_cancel() {
    let service = service(false);
    let config = preload_config();
    let targets = PreloadTargets::default();
    let shutdown = CancellationToken::new();

    let token = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(60)).await;
        token.cancel();
    });

    // 첫 실행은 즉시, 다음 주기(30분) 전에 취소됨
    let runs = workflow::run_daemon(&service, &config, &targets, shutdown).await;

    assert_eq!(runs, 1);
}

#[tokio::test]
async fn test_invalid_targets_are_charged_to_their_own_stage() {
    let service = service(true);
    let targets = PreloadTargets {
        quotes: symbols(&[("AAPL", AssetClass::Stock)]),
        series: series(&["DGS10"]),
        invalid_quotes: vec!["bad ticker".to_string()],
        invalid_series: vec!["BAD-ID".to_string(), "ALSO BAD".to_string()],
    };

    let (quotes, series) = workflow::load_targets(&service, &preload_config(), &targets).await;

    assert_eq!(quotes.total, 2);
    assert_eq!(quotes.success, 1);
    assert_eq!(quotes.skipped, 1);
    assert_eq!(series.total, 3);
    assert_eq!(series.success, 1);
    assert_eq!(series.skipped, 2);
}

#[tokio::test(start_paused = true)]
async fn test_daemon_with_zero_interval_runs_every_minute() {
    let service = service(false);
    let config = PreloadConfig {
        interval_minutes: 0,
        ..preload_config()
    };
    let targets = PreloadTargets::default();
    let shutdown = CancellationToken::new();

    let token = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(150)).await;
        token.cancel();
    });

    // 0분, 1분, 2분에 실행
    let runs = workflow::run_daemon(&service, &config, &targets, shutdown).await;

    assert_eq!(runs, 3);
}
