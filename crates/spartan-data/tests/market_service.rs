//! 캐시/저장소 없이 동작하는 시장 데이터 서비스 테스트.

mod common;

use std::sync::Arc;

use common::{stock, StubProvider, StubSeriesSource};
use rust_decimal_macros::dec;
use spartan_core::{CacheConfig, ProviderId, ProviderPriority, QuoteOrigin, RecessionRisk, SeriesId};
use spartan_data::{FallbackFetcher, MarketDataService, QuoteProvider, RateLimiter};

fn service(providers: Vec<Arc<dyn QuoteProvider>>) -> MarketDataService {
    let fetcher = FallbackFetcher::new(
        providers,
        ProviderPriority::default(),
        Arc::new(RateLimiter::unlimited()),
    );
    MarketDataService::new(Arc::new(fetcher), CacheConfig::default())
}

fn yield_curve() -> StubSeriesSource {
    StubSeriesSource::default()
        .with("DGS10", &[("2024-03-14", 4.29), ("2024-03-15", 4.30)])
        .with("DGS3MO", &[("2024-03-14", 5.46), ("2024-03-15", 5.47)])
        .with("DGS2", &[("2024-03-15", 4.72)])
}

#[tokio::test]
async fn test_quote_from_provider_when_no_cache_layers() {
    let service = service(vec![Arc::new(StubProvider::ok(ProviderId::Yahoo, dec!(500)))]);

    let lookup = service.get_quote(&stock("SPY")).await.unwrap();

    assert_eq!(lookup.origin, QuoteOrigin::Provider);
    assert_eq!(lookup.quote.price, dec!(500));
}

#[tokio::test]
async fn test_quote_none_when_every_source_fails() {
    let service = service(vec![Arc::new(StubProvider::failing(ProviderId::Yahoo))]);

    assert!(service.get_quote(&stock("SPY")).await.is_none());
}

#[tokio::test]
async fn test_batch_reports_missing_symbols() {
    let service = service(vec![
        Arc::new(StubProvider::ok(ProviderId::Yahoo, dec!(10)).only(&[spartan_core::AssetClass::Stock])),
    ]);

    let symbols = vec![stock("AAPL"), stock("MSFT")];
    let batch = service.get_quotes(&symbols).await;
    assert_eq!(batch.quotes.len(), 2);
    assert!(batch.missing.is_empty());

    let failing = self::service(vec![Arc::new(StubProvider::failing(ProviderId::Yahoo))]);
    let batch = failing.get_quotes(&symbols).await;
    assert!(batch.quotes.is_empty());
    assert_eq!(batch.missing, vec!["AAPL".to_string(), "MSFT".to_string()]);
}

#[tokio::test]
async fn test_lookup_serializes_flat_with_origin() {
    let service = service(vec![Arc::new(StubProvider::ok(ProviderId::Yahoo, dec!(1.5)))]);
    let lookup = service.get_quote(&stock("QQQ")).await.unwrap();

    let json = serde_json::to_value(&lookup).unwrap();
    assert_eq!(json["symbol"], "QQQ");
    assert_eq!(json["source"], "yahoo");
    assert_eq!(json["origin"], "provider");
}

#[tokio::test]
async fn test_refresh_quote_returns_report() {
    let service = service(vec![
        Arc::new(StubProvider::failing(ProviderId::Yahoo)),
        Arc::new(StubProvider::ok(ProviderId::Polygon, dec!(20))),
    ]);

    let report = service.refresh_quote(&stock("DIA")).await;
    assert_eq!(report.winner(), Some(ProviderId::Polygon));
    assert_eq!(report.attempts.len(), 2);
}

#[tokio::test]
async fn test_series_none_without_source() {
    let service = service(vec![]);
    let id = SeriesId::parse("DGS10").unwrap();

    assert!(!service.has_series_source());
    assert!(service.get_series(&id, 10).await.is_none());
    assert!(service.refresh_series(&id, 10).await.is_err());
}

#[tokio::test]
async fn test_series_from_source() {
    let source = Arc::new(yield_curve());
    let service = service(vec![]).with_series_source(source.clone());

    let series = service
        .get_series(&SeriesId::parse("dgs10").unwrap(), 1)
        .await
        .unwrap();

    assert_eq!(series.observations.len(), 1);
    assert_eq!(series.latest().unwrap().value, 4.30);
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn test_recession_outlook_from_inverted_curve() {
    let service = service(vec![]).with_series_source(Arc::new(yield_curve()));

    let outlook = service.recession_outlook().await.unwrap();

    assert_eq!(outlook.as_of.to_string(), "2024-03-15");
    assert!((outlook.spread_10y_3m - (-1.17)).abs() < 1e-9);
    assert!(outlook.inverted);
    // Φ(-0.5333 + 0.6330 * 1.17) = Φ(0.20731) ≈ 0.582
    assert!((outlook.probability - 0.582).abs() < 0.005);
    assert_eq!(outlook.risk, RecessionRisk::Elevated);
    assert!(outlook.spread_10y_2y.is_some());
}

#[tokio::test]
async fn test_recession_outlook_none_when_input_missing() {
    let source = StubSeriesSource::default().with("DGS10", &[("2024-03-15", 4.30)]);
    let service = service(vec![]).with_series_source(Arc::new(source));

    assert!(service.recession_outlook().await.is_none());
}

#[tokio::test]
async fn test_latest_indicators_skip_unavailable() {
    let source = yield_curve().with("UNRATE", &[("2024-02-01", 3.9)]);
    let service = service(vec![]).with_series_source(Arc::new(source));

    let indicators = service.latest_indicators().await;
    let ids: Vec<&str> = indicators.iter().map(|i| i.series_id.as_str()).collect();

    assert_eq!(ids, vec!["DGS10", "DGS2", "DGS3MO", "UNRATE"]);
    let unrate = indicators.iter().find(|i| i.series_id.as_str() == "UNRATE").unwrap();
    assert_eq!(unrate.value, 3.9);
    assert!(unrate.title.is_some());
}

#[tokio::test]
async fn test_presence_checks_without_layers() {
    let service = service(vec![Arc::new(StubProvider::ok(ProviderId::Yahoo, dec!(1)))]);

    assert!(!service.has_quote(&stock("AAPL")).await);
    assert!(
        !service
            .has_series(&SeriesId::parse("DGS10").unwrap(), 100)
            .await
    );
}
