//! fallback 시세 조회 통합 테스트.

mod common;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use common::{crypto, forex, stock, StubProvider};
use rust_decimal_macros::dec;
use spartan_core::{AssetClass, ProviderId, ProviderPriority};
use spartan_data::{AttemptOutcome, FallbackFetcher, QuoteProvider, RateLimiter};

fn fetcher(providers: Vec<Arc<dyn QuoteProvider>>) -> FallbackFetcher {
    FallbackFetcher::new(
        providers,
        ProviderPriority::default(),
        Arc::new(RateLimiter::unlimited()),
    )
}

#[tokio::test]
async fn test_first_success_short_circuits() {
    let yahoo = Arc::new(StubProvider::ok(ProviderId::Yahoo, dec!(190.5)));
    let polygon = Arc::new(StubProvider::ok(ProviderId::Polygon, dec!(191)));
    let fetcher = fetcher(vec![yahoo.clone(), polygon.clone()]);

    let quote = fetcher.fetch_quote(&stock("aapl")).await.unwrap();

    assert_eq!(quote.source, ProviderId::Yahoo);
    assert_eq!(quote.price, dec!(190.5));
    assert_eq!(quote.symbol, "AAPL");
    assert_eq!(yahoo.calls(), 1);
    assert_eq!(polygon.calls(), 0);
}

#[tokio::test]
async fn test_falls_back_in_priority_order() {
    let yahoo = Arc::new(StubProvider::failing(ProviderId::Yahoo));
    let polygon = Arc::new(StubProvider::ok(ProviderId::Polygon, dec!(191)));
    let alpha = Arc::new(StubProvider::ok(ProviderId::AlphaVantage, dec!(192)));
    let fetcher = fetcher(vec![yahoo.clone(), polygon.clone(), alpha.clone()]);

    let report = fetcher.fetch_quote_with_report(&stock("MSFT")).await;

    assert_eq!(report.winner(), Some(ProviderId::Polygon));
    assert_eq!(report.attempts.len(), 2);
    assert!(matches!(report.attempts[0].outcome, AttemptOutcome::Failed { .. }));
    assert_eq!(report.attempts[1].outcome, AttemptOutcome::Success);
    assert_eq!(alpha.calls(), 0);
}

#[tokio::test]
async fn test_all_failures_return_none() {
    let fetcher = fetcher(vec![
        Arc::new(StubProvider::failing(ProviderId::Yahoo)),
        Arc::new(StubProvider::failing(ProviderId::Polygon)),
        Arc::new(StubProvider::failing(ProviderId::CoinGecko)),
    ]);

    let report = fetcher.fetch_quote_with_report(&crypto("BTC")).await;

    assert!(report.quote.is_none());
    assert_eq!(report.symbol, "BTC-USD");
    assert_eq!(report.asset_class, AssetClass::Crypto);
    assert_eq!(report.attempts.len(), 3);
    assert!(report
        .attempts
        .iter()
        .all(|a| matches!(a.outcome, AttemptOutcome::Failed { .. })));
}

#[tokio::test]
async fn test_non_positive_price_is_failure() {
    let fetcher = fetcher(vec![
        Arc::new(StubProvider::ok(ProviderId::Yahoo, dec!(0))),
        Arc::new(StubProvider::ok(ProviderId::ExchangeRate, dec!(1.0842))),
    ]);

    let report = fetcher.fetch_quote_with_report(&forex("EUR/USD")).await;

    assert_eq!(report.winner(), Some(ProviderId::ExchangeRate));
    assert!(matches!(report.attempts[0].outcome, AttemptOutcome::Failed { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_unregistered_provider_skipped_without_wait() {
    let limiter = Arc::new(RateLimiter::new(HashMap::from([
        (ProviderId::Polygon, Duration::from_secs(12)),
        (ProviderId::AlphaVantage, Duration::from_secs(12)),
    ])));
    let providers: Vec<Arc<dyn QuoteProvider>> = vec![
        Arc::new(StubProvider::failing(ProviderId::Yahoo)),
        Arc::new(StubProvider::ok(ProviderId::AlphaVantage, dec!(50))),
    ];
    let fetcher = FallbackFetcher::new(providers, ProviderPriority::default(), limiter);

    let started = tokio::time::Instant::now();
    let report = fetcher.fetch_quote_with_report(&stock("IBM")).await;

    assert_eq!(report.winner(), Some(ProviderId::AlphaVantage));
    assert_eq!(report.attempts[1].provider, ProviderId::Polygon);
    assert!(matches!(report.attempts[1].outcome, AttemptOutcome::Skipped { .. }));
    assert_eq!(report.attempts[1].waited_ms, 0);
    // 첫 요청이므로 Alpha Vantage도 대기 없음
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[tokio::test]
async fn test_unsupported_asset_class_skipped() {
    let alpha = Arc::new(StubProvider::ok(ProviderId::AlphaVantage, dec!(1)).only(&[AssetClass::Stock]));
    let priority = ProviderPriority {
        crypto: vec![ProviderId::AlphaVantage, ProviderId::CoinGecko],
        ..Default::default()
    };
    let providers: Vec<Arc<dyn QuoteProvider>> = vec![
        alpha.clone(),
        Arc::new(StubProvider::ok(ProviderId::CoinGecko, dec!(3000))),
    ];
    let fetcher = FallbackFetcher::new(providers, priority, Arc::new(RateLimiter::unlimited()));

    let report = fetcher.fetch_quote_with_report(&crypto("ETH")).await;

    assert_eq!(report.winner(), Some(ProviderId::CoinGecko));
    assert!(matches!(report.attempts[0].outcome, AttemptOutcome::Skipped { .. }));
    assert_eq!(alpha.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_rate_limit_shared_across_symbols() {
    let limiter = Arc::new(RateLimiter::new(HashMap::from([(
        ProviderId::Yahoo,
        Duration::from_millis(500),
    )])));
    let providers: Vec<Arc<dyn QuoteProvider>> =
        vec![Arc::new(StubProvider::ok(ProviderId::Yahoo, dec!(10)))];
    let fetcher = FallbackFetcher::new(providers, ProviderPriority::default(), limiter);

    let first = fetcher.fetch_quote_with_report(&stock("AAPL")).await;
    let second = fetcher.fetch_quote_with_report(&stock("MSFT")).await;

    assert_eq!(first.attempts[0].waited_ms, 0);
    assert_eq!(second.attempts[0].waited_ms, 500);
}

#[tokio::test]
async fn test_priority_override() {
    let priority = ProviderPriority {
        stock: vec![ProviderId::Polygon, ProviderId::Yahoo],
        ..Default::default()
    };
    let providers: Vec<Arc<dyn QuoteProvider>> = vec![
        Arc::new(StubProvider::ok(ProviderId::Yahoo, dec!(1))),
        Arc::new(StubProvider::ok(ProviderId::Polygon, dec!(2))),
    ];
    let fetcher = FallbackFetcher::new(providers, priority, Arc::new(RateLimiter::unlimited()));

    assert_eq!(
        fetcher.priority(AssetClass::Stock),
        vec![ProviderId::Polygon, ProviderId::Yahoo]
    );
    let quote = fetcher.fetch_quote(&stock("SPY")).await.unwrap();
    assert_eq!(quote.source, ProviderId::Polygon);
}

#[test]
fn test_report_serialization_shape() {
    let attempt = spartan_data::ProviderAttempt {
        provider: ProviderId::Polygon,
        outcome: AttemptOutcome::Skipped {
            reason: "not configured".to_string(),
        },
        waited_ms: 0,
        elapsed_ms: 0,
    };

    let json = serde_json::to_value(&attempt).unwrap();
    assert_eq!(json["provider"], "polygon");
    assert_eq!(json["status"], "skipped");
    assert_eq!(json["reason"], "not configured");
}
