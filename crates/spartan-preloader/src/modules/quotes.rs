//! 시세 프리로드 모듈.

use spartan_core::CanonicalSymbol;
use spartan_data::MarketDataService;
use std::time::{Duration, Instant};

use crate::stats::ItemOutcome;
use crate::PreloadStats;

/// 캐시를 우회해 제공자에서 시세를 받아 Redis/PostgreSQL에 기록합니다.
///
/// 항목 사이에 `delay`만큼 쉬며, 제공자별 최소 간격은 rate limiter가 따로 보장합니다.
pub async fn preload_quotes(
    service: &MarketDataService,
    symbols: &[CanonicalSymbol],
    delay: Duration,
) -> PreloadStats {
    let start = Instant::now();
    let mut stats = PreloadStats::new();

    tracing::info!(count = symbols.len(), "시세 프리로드 시작");

    for (idx, symbol) in symbols.iter().enumerate() {
        if idx > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        tracing::debug!(
            symbol = %symbol,
            progress = format!("{}/{}", idx + 1, symbols.len()),
            "조회 시작"
        );

        let report = service.refresh_quote(symbol).await;
        match report.winner() {
            Some(provider) => {
                stats.record(ItemOutcome::Stored(Some(provider)));
                tracing::info!(symbol = %symbol, provider = %provider, "시세 저장 완료");
            }
            None => {
                stats.record(ItemOutcome::Failed);
                let tried: Vec<&str> = report
                    .attempts
                    .iter()
                    .map(|a| a.provider.as_str())
                    .collect();
                tracing::error!(symbol = %symbol, tried = ?tried, "모든 제공자 실패");
            }
        }
    }

    stats.elapsed = start.elapsed();
    stats
}
