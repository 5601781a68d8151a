//! 경제 지표 프리로드 모듈.

use spartan_core::SeriesId;
use spartan_data::MarketDataService;
use std::time::{Duration, Instant};

use crate::stats::ItemOutcome;
use crate::PreloadStats;

/// FRED 시계열을 받아 Redis/PostgreSQL에 기록합니다.
///
/// 시계열 소스가 없으면 모든 대상을 건너뜁니다.
pub async fn preload_series(
    service: &MarketDataService,
    series: &[SeriesId],
    limit: usize,
    delay: Duration,
) -> PreloadStats {
    let start = Instant::now();
    let mut stats = PreloadStats::new();

    if !service.has_series_source() {
        tracing::warn!("FRED API 키 미설정: 경제 지표 프리로드 건너뜀");
        stats.skip_all(series.len());
        return stats;
    }

    tracing::info!(count = series.len(), limit, "경제 지표 프리로드 시작");

    for (idx, series_id) in series.iter().enumerate() {
        if idx > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match service.refresh_series(series_id, limit).await {
            Ok(series) => {
                stats.record(ItemOutcome::Stored(None));
                tracing::info!(
                    series_id = %series_id,
                    observations = series.observations.len(),
                    "시계열 저장 완료"
                );
            }
            Err(e) => {
                stats.record(ItemOutcome::Failed);
                tracing::error!(series_id = %series_id, error = %e, "시계열 조회 실패");
            }
        }
    }

    stats.elapsed = start.elapsed();
    stats
}
