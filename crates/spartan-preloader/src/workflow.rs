//! 전체 프리로드 워크플로우와 데몬 루프.

use spartan_core::PreloadConfig;
use spartan_data::{MarketDataService, PreloadStatus};
use tokio_util::sync::CancellationToken;

use crate::error::PreloadError;
use crate::{modules, PreloadStats, PreloadTargets, Result};

/// 시세 → 경제 지표 → 검증 → 마커 순으로 한 번 실행합니다.
///
/// 마커는 검증 결과와 관계없이 기록하며, 기준 미달이면 `ValidationFailed`를 반환합니다.
pub async fn run_all(
    service: &MarketDataService,
    config: &PreloadConfig,
    targets: &PreloadTargets,
) -> Result<PreloadStatus> {
    tracing::info!(
        quotes = targets.quotes.len(),
        series = targets.series.len(),
        invalid_quotes = targets.invalid_quotes.len(),
        invalid_series = targets.invalid_series.len(),
        "=== 전체 프리로드 시작 ==="
    );

    load_targets(service, config, targets).await;

    tracing::info!("Step 3/3: 검증");
    let status =
        modules::validate_preload(service, targets, config.series_limit, config.min_success_pct)
            .await;
    modules::write_marker(service, &status).await;

    if !status.passed {
        return Err(PreloadError::ValidationFailed {
            expected: status.expected,
            present: status.present,
            success_pct: status.success_pct,
            min_pct: config.min_success_pct,
        });
    }

    tracing::info!("=== 전체 프리로드 완료 ===");
    Ok(status)
}

/// 시세와 경제 지표를 차례로 적재하고 단계별 통계를 반환합니다.
///
/// 설정에서 파싱에 실패한 항목은 해당 단계의 건너뜀으로 집계합니다.
pub async fn load_targets(
    service: &MarketDataService,
    config: &PreloadConfig,
    targets: &PreloadTargets,
) -> (PreloadStats, PreloadStats) {
    tracing::info!("Step 1/3: 시세 프리로드");
    let mut quote_stats =
        modules::preload_quotes(service, &targets.quotes, config.request_delay()).await;
    quote_stats.skip_all(targets.invalid_quotes.len());
    quote_stats.log_summary("시세 프리로드");

    tracing::info!("Step 2/3: 경제 지표 프리로드");
    let mut series_stats = modules::preload_series(
        service,
        &targets.series,
        config.series_limit,
        config.request_delay(),
    )
    .await;
    series_stats.skip_all(targets.invalid_series.len());
    series_stats.log_summary("경제 지표 프리로드");

    (quote_stats, series_stats)
}

/// `PreloadConfig::interval` 주기로 `run_all`을 반복합니다.
///
/// 첫 실행은 즉시 시작하며, `shutdown`이 취소되면 현재 실행을 마친 뒤 종료합니다.
/// 주기가 0분으로 설정돼 있어도 1분으로 올려 실행합니다.
pub async fn run_daemon(
    service: &MarketDataService,
    config: &PreloadConfig,
    targets: &PreloadTargets,
    shutdown: CancellationToken,
) -> usize {
    let period = config.interval();
    let minutes = period.as_secs() / 60;
    if minutes != config.interval_minutes {
        tracing::warn!(
            configured = config.interval_minutes,
            effective = minutes,
            "데몬 주기가 허용 범위를 벗어나 조정됨"
        );
    }
    tracing::info!("=== 데몬 모드 시작 (주기: {}분) ===", minutes);

    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut runs = 0;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                tracing::info!("종료 신호 수신, 데몬 종료 중...");
                break;
            }
            _ = interval.tick() => {
                runs += 1;
                match run_all(service, config, targets).await {
                    Ok(status) => {
                        tracing::info!(success_pct = format!("{:.1}%", status.success_pct), "프리로드 통과");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "프리로드 실패");
                    }
                }

                tracing::info!("=== 워크플로우 완료, 다음 실행: {}분 후 ===", minutes);
            }
        }
    }

    runs
}
