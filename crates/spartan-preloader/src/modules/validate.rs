//! 프리로드 결과 검증 및 완료 마커 기록.

use chrono::Utc;
use spartan_data::{MarketDataService, PreloadStatus};

use crate::PreloadTargets;

/// 존재 비율로 통과 여부를 판정합니다.
///
/// 대상이 없으면 100%로 간주합니다.
pub fn evaluate(expected: usize, present: usize, min_success_pct: f64) -> PreloadStatus {
    let success_pct = if expected == 0 {
        100.0
    } else {
        present as f64 / expected as f64 * 100.0
    };

    PreloadStatus {
        completed_at: Utc::now(),
        expected,
        present,
        success_pct,
        passed: success_pct >= min_success_pct,
    }
}

/// 대상이 캐시 또는 저장소에 있는지 세어 검증합니다.
///
/// FRED 소스가 없으면 시계열은 기대 항목에서 제외합니다.
pub async fn validate_preload(
    service: &MarketDataService,
    targets: &PreloadTargets,
    series_limit: usize,
    min_success_pct: f64,
) -> PreloadStatus {
    let mut expected = 0;
    let mut present = 0;
    let mut absent: Vec<String> = Vec::new();

    for symbol in &targets.quotes {
        expected += 1;
        if service.has_quote(symbol).await {
            present += 1;
        } else {
            absent.push(symbol.key());
        }
    }

    if service.has_series_source() {
        for series_id in &targets.series {
            expected += 1;
            if service.has_series(series_id, series_limit).await {
                present += 1;
            } else {
                absent.push(series_id.to_string());
            }
        }
    } else if !targets.series.is_empty() {
        tracing::warn!(
            count = targets.series.len(),
            "FRED 소스 미설정: 시계열은 검증 대상에서 제외"
        );
    }

    let status = evaluate(expected, present, min_success_pct);

    if !absent.is_empty() {
        tracing::warn!(absent = ?absent, "캐시/저장소에 없는 항목");
    }
    tracing::info!(
        expected = status.expected,
        present = status.present,
        success_pct = format!("{:.1}%", status.success_pct),
        min_success_pct = format!("{:.1}%", min_success_pct),
        passed = status.passed,
        "프리로드 검증"
    );

    status
}

/// 완료 마커를 Redis에 기록합니다. Redis가 없거나 실패하면 false.
pub async fn write_marker(service: &MarketDataService, status: &PreloadStatus) -> bool {
    let Some(cache) = service.cache() else {
        tracing::warn!("Redis 미설정: 프리로드 마커를 기록하지 않음");
        return false;
    };

    match cache.set_preload_status(status).await {
        Ok(()) => {
            tracing::info!(passed = status.passed, "프리로드 마커 기록");
            true
        }
        Err(e) => {
            tracing::error!(error = %e, "프리로드 마커 기록 실패");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluate_threshold() {
        let status = evaluate(10, 8, 80.0);
        assert_eq!(status.success_pct, 80.0);
        assert!(status.passed);

        let status = evaluate(10, 7, 80.0);
        assert!(!status.passed);
        assert_eq!(status.present, 7);
        assert_eq!(status.expected, 10);
    }

    #[test]
    fn test_evaluate_empty_targets_pass() {
        let status = evaluate(0, 0, 80.0);
        assert_eq!(status.success_pct, 100.0);
        assert!(status.passed);
    }
}
