//! 프리로드 통계.

use serde::{Deserialize, Serialize};
use spartan_core::ProviderId;
use std::collections::BTreeMap;
use std::time::Duration;

/// 대상 하나의 처리 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    /// 기록 완료. 시세면 응답한 제공자
    Stored(Option<ProviderId>),
    /// 조회 실패 (모든 제공자 실패 포함)
    Failed,
    /// 잘못된 대상 또는 소스 미설정
    Skipped,
}

/// 프리로드 단계 하나의 통계.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreloadStats {
    pub total: usize,
    pub success: usize,
    pub errors: usize,
    pub skipped: usize,
    /// 제공자별 성공 수
    pub by_provider: BTreeMap<ProviderId, usize>,
    #[serde(skip)]
    pub elapsed: Duration,
}

impl PreloadStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// 결과 하나를 집계합니다.
    pub fn record(&mut self, outcome: ItemOutcome) {
        self.total += 1;
        match outcome {
            ItemOutcome::Stored(provider) => {
                self.success += 1;
                if let Some(provider) = provider {
                    *self.by_provider.entry(provider).or_default() += 1;
                }
            }
            ItemOutcome::Failed => self.errors += 1,
            ItemOutcome::Skipped => self.skipped += 1,
        }
    }

    /// `count`개 대상을 한꺼번에 건너뜀으로 집계합니다.
    pub fn skip_all(&mut self, count: usize) {
        self.total += count;
        self.skipped += count;
    }

    /// 성공률 (%). 건너뛴 항목은 분모에서 제외합니다.
    pub fn success_rate(&self) -> f64 {
        let attempted = self.total - self.skipped;
        if attempted == 0 {
            0.0
        } else {
            self.success as f64 / attempted as f64 * 100.0
        }
    }

    /// 요약 로그 출력
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation,
            total = self.total,
            success = self.success,
            errors = self.errors,
            skipped = self.skipped,
            by_provider = ?self.by_provider,
            success_rate = format!("{:.1}%", self.success_rate()),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "프리로드 단계 완료"
        );
    }
}
