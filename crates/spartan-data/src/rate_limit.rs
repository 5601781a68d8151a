//! 제공자별 최소 간격 rate limiter.
//!
//! 키는 제공자 이름뿐입니다. 심볼이나 호출자가 달라도 같은 제공자에 대한
//! 요청은 하나의 슬롯을 공유하며, 동시에 들어온 요청은 간격만큼 줄을 섭니다.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use spartan_core::ProviderId;
use tokio::time::Instant;
use tracing::debug;

/// 제공자별 최소 요청 간격을 강제하는 limiter.
#[derive(Debug)]
pub struct RateLimiter {
    intervals: HashMap<ProviderId, Duration>,
    /// 제공자별 다음 요청 가능 시각
    next_slot: Mutex<HashMap<ProviderId, Instant>>,
}

impl RateLimiter {
    /// 제공자별 간격으로 생성합니다. 맵에 없는 제공자는 제한이 없습니다.
    pub fn new(intervals: HashMap<ProviderId, Duration>) -> Self {
        Self {
            intervals,
            next_slot: Mutex::new(HashMap::new()),
        }
    }

    /// 제한 없는 limiter (테스트용).
    pub fn unlimited() -> Self {
        Self::new(HashMap::new())
    }

    /// 제공자의 최소 간격.
    pub fn interval(&self, provider: ProviderId) -> Duration {
        self.intervals.get(&provider).copied().unwrap_or_default()
    }

    /// 제공자의 다음 슬롯을 예약하고 그 시각까지 대기합니다.
    ///
    /// 실제로 대기한 시간을 반환합니다.
    pub async fn acquire(&self, provider: ProviderId) -> Duration {
        let interval = self.interval(provider);
        if interval.is_zero() {
            return Duration::ZERO;
        }

        let now = Instant::now();
        let start = {
            let mut slots = self
                .next_slot
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            let start = slots.get(&provider).copied().map_or(now, |slot| slot.max(now));
            slots.insert(provider, start + interval);
            start
        };

        let wait = start.saturating_duration_since(now);
        if !wait.is_zero() {
            debug!(provider = %provider, wait_ms = wait.as_millis() as u64, "rate limit 대기");
            tokio::time::sleep_until(start).await;
        }
        wait
    }
}
