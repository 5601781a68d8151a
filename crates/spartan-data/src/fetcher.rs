//! 다중 제공자 fallback 시세 조회.
//!
//! 자산 분류별로 고정된 우선순위에 따라 제공자를 순서대로 시도하고,
//! 양수 가격의 시세를 처음 돌려준 제공자의 결과를 사용합니다.
//! 모든 제공자가 실패하면 `None`을 반환하며 대체값을 만들지 않습니다.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use spartan_core::{AssetClass, CanonicalSymbol, ProviderId, ProviderPriority, ProvidersConfig, Quote};
use tokio::time::Instant;
use tracing::{debug, info, warn, Instrument};

use crate::error::Result;
use crate::provider::{build_quote_providers, QuoteProvider};
use crate::rate_limit::RateLimiter;

/// 제공자 시도 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// 유효한 시세 반환
    Success,
    /// 요청/응답 실패
    Failed { message: String },
    /// 미등록 또는 미지원으로 건너뜀 (대기 없음)
    Skipped { reason: String },
}

impl AttemptOutcome {
    /// 메트릭 라벨.
    pub fn label(&self) -> &'static str {
        match self {
            AttemptOutcome::Success => "success",
            AttemptOutcome::Failed { .. } => "failed",
            AttemptOutcome::Skipped { .. } => "skipped",
        }
    }
}

/// 개별 제공자 시도 기록.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderAttempt {
    pub provider: ProviderId,
    #[serde(flatten)]
    pub outcome: AttemptOutcome,
    /// rate limit 대기 시간 (밀리초)
    pub waited_ms: u64,
    /// 요청 소요 시간 (밀리초, 대기 제외)
    pub elapsed_ms: u64,
}

/// fallback 조회 전체 기록.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchReport {
    pub symbol: String,
    pub asset_class: AssetClass,
    pub quote: Option<Quote>,
    pub attempts: Vec<ProviderAttempt>,
}

impl FetchReport {
    /// 시세를 만든 제공자.
    pub fn winner(&self) -> Option<ProviderId> {
        self.quote.as_ref().map(|q| q.source)
    }
}

/// 우선순위 기반 fallback 시세 조회기.
pub struct FallbackFetcher {
    providers: HashMap<ProviderId, Arc<dyn QuoteProvider>>,
    priority: ProviderPriority,
    limiter: Arc<RateLimiter>,
}

impl FallbackFetcher {
    /// 제공자 목록, 우선순위, rate limiter로 생성합니다.
    pub fn new(
        providers: Vec<Arc<dyn QuoteProvider>>,
        priority: ProviderPriority,
        limiter: Arc<RateLimiter>,
    ) -> Self {
        let providers = providers.into_iter().map(|p| (p.id(), p)).collect();
        Self {
            providers,
            priority,
            limiter,
        }
    }

    /// 설정에서 제공자를 등록하고 생성합니다.
    pub fn from_config(config: &ProvidersConfig, limiter: Arc<RateLimiter>) -> Result<Self> {
        let providers = build_quote_providers(config)?;
        Ok(Self::new(providers, config.priority.clone(), limiter))
    }

    /// 자산 분류의 제공자 우선순위.
    pub fn priority(&self, asset_class: AssetClass) -> Vec<ProviderId> {
        self.priority.for_class(asset_class).to_vec()
    }

    /// 제공자 등록 여부.
    pub fn is_registered(&self, provider: ProviderId) -> bool {
        self.providers.contains_key(&provider)
    }

    /// 공유 rate limiter.
    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// 시세를 조회합니다. 모든 제공자가 실패하면 None.
    pub async fn fetch_quote(&self, symbol: &CanonicalSymbol) -> Option<Quote> {
        self.fetch_quote_with_report(symbol).await.quote
    }

    /// 시도 기록과 함께 시세를 조회합니다.
    pub async fn fetch_quote_with_report(&self, symbol: &CanonicalSymbol) -> FetchReport {
        let asset_class = symbol.asset_class();
        let span = spartan_core::fetch_span!("fallback_fetch", symbol, asset_class);

        async move {
            let mut attempts = Vec::new();

            for provider_id in self.priority.for_class(asset_class) {
                let (attempt, quote) = self.attempt(*provider_id, symbol).await;

                metrics::counter!(
                    "provider_requests_total",
                    "provider" => provider_id.as_str(),
                    "outcome" => attempt.outcome.label()
                )
                .increment(1);
                attempts.push(attempt);

                if let Some(quote) = quote {
                    info!(provider = %provider_id, price = %quote.price, "시세 조회 성공");
                    return FetchReport {
                        symbol: symbol.key(),
                        asset_class,
                        quote: Some(quote),
                        attempts,
                    };
                }
            }

            warn!(attempts = attempts.len(), "모든 제공자 조회 실패");
            FetchReport {
                symbol: symbol.key(),
                asset_class,
                quote: None,
                attempts,
            }
        }
        .instrument(span)
        .await
    }

    async fn attempt(
        &self,
        provider_id: ProviderId,
        symbol: &CanonicalSymbol,
    ) -> (ProviderAttempt, Option<Quote>) {
        let skipped = |reason: &str| ProviderAttempt {
            provider: provider_id,
            outcome: AttemptOutcome::Skipped {
                reason: reason.to_string(),
            },
            waited_ms: 0,
            elapsed_ms: 0,
        };

        let Some(provider) = self.providers.get(&provider_id) else {
            debug!(provider = %provider_id, "미등록 제공자 건너뜀");
            return (skipped("not configured"), None);
        };
        if !provider.supports(symbol.asset_class()) {
            debug!(provider = %provider_id, "미지원 자산 분류 건너뜀");
            return (skipped("asset class not supported"), None);
        }

        let waited = self.limiter.acquire(provider_id).await;
        let started = Instant::now();
        let result = provider.fetch_quote(symbol).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let (outcome, quote) = match result {
            Ok(quote) if quote.is_valid() => (AttemptOutcome::Success, Some(quote)),
            Ok(quote) => (
                AttemptOutcome::Failed {
                    message: format!("가격이 양수가 아님: {}", quote.price),
                },
                None,
            ),
            Err(e) => (
                AttemptOutcome::Failed {
                    message: e.to_string(),
                },
                None,
            ),
        };

        if let AttemptOutcome::Failed { message } = &outcome {
            warn!(provider = %provider_id, elapsed_ms, error = %message, "제공자 조회 실패");
        } else {
            debug!(provider = %provider_id, elapsed_ms, "제공자 조회 성공");
        }

        (
            ProviderAttempt {
                provider: provider_id,
                outcome,
                waited_ms: waited.as_millis() as u64,
                elapsed_ms,
            },
            quote,
        )
    }
}
