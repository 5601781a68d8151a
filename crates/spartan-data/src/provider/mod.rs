//! 외부 시세/경제 지표 제공자.
//!
//! ## 시세 제공자 ([`QuoteProvider`])
//! - `YahooProvider`: Yahoo Finance (키 불필요, 주식/암호화폐/외환)
//! - `PolygonProvider`: Polygon.io 전일 집계 (키 필요, 주식/암호화폐)
//! - `AlphaVantageProvider`: Alpha Vantage GLOBAL_QUOTE (키 필요, 주식)
//! - `CoinGeckoProvider`: CoinGecko simple price (키 불필요, 암호화폐)
//! - `ExchangeRateProvider`: ExchangeRate-API (키 선택, 외환)
//!
//! ## 경제 지표
//! - `FredClient`: FRED 시계열 관측값 (키 필요)
//!
//! 키가 필요한 제공자는 키가 설정된 경우에만 등록됩니다.

pub mod alpha_vantage;
pub mod coingecko;
pub mod exchange_rate;
pub mod fred;
pub mod polygon;
pub mod yahoo;

pub use alpha_vantage::AlphaVantageProvider;
pub use coingecko::CoinGeckoProvider;
pub use exchange_rate::ExchangeRateProvider;
pub use fred::{FredClient, SeriesSource};
pub use polygon::PolygonProvider;
pub use yahoo::YahooProvider;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use spartan_core::{AssetClass, CanonicalSymbol, ProviderId, ProvidersConfig, Quote};

use crate::error::{DataError, Result};

/// 시세 제공자 trait.
///
/// 구현체는 성공 시 양수 가격의 정규화된 [`Quote`]를 반환하고,
/// 그 외의 모든 경우(HTTP 오류, 빈 응답, 파싱 실패)는 `Err`로 보고합니다.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// 제공자 식별자.
    fn id(&self) -> ProviderId;

    /// 자산 분류 지원 여부.
    fn supports(&self, asset_class: AssetClass) -> bool;

    /// 단일 심볼 시세 조회.
    async fn fetch_quote(&self, symbol: &CanonicalSymbol) -> Result<Quote>;
}

/// 설정에서 시세 제공자 목록을 생성합니다.
///
/// Polygon, Alpha Vantage는 API 키가 있을 때만 포함됩니다.
pub fn build_quote_providers(config: &ProvidersConfig) -> Result<Vec<Arc<dyn QuoteProvider>>> {
    let client = http_client(config.timeout())?;
    let mut providers: Vec<Arc<dyn QuoteProvider>> = Vec::new();

    providers.push(Arc::new(YahooProvider::new(config.timeout())?));

    if let Some(key) = &config.polygon_api_key {
        providers.push(Arc::new(PolygonProvider::new(
            client.clone(),
            &config.urls.polygon,
            key.clone(),
        )));
    }

    if let Some(key) = &config.alpha_vantage_api_key {
        providers.push(Arc::new(AlphaVantageProvider::new(
            client.clone(),
            &config.urls.alpha_vantage,
            key.clone(),
        )));
    }

    providers.push(Arc::new(CoinGeckoProvider::new(
        client.clone(),
        &config.urls.coingecko,
    )));

    providers.push(Arc::new(match &config.exchange_rate_api_key {
        Some(key) => ExchangeRateProvider::with_key(client, &config.urls.exchange_rate, key.clone()),
        None => ExchangeRateProvider::open(client, &config.urls.exchange_rate_open),
    }));

    let ids: Vec<&str> = providers.iter().map(|p| p.id().as_str()).collect();
    tracing::info!(providers = ?ids, "시세 제공자 등록 완료");

    Ok(providers)
}

/// 제공자 공용 HTTP 클라이언트를 생성합니다.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("spartan-research-station/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| DataError::ConfigError(format!("HTTP 클라이언트 생성 실패: {}", e)))
}

/// 요청을 보내고 JSON 응답을 역직렬화합니다.
///
/// 429는 `RateLimited`, 그 외 비정상 상태는 `HttpStatus`로 변환합니다.
/// 오류 메시지에는 요청 URL(API 키 포함)을 남기지 않습니다.
pub(crate) async fn send_json<T: DeserializeOwned>(
    provider: ProviderId,
    request: reqwest::RequestBuilder,
) -> Result<T> {
    let response = request
        .send()
        .await
        .map_err(|e| DataError::provider(provider, e.without_url()))?;

    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(DataError::RateLimited {
            provider,
            message: "HTTP 429".to_string(),
        });
    }
    if !status.is_success() {
        return Err(DataError::HttpStatus {
            provider,
            status: status.as_u16(),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| DataError::provider(provider, e.without_url()))?;

    serde_json::from_str(&body).map_err(|e| DataError::parse(provider, e))
}

/// f64 값을 Decimal로 변환합니다. NaN/무한대는 파싱 오류입니다.
pub(crate) fn to_decimal(provider: ProviderId, value: f64, field: &str) -> Result<Decimal> {
    if !value.is_finite() {
        return Err(DataError::parse(provider, format!("{} 값이 유한하지 않음", field)));
    }
    Decimal::from_f64(value)
        .ok_or_else(|| DataError::parse(provider, format!("{} 변환 실패: {}", field, value)))
}

/// 양수 가격이 아니면 오류를 반환합니다.
pub(crate) fn ensure_positive(quote: Quote) -> Result<Quote> {
    if quote.is_valid() {
        Ok(quote)
    } else {
        Err(DataError::parse(
            quote.source,
            format!("{} 가격이 양수가 아님: {}", quote.symbol, quote.price),
        ))
    }
}

/// 기본 URL 끝의 `/`를 제거합니다.
pub(crate) fn trim_base(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}
