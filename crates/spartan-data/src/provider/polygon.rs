//! Polygon.io 시세 제공자.
//!
//! 전일 집계(`/v2/aggs/ticker/{ticker}/prev`)를 사용합니다. 무료 플랜은
//! 실시간 시세를 제공하지 않으므로 종가(`c`)를 현재가, 시가(`o`)를 기준가로 봅니다.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use spartan_core::{AssetClass, CanonicalSymbol, ProviderId, Quote};

use super::{ensure_positive, send_json, to_decimal, trim_base, QuoteProvider};
use crate::error::{DataError, Result};

const PROVIDER: ProviderId = ProviderId::Polygon;

#[derive(Debug, Deserialize)]
struct PrevCloseResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    results: Vec<AggregateBar>,
}

#[derive(Debug, Deserialize)]
struct AggregateBar {
    /// 종가
    c: f64,
    /// 시가
    o: f64,
    /// 거래량
    #[serde(default)]
    v: f64,
}

/// Polygon.io 시세 제공자.
pub struct PolygonProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl PolygonProvider {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: SecretString) -> Self {
        Self {
            client,
            base_url: trim_base(base_url),
            api_key,
        }
    }
}

#[async_trait]
impl QuoteProvider for PolygonProvider {
    fn id(&self) -> ProviderId {
        PROVIDER
    }

    fn supports(&self, _asset_class: AssetClass) -> bool {
        true
    }

    async fn fetch_quote(&self, symbol: &CanonicalSymbol) -> Result<Quote> {
        let ticker = symbol.polygon_ticker();
        let url = format!("{}/v2/aggs/ticker/{}/prev", self.base_url, ticker);

        let response: PrevCloseResponse = send_json(
            PROVIDER,
            self.client.get(&url).query(&[
                ("adjusted", "true"),
                ("apiKey", self.api_key.expose_secret()),
            ]),
        )
        .await?;

        if let Some(message) = response.error {
            return Err(DataError::provider(PROVIDER, message));
        }
        if matches!(response.status.as_deref(), Some("ERROR") | Some("NOT_AUTHORIZED")) {
            return Err(DataError::provider(PROVIDER, "응답 상태 오류"));
        }

        let bar = response.results.first().ok_or_else(|| DataError::NoData {
            provider: PROVIDER,
            symbol: ticker.clone(),
        })?;

        ensure_positive(Quote::from_prices(
            symbol.key(),
            symbol.asset_class(),
            to_decimal(PROVIDER, bar.c, "c")?,
            to_decimal(PROVIDER, bar.o, "o")?,
            to_decimal(PROVIDER, bar.v, "v")?,
            PROVIDER,
        ))
    }
}
