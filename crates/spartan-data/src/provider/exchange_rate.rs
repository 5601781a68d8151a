//! ExchangeRate-API 환율 제공자.
//!
//! 키가 있으면 `/v6/{key}/latest/{BASE}`, 없으면 공개 엔드포인트
//! `/v6/latest/{BASE}`를 사용합니다. 전일 값이 없으므로 변동폭과
//! 거래량은 항상 0입니다.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use spartan_core::{AssetClass, CanonicalSymbol, ProviderId, Quote};

use super::{ensure_positive, send_json, to_decimal, trim_base, QuoteProvider};
use crate::error::{DataError, Result};

const PROVIDER: ProviderId = ProviderId::ExchangeRate;

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    result: String,
    #[serde(rename = "error-type", default)]
    error_type: Option<String>,
    /// 키 엔드포인트 응답
    #[serde(default)]
    conversion_rates: Option<HashMap<String, f64>>,
    /// 공개 엔드포인트 응답
    #[serde(default)]
    rates: Option<HashMap<String, f64>>,
}

/// ExchangeRate-API 환율 제공자.
pub struct ExchangeRateProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<SecretString>,
}

impl ExchangeRateProvider {
    /// API 키를 사용하는 엔드포인트.
    pub fn with_key(client: reqwest::Client, base_url: &str, api_key: SecretString) -> Self {
        Self {
            client,
            base_url: trim_base(base_url),
            api_key: Some(api_key),
        }
    }

    /// 키 없는 공개 엔드포인트.
    pub fn open(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: trim_base(base_url),
            api_key: None,
        }
    }

    fn latest_url(&self, base_currency: &str) -> String {
        match &self.api_key {
            Some(key) => format!(
                "{}/v6/{}/latest/{}",
                self.base_url,
                key.expose_secret(),
                base_currency
            ),
            None => format!("{}/v6/latest/{}", self.base_url, base_currency),
        }
    }
}

#[async_trait]
impl QuoteProvider for ExchangeRateProvider {
    fn id(&self) -> ProviderId {
        PROVIDER
    }

    fn supports(&self, asset_class: AssetClass) -> bool {
        asset_class == AssetClass::Forex
    }

    async fn fetch_quote(&self, symbol: &CanonicalSymbol) -> Result<Quote> {
        let pair = match symbol {
            CanonicalSymbol::Forex { pair } => pair,
            other => {
                return Err(DataError::Unsupported {
                    provider: PROVIDER,
                    what: other.asset_class().to_string(),
                })
            }
        };

        let response: LatestRatesResponse =
            send_json(PROVIDER, self.client.get(self.latest_url(&pair.base))).await?;

        if response.result != "success" {
            return Err(DataError::provider(
                PROVIDER,
                response.error_type.unwrap_or(response.result),
            ));
        }

        let rate = response
            .conversion_rates
            .or(response.rates)
            .and_then(|rates| rates.get(&pair.quote).copied())
            .ok_or_else(|| DataError::NoData {
                provider: PROVIDER,
                symbol: symbol.key(),
            })?;

        let quote = Quote {
            symbol: symbol.key(),
            asset_class: AssetClass::Forex,
            price: to_decimal(PROVIDER, rate, "rate")?,
            change: Decimal::ZERO,
            change_percent: 0.0,
            volume: Decimal::ZERO,
            source: PROVIDER,
            fetched_at: Utc::now(),
        };

        ensure_positive(quote)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_url_variants() {
        let client = reqwest::Client::new();

        let open = ExchangeRateProvider::open(client.clone(), "https://open.er-api.com/");
        assert_eq!(open.latest_url("EUR"), "https://open.er-api.com/v6/latest/EUR");

        let keyed = ExchangeRateProvider::with_key(
            client,
            "https://v6.exchangerate-api.com",
            SecretString::from("k123"),
        );
        assert_eq!(
            keyed.latest_url("USD"),
            "https://v6.exchangerate-api.com/v6/k123/latest/USD"
        );
    }
}
