//! Alpha Vantage 시세 제공자 (GLOBAL_QUOTE).
//!
//! 무료 플랜 한도를 넘으면 HTTP 200과 함께 `Note` 또는 `Information`
//! 필드만 돌려주므로 본문을 보고 실패로 판정해야 합니다.

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use spartan_core::{AssetClass, CanonicalSymbol, ProviderId, Quote};

use super::{ensure_positive, send_json, trim_base, QuoteProvider};
use crate::error::{DataError, Result};

const PROVIDER: ProviderId = ProviderId::AlphaVantage;

#[derive(Debug, Deserialize)]
struct GlobalQuoteResponse {
    #[serde(rename = "Global Quote", default)]
    global_quote: Option<HashMap<String, String>>,
    #[serde(rename = "Note", default)]
    note: Option<String>,
    #[serde(rename = "Information", default)]
    information: Option<String>,
    #[serde(rename = "Error Message", default)]
    error_message: Option<String>,
}

/// Alpha Vantage 시세 제공자.
pub struct AlphaVantageProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl AlphaVantageProvider {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: SecretString) -> Self {
        Self {
            client,
            base_url: trim_base(base_url),
            api_key,
        }
    }
}

fn field<'a>(fields: &'a HashMap<String, String>, name: &str) -> Result<&'a str> {
    fields
        .get(name)
        .map(|v| v.trim())
        .ok_or_else(|| DataError::parse(PROVIDER, format!("필드 누락: {}", name)))
}

fn decimal_field(fields: &HashMap<String, String>, name: &str) -> Result<Decimal> {
    let raw = field(fields, name)?;
    Decimal::from_str(raw).map_err(|e| DataError::parse(PROVIDER, format!("{}: {}", name, e)))
}

/// `"0.6400%"` 형식의 변동률 파싱.
fn parse_percent(raw: &str) -> Result<f64> {
    raw.trim_end_matches('%')
        .trim()
        .parse::<f64>()
        .map_err(|e| DataError::parse(PROVIDER, format!("change percent: {}", e)))
}

#[async_trait]
impl QuoteProvider for AlphaVantageProvider {
    fn id(&self) -> ProviderId {
        PROVIDER
    }

    fn supports(&self, asset_class: AssetClass) -> bool {
        asset_class == AssetClass::Stock
    }

    async fn fetch_quote(&self, symbol: &CanonicalSymbol) -> Result<Quote> {
        let ticker = symbol.key();
        let url = format!("{}/query", self.base_url);

        let response: GlobalQuoteResponse = send_json(
            PROVIDER,
            self.client.get(&url).query(&[
                ("function", "GLOBAL_QUOTE"),
                ("symbol", ticker.as_str()),
                ("apikey", self.api_key.expose_secret()),
            ]),
        )
        .await?;

        if let Some(message) = response.note.or(response.information) {
            return Err(DataError::RateLimited {
                provider: PROVIDER,
                message,
            });
        }
        if let Some(message) = response.error_message {
            return Err(DataError::provider(PROVIDER, message));
        }

        let fields = response
            .global_quote
            .filter(|q| !q.is_empty())
            .ok_or_else(|| DataError::NoData {
                provider: PROVIDER,
                symbol: ticker.clone(),
            })?;

        let quote = Quote {
            symbol: ticker,
            asset_class: AssetClass::Stock,
            price: decimal_field(&fields, "05. price")?,
            change: decimal_field(&fields, "09. change")?,
            change_percent: parse_percent(field(&fields, "10. change percent")?)?,
            volume: decimal_field(&fields, "06. volume")?,
            source: PROVIDER,
            fetched_at: Utc::now(),
        };

        ensure_positive(quote)
    }
}
