//! Yahoo Finance 시세 제공자.
//!
//! 최근 5일 일봉을 조회해 마지막 종가를 현재가로, 직전 종가를 기준가로 사용합니다.

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use spartan_core::{AssetClass, CanonicalSymbol, ProviderId, Quote};
use tracing::debug;
use yahoo_finance_api as yahoo;

use super::{ensure_positive, to_decimal, QuoteProvider};
use crate::error::{DataError, Result};

const PROVIDER: ProviderId = ProviderId::Yahoo;

/// Yahoo Finance 기반 시세 제공자.
pub struct YahooProvider {
    connector: yahoo::YahooConnector,
    timeout: Duration,
}

impl YahooProvider {
    /// 새로운 YahooProvider 생성.
    pub fn new(timeout: Duration) -> Result<Self> {
        let connector = yahoo::YahooConnector::new().map_err(|e| DataError::provider(PROVIDER, e))?;

        Ok(Self { connector, timeout })
    }

    /// 심볼의 최근 일봉 조회.
    async fn fetch_bars(&self, yahoo_symbol: &str) -> Result<Vec<yahoo::Quote>> {
        let response = tokio::time::timeout(
            self.timeout,
            self.connector.get_quote_range(yahoo_symbol, "1d", "5d"),
        )
        .await
        .map_err(|_| DataError::provider(PROVIDER, "요청 타임아웃"))?
        .map_err(|e| DataError::provider(PROVIDER, e))?;

        let bars: Vec<yahoo::Quote> = response
            .quotes()
            .map_err(|e| DataError::parse(PROVIDER, e))?
            .into_iter()
            .filter(|q| q.close.is_finite() && q.close > 0.0)
            .collect();

        debug!(symbol = yahoo_symbol, count = bars.len(), "Yahoo 일봉 수신");
        Ok(bars)
    }
}

#[async_trait]
impl QuoteProvider for YahooProvider {
    fn id(&self) -> ProviderId {
        PROVIDER
    }

    fn supports(&self, _asset_class: AssetClass) -> bool {
        true
    }

    async fn fetch_quote(&self, symbol: &CanonicalSymbol) -> Result<Quote> {
        let yahoo_symbol = symbol.yahoo_symbol();
        let bars = self.fetch_bars(&yahoo_symbol).await?;

        let (current, reference) = match bars.as_slice() {
            [] => {
                return Err(DataError::NoData {
                    provider: PROVIDER,
                    symbol: yahoo_symbol,
                })
            }
            [only] => (only, only.open),
            [.., previous, current] => (current, previous.close),
        };

        let price = to_decimal(PROVIDER, current.close, "close")?;
        let reference = to_decimal(PROVIDER, reference, "reference")?;

        ensure_positive(Quote::from_prices(
            symbol.key(),
            symbol.asset_class(),
            price,
            reference,
            Decimal::from(current.volume),
            PROVIDER,
        ))
    }
}
