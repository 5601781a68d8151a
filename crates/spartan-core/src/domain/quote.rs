//! 정규화된 시세 레코드.
//!
//! 어떤 제공자에서 가져왔든 API 응답, Redis 캐시, PostgreSQL 저장소는
//! 모두 같은 [`Quote`] 형식을 사용합니다.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::asset::{AssetClass, ProviderId};

/// 정규화된 시세.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// 정규 심볼 키 (예: AAPL, BTC-USD, EURUSD)
    pub symbol: String,
    /// 자산 분류
    pub asset_class: AssetClass,
    /// 현재가
    pub price: Decimal,
    /// 전일(또는 시가/24시간 전) 대비 변동폭
    pub change: Decimal,
    /// 변동률 (%)
    pub change_percent: f64,
    /// 거래량 (외환처럼 제공되지 않으면 0)
    pub volume: Decimal,
    /// 시세를 만든 제공자
    pub source: ProviderId,
    /// 조회 시각
    pub fetched_at: DateTime<Utc>,
}

impl Quote {
    /// 현재가와 기준가(전일 종가 등)로 시세를 생성합니다.
    ///
    /// 변동폭과 변동률은 두 가격에서 계산됩니다.
    pub fn from_prices(
        symbol: impl Into<String>,
        asset_class: AssetClass,
        price: Decimal,
        reference_price: Decimal,
        volume: Decimal,
        source: ProviderId,
    ) -> Self {
        let change = price - reference_price;
        Self {
            symbol: symbol.into(),
            asset_class,
            price,
            change,
            change_percent: Self::calculate_change_pct(price, reference_price),
            volume,
            source,
            fetched_at: Utc::now(),
        }
    }

    /// 변동률 계산 (%).
    ///
    /// 기준가가 0이면 0을 반환합니다.
    pub fn calculate_change_pct(current: Decimal, previous: Decimal) -> f64 {
        if previous.is_zero() {
            return 0.0;
        }

        ((current - previous) / previous * Decimal::from(100))
            .to_f64()
            .unwrap_or(0.0)
    }

    /// 사용 가능한 시세인지 확인합니다 (양수 가격).
    pub fn is_valid(&self) -> bool {
        self.price > Decimal::ZERO
    }

    /// 조회 후 경과 시간(초).
    pub fn age_secs(&self) -> i64 {
        Utc::now()
            .signed_duration_since(self.fetched_at)
            .num_seconds()
    }
}

/// 시세 조회 결과의 출처 계층.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteOrigin {
    /// Redis 캐시
    Cache,
    /// PostgreSQL 저장소
    Database,
    /// 외부 제공자 (fallback 체인)
    Provider,
}

impl QuoteOrigin {
    pub fn as_str(self) -> &'static str {
        match self {
            QuoteOrigin::Cache => "cache",
            QuoteOrigin::Database => "database",
            QuoteOrigin::Provider => "provider",
        }
    }
}

impl fmt::Display for QuoteOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_from_prices_computes_change() {
        let quote = Quote::from_prices(
            "AAPL",
            AssetClass::Stock,
            dec!(105),
            dec!(100),
            dec!(1000),
            ProviderId::Yahoo,
        );

        assert_eq!(quote.change, dec!(5));
        assert!((quote.change_percent - 5.0).abs() < 1e-9);
        assert!(quote.is_valid());
    }

    #[test]
    fn test_change_pct_zero_reference() {
        assert_eq!(Quote::calculate_change_pct(dec!(100), Decimal::ZERO), 0.0);
    }

    #[test]
    fn test_change_pct_negative() {
        let pct = Quote::calculate_change_pct(dec!(1250), dec!(1300));
        assert!((pct + 3.846).abs() < 0.01);
    }

    #[test]
    fn test_non_positive_price_is_invalid() {
        let quote = Quote::from_prices(
            "EURUSD",
            AssetClass::Forex,
            Decimal::ZERO,
            dec!(1.1),
            Decimal::ZERO,
            ProviderId::ExchangeRate,
        );
        assert!(!quote.is_valid());
    }

    #[test]
    fn test_serialization_shape() {
        let quote = Quote::from_prices(
            "BTC-USD",
            AssetClass::Crypto,
            dec!(50000),
            dec!(49000),
            dec!(12.5),
            ProviderId::CoinGecko,
        );
        let json = serde_json::to_value(&quote).unwrap();
        assert_eq!(json["asset_class"], "crypto");
        assert_eq!(json["source"], "coingecko");
        assert_eq!(json["symbol"], "BTC-USD");
    }
}
