//! 자산 분류와 데이터 제공자 식별자.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SpartanError;

/// 자산 분류.
///
/// 분류마다 시세 조회 시 시도할 제공자 우선순위가 다릅니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    /// 주식 및 ETF
    Stock,
    /// 암호화폐
    Crypto,
    /// 외환
    Forex,
}

impl AssetClass {
    /// 모든 자산 분류.
    pub fn all() -> [AssetClass; 3] {
        [AssetClass::Stock, AssetClass::Crypto, AssetClass::Forex]
    }

    /// 문자열 표현.
    pub fn as_str(self) -> &'static str {
        match self {
            AssetClass::Stock => "stock",
            AssetClass::Crypto => "crypto",
            AssetClass::Forex => "forex",
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetClass {
    type Err = SpartanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stock" | "stocks" | "equity" => Ok(AssetClass::Stock),
            "crypto" | "cryptocurrency" => Ok(AssetClass::Crypto),
            "forex" | "fx" | "currency" => Ok(AssetClass::Forex),
            other => Err(SpartanError::UnknownAssetClass(other.to_string())),
        }
    }
}

/// 외부 데이터 제공자 식별자.
///
/// Rate limiter의 키로도 사용되므로, 같은 제공자에 대한 요청은
/// 심볼이나 호출자와 무관하게 하나의 간격을 공유합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderId {
    /// Yahoo Finance
    Yahoo,
    /// Polygon.io
    Polygon,
    /// Alpha Vantage
    AlphaVantage,
    /// CoinGecko
    #[serde(rename = "coingecko")]
    CoinGecko,
    /// ExchangeRate-API
    ExchangeRate,
    /// FRED (Federal Reserve Economic Data)
    Fred,
}

impl ProviderId {
    /// 모든 제공자.
    pub fn all() -> [ProviderId; 6] {
        [
            ProviderId::Yahoo,
            ProviderId::Polygon,
            ProviderId::AlphaVantage,
            ProviderId::CoinGecko,
            ProviderId::ExchangeRate,
            ProviderId::Fred,
        ]
    }

    /// 문자열 표현 (설정 키, 메트릭 레이블에 사용).
    pub fn as_str(self) -> &'static str {
        match self {
            ProviderId::Yahoo => "yahoo",
            ProviderId::Polygon => "polygon",
            ProviderId::AlphaVantage => "alpha_vantage",
            ProviderId::CoinGecko => "coingecko",
            ProviderId::ExchangeRate => "exchange_rate",
            ProviderId::Fred => "fred",
        }
    }

    /// API 키가 있어야 사용할 수 있는 제공자인지 여부.
    pub fn requires_api_key(self) -> bool {
        matches!(
            self,
            ProviderId::Polygon | ProviderId::AlphaVantage | ProviderId::Fred
        )
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = SpartanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "yahoo" | "yfinance" => Ok(ProviderId::Yahoo),
            "polygon" => Ok(ProviderId::Polygon),
            "alpha_vantage" | "alphavantage" => Ok(ProviderId::AlphaVantage),
            "coingecko" => Ok(ProviderId::CoinGecko),
            "exchange_rate" | "exchangerate" => Ok(ProviderId::ExchangeRate),
            "fred" => Ok(ProviderId::Fred),
            other => Err(SpartanError::UnknownProvider(other.to_string())),
        }
    }
}
