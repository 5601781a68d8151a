//! 심볼 정규화 및 제공자별 표기 변환.
//!
//! 대시보드와 프리로더는 같은 자산을 여러 형식으로 전달합니다
//! (`BTC`, `BTC-USD`, `BTC/USDT`, `EURUSD=X` 등). 이 모듈은 입력을
//! 하나의 정규 형식으로 변환하고, 각 제공자가 요구하는 표기로
//! 다시 변환합니다.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::asset::AssetClass;
use crate::error::{SpartanError, SpartanResult};

/// 심볼 최대 길이.
const MAX_SYMBOL_LEN: usize = 20;

/// 기준/호가 통화 쌍.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    /// 기준 통화/자산 (예: BTC, EUR)
    pub base: String,
    /// 호가 통화 (예: USD, JPY)
    pub quote: String,
}

impl CurrencyPair {
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            quote: quote.into(),
        }
    }
}

/// 정규화된 심볼.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "asset_class", rename_all = "snake_case")]
pub enum CanonicalSymbol {
    /// 주식 티커 (예: AAPL, BRK.B, ^GSPC)
    Stock { ticker: String },
    /// 암호화폐 (예: BTC/USD)
    Crypto { pair: CurrencyPair },
    /// 외환 (예: EUR/USD)
    Forex { pair: CurrencyPair },
}

impl CanonicalSymbol {
    /// 원시 입력을 자산 분류에 맞춰 정규화합니다.
    pub fn parse(raw: &str, asset_class: AssetClass) -> SpartanResult<Self> {
        let trimmed = raw.trim();
        validate_chars(trimmed)?;
        let cleaned = trimmed.to_ascii_uppercase();

        match asset_class {
            AssetClass::Stock => Ok(CanonicalSymbol::Stock { ticker: cleaned }),
            AssetClass::Crypto => parse_crypto(&cleaned).map(|pair| CanonicalSymbol::Crypto { pair }),
            AssetClass::Forex => parse_forex(&cleaned).map(|pair| CanonicalSymbol::Forex { pair }),
        }
    }

    /// 자산 분류.
    pub fn asset_class(&self) -> AssetClass {
        match self {
            CanonicalSymbol::Stock { .. } => AssetClass::Stock,
            CanonicalSymbol::Crypto { .. } => AssetClass::Crypto,
            CanonicalSymbol::Forex { .. } => AssetClass::Forex,
        }
    }

    /// 캐시/DB 키 및 응답에 사용하는 정규 표기.
    ///
    /// - 주식: `AAPL`
    /// - 암호화폐: `BTC-USD`
    /// - 외환: `EURUSD`
    pub fn key(&self) -> String {
        match self {
            CanonicalSymbol::Stock { ticker } => ticker.clone(),
            CanonicalSymbol::Crypto { pair } => format!("{}-{}", pair.base, pair.quote),
            CanonicalSymbol::Forex { pair } => format!("{}{}", pair.base, pair.quote),
        }
    }

    /// 통화 쌍 (주식이면 None).
    pub fn pair(&self) -> Option<&CurrencyPair> {
        match self {
            CanonicalSymbol::Stock { .. } => None,
            CanonicalSymbol::Crypto { pair } | CanonicalSymbol::Forex { pair } => Some(pair),
        }
    }

    /// Yahoo Finance 심볼.
    pub fn yahoo_symbol(&self) -> String {
        match self {
            CanonicalSymbol::Stock { ticker } => ticker.clone(),
            CanonicalSymbol::Crypto { pair } => format!("{}-{}", pair.base, pair.quote),
            CanonicalSymbol::Forex { pair } => format!("{}{}=X", pair.base, pair.quote),
        }
    }

    /// Polygon.io 티커.
    pub fn polygon_ticker(&self) -> String {
        match self {
            CanonicalSymbol::Stock { ticker } => ticker.clone(),
            CanonicalSymbol::Crypto { pair } => format!("X:{}{}", pair.base, pair.quote),
            CanonicalSymbol::Forex { pair } => format!("C:{}{}", pair.base, pair.quote),
        }
    }
}

impl fmt::Display for CanonicalSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

fn validate_chars(symbol: &str) -> SpartanResult<()> {
    if symbol.is_empty() {
        return Err(SpartanError::InvalidSymbol("빈 심볼".to_string()));
    }
    if symbol.len() > MAX_SYMBOL_LEN {
        return Err(SpartanError::InvalidSymbol(format!(
            "{} ({}자 초과)",
            symbol, MAX_SYMBOL_LEN
        )));
    }
    let valid = symbol
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '^' | '=' | '/' | '-'));
    if !valid {
        return Err(SpartanError::InvalidSymbol(symbol.to_string()));
    }
    Ok(())
}

/// 스테이블코인 호가는 USD로 취급합니다.
fn normalize_quote_currency(quote: &str) -> String {
    match quote {
        "USDT" | "USDC" => "USD".to_string(),
        other => other.to_string(),
    }
}

fn parse_crypto(symbol: &str) -> SpartanResult<CurrencyPair> {
    let (base, quote) = if let Some((base, quote)) = symbol.split_once(['-', '/']) {
        (base.to_string(), quote.to_string())
    } else if let Some(base) = symbol.strip_suffix("USDT").filter(|b| !b.is_empty()) {
        (base.to_string(), "USD".to_string())
    } else if let Some(base) = symbol.strip_suffix("USD").filter(|b| !b.is_empty()) {
        (base.to_string(), "USD".to_string())
    } else {
        (symbol.to_string(), "USD".to_string())
    };

    let valid_part = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric());
    if !valid_part(&base) || !valid_part(&quote) {
        return Err(SpartanError::InvalidSymbol(symbol.to_string()));
    }

    Ok(CurrencyPair::new(base, normalize_quote_currency(&quote)))
}

fn parse_forex(symbol: &str) -> SpartanResult<CurrencyPair> {
    let stripped = symbol.strip_suffix("=X").unwrap_or(symbol);
    let letters: String = stripped.chars().filter(|c| !matches!(c, '/' | '-')).collect();

    if letters.len() != 6 || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(SpartanError::InvalidSymbol(format!(
            "{} (외환은 EURUSD 형식이어야 합니다)",
            symbol
        )));
    }

    Ok(CurrencyPair::new(&letters[..3], &letters[3..]))
}
