//! CoinGecko 암호화폐 시세 제공자.
//!
//! CoinGecko는 티커가 아닌 코인 ID(`bitcoin`, `ethereum` 등)를 사용하므로
//! 주요 코인에 대한 고정 매핑 테이블로 변환합니다.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use spartan_core::{AssetClass, CanonicalSymbol, ProviderId, Quote};

use super::{ensure_positive, send_json, to_decimal, trim_base, QuoteProvider};
use crate::error::{DataError, Result};

const PROVIDER: ProviderId = ProviderId::CoinGecko;

/// 티커 → CoinGecko 코인 ID.
const COIN_IDS: &[(&str, &str)] = &[
    ("BTC", "bitcoin"),
    ("ETH", "ethereum"),
    ("SOL", "solana"),
    ("XRP", "ripple"),
    ("ADA", "cardano"),
    ("DOGE", "dogecoin"),
    ("DOT", "polkadot"),
    ("AVAX", "avalanche-2"),
    ("MATIC", "matic-network"),
    ("LINK", "chainlink"),
    ("LTC", "litecoin"),
    ("BCH", "bitcoin-cash"),
    ("BNB", "binancecoin"),
    ("TRX", "tron"),
    ("ATOM", "cosmos"),
    ("UNI", "uniswap"),
    ("XLM", "stellar"),
    ("SHIB", "shiba-inu"),
];

/// 티커에 해당하는 CoinGecko 코인 ID.
pub fn coin_id(ticker: &str) -> Option<&'static str> {
    COIN_IDS
        .iter()
        .find(|(t, _)| t.eq_ignore_ascii_case(ticker))
        .map(|(_, id)| *id)
}

/// `{ "bitcoin": { "usd": 67000.0, "usd_24h_change": 1.2, "usd_24h_vol": 3.1e10 } }`
type SimplePriceResponse = HashMap<String, HashMap<String, Option<f64>>>;

/// CoinGecko 시세 제공자.
pub struct CoinGeckoProvider {
    client: reqwest::Client,
    base_url: String,
}

impl CoinGeckoProvider {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: trim_base(base_url),
        }
    }
}

#[async_trait]
impl QuoteProvider for CoinGeckoProvider {
    fn id(&self) -> ProviderId {
        PROVIDER
    }

    fn supports(&self, asset_class: AssetClass) -> bool {
        asset_class == AssetClass::Crypto
    }

    async fn fetch_quote(&self, symbol: &CanonicalSymbol) -> Result<Quote> {
        let pair = symbol
            .pair()
            .filter(|_| symbol.asset_class() == AssetClass::Crypto)
            .ok_or_else(|| DataError::Unsupported {
                provider: PROVIDER,
                what: symbol.asset_class().to_string(),
            })?;

        let id = coin_id(&pair.base).ok_or_else(|| DataError::Unsupported {
            provider: PROVIDER,
            what: format!("coin {}", pair.base),
        })?;
        let vs = pair.quote.to_lowercase();

        let url = format!("{}/api/v3/simple/price", self.base_url);
        let mut response: SimplePriceResponse = send_json(
            PROVIDER,
            self.client.get(&url).query(&[
                ("ids", id),
                ("vs_currencies", vs.as_str()),
                ("include_24hr_change", "true"),
                ("include_24hr_vol", "true"),
            ]),
        )
        .await?;

        let fields = response.remove(id).ok_or_else(|| DataError::NoData {
            provider: PROVIDER,
            symbol: symbol.key(),
        })?;

        let price = fields
            .get(&vs)
            .copied()
            .flatten()
            .ok_or_else(|| DataError::NoData {
                provider: PROVIDER,
                symbol: symbol.key(),
            })?;
        let change_percent = fields
            .get(&format!("{}_24h_change", vs))
            .copied()
            .flatten()
            .unwrap_or(0.0);
        let volume = fields
            .get(&format!("{}_24h_vol", vs))
            .copied()
            .flatten()
            .unwrap_or(0.0);

        // 24시간 전 가격 = price / (1 + pct/100) 이므로 변동폭은 price * pct / (100 + pct)
        let change = if (100.0 + change_percent).abs() > f64::EPSILON {
            price * change_percent / (100.0 + change_percent)
        } else {
            0.0
        };

        let quote = Quote {
            symbol: symbol.key(),
            asset_class: AssetClass::Crypto,
            price: to_decimal(PROVIDER, price, "price")?,
            change: to_decimal(PROVIDER, change, "change")?.round_dp(8),
            change_percent,
            volume: to_decimal(PROVIDER, volume, "volume").unwrap_or(Decimal::ZERO),
            source: PROVIDER,
            fetched_at: Utc::now(),
        };

        ensure_positive(quote)
    }
}
