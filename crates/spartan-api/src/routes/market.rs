//! 시장 개요 endpoint.
//!
//! 설정된 관심 종목(`[watchlist]`)의 시세를 자산 분류별로 묶어 반환합니다.
//!
//! # 엔드포인트
//!
//! - `GET /api/v1/market/overview` - 관심 종목 시세

use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use spartan_core::{AssetClass, CanonicalSymbol, WatchlistConfig};
use spartan_data::{MarketDataService, QuoteBatch, QuoteLookup};
use std::sync::Arc;
use tracing::{info, warn};

use crate::state::AppState;

/// 시장 개요 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct MarketOverviewResponse {
    pub stocks: Vec<QuoteLookup>,
    pub crypto: Vec<QuoteLookup>,
    pub forex: Vec<QuoteLookup>,
    /// 파싱에 실패했거나 어떤 계층에서도 찾지 못한 종목
    pub missing: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

/// 관심 종목을 정규 심볼로 변환합니다. 잘못된 항목은 원문 그대로 돌려줍니다.
fn watchlist_symbols(
    watchlist: &WatchlistConfig,
    asset_class: AssetClass,
) -> (Vec<CanonicalSymbol>, Vec<String>) {
    let mut symbols = Vec::new();
    let mut invalid = Vec::new();

    for raw in watchlist.for_class(asset_class) {
        match CanonicalSymbol::parse(raw, asset_class) {
            Ok(symbol) => symbols.push(symbol),
            Err(e) => {
                warn!(symbol = %raw, asset_class = %asset_class, error = %e, "관심 종목 파싱 실패");
                invalid.push(raw.clone());
            }
        }
    }

    (symbols, invalid)
}

async fn class_batch(
    market: &MarketDataService,
    watchlist: &WatchlistConfig,
    asset_class: AssetClass,
) -> QuoteBatch {
    let (symbols, invalid) = watchlist_symbols(watchlist, asset_class);
    let mut batch = market.get_quotes(&symbols).await;
    batch.missing.extend(invalid);
    batch
}

/// 시장 개요 조회.
///
/// GET /api/v1/market/overview
///
/// 분류 내부는 순차 조회하고, 분류끼리는 동시에 진행합니다.
/// 제공자별 요청 간격은 공유 rate limiter가 보장합니다.
pub async fn get_overview(State(state): State<Arc<AppState>>) -> Json<MarketOverviewResponse> {
    let watchlist = &state.config.watchlist;
    let market = state.market.as_ref();

    let (stocks, crypto, forex) = futures::future::join3(
        class_batch(market, watchlist, AssetClass::Stock),
        class_batch(market, watchlist, AssetClass::Crypto),
        class_batch(market, watchlist, AssetClass::Forex),
    )
    .await;

    let missing: Vec<String> = [&stocks, &crypto, &forex]
        .iter()
        .flat_map(|b| b.missing.iter().cloned())
        .collect();

    info!(
        stocks = stocks.quotes.len(),
        crypto = crypto.quotes.len(),
        forex = forex.quotes.len(),
        missing = missing.len(),
        "시장 개요 생성"
    );

    Json(MarketOverviewResponse {
        stocks: stocks.quotes,
        crypto: crypto.quotes,
        forex: forex.quotes,
        missing,
        generated_at: Utc::now(),
    })
}

/// 시장 라우터 생성.
pub fn market_router() -> Router<Arc<AppState>> {
    Router::new().route("/overview", get(get_overview))
}
