//! 시세 endpoint.
//!
//! # 엔드포인트
//!
//! - `GET /api/v1/quotes/{asset_class}/{symbol}` - 단일 시세 (캐시 → 저장소 → 제공자)
//! - `GET /api/v1/quotes/{asset_class}?symbols=A,B` - 다중 시세
//! - `GET /api/v1/quotes/{asset_class}/{symbol}/sources` - 캐시를 우회한 제공자 시도 기록

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use spartan_core::{AssetClass, CanonicalSymbol};
use spartan_data::{FetchReport, QuoteBatch, QuoteLookup};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::{bad_request, invalid_input, no_data, ApiErrorResponse, ApiResult};
use crate::state::AppState;

/// 다중 조회 최대 심볼 수.
pub const MAX_BATCH_SYMBOLS: usize = 25;

/// 다중 시세 쿼리.
#[derive(Debug, Deserialize)]
pub struct BatchQuery {
    /// 쉼표로 구분된 심볼 목록 (예: AAPL,MSFT)
    pub symbols: Option<String>,
}

fn parse_class(raw: &str) -> ApiResult<AssetClass> {
    raw.parse::<AssetClass>().map_err(|e| invalid_input(&e))
}

fn parse_symbol(asset_class: AssetClass, raw: &str) -> ApiResult<CanonicalSymbol> {
    CanonicalSymbol::parse(raw, asset_class).map_err(|e| invalid_input(&e))
}

/// 단일 시세 조회.
///
/// GET /api/v1/quotes/{asset_class}/{symbol}
pub async fn get_quote(
    State(state): State<Arc<AppState>>,
    Path((asset_class, symbol)): Path<(String, String)>,
) -> ApiResult<Json<QuoteLookup>> {
    let asset_class = parse_class(&asset_class)?;
    let symbol = parse_symbol(asset_class, &symbol)?;

    match state.market.get_quote(&symbol).await {
        Some(lookup) => {
            debug!(symbol = %symbol, origin = %lookup.origin, "시세 응답");
            Ok(Json(lookup))
        }
        None => Err(no_data(format!(
            "모든 제공자에서 시세를 가져오지 못했습니다: {}",
            symbol.key()
        ))),
    }
}

/// 다중 시세 조회.
///
/// GET /api/v1/quotes/{asset_class}?symbols=A,B
///
/// 찾지 못한 심볼은 에러 대신 `missing`에 담깁니다.
pub async fn get_quotes(
    State(state): State<Arc<AppState>>,
    Path(asset_class): Path<String>,
    Query(query): Query<BatchQuery>,
) -> ApiResult<Json<QuoteBatch>> {
    let asset_class = parse_class(&asset_class)?;

    let raw: Vec<&str> = query
        .symbols
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();

    if raw.is_empty() {
        return Err(bad_request("MISSING_SYMBOLS", "symbols 쿼리 파라미터가 필요합니다"));
    }
    if raw.len() > MAX_BATCH_SYMBOLS {
        return Err(ApiErrorResponse::with_details(
            "TOO_MANY_SYMBOLS",
            format!("한 번에 최대 {}개 심볼까지 조회할 수 있습니다", MAX_BATCH_SYMBOLS),
            serde_json::json!({ "requested": raw.len(), "max": MAX_BATCH_SYMBOLS }),
        )
        .into_error(axum::http::StatusCode::BAD_REQUEST));
    }

    let symbols = raw
        .iter()
        .map(|s| parse_symbol(asset_class, s))
        .collect::<ApiResult<Vec<_>>>()?;

    let batch = state.market.get_quotes(&symbols).await;
    info!(
        asset_class = %asset_class,
        found = batch.quotes.len(),
        missing = batch.missing.len(),
        "다중 시세 조회 완료"
    );

    Ok(Json(batch))
}

/// 제공자 시도 기록 조회.
///
/// GET /api/v1/quotes/{asset_class}/{symbol}/sources
///
/// 캐시를 거치지 않고 우선순위대로 제공자를 호출합니다. 모든 제공자가
/// 실패해도 200으로 시도 기록을 반환합니다.
pub async fn get_quote_sources(
    State(state): State<Arc<AppState>>,
    Path((asset_class, symbol)): Path<(String, String)>,
) -> ApiResult<Json<FetchReport>> {
    let asset_class = parse_class(&asset_class)?;
    let symbol = parse_symbol(asset_class, &symbol)?;

    Ok(Json(state.market.refresh_quote(&symbol).await))
}

/// 시세 라우터 생성.
pub fn quotes_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/{asset_class}", get(get_quotes))
        .route("/{asset_class}/{symbol}", get(get_quote))
        .route("/{asset_class}/{symbol}/sources", get(get_quote_sources))
}
