//! 경제 지표 endpoint.
//!
//! # 엔드포인트
//!
//! - `GET /api/v1/economic/series/{series_id}?limit=N` - FRED 시계열 관측값
//! - `GET /api/v1/economic/indicators` - 헤드라인 지표 최신값
//! - `GET /api/v1/economic/recession-probability` - 수익률 곡선 기반 경기침체 확률

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use spartan_core::{EconomicSeries, RecessionOutlook, SeriesId};
use spartan_data::IndicatorSnapshot;
use std::sync::Arc;
use tracing::debug;

use crate::error::{bad_request, invalid_input, no_data, ApiResult};
use crate::state::AppState;

/// 기본 관측값 수.
const DEFAULT_LIMIT: usize = 100;
/// 최대 관측값 수.
const MAX_LIMIT: usize = 1000;

/// 시계열 쿼리.
#[derive(Debug, Deserialize)]
pub struct SeriesQuery {
    /// 최근 관측값 수 (1..=1000)
    pub limit: Option<usize>,
}

/// 헤드라인 지표 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct IndicatorsResponse {
    pub indicators: Vec<IndicatorSnapshot>,
    pub count: usize,
}

fn validate_limit(limit: Option<usize>) -> ApiResult<usize> {
    match limit.unwrap_or(DEFAULT_LIMIT) {
        n @ 1..=MAX_LIMIT => Ok(n),
        n => Err(bad_request(
            "INVALID_LIMIT",
            format!("limit은 1~{} 사이여야 합니다: {}", MAX_LIMIT, n),
        )),
    }
}

/// 시계열 조회.
///
/// GET /api/v1/economic/series/{series_id}?limit=N
pub async fn get_series(
    State(state): State<Arc<AppState>>,
    Path(series_id): Path<String>,
    Query(query): Query<SeriesQuery>,
) -> ApiResult<Json<EconomicSeries>> {
    let series_id = SeriesId::parse(&series_id).map_err(|e| invalid_input(&e))?;
    let limit = validate_limit(query.limit)?;

    match state.market.get_series(&series_id, limit).await {
        Some(series) => {
            debug!(series_id = %series_id, count = series.observations.len(), "시계열 응답");
            Ok(Json(series))
        }
        None => Err(no_data(format!("시계열 데이터를 찾을 수 없습니다: {}", series_id))),
    }
}

/// 헤드라인 지표 조회.
///
/// GET /api/v1/economic/indicators
///
/// 값을 구할 수 없는 지표는 목록에서 빠집니다.
pub async fn get_indicators(State(state): State<Arc<AppState>>) -> Json<IndicatorsResponse> {
    let indicators = state.market.latest_indicators().await;
    Json(IndicatorsResponse {
        count: indicators.len(),
        indicators,
    })
}

/// 경기침체 확률 조회.
///
/// GET /api/v1/economic/recession-probability
pub async fn get_recession_probability(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<RecessionOutlook>> {
    state
        .market
        .recession_outlook()
        .await
        .map(Json)
        .ok_or_else(|| no_data("10년물/3개월물 국채 수익률 데이터가 없습니다"))
}

/// 경제 지표 라우터 생성.
pub fn economic_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/series/{series_id}", get(get_series))
        .route("/indicators", get(get_indicators))
        .route("/recession-probability", get(get_recession_probability))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_validate_limit() {
        assert_eq!(validate_limit(None).unwrap(), 100);
        assert_eq!(validate_limit(Some(1)).unwrap(), 1);
        assert_eq!(validate_limit(Some(1000)).unwrap(), 1000);

        let (status, body) = validate_limit(Some(0)).unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, "INVALID_LIMIT");
        assert!(validate_limit(Some(1001)).is_err());
    }
}
