//! 제공자 현황 endpoint.
//!
//! - `GET /api/v1/providers` - 등록 여부, 최소 요청 간격, 자산 분류별 우선순위

use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use spartan_core::{AssetClass, ProviderId};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::state::AppState;

/// 제공자 정보.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub id: ProviderId,
    /// 현재 프로세스에 등록되어 호출 가능한지
    pub configured: bool,
    pub requires_api_key: bool,
    pub min_interval_ms: u64,
}

/// 제공자 현황 응답.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProvidersResponse {
    pub providers: Vec<ProviderInfo>,
    /// 자산 분류별 시도 순서
    pub priority: BTreeMap<String, Vec<ProviderId>>,
}

/// 제공자 현황 조회.
///
/// GET /api/v1/providers
pub async fn list_providers(State(state): State<Arc<AppState>>) -> Json<ProvidersResponse> {
    let fetcher = state.market.fetcher();

    let providers = ProviderId::all()
        .into_iter()
        .map(|id| {
            // FRED는 시세 체인이 아닌 시계열 소스로 등록됨
            let configured = match id {
                ProviderId::Fred => state.market.has_series_source(),
                other => fetcher.is_registered(other),
            };
            ProviderInfo {
                id,
                configured,
                requires_api_key: id.requires_api_key(),
                min_interval_ms: fetcher.limiter().interval(id).as_millis() as u64,
            }
        })
        .collect();

    let priority = AssetClass::all()
        .into_iter()
        .map(|class| (class.as_str().to_string(), fetcher.priority(class)))
        .collect();

    Json(ProvidersResponse {
        providers,
        priority,
    })
}

/// 제공자 라우터 생성.
pub fn providers_router() -> Router<Arc<AppState>> {
    Router::new().route("/", get(list_providers))
}
