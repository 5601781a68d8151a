//! FRED(미국 연준 경제 데이터) 클라이언트.

use async_trait::async_trait;
use chrono::NaiveDate;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use spartan_core::{EconomicSeries, Observation, ProviderId, ProvidersConfig, SeriesId};
use tracing::debug;

use super::{http_client, send_json, trim_base};
use crate::error::{DataError, Result};

const PROVIDER: ProviderId = ProviderId::Fred;

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    #[serde(default)]
    observations: Vec<RawObservation>,
}

#[derive(Debug, Deserialize)]
struct RawObservation {
    date: String,
    /// 결측값은 `"."`
    value: String,
}

/// 경제 지표 시계열 소스.
///
/// 시장 데이터 서비스와 프리로더는 이 trait을 통해 시계열을 가져옵니다.
#[async_trait]
pub trait SeriesSource: Send + Sync {
    /// 최근 `limit`개 관측값을 날짜 오름차순으로 반환합니다.
    async fn fetch_series(&self, series_id: &SeriesId, limit: usize) -> Result<EconomicSeries>;
}

/// FRED API 클라이언트.
pub struct FredClient {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl FredClient {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: SecretString) -> Self {
        Self {
            client,
            base_url: trim_base(base_url),
            api_key,
        }
    }

    /// 설정에서 생성합니다. API 키가 없으면 None.
    pub fn from_config(config: &ProvidersConfig) -> Result<Option<Self>> {
        let Some(key) = &config.fred_api_key else {
            return Ok(None);
        };
        let client = http_client(config.timeout())?;
        Ok(Some(Self::new(client, &config.urls.fred, key.clone())))
    }
}

fn parse_observation(raw: RawObservation) -> Result<Option<Observation>> {
    let value = raw.value.trim();
    if value == "." || value.is_empty() {
        return Ok(None);
    }

    let date = NaiveDate::parse_from_str(&raw.date, "%Y-%m-%d")
        .map_err(|e| DataError::parse(PROVIDER, format!("date {}: {}", raw.date, e)))?;
    let value = value
        .parse::<f64>()
        .map_err(|e| DataError::parse(PROVIDER, format!("value {}: {}", raw.value, e)))?;

    Ok(Some(Observation { date, value }))
}

#[async_trait]
impl SeriesSource for FredClient {
    async fn fetch_series(&self, series_id: &SeriesId, limit: usize) -> Result<EconomicSeries> {
        let url = format!("{}/fred/series/observations", self.base_url);
        let limit_param = limit.max(1).to_string();

        let response: ObservationsResponse = send_json(
            PROVIDER,
            self.client.get(&url).query(&[
                ("series_id", series_id.as_str()),
                ("api_key", self.api_key.expose_secret()),
                ("file_type", "json"),
                ("sort_order", "desc"),
                ("limit", limit_param.as_str()),
            ]),
        )
        .await?;

        let mut observations = Vec::with_capacity(response.observations.len());
        for raw in response.observations {
            if let Some(obs) = parse_observation(raw)? {
                observations.push(obs);
            }
        }

        if observations.is_empty() {
            return Err(DataError::NoData {
                provider: PROVIDER,
                symbol: series_id.to_string(),
            });
        }

        debug!(series_id = %series_id, count = observations.len(), "FRED 관측값 수신");

        let mut series = EconomicSeries::new(series_id.clone(), observations);
        series.truncate_to_latest(limit);
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_value_skipped() {
        let raw = RawObservation {
            date: "2024-01-01".to_string(),
            value: ".".to_string(),
        };
        assert!(parse_observation(raw).unwrap().is_none());
    }

    #[test]
    fn test_observation_parsed() {
        let raw = RawObservation {
            date: "2024-03-15".to_string(),
            value: "4.31".to_string(),
        };
        let obs = parse_observation(raw).unwrap().unwrap();
        assert_eq!(obs.date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(obs.value, 4.31);
    }

    #[test]
    fn test_bad_date_is_parse_error() {
        let raw = RawObservation {
            date: "15/03/2024".to_string(),
            value: "4.31".to_string(),
        };
        assert!(matches!(
            parse_observation(raw),
            Err(DataError::ParseError { .. })
        ));
    }

    #[test]
    fn test_from_config_requires_key() {
        let config = ProvidersConfig::default();
        assert!(FredClient::from_config(&config).unwrap().is_none());
    }
}
