//! 경제 지표 시계열.
//!
//! FRED 시계열(예: DGS10, UNRATE)을 날짜 오름차순 관측값 목록으로 표현합니다.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{SpartanError, SpartanResult};

/// 10년 만기 국채 수익률.
pub const DGS10: &str = "DGS10";
/// 2년 만기 국채 수익률.
pub const DGS2: &str = "DGS2";
/// 3개월 만기 국채 수익률.
pub const DGS3MO: &str = "DGS3MO";

/// 대시보드 헤드라인 지표 (시계열 ID, 설명).
pub const HEADLINE_SERIES: &[(&str, &str)] = &[
    (DGS10, "10-Year Treasury Constant Maturity Rate"),
    (DGS2, "2-Year Treasury Constant Maturity Rate"),
    (DGS3MO, "3-Month Treasury Constant Maturity Rate"),
    ("T10Y2Y", "10-Year Treasury Minus 2-Year Treasury"),
    ("FEDFUNDS", "Federal Funds Effective Rate"),
    ("UNRATE", "Unemployment Rate"),
    ("CPIAUCSL", "Consumer Price Index for All Urban Consumers"),
    ("GDP", "Gross Domestic Product"),
];

/// 헤드라인 지표 설명 조회.
pub fn headline_title(series_id: &str) -> Option<&'static str> {
    HEADLINE_SERIES
        .iter()
        .find(|(id, _)| *id == series_id)
        .map(|(_, title)| *title)
}

/// 검증된 FRED 시계열 ID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeriesId(String);

impl SeriesId {
    /// 시계열 ID를 검증하고 대문자로 정규화합니다.
    pub fn parse(raw: &str) -> SpartanResult<Self> {
        let id = raw.trim().to_uppercase();
        if id.is_empty() || id.len() > 30 {
            return Err(SpartanError::InvalidInput(format!("잘못된 시계열 ID: {}", raw)));
        }
        if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(SpartanError::InvalidInput(format!("잘못된 시계열 ID: {}", raw)));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 시계열 관측값.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// 관측일
    pub date: NaiveDate,
    /// 관측값
    pub value: f64,
}

/// 경제 지표 시계열.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomicSeries {
    /// 시계열 ID
    pub series_id: SeriesId,
    /// 설명 (헤드라인 지표만 제공)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// 날짜 오름차순 관측값
    pub observations: Vec<Observation>,
    /// 조회 시각
    pub fetched_at: DateTime<Utc>,
}

impl EconomicSeries {
    /// 관측값을 날짜순으로 정렬하고 중복 날짜를 제거하여 생성합니다.
    pub fn new(series_id: SeriesId, mut observations: Vec<Observation>) -> Self {
        observations.sort_by_key(|o| o.date);
        observations.dedup_by_key(|o| o.date);
        let title = headline_title(series_id.as_str()).map(str::to_string);

        Self {
            series_id,
            title,
            observations,
            fetched_at: Utc::now(),
        }
    }

    /// 가장 최근 관측값.
    pub fn latest(&self) -> Option<&Observation> {
        self.observations.last()
    }

    /// 특정 날짜의 관측값.
    pub fn value_on(&self, date: NaiveDate) -> Option<f64> {
        self.observations
            .binary_search_by_key(&date, |o| o.date)
            .ok()
            .map(|idx| self.observations[idx].value)
    }

    /// 최근 `limit`개만 남깁니다.
    pub fn truncate_to_latest(&mut self, limit: usize) {
        if self.observations.len() > limit {
            let skip = self.observations.len() - limit;
            self.observations.drain(..skip);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}
