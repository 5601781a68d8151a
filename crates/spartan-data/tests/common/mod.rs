//! 통합 테스트 공용 stub.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use spartan_core::{AssetClass, CanonicalSymbol, EconomicSeries, Observation, ProviderId, Quote, SeriesId};
use spartan_data::{DataError, QuoteProvider, Result, SeriesSource};

/// 고정 응답을 돌려주는 시세 제공자.
pub struct StubProvider {
    id: ProviderId,
    classes: Vec<AssetClass>,
    price: Option<Decimal>,
    calls: AtomicUsize,
}

impl StubProvider {
    /// 항상 `price`를 반환하는 제공자.
    pub fn ok(id: ProviderId, price: Decimal) -> Self {
        Self {
            id,
            classes: AssetClass::all().to_vec(),
            price: Some(price),
            calls: AtomicUsize::new(0),
        }
    }

    /// 항상 실패하는 제공자.
    pub fn failing(id: ProviderId) -> Self {
        Self {
            id,
            classes: AssetClass::all().to_vec(),
            price: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn only(mut self, classes: &[AssetClass]) -> Self {
        self.classes = classes.to_vec();
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteProvider for StubProvider {
    fn id(&self) -> ProviderId {
        self.id
    }

    fn supports(&self, asset_class: AssetClass) -> bool {
        self.classes.contains(&asset_class)
    }

    async fn fetch_quote(&self, symbol: &CanonicalSymbol) -> Result<Quote> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.price {
            Some(price) => Ok(Quote::from_prices(
                symbol.key(),
                symbol.asset_class(),
                price,
                price,
                Decimal::ZERO,
                self.id,
            )),
            None => Err(DataError::NoData {
                provider: self.id,
                symbol: symbol.key(),
            }),
        }
    }
}

/// 메모리 내 시계열 소스.
#[derive(Default)]
pub struct StubSeriesSource {
    series: HashMap<String, Vec<Observation>>,
    calls: AtomicUsize,
}

impl StubSeriesSource {
    pub fn with(mut self, id: &str, points: &[(&str, f64)]) -> Self {
        let observations = points
            .iter()
            .map(|(date, value)| Observation {
                date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
                value: *value,
            })
            .collect();
        self.series.insert(id.to_string(), observations);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SeriesSource for StubSeriesSource {
    async fn fetch_series(&self, series_id: &SeriesId, limit: usize) -> Result<EconomicSeries> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let observations = self
            .series
            .get(series_id.as_str())
            .cloned()
            .ok_or_else(|| DataError::NoData {
                provider: ProviderId::Fred,
                symbol: series_id.to_string(),
            })?;

        let mut series = EconomicSeries::new(series_id.clone(), observations);
        series.truncate_to_latest(limit);
        Ok(series)
    }
}

pub fn stock(raw: &str) -> CanonicalSymbol {
    CanonicalSymbol::parse(raw, AssetClass::Stock).unwrap()
}

pub fn crypto(raw: &str) -> CanonicalSymbol {
    CanonicalSymbol::parse(raw, AssetClass::Crypto).unwrap()
}

pub fn forex(raw: &str) -> CanonicalSymbol {
    CanonicalSymbol::parse(raw, AssetClass::Forex).unwrap()
}
