//! 프리로드 대상 결정.
//!
//! 기본 대상은 `[watchlist]`의 종목과 `[preload] series`입니다.
//! CLI 인자로 일부만 지정할 수 있습니다.

use spartan_core::{AppConfig, AssetClass, CanonicalSymbol, SeriesId};
use tracing::warn;

use crate::Result;

/// 정규화된 프리로드 대상.
#[derive(Debug, Clone, Default)]
pub struct PreloadTargets {
    pub quotes: Vec<CanonicalSymbol>,
    pub series: Vec<SeriesId>,
    /// 설정에 있었지만 파싱에 실패한 관심 종목
    pub invalid_quotes: Vec<String>,
    /// 설정에 있었지만 파싱에 실패한 시계열 ID
    pub invalid_series: Vec<String>,
}

impl PreloadTargets {
    /// 설정 전체에서 대상을 만듭니다. 잘못된 항목은 경고 후 종류별 `invalid_*`에 담습니다.
    pub fn from_config(config: &AppConfig) -> Self {
        let mut targets = Self::default();

        for asset_class in AssetClass::all() {
            for raw in config.watchlist.for_class(asset_class) {
                match CanonicalSymbol::parse(raw, asset_class) {
                    Ok(symbol) => targets.quotes.push(symbol),
                    Err(e) => {
                        warn!(symbol = %raw, asset_class = %asset_class, error = %e, "관심 종목 파싱 실패");
                        targets.invalid_quotes.push(raw.clone());
                    }
                }
            }
        }

        for raw in &config.preload.series {
            match SeriesId::parse(raw) {
                Ok(id) => targets.series.push(id),
                Err(e) => {
                    warn!(series_id = %raw, error = %e, "시계열 ID 파싱 실패");
                    targets.invalid_series.push(raw.clone());
                }
            }
        }

        targets
    }

    /// 시세와 시계열 대상 수.
    pub fn len(&self) -> usize {
        self.quotes.len() + self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 쉼표로 구분된 목록을 나눕니다.
fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// `quotes` 서브커맨드 대상.
///
/// - `--symbols`가 있으면 `--class`(기본 stock)로 해석합니다.
/// - `--class`만 있으면 해당 분류의 관심 종목입니다.
/// - 둘 다 없으면 설정 전체입니다.
pub fn quote_targets(
    config: &AppConfig,
    symbols: Option<&str>,
    asset_class: Option<AssetClass>,
) -> Result<Vec<CanonicalSymbol>> {
    match (symbols, asset_class) {
        (Some(raw), class) => {
            let class = class.unwrap_or(AssetClass::Stock);
            Ok(split_list(raw)
                .map(|s| CanonicalSymbol::parse(s, class))
                .collect::<std::result::Result<Vec<_>, _>>()?)
        }
        (None, Some(class)) => Ok(PreloadTargets::from_config(config)
            .quotes
            .into_iter()
            .filter(|s| s.asset_class() == class)
            .collect()),
        (None, None) => Ok(PreloadTargets::from_config(config).quotes),
    }
}

/// `economic` 서브커맨드 대상.
pub fn series_targets(config: &AppConfig, series: Option<&str>) -> Result<Vec<SeriesId>> {
    match series {
        Some(raw) => Ok(split_list(raw)
            .map(SeriesId::parse)
            .collect::<std::result::Result<Vec<_>, _>>()?),
        None => Ok(PreloadTargets::from_config(config).series),
    }
}
