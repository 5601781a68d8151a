//! 수익률 곡선 기반 경기침체 확률 지표.
//!
//! 10년물과 3개월물 국채 수익률 스프레드를 probit 모형에 넣어
//! 12개월 내 경기침체 확률을 추정합니다.
//!
//! ```text
//! P = Φ(α + β × spread),  α = -0.5333, β = -0.6330
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::economic::EconomicSeries;

/// Probit 모형 절편.
pub const PROBIT_ALPHA: f64 = -0.5333;
/// Probit 모형 스프레드 계수.
pub const PROBIT_BETA: f64 = -0.6330;

/// 경기침체 위험 수준.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecessionRisk {
    /// 확률 < 20%
    Low,
    /// 20% ≤ 확률 < 40%
    Moderate,
    /// 40% ≤ 확률 < 60%
    Elevated,
    /// 확률 ≥ 60%
    High,
}

impl RecessionRisk {
    /// 확률로부터 위험 수준을 결정합니다.
    pub fn from_probability(probability: f64) -> Self {
        if probability < 0.2 {
            Self::Low
        } else if probability < 0.4 {
            Self::Moderate
        } else if probability < 0.6 {
            Self::Elevated
        } else {
            Self::High
        }
    }

    /// 설명 문자열.
    pub fn description(self) -> &'static str {
        match self {
            Self::Low => "낮음",
            Self::Moderate => "보통",
            Self::Elevated => "주의",
            Self::High => "높음",
        }
    }
}

/// 계산에 사용된 원시 입력값.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecessionInputs {
    /// 10년물 수익률 (%)
    pub ten_year: f64,
    /// 3개월물 수익률 (%)
    pub three_month: f64,
    /// 2년물 수익률 (%), 같은 날짜 관측값이 있을 때만
    #[serde(skip_serializing_if = "Option::is_none")]
    pub two_year: Option<f64>,
}

/// 경기침체 확률 지표.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecessionOutlook {
    /// 기준일 (두 입력이 모두 존재하는 가장 최근 날짜)
    pub as_of: NaiveDate,
    /// 10년물 - 3개월물 스프레드 (%p)
    pub spread_10y_3m: f64,
    /// 10년물 - 2년물 스프레드 (%p)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spread_10y_2y: Option<f64>,
    /// 12개월 내 경기침체 확률 (0.0 ~ 1.0)
    pub probability: f64,
    /// 위험 수준
    pub risk: RecessionRisk,
    /// 수익률 곡선 역전 여부
    pub inverted: bool,
    /// 원시 입력값
    pub inputs: RecessionInputs,
}

impl RecessionOutlook {
    /// 두 시계열에서 공통으로 존재하는 가장 최근 날짜를 기준으로 계산합니다.
    ///
    /// 공통 날짜가 없으면 None을 반환합니다.
    pub fn compute(
        ten_year: &EconomicSeries,
        three_month: &EconomicSeries,
        two_year: Option<&EconomicSeries>,
    ) -> Option<Self> {
        let (as_of, ten, three) = ten_year
            .observations
            .iter()
            .rev()
            .find_map(|o| three_month.value_on(o.date).map(|v| (o.date, o.value, v)))?;

        let two = two_year.and_then(|s| s.value_on(as_of));
        let spread_10y_3m = ten - three;
        let probability = recession_probability(spread_10y_3m);

        Some(Self {
            as_of,
            spread_10y_3m,
            spread_10y_2y: two.map(|v| ten - v),
            probability,
            risk: RecessionRisk::from_probability(probability),
            inverted: spread_10y_3m < 0.0,
            inputs: RecessionInputs {
                ten_year: ten,
                three_month: three,
                two_year: two,
            },
        })
    }
}

/// 스프레드(%p)로부터 경기침체 확률을 계산합니다.
pub fn recession_probability(spread_10y_3m: f64) -> f64 {
    normal_cdf(PROBIT_ALPHA + PROBIT_BETA * spread_10y_3m).clamp(0.0, 1.0)
}

/// 표준정규분포 누적분포함수.
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

/// 오차함수 근사 (Abramowitz & Stegun 7.1.26, |오차| < 1.5e-7).
fn erf(x: f64) -> f64 {
    const A1: f64 = 0.254_829_592;
    const A2: f64 = -0.284_496_736;
    const A3: f64 = 1.421_413_741;
    const A4: f64 = -1.453_152_027;
    const A5: f64 = 1.061_405_429;
    const P: f64 = 0.327_591_1;

    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let poly = ((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t;

    sign * (1.0 - poly * (-x * x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::economic::{Observation, SeriesId};

    fn series(id: &str, points: &[(u32, f64)]) -> EconomicSeries {
        EconomicSeries::new(
            SeriesId::parse(id).unwrap(),
            points
                .iter()
                .map(|(day, value)| Observation {
                    date: NaiveDate::from_ymd_opt(2024, 3, *day).unwrap(),
                    value: *value,
                })
                .collect(),
        )
    }

    #[test]
    fn test_normal_cdf_reference_points() {
        assert!((normal_cdf(0.0) - 0.5).abs() < 1e-7);
        assert!((normal_cdf(1.0) - 0.841_344_7).abs() < 1e-6);
        assert!((normal_cdf(-1.96) - 0.024_997_9).abs() < 1e-6);
    }

    #[test]
    fn test_flat_curve_probability() {
        // Φ(-0.5333) ≈ 0.297
        let p = recession_probability(0.0);
        assert!((p - 0.297).abs() < 0.001);
        assert_eq!(RecessionRisk::from_probability(p), RecessionRisk::Moderate);
    }

    #[test]
    fn test_probability_monotonic_in_spread() {
        let inverted = recession_probability(-1.5);
        let flat = recession_probability(0.0);
        let steep = recession_probability(2.5);
        assert!(inverted > flat);
        assert!(flat > steep);
        assert!(inverted > 0.6);
        assert!(steep < 0.05);
    }

    #[test]
    fn test_risk_thresholds() {
        assert_eq!(RecessionRisk::from_probability(0.1), RecessionRisk::Low);
        assert_eq!(RecessionRisk::from_probability(0.2), RecessionRisk::Moderate);
        assert_eq!(RecessionRisk::from_probability(0.45), RecessionRisk::Elevated);
        assert_eq!(RecessionRisk::from_probability(0.6), RecessionRisk::High);
    }

    #[test]
    fn test_compute_uses_latest_common_date() {
        // 10년물은 3/5까지, 3개월물은 3/4까지 존재
        let ten = series("DGS10", &[(1, 4.0), (4, 4.2), (5, 4.3)]);
        let three = series("DGS3MO", &[(1, 5.0), (4, 5.4)]);
        let two = series("DGS2", &[(4, 4.6)]);

        let outlook = RecessionOutlook::compute(&ten, &three, Some(&two)).unwrap();

        assert_eq!(outlook.as_of, NaiveDate::from_ymd_opt(2024, 3, 4).unwrap());
        assert!((outlook.spread_10y_3m + 1.2).abs() < 1e-9);
        assert!((outlook.spread_10y_2y.unwrap() + 0.4).abs() < 1e-9);
        assert!(outlook.inverted);
        assert_eq!(outlook.inputs.three_month, 5.4);
    }

    #[test]
    fn test_compute_without_common_date() {
        let ten = series("DGS10", &[(1, 4.0)]);
        let three = series("DGS3MO", &[(2, 5.0)]);
        assert!(RecessionOutlook::compute(&ten, &three, None).is_none());
    }

    #[test]
    fn test_compute_without_two_year_on_date() {
        let ten = series("DGS10", &[(1, 4.0)]);
        let three = series("DGS3MO", &[(1, 3.0)]);
        let two = series("DGS2", &[(2, 3.5)]);

        let outlook = RecessionOutlook::compute(&ten, &three, Some(&two)).unwrap();
        assert!(outlook.spread_10y_2y.is_none());
        assert!(!outlook.inverted);
        assert_eq!(outlook.risk, RecessionRisk::Low);
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn probability_is_bounded(spread in -10.0f64..10.0) {
                let p = recession_probability(spread);
                prop_assert!((0.0..=1.0).contains(&p));
            }

            #[test]
            fn wider_spread_lowers_probability(spread in -5.0f64..5.0, step in 0.01f64..2.0) {
                prop_assert!(recession_probability(spread + step) <= recession_probability(spread) + 1e-6);
            }
        }
    }
}
