//! 도메인 모델.
//!
//! - [`asset`]: 자산 분류와 데이터 제공자 식별자
//! - [`symbol`]: 심볼 정규화 및 제공자별 표기 변환
//! - [`quote`]: 정규화된 시세 레코드
//! - [`economic`]: 경제 지표 시계열
//! - [`recession`]: 수익률 곡선 기반 경기침체 확률

pub mod asset;
pub mod economic;
pub mod quote;
pub mod recession;
pub mod symbol;

pub use asset::{AssetClass, ProviderId};
pub use economic::{EconomicSeries, Observation, SeriesId};
pub use quote::{Quote, QuoteOrigin};
pub use recession::{RecessionInputs, RecessionOutlook, RecessionRisk};
pub use symbol::{CanonicalSymbol, CurrencyPair};
