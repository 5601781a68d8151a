//! 캐시 프리로더.
//!
//! API 서버와 별도로 실행되어 관심 종목 시세와 FRED 시계열을
//! Redis/PostgreSQL에 미리 채우고, 결과를 검증해 완료 마커를 남깁니다.

pub mod error;
pub mod modules;
pub mod stats;
pub mod targets;
pub mod workflow;

pub use error::{PreloadError, Result};
pub use stats::{ItemOutcome, PreloadStats};
pub use targets::PreloadTargets;
