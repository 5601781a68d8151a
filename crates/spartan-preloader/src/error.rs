//! 에러 타입 정의.

use spartan_core::SpartanError;
use spartan_data::DataError;
use thiserror::Error;

/// 프리로더 에러 타입
#[derive(Debug, Error)]
pub enum PreloadError {
    /// 데이터 계층 에러
    #[error("데이터 에러: {0}")]
    Data(#[from] DataError),

    /// 잘못된 심볼/시계열 ID
    #[error("잘못된 입력: {0}")]
    InvalidInput(#[from] SpartanError),

    /// 검증 기준 미달
    #[error("프리로드 검증 실패: {present}/{expected} ({success_pct:.1}% < {min_pct:.1}%)")]
    ValidationFailed {
        expected: usize,
        present: usize,
        success_pct: f64,
        min_pct: f64,
    },
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, PreloadError>;
