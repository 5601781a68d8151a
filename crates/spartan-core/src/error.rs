//! 리서치 스테이션의 에러 타입.
//!
//! 도메인 타입 파싱과 설정 로드 과정에서 사용되는 에러를 정의합니다.

use thiserror::Error;

/// 핵심 도메인 에러.
#[derive(Debug, Error)]
pub enum SpartanError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 알 수 없는 자산 분류
    #[error("알 수 없는 자산 분류: {0}")]
    UnknownAssetClass(String),

    /// 알 수 없는 데이터 제공자
    #[error("알 수 없는 데이터 제공자: {0}")]
    UnknownProvider(String),

    /// 잘못된 심볼
    #[error("잘못된 심볼: {0}")]
    InvalidSymbol(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),
}

/// 핵심 작업을 위한 Result 타입.
pub type SpartanResult<T> = Result<T, SpartanError>;

impl SpartanError {
    /// 클라이언트 입력 문제로 인한 에러인지 확인합니다.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            SpartanError::UnknownAssetClass(_)
                | SpartanError::UnknownProvider(_)
                | SpartanError::InvalidSymbol(_)
                | SpartanError::InvalidInput(_)
        )
    }
}

impl From<serde_json::Error> for SpartanError {
    fn from(err: serde_json::Error) -> Self {
        SpartanError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for SpartanError {
    fn from(err: config::ConfigError) -> Self {
        SpartanError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors() {
        assert!(SpartanError::InvalidSymbol("".to_string()).is_client_error());
        assert!(SpartanError::UnknownAssetClass("bond".to_string()).is_client_error());
        assert!(!SpartanError::Config("missing".to_string()).is_client_error());
    }
}
