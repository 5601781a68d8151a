//! 데이터 모듈 오류 타입.

use spartan_core::{ProviderId, SpartanError};
use thiserror::Error;

/// 데이터 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 데이터베이스 연결 오류
    #[error("Database connection error: {0}")]
    ConnectionError(String),

    /// 쿼리 실행 오류
    #[error("Query error: {0}")]
    QueryError(String),

    /// 레코드를 찾을 수 없음
    #[error("Record not found: {0}")]
    NotFound(String),

    /// 직렬화/역직렬화 오류
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// 캐시 오류
    #[error("Cache error: {0}")]
    CacheError(String),

    /// 잘못된 입력
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// 설정 오류
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// 마이그레이션 오류
    #[error("Migration error: {0}")]
    MigrationError(String),

    /// 연결 풀 소진
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// 외부 제공자 HTTP/네트워크 오류
    #[error("{provider} request failed: {message}")]
    ProviderError {
        provider: ProviderId,
        message: String,
    },

    /// 제공자 응답 상태 코드 오류
    #[error("{provider} returned HTTP {status}")]
    HttpStatus { provider: ProviderId, status: u16 },

    /// 제공자 요청 한도 초과 응답
    #[error("{provider} rate limit reached: {message}")]
    RateLimited {
        provider: ProviderId,
        message: String,
    },

    /// 응답 파싱 오류
    #[error("{provider} parse error: {message}")]
    ParseError {
        provider: ProviderId,
        message: String,
    },

    /// 응답에 데이터 없음
    #[error("{provider} returned no data for {symbol}")]
    NoData { provider: ProviderId, symbol: String },

    /// 제공자가 해당 자산 분류를 지원하지 않음
    #[error("{provider} does not support {what}")]
    Unsupported { provider: ProviderId, what: String },
}

impl DataError {
    /// 제공자 네트워크 오류 생성 헬퍼.
    pub fn provider(provider: ProviderId, err: impl std::fmt::Display) -> Self {
        DataError::ProviderError {
            provider,
            message: err.to_string(),
        }
    }

    /// 파싱 오류 생성 헬퍼.
    pub fn parse(provider: ProviderId, err: impl std::fmt::Display) -> Self {
        DataError::ParseError {
            provider,
            message: err.to_string(),
        }
    }

    /// 외부 제공자 응답에서 비롯된 오류인지 확인.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            DataError::ProviderError { .. }
                | DataError::HttpStatus { .. }
                | DataError::RateLimited { .. }
                | DataError::ParseError { .. }
                | DataError::NoData { .. }
                | DataError::Unsupported { .. }
        )
    }
}

impl From<sqlx::Error> for DataError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DataError::NotFound("Row not found".to_string()),
            sqlx::Error::PoolTimedOut => DataError::PoolExhausted,
            sqlx::Error::Database(db_err) => DataError::QueryError(db_err.message().to_string()),
            _ => DataError::QueryError(err.to_string()),
        }
    }
}

impl From<redis::RedisError> for DataError {
    fn from(err: redis::RedisError) -> Self {
        DataError::CacheError(err.to_string())
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::SerializationError(err.to_string())
    }
}

impl From<SpartanError> for DataError {
    fn from(err: SpartanError) -> Self {
        DataError::InvalidInput(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_failure_classification() {
        let err = DataError::HttpStatus {
            provider: ProviderId::Polygon,
            status: 429,
        };
        assert!(err.is_provider_failure());
        assert_eq!(err.to_string(), "polygon returned HTTP 429");

        assert!(!DataError::CacheError("down".to_string()).is_provider_failure());
    }

    #[test]
    fn test_from_spartan_error() {
        let err: DataError = SpartanError::InvalidSymbol("??".to_string()).into();
        assert!(matches!(err, DataError::InvalidInput(_)));
    }
}
