//! 통합 API 에러 응답 타입.
//!
//! 모든 API 엔드포인트에서 일관된 에러 형식을 제공합니다.

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use spartan_core::SpartanError;

/// 통합 API 에러 응답.
///
/// # 예시
///
/// ```json
/// {
///   "code": "NO_DATA",
///   "message": "모든 제공자에서 시세를 가져오지 못했습니다: AAPL",
///   "timestamp": 1738300800
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "INVALID_SYMBOL", "NO_DATA")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 추가 에러 상세 정보 (선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// 에러 발생 타임스탬프 (Unix timestamp, 선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl ApiErrorResponse {
    /// 기본 에러 생성 (타임스탬프 포함).
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            timestamp: Some(chrono::Utc::now().timestamp()),
        }
    }

    /// 상세 정보 포함 에러 생성.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Value,
    ) -> Self {
        Self {
            details: Some(details),
            ..Self::new(code, message)
        }
    }

    /// 상태 코드와 묶어 핸들러 에러로 변환합니다.
    pub fn into_error(self, status: StatusCode) -> ApiError {
        (status, Json(self))
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiErrorResponse {}

/// 핸들러 에러 타입.
pub type ApiError = (StatusCode, Json<ApiErrorResponse>);

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, ApiError>;

/// 400 Bad Request.
pub fn bad_request(code: &str, message: impl Into<String>) -> ApiError {
    ApiErrorResponse::new(code, message).into_error(StatusCode::BAD_REQUEST)
}

/// 404 `NO_DATA`. 모든 계층에서 데이터를 찾지 못했을 때 사용합니다.
pub fn no_data(message: impl Into<String>) -> ApiError {
    ApiErrorResponse::new("NO_DATA", message).into_error(StatusCode::NOT_FOUND)
}

/// 입력 파싱 에러를 400 응답으로 변환합니다.
pub fn invalid_input(err: &SpartanError) -> ApiError {
    let code = match err {
        SpartanError::UnknownAssetClass(_) => "INVALID_ASSET_CLASS",
        SpartanError::InvalidSymbol(_) => "INVALID_SYMBOL",
        _ => "INVALID_INPUT",
    };
    bad_request(code, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_response_new() {
        let error = ApiErrorResponse::new("TEST_ERROR", "Test message");
        assert_eq!(error.code, "TEST_ERROR");
        assert_eq!(error.message, "Test message");
        assert!(error.timestamp.is_some());
        assert!(error.details.is_none());
    }

    #[test]
    fn test_api_error_response_with_details() {
        let details = serde_json::json!({"field": "symbols", "max": 25});
        let error = ApiErrorResponse::with_details("TOO_MANY_SYMBOLS", "Too many", details);
        assert_eq!(error.code, "TOO_MANY_SYMBOLS");
        assert_eq!(error.details.unwrap()["max"], 25);
    }

    #[test]
    fn test_json_omits_empty_details() {
        let error = ApiErrorResponse::new("NO_DATA", "missing");
        let json = serde_json::to_string(&error).unwrap();

        assert!(!json.contains("details"));
        assert!(json.contains(r#""code":"NO_DATA""#));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_invalid_input_codes() {
        let (status, body) = invalid_input(&SpartanError::UnknownAssetClass("bond".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, "INVALID_ASSET_CLASS");

        let (_, body) = invalid_input(&SpartanError::InvalidSymbol("A B".into()));
        assert_eq!(body.code, "INVALID_SYMBOL");

        let (_, body) = invalid_input(&SpartanError::InvalidInput("x".into()));
        assert_eq!(body.code, "INVALID_INPUT");
    }

    #[test]
    fn test_no_data_is_404() {
        let (status, body) = no_data("nothing");
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.code, "NO_DATA");
    }
}
