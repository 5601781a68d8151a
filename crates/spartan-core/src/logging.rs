//! tracing 기반 로깅 초기화.
//!
//! `[logging]` 설정 또는 `LOG_FORMAT`/`RUST_LOG` 환경 변수로
//! pretty, json, compact 출력 중 하나를 선택합니다.

use tracing_subscriber::{
    fmt,
    layer::{Layered, SubscriberExt},
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

use crate::config::LoggingConfig;

/// 외부 라이브러리의 잡음을 줄이는 기본 필터 지시자.
const QUIET_DEPENDENCIES: &str = "hyper=warn,reqwest=warn,sqlx=warn,redis=warn";

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 개발용
    #[default]
    Pretty,
    /// 로그 수집기용
    Json,
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            other => Err(format!("알 수 없는 로그 형식: {}", other)),
        }
    }
}

/// 로깅 초기화 옵션.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 기본 레벨 또는 필터 (예: "info", "spartan_data=debug")
    pub level: String,
    pub format: LogFormat,
    /// 파일명/줄 번호 출력 여부
    pub with_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            with_location: false,
        }
    }
}

impl LogConfig {
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Default::default()
        }
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// CLI 인자 등으로 레벨을 덮어씁니다. `None`이면 그대로 둡니다.
    pub fn with_level_override(mut self, level: Option<String>) -> Self {
        if let Some(level) = level.filter(|l| !l.trim().is_empty()) {
            self.level = level;
        }
        self
    }

    /// `[logging]` 섹션에서 생성합니다. `LOG_FORMAT`이 설정 파일보다 우선합니다.
    pub fn from_app_config(logging: &LoggingConfig) -> Self {
        let format = std::env::var("LOG_FORMAT")
            .unwrap_or_else(|_| logging.format.clone())
            .parse()
            .unwrap_or_default();

        Self {
            level: logging.level.clone(),
            format,
            // JSON은 수집기에서 위치 정보를 활용
            with_location: format == LogFormat::Json,
        }
    }

    /// `RUST_LOG`가 없을 때 사용할 필터 문자열.
    fn filter_directives(&self) -> String {
        format!("{},{}", self.level, QUIET_DEPENDENCIES)
    }
}

type FmtLayer = Box<dyn Layer<Layered<EnvFilter, Registry>> + Send + Sync>;

/// 전역 subscriber를 설치합니다.
///
/// `RUST_LOG`가 설정되어 있으면 `config.level`보다 우선하며,
/// 이미 설치되어 있으면 에러를 반환합니다.
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.filter_directives()))?;

    let fmt_layer: FmtLayer = match config.format {
        LogFormat::Pretty => fmt::layer()
            .pretty()
            .with_file(config.with_location)
            .with_line_number(config.with_location)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_file(config.with_location)
            .with_line_number(config.with_location)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(false).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    tracing::debug!(format = ?config.format, level = %config.level, "로깅 초기화");
    Ok(())
}

/// 심볼과 자산 분류 필드를 가진 조회 span.
#[macro_export]
macro_rules! fetch_span {
    ($name:expr, $symbol:expr, $asset_class:expr) => {
        tracing::info_span!($name, symbol = %$symbol, asset_class = %$asset_class)
    };
}
