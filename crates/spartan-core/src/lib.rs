//! # Spartan Core
//!
//! 리서치 스테이션 백엔드의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 다른 크레이트 전반에서 사용되는 기본 타입을 제공합니다:
//! - 자산 분류 및 데이터 제공자 식별자
//! - 심볼 정규화
//! - 정규화된 시세(Quote) 레코드
//! - 경제 지표 시계열 및 경기침체 확률 지표
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
