//! 저장소 모듈.
//!
//! - [`redis`]: 1차 캐시 (시세, 시계열, 프리로드 마커)
//! - [`postgres`]: 2차 캐시 겸 영속 저장소

pub mod postgres;
pub mod redis;

pub use postgres::{Database, ObservationRepository, QuoteRecord, QuoteRepository};
pub use redis::{PreloadStatus, RedisCache, PRELOAD_STATUS_KEY, PRELOAD_STATUS_TTL_SECS};
