//! 프리로드 작업 모듈.

pub mod economic;
pub mod quotes;
pub mod validate;

pub use economic::preload_series;
pub use quotes::preload_quotes;
pub use validate::{evaluate, validate_preload, write_marker};
