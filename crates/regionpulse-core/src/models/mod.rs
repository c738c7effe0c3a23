//! 도메인 모델.

pub mod metrics;
pub mod telemetry;
