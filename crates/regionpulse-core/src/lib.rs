//! # regionpulse-core
//!
//! RegionPulse 도메인 모델, 텔레메트리 저장소, 지표 계산기, 에러 타입.
//! 웹 경계와 바이너리가 공유하는 핵심 타입과 순수 계산 로직을 제공한다.
//!
//! ## 구조
//!
//! - [`models`] — 도메인 데이터 구조체 (serde Serialize/Deserialize)
//! - [`store`] — 불변 인메모리 텔레메트리 저장소
//! - [`calculator`] — 리전별 지연/가동률 통계 계산 (순수 함수)
//! - [`error`] — 핵심 에러 타입 (thiserror)
//! - [`config`] — 애플리케이션 설정 구조체

pub mod calculator;
pub mod config;
pub mod error;
pub mod models;
pub mod store;

/// 바이너리에 포함된 샘플 텔레메트리 데이터셋 (JSON 배열)
pub const SAMPLE_DATASET: &str = include_str!("../../../data/q-vercel-latency.json");
