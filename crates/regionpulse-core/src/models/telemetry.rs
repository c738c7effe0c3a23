//! 텔레메트리 레코드 모델.
//!
//! 데이터 파일(JSON 배열)의 원소 하나에 대응한다.

use serde::{Deserialize, Serialize};

/// 단일 텔레메트리 관측값
///
/// 로드 이후 변경되지 않는다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    /// 리전 식별자 (예: "apac", "emea", "amer") — 대소문자 구분
    pub region: String,
    /// 서비스 이름 (계산에 사용하지 않음)
    #[serde(default)]
    pub service: String,
    /// 지연 시간 (밀리초)
    pub latency_ms: f64,
    /// 가동률 (%, 0~100 기대값이나 검증하지 않음)
    pub uptime_pct: f64,
    /// 관측 시각 (계산에 사용하지 않음)
    #[serde(default)]
    pub timestamp: i64,
}

impl TelemetryRecord {
    /// 새 레코드 생성
    pub fn new(
        region: impl Into<String>,
        service: impl Into<String>,
        latency_ms: f64,
        uptime_pct: f64,
        timestamp: i64,
    ) -> Self {
        Self {
            region: region.into(),
            service: service.into(),
            latency_ms,
            uptime_pct,
            timestamp,
        }
    }
}
