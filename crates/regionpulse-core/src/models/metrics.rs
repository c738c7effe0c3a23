//! 지표 요청/응답 모델.
//!
//! 요청 검증은 전송 계층과 무관하게 [`MetricsRequest::from_value`]에서 수행한다.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::CoreError;

/// 리전 지표 요청
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsRequest {
    /// 요청 리전 집합 (중복 제거됨)
    pub regions: BTreeSet<String>,
    /// 지연 임계값 (밀리초) — 이 값을 초과하면 breach
    pub threshold_ms: f64,
}

impl MetricsRequest {
    /// 새 요청 생성 (중복 리전은 하나로 합쳐짐)
    pub fn new<I, S>(regions: I, threshold_ms: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            regions: regions.into_iter().map(Into::into).collect(),
            threshold_ms,
        }
    }

    /// JSON 본문에서 요청 파싱 및 검증
    ///
    /// - `regions`: 문자열 배열 필수
    /// - `threshold_ms`: 숫자 또는 숫자로 해석 가능한 문자열, 유한값이어야 함
    pub fn from_value(body: &Value) -> Result<Self, CoreError> {
        let object = body
            .as_object()
            .ok_or_else(|| CoreError::invalid("Body must be a JSON object"))?;

        let regions = match object.get("regions") {
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| item.as_str().map(str::to_owned))
                .collect::<Option<BTreeSet<String>>>()
                .ok_or_else(|| CoreError::invalid("regions must contain only strings"))?,
            _ => return Err(CoreError::invalid("Body must include regions: [..]")),
        };

        let threshold_ms = object
            .get("threshold_ms")
            .and_then(coerce_threshold)
            .ok_or_else(|| CoreError::invalid("Body must include threshold_ms as a number"))?;

        Ok(Self {
            regions,
            threshold_ms,
        })
    }
}

/// threshold_ms 값을 유한 f64로 변환
fn coerce_threshold(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

/// 리전별 계산 결과
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionMetrics {
    /// 평균 지연 (밀리초)
    pub avg_latency: f64,
    /// 95 퍼센타일 지연 (밀리초, 선형 보간)
    pub p95_latency: f64,
    /// 평균 가동률 (%)
    pub avg_uptime: f64,
    /// 임계값 초과 레코드 수
    pub breaches: u64,
}

impl RegionMetrics {
    /// 데이터가 없는 리전에 사용하는 0 값 엔트리
    pub fn empty() -> Self {
        Self {
            avg_latency: 0.0,
            p95_latency: 0.0,
            avg_uptime: 0.0,
            breaches: 0,
        }
    }
}

/// 리전 이름 → 계산 결과 매핑
pub type MetricsReport = BTreeMap<String, RegionMetrics>;
