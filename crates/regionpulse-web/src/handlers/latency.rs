//! 리전 지연 지표 API 핸들러.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::Method;
use axum::response::{IntoResponse, Response};
use axum::Json;
use regionpulse_core::calculator;
use regionpulse_core::config::ResponseShape;
use regionpulse_core::models::metrics::{MetricsReport, MetricsRequest, RegionMetrics};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::AppState;

/// 목록 형태 응답의 리전 엔트리
#[derive(Debug, Serialize)]
pub struct RegionEntry {
    /// 리전 이름
    pub region: String,
    /// 계산된 지표
    #[serde(flatten)]
    pub metrics: RegionMetrics,
}

/// 목록 형태 응답 (`{"regions": [...]}`)
#[derive(Debug, Serialize)]
pub struct RegionListResponse {
    /// 리전별 엔트리 (리전 이름 순)
    pub regions: Vec<RegionEntry>,
}

impl From<MetricsReport> for RegionListResponse {
    fn from(report: MetricsReport) -> Self {
        Self {
            regions: report
                .into_iter()
                .map(|(region, metrics)| RegionEntry { region, metrics })
                .collect(),
        }
    }
}

/// 리전 지연 지표 계산
///
/// POST /api/latency
///
/// 본문: `{"regions": ["apac", "emea"], "threshold_ms": 180}`.
/// Content-Type과 무관하게 본문을 JSON으로 해석한다.
pub async fn calculate_latency(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let value: Value = serde_json::from_slice(&body).map_err(|e| {
        warn!("요청 본문 JSON 파싱 실패: {e}");
        ApiError::BadRequest("Invalid JSON".to_string())
    })?;

    let request = MetricsRequest::from_value(&value).inspect_err(|e| warn!("{e}"))?;

    debug!(
        "지표 요청: regions={:?}, threshold_ms={}",
        request.regions, request.threshold_ms
    );

    let report = calculator::compute(&state.store, &request);

    let response = match state.response_shape {
        ResponseShape::Keyed => Json(report).into_response(),
        ResponseShape::List => Json(RegionListResponse::from(report)).into_response(),
    };
    Ok(response)
}

/// POST/OPTIONS 외 메서드 거부
pub async fn method_not_allowed(method: Method) -> ApiError {
    debug!("허용되지 않은 메서드: {method}");
    ApiError::MethodNotAllowed(method.to_string())
}
