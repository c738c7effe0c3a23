//! RegionPulse 핵심 에러 타입.
//!
//! 웹 경계 crate는 자체 에러 타입에서 `From<CoreError>`로 변환한다.

use thiserror::Error;

/// 코어 레이어 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 요청 본문 유효성 검증 실패 (regions / threshold_ms)
    #[error("잘못된 요청: {0}")]
    InvalidRequest(String),

    /// 텔레메트리 데이터 소스를 읽거나 해석할 수 없음
    #[error("데이터 소스 사용 불가 — {source_name}: {reason}")]
    DataSourceUnavailable {
        /// 데이터 소스 설명 (파일 경로 또는 "embedded")
        source_name: String,
        /// 실패 사유
        reason: String,
    },

    /// 설정값 오류
    #[error("설정 에러: {0}")]
    Config(String),

    /// JSON 직렬화/역직렬화 실패
    #[error("직렬화 에러: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O 에러
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// 유효성 검증 에러 생성 헬퍼
    pub fn invalid(message: impl Into<String>) -> Self {
        CoreError::InvalidRequest(message.into())
    }
}
