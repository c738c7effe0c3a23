//! 애플리케이션 설정 구조체.
//!
//! 웹 서버 바인딩, 응답 형태, 텔레메트리 데이터 소스 경로를 정의한다.
//! 바이너리에서 `config` crate를 통해 파일/환경변수로부터 로드.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::store::DataSource;

/// 최상위 애플리케이션 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// 웹 서버 설정
    #[serde(default)]
    pub web: WebConfig,
    /// 데이터 소스 설정
    #[serde(default)]
    pub data: DataConfig,
}

// ============================================================
// 웹 서버 설정
// ============================================================

/// 응답 본문 형태
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseShape {
    /// `{"apac": {...}, "emea": {...}}`
    #[default]
    Keyed,
    /// `{"regions": [{"region": "apac", ...}]}`
    List,
}

/// 웹 서버 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    /// 웹 서버 포트 (기본: 9090)
    #[serde(default = "default_web_port")]
    pub port: u16,
    /// 외부 접근 허용 여부 (false: 127.0.0.1 only)
    #[serde(default)]
    pub allow_external: bool,
    /// 응답 본문 형태
    #[serde(default)]
    pub response_shape: ResponseShape,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            port: default_web_port(),
            allow_external: false,
            response_shape: ResponseShape::Keyed,
        }
    }
}

fn default_web_port() -> u16 {
    9090
}

// ============================================================
// 데이터 소스 설정
// ============================================================

/// 텔레메트리 데이터 소스 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// 기본 데이터 파일 경로
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
    /// 기본 경로에 파일이 없을 때 시도할 경로
    #[serde(default = "default_fallback_path")]
    pub fallback_path: Option<PathBuf>,
    /// 파일이 모두 없을 때 내장 샘플 데이터셋 사용
    #[serde(default = "default_true")]
    pub embedded_sample: bool,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
            fallback_path: default_fallback_path(),
            embedded_sample: true,
        }
    }
}

impl DataConfig {
    /// 로드 시도 순서대로 데이터 소스 목록 생성
    pub fn sources(&self) -> Vec<DataSource> {
        let mut sources = vec![DataSource::File(self.path.clone())];
        if let Some(fallback) = &self.fallback_path {
            sources.push(DataSource::File(fallback.clone()));
        }
        if self.embedded_sample {
            sources.push(DataSource::Embedded(crate::SAMPLE_DATASET));
        }
        sources
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("q-vercel-latency.json")
}

fn default_fallback_path() -> Option<PathBuf> {
    Some(PathBuf::from("api/q-vercel-latency.json"))
}

fn default_true() -> bool {
    true
}
