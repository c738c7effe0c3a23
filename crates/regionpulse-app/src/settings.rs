//! 설정 로드.
//!
//! 우선순위: serde 기본값 < 설정 파일 (TOML/JSON) < `REGIONPULSE__*` 환경변수.
//! CLI 인자 오버라이드는 진입점에서 마지막에 적용한다.

use config::{Config, ConfigError, Environment, File};
use regionpulse_core::config::AppConfig;
use std::path::Path;

/// 환경변수 접두사 (예: `REGIONPULSE__WEB__PORT=8080`)
const ENV_PREFIX: &str = "REGIONPULSE";

/// 설정 로드
///
/// `path`가 주어지면 해당 파일이 반드시 존재해야 한다.
pub fn load(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(true));
    }

    builder
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
        .build()?
        .try_deserialize()
}
