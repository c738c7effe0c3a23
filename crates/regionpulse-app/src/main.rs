//! # regionpulse
//!
//! 리전 지연 지표 서버 바이너리 진입점.
//! 설정 로드, 텔레메트리 저장소 1회 로드 및 주입, 서버 라이프사이클 관리.

mod settings;

use anyhow::{Context, Result};
use clap::Parser;
use regionpulse_core::config::AppConfig;
use regionpulse_core::store::TelemetryStore;
use regionpulse_web::WebServer;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// RegionPulse 지표 서버
///
/// 정적 텔레메트리 데이터셋에서 리전별 지연/가동률 통계를 제공
#[derive(Parser, Debug)]
#[command(name = "regionpulse")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// 설정 파일 경로 (TOML/JSON)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// 텔레메트리 데이터 파일 경로 (설정 파일 값 대체)
    #[arg(long, short = 'd')]
    data: Option<PathBuf>,

    /// 서버 포트 (기본: 9090)
    #[arg(long, short = 'p')]
    port: Option<u16>,

    /// 외부 접근 허용 (0.0.0.0 바인드)
    #[arg(long)]
    allow_external: bool,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, short = 'l', default_value = "info")]
    log_level: String,
}

/// CLI 인자로 설정 오버라이드
fn apply_args(config: &mut AppConfig, args: &Args) {
    if let Some(ref data) = args.data {
        config.data.path = data.clone();
    }
    if let Some(port) = args.port {
        config.web.port = port;
    }
    if args.allow_external {
        config.web.allow_external = true;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_filter = format!(
        "regionpulse={},regionpulse_app={},regionpulse_core={},regionpulse_web={},tower_http={}",
        args.log_level, args.log_level, args.log_level, args.log_level, args.log_level
    );
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log_filter)),
        )
        .init();

    info!("RegionPulse 시작");

    let mut config = settings::load(args.config.as_deref()).context("설정 로드 실패")?;
    apply_args(&mut config, &args);

    // 저장소는 한 번만 로드되고 이후 읽기 전용으로 공유된다
    let store = Arc::new(TelemetryStore::load(&config.data.sources()));
    if store.is_empty() {
        warn!("텔레메트리 데이터 없음 — 모든 리전이 0 값으로 응답됩니다");
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("종료 신호 수신 (Ctrl+C)");
                let _ = shutdown_tx.send(true);
            }
            Err(e) => warn!("종료 신호 핸들러 등록 실패: {e}"),
        }
    });

    let server = WebServer::new(store, config.web.clone());
    info!("엔드포인트: {}", server.url());
    server.run(shutdown_rx).await.context("웹 서버 실행 실패")?;

    info!("RegionPulse 종료");
    Ok(())
}
