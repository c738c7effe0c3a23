//! # regionpulse-web
//!
//! 리전 지연 지표 HTTP 서버.
//! Axum 기반 단일 엔드포인트 + 교차 출처(CORS) 헤더 주입.
//!
//! ## 엔드포인트
//! - `POST /api/latency` — 리전별 평균/p95 지연, 평균 가동률, 임계값 초과 수
//! - `OPTIONS /api/latency` — 사전 요청 (204, 본문 없음)

pub mod error;
pub mod handlers;
pub mod routes;

use axum::extract::Request;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::Router;
use regionpulse_core::config::{ResponseShape, WebConfig};
use regionpulse_core::store::TelemetryStore;
use std::any::Any;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any as AnyOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::error::ApiError;

/// 모든 응답에 붙는 허용 메서드
const ALLOWED_METHODS: &str = "POST, OPTIONS";

/// 웹 서버 애플리케이션 상태
#[derive(Clone)]
pub struct AppState {
    /// 불변 텔레메트리 저장소 (요청 간 읽기 전용 공유)
    pub store: Arc<TelemetryStore>,
    /// 응답 본문 형태
    pub response_shape: ResponseShape,
}

/// 라우터 구성
pub fn build_router(state: AppState) -> Router {
    with_layers(Router::new().nest("/api", routes::api_routes())).with_state(state)
}

/// 공통 레이어 적용
///
/// 패닉은 500 JSON 응답으로 변환되며, 에러 응답을 포함한 모든 응답에 CORS 헤더가 붙는다.
/// `CorsLayer`는 모든 OPTIONS 요청을 직접 응답하므로 라우트까지 도달하지 않는다.
pub fn with_layers(router: Router<AppState>) -> Router<AppState> {
    let cors = CorsLayer::new()
        .allow_origin(AnyOrigin)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    router
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(cors)
        .layer(middleware::from_fn(options_no_content))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
        .layer(TraceLayer::new_for_http())
}

/// OPTIONS 요청의 빈 200 응답을 204로 변환
async fn options_no_content(request: Request, next: Next) -> Response {
    let is_options = request.method() == Method::OPTIONS;
    let mut response = next.run(request).await;
    if is_options && response.status() == StatusCode::OK {
        *response.status_mut() = StatusCode::NO_CONTENT;
    }
    response
}

/// 핸들러 패닉을 500 응답으로 변환
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!("요청 처리 중 패닉: {detail}");
    ApiError::Internal("Internal server error".to_string()).into_response()
}

/// 리전 지표 웹 서버
pub struct WebServer {
    config: WebConfig,
    state: AppState,
}

impl WebServer {
    /// 새 웹 서버 생성
    pub fn new(store: Arc<TelemetryStore>, config: WebConfig) -> Self {
        let state = AppState {
            store,
            response_shape: config.response_shape,
        };
        Self { config, state }
    }

    /// 라우터 반환
    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// 서버 실행
    ///
    /// `shutdown_rx`가 `true`가 되면 처리 중인 요청을 마치고 종료한다.
    pub async fn run(self, shutdown_rx: watch::Receiver<bool>) -> Result<(), std::io::Error> {
        let host = if self.config.allow_external {
            "0.0.0.0"
        } else {
            "127.0.0.1"
        };

        let listener = TcpListener::bind((host, self.config.port)).await?;
        info!("지표 서버 시작: http://{}/api/latency", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(wait_for_shutdown(shutdown_rx))
            .await?;

        info!("지표 서버 종료");
        Ok(())
    }

    /// 서버 URL 반환
    pub fn url(&self) -> String {
        format!("http://localhost:{}/api/latency", self.config.port)
    }
}

/// 종료 신호 대기 (송신측이 사라져도 종료)
async fn wait_for_shutdown(mut shutdown_rx: watch::Receiver<bool>) {
    if shutdown_rx.wait_for(|stop| *stop).await.is_ok() {
        info!("웹 서버 종료 신호 수신");
    }
}
