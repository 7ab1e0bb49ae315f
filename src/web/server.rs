use anyhow::Result;
use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::core::models::ServerInfo;
use crate::web::routes::{create_routes, AppState};

/// Cross-origin access is limited to the page this server hands out, since
/// the Wi-Fi endpoints return stored passwords.
fn same_origin_cors(info: &ServerInfo) -> CorsLayer {
    let origins: Vec<HeaderValue> = [info.url(), format!("http://localhost:{}", info.port)]
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

/// The API router with tracing and CORS applied.
pub fn build_router(state: AppState, max_upload_size: u64) -> Router {
    let cors = same_origin_cors(&state.server_info);
    create_routes(state, max_upload_size)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub struct WebServer {
    addr: SocketAddr,
    state: AppState,
    max_upload_size: u64,
}

impl WebServer {
    pub fn new(addr: SocketAddr, state: AppState, max_upload_size: u64) -> Self {
        Self {
            addr,
            state,
            max_upload_size,
        }
    }

    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = build_router(self.state, self.max_upload_size);

        info!("Starting web server on {}", self.addr);
        let listener = TcpListener::bind(self.addr).await?;
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}
