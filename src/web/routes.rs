use axum::{
    Router,
    routing::{get, post},
    extract::DefaultBodyLimit,
};
use std::sync::Arc;

use crate::core::models::ServerInfo;
use crate::qr::encode::QrOptions;
use crate::utils::file::OutputDir;
use crate::web::handlers::{
    api::{
        health_check,
        get_server_info,
        encode_text,
        list_generated,
        download_generated,
        decode_upload,
        list_wifi_networks,
        share_wifi,
        wifi_qr,
        api_not_found,
    },
    static_files::serve_index,
};
use crate::wifi::profiles::WifiProfileStore;

/// Shared by every API handler.
#[derive(Clone)]
pub struct AppState {
    pub output: OutputDir,
    pub qr_options: QrOptions,
    pub server_info: ServerInfo,
    pub wifi: Arc<dyn WifiProfileStore>,
}

pub fn create_routes(state: AppState, max_upload_size: u64) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/info", get(get_server_info))
        .route("/encode", post(encode_text))
        .route("/qr", get(list_generated))
        .route("/qr/:id", get(download_generated))
        .route("/decode", post(decode_upload))
        .route("/wifi/networks", get(list_wifi_networks))
        .route("/wifi/share", post(share_wifi))
        .route("/wifi/qr", post(wifi_qr))
        .fallback(api_not_found)
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .fallback(serve_index)
        .layer(DefaultBodyLimit::max(max_upload_size as usize))
}
