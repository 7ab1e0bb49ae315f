use axum::{
    extract::{Multipart, Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::core::error::{AppError, AppResult};
use crate::core::models::{DecodeReport, GeneratedQr, ServerInfo};
use crate::qr::{decode_bytes, render_png, ErrorCorrection, QrOptions};
use crate::utils::file::wifi_file_name;
use crate::web::routes::AppState;
use crate::wifi::{share_credentials, WifiCredentials};

#[derive(Debug, Deserialize)]
pub struct EncodeRequest {
    pub data: String,
    #[serde(default)]
    pub error_correction: Option<ErrorCorrection>,
}

#[derive(Debug, Deserialize)]
pub struct ShareRequest {
    pub name: String,
}

/// Run filesystem, image and process work off the async executor.
async fn blocking<T, F>(f: F) -> AppResult<T>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))?
}

fn png_response(png: Vec<u8>, file_name: &str) -> Response {
    let ascii_name: String = file_name
        .chars()
        .map(|c| if (c.is_ascii_graphic() && c != '"') || c == ' ' { c } else { '_' })
        .collect();
    let disposition = HeaderValue::from_str(&format!("inline; filename=\"{}\"", ascii_name))
        .unwrap_or_else(|_| HeaderValue::from_static("inline"));

    (
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("image/png")),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CACHE_CONTROL, HeaderValue::from_static("no-store")),
        ],
        png,
    )
        .into_response()
}

pub async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "service": "qrgendec"
    }))
}

pub async fn get_server_info(State(state): State<AppState>) -> Json<ServerInfo> {
    Json(state.server_info)
}

pub async fn encode_text(
    State(state): State<AppState>,
    Json(request): Json<EncodeRequest>,
) -> AppResult<Json<GeneratedQr>> {
    if request.data.trim().is_empty() {
        return Err(AppError::InvalidInput("Enter some text to encode".to_string()));
    }

    let mut options = state.qr_options.clone();
    if let Some(level) = request.error_correction {
        options.error_correction = level;
    }

    let output = state.output.clone();
    let generated = blocking(move || output.save(&request.data, &options)).await?;
    Ok(Json(generated))
}

pub async fn list_generated(State(state): State<AppState>) -> AppResult<Json<Vec<GeneratedQr>>> {
    let output = state.output.clone();
    Ok(Json(blocking(move || output.list()).await?))
}

pub async fn download_generated(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let output = state.output.clone();
    let file = blocking(move || output.find(&id)).await?;
    let png = tokio::fs::read(&file.path).await?;
    Ok(png_response(png, &file.name))
}

pub async fn decode_upload(mut multipart: Multipart) -> AppResult<Json<DecodeReport>> {
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart field: {}", e)))?
    {
        if field.name() == Some("image") || field.file_name().is_some() {
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::InvalidInput(format!("Failed to read image data: {}", e)))?;
            image = Some(data);
            break;
        }
    }

    let image = image.ok_or_else(|| AppError::InvalidInput("No image in request".to_string()))?;
    info!("Decoding uploaded image ({} bytes)", image.len());

    let codes = blocking(move || decode_bytes(&image)).await?;
    Ok(Json(DecodeReport::new(codes)))
}

pub async fn list_wifi_networks(State(state): State<AppState>) -> AppResult<Json<Vec<String>>> {
    let store = state.wifi.clone();
    Ok(Json(blocking(move || store.list_profiles()).await?))
}

pub async fn share_wifi(
    State(state): State<AppState>,
    Json(request): Json<ShareRequest>,
) -> AppResult<Response> {
    let store = state.wifi.clone();
    let options = state.qr_options.clone();
    let (creds, png) = blocking(move || {
        let creds = share_credentials(store.as_ref(), &request.name)?;
        let png = render_png(&creds.to_uri(), &options)?;
        Ok((creds, png))
    })
    .await?;

    info!("Sharing Wi-Fi network {}", creds.ssid);
    Ok(png_response(png, &wifi_file_name(&creds.ssid)))
}

pub async fn wifi_qr(
    State(state): State<AppState>,
    Json(creds): Json<WifiCredentials>,
) -> AppResult<Response> {
    creds.validate()?;
    let options: QrOptions = state.qr_options.clone();
    let uri = creds.to_uri();
    let png = blocking(move || render_png(&uri, &options)).await?;
    Ok(png_response(png, &wifi_file_name(&creds.ssid)))
}

/// Handle 404 errors for API routes
pub async fn api_not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(serde_json::json!({
        "error": "API endpoint not found"
    })))
}
