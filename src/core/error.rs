use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("QR encode error: {0}")]
    Encode(#[from] qrcode::types::QrError),

    #[error("QR decode error: {0}")]
    Decode(String),

    #[error("No QR Code detected.")]
    NoQrCode,

    #[error("Invalid Wi-Fi URI: {0}")]
    InvalidWifiUri(String),

    #[error("Wi-Fi error: {0}")]
    Wifi(String),

    #[error("Wi-Fi profile not found: {0}")]
    ProfileNotFound(String),

    #[error("No stored password for Wi-Fi profile: {0}")]
    PasswordUnavailable(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) | AppError::InvalidWifiUri(_) | AppError::Encode(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) | AppError::ProfileNotFound(_) | AppError::NoQrCode => {
                StatusCode::NOT_FOUND
            }
            AppError::Image(_) | AppError::Decode(_) | AppError::PasswordUnavailable(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Io(_) | AppError::Wifi(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{}", self);
        } else {
            tracing::warn!("{}", self);
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
