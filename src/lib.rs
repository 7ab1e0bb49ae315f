//! qrgendec - QR code generator and decoder
//!
//! Generates QR codes from text or Wi-Fi credentials, decodes them from
//! images, and serves a small local web interface for both.

pub mod core;
pub mod qr;
pub mod utils;
pub mod web;
pub mod wifi;
pub mod cli;

// Re-export commonly used types for convenience
pub use core::{
    config::AppConfig,
    models::{DecodeReport, GeneratedQr, ServerInfo},
    error::{AppError, AppResult},
};

pub use qr::{decode_bytes, decode_file, render_png, DecodedQr, ErrorCorrection, QrOptions};

pub use utils::file::OutputDir;

pub use web::{
    routes::{create_routes, AppState},
    server::WebServer,
};

pub use wifi::{parse_wifi_uri, Security, WifiCredentials};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
