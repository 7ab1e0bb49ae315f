use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use anyhow::Result;

use crate::qr::encode::{ErrorCorrection, QrOptions, HexColor};
use crate::wifi::profiles::WifiBackend;

pub const CONFIG_FILE: &str = "qrgendec.toml";
pub const EXAMPLE_CONFIG_FILE: &str = "qrgendec.example.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub qr: QrConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub wifi: WifiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrConfig {
    #[serde(default)]
    pub error_correction: ErrorCorrection,
    #[serde(default = "default_box_size")]
    pub box_size: u32,
    #[serde(default = "default_border")]
    pub border: u32,
    #[serde(default = "default_dark_color")]
    pub dark_color: String,
    #[serde(default = "default_light_color")]
    pub light_color: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_true")]
    pub terminal_qr: bool,
    #[serde(default = "default_false")]
    pub open_browser: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WifiConfig {
    #[serde(default)]
    pub backend: WifiBackend,
}

// Default value functions
fn default_port() -> u16 { 8080 }
fn default_host() -> String { "127.0.0.1".to_string() }
fn default_max_upload_size() -> u64 { 20 * 1024 * 1024 } // 20MiB
fn default_box_size() -> u32 { 10 }
fn default_border() -> u32 { 4 }
fn default_dark_color() -> String { "#000000".to_string() }
fn default_light_color() -> String { "#ffffff".to_string() }
fn default_output_directory() -> PathBuf { PathBuf::from("generated_qr_images") }
fn default_file_prefix() -> String { "QRcode".to_string() }
fn default_true() -> bool { true }
fn default_false() -> bool { false }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            max_upload_size: default_max_upload_size(),
        }
    }
}

impl Default for QrConfig {
    fn default() -> Self {
        Self {
            error_correction: ErrorCorrection::default(),
            box_size: default_box_size(),
            border: default_border(),
            dark_color: default_dark_color(),
            light_color: default_light_color(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            file_prefix: default_file_prefix(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            terminal_qr: default_true(),
            open_browser: default_false(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            qr: QrConfig::default(),
            output: OutputConfig::default(),
            ui: UiConfig::default(),
            wifi: WifiConfig::default(),
        }
    }
}

impl QrConfig {
    /// Resolve the configured colours and sizes into render options.
    pub fn options(&self) -> Result<QrOptions> {
        Ok(QrOptions {
            error_correction: self.error_correction,
            box_size: self.box_size,
            border: self.border,
            dark: self.dark_color.parse::<HexColor>()?,
            light: self.light_color.parse::<HexColor>()?,
        })
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(config::Environment::with_prefix("QRGENDEC").separator("__"));

        if let Ok(port) = std::env::var("PORT") {
            builder = builder.set_override("server.port", port)?;
        }
        if let Ok(host) = std::env::var("HOST") {
            builder = builder.set_override("server.host", host)?;
        }
        if let Ok(dir) = std::env::var("QR_OUTPUT_DIR") {
            builder = builder.set_override("output.directory", dir)?;
        }

        let settings = builder.build()?;
        let config: AppConfig = settings.try_deserialize()?;
        Ok(config)
    }

    pub fn save_example() -> Result<()> {
        let example_config = AppConfig::default();
        let toml_string = toml::to_string_pretty(&example_config)?;
        std::fs::write(EXAMPLE_CONFIG_FILE, toml_string)?;
        Ok(())
    }

    pub fn from_toml(toml_content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(toml_content)?;
        Ok(config)
    }
}
