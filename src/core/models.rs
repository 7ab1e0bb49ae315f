use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;
use uuid::Uuid;

use crate::qr::DecodedQr;
use crate::wifi::uri::{is_wifi_uri, parse_wifi_uri, WifiCredentials};

/// A QR image saved in the output directory.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GeneratedQr {
    pub id: Uuid,
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
    pub size_human: String,
    pub modified: DateTime<Utc>,
    pub mime_type: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerInfo {
    pub name: String,
    pub ip: String,
    pub port: u16,
    pub os: String,
    pub version: String,
}

impl ServerInfo {
    /// `host` is the bind address; wildcard binds advertise the LAN address instead.
    pub fn new(host: &str, port: u16) -> Self {
        let name = hostname::get()
            .unwrap_or_else(|_| "unknown".into())
            .to_string_lossy()
            .to_string();

        let ip = match host.parse::<IpAddr>() {
            Ok(addr) if addr.is_unspecified() => local_ip_address::local_ip()
                .map(|ip| ip.to_string())
                .unwrap_or_else(|_| "127.0.0.1".to_string()),
            _ => host.to_string(),
        };

        Self {
            name,
            ip,
            port,
            os: std::env::consts::OS.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn url(&self) -> String {
        match self.ip.parse::<IpAddr>() {
            Ok(IpAddr::V6(_)) => format!("http://[{}]:{}", self.ip, self.port),
            _ => format!("http://{}:{}", self.ip, self.port),
        }
    }
}

/// Everything the decode view shows for one image.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DecodeReport {
    pub codes: Vec<DecodedQr>,
    /// Credentials from the last Wi-Fi code in the image, if any.
    pub wifi: Option<WifiCredentials>,
    pub message: String,
}

impl DecodeReport {
    pub fn new(codes: Vec<DecodedQr>) -> Self {
        let wifi = codes
            .iter()
            .rev()
            .filter(|code| is_wifi_uri(&code.content))
            .find_map(|code| parse_wifi_uri(&code.content).ok());

        let message = if codes.is_empty() {
            "No QR Code detected.".to_string()
        } else if let Some(creds) = &wifi {
            match creds.password {
                Some(_) => format!("{}\nPassword copied to clipboard.", creds.summary()),
                None => creds.summary(),
            }
        } else {
            let contents: Vec<&str> = codes.iter().map(|c| c.content.as_str()).collect();
            format!("Decoded QR Code: {}\nData copied to clipboard.", contents.join("\n"))
        };

        Self { codes, wifi, message }
    }

    /// Text that belongs on the clipboard: the Wi-Fi password, else the decoded data.
    pub fn clipboard_text(&self) -> Option<String> {
        if let Some(creds) = &self.wifi {
            return creds.password.clone();
        }
        self.codes.last().map(|c| c.content.clone())
    }
}
