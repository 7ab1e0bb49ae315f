use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::error::{AppError, AppResult};

pub const WIFI_SCHEME: &str = "WIFI:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Security {
    #[default]
    Wpa,
    Wep,
    Nopass,
}

impl Security {
    /// Value of the `T:` field.
    pub fn as_uri_value(&self) -> &'static str {
        match self {
            Security::Wpa => "WPA",
            Security::Wep => "WEP",
            Security::Nopass => "nopass",
        }
    }
}

impl FromStr for Security {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "nopass" | "none" | "open" => Ok(Security::Nopass),
            "wep" => Ok(Security::Wep),
            // WPA2, WPA3, SAE and friends all join the same way
            _ => Ok(Security::Wpa),
        }
    }
}

impl fmt::Display for Security {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_uri_value())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiCredentials {
    pub ssid: String,
    #[serde(default)]
    pub security: Security,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub hidden: bool,
}

impl WifiCredentials {
    pub fn new(ssid: impl Into<String>, security: Security, password: Option<String>) -> Self {
        Self {
            ssid: ssid.into(),
            security,
            password,
            hidden: false,
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.ssid.is_empty() {
            return Err(AppError::InvalidInput("SSID must not be empty".to_string()));
        }
        if self.security != Security::Nopass && self.password.as_deref().unwrap_or("").is_empty() {
            return Err(AppError::InvalidInput(format!(
                "{} network '{}' needs a password",
                self.security, self.ssid
            )));
        }
        Ok(())
    }

    /// `WIFI:S:<ssid>;T:<type>;P:<password>;;`
    pub fn to_uri(&self) -> String {
        let mut uri = format!(
            "{}S:{};T:{};",
            WIFI_SCHEME,
            escape_field(&self.ssid),
            self.security.as_uri_value()
        );
        if self.security != Security::Nopass {
            if let Some(password) = &self.password {
                uri.push_str(&format!("P:{};", escape_field(password)));
            }
        }
        if self.hidden {
            uri.push_str("H:true;");
        }
        uri.push(';');
        uri
    }

    /// Text shown after scanning a Wi-Fi code.
    pub fn summary(&self) -> String {
        format!(
            "SSID: {}\nPassword: {}",
            self.ssid,
            self.password.as_deref().unwrap_or("")
        )
    }
}

impl fmt::Display for WifiCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_uri())
    }
}

impl FromStr for WifiCredentials {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_wifi_uri(s)
    }
}

pub fn is_wifi_uri(text: &str) -> bool {
    text.get(..WIFI_SCHEME.len())
        .map(|scheme| scheme.eq_ignore_ascii_case(WIFI_SCHEME))
        .unwrap_or(false)
}

pub fn parse_wifi_uri(text: &str) -> AppResult<WifiCredentials> {
    let text = text.trim();
    if !is_wifi_uri(text) {
        return Err(AppError::InvalidWifiUri("missing WIFI: prefix".to_string()));
    }

    let mut ssid = None;
    let mut security = None;
    let mut password = None;
    let mut hidden = false;

    for field in split_fields(&text[WIFI_SCHEME.len()..]) {
        if field.is_empty() {
            continue;
        }
        let Some((key, value)) = field.split_once(':') else {
            return Err(AppError::InvalidWifiUri(format!("malformed field '{}'", field)));
        };
        let value = unescape_field(value);
        match key.to_ascii_uppercase().as_str() {
            "S" => ssid = Some(value),
            "T" => security = Some(value.parse::<Security>()?),
            "P" => password = Some(value),
            "H" => hidden = value.eq_ignore_ascii_case("true"),
            // Unknown keys (e.g. WPA2-EAP identity fields) are ignored
            _ => {}
        }
    }

    let ssid = ssid
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::InvalidWifiUri("missing SSID".to_string()))?;
    let password = password.filter(|p| !p.is_empty());
    let security = security.unwrap_or(if password.is_some() {
        Security::Wpa
    } else {
        Security::Nopass
    });

    Ok(WifiCredentials {
        ssid,
        security,
        password,
        hidden,
    })
}

fn escape_field(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 4);
    for c in value.chars() {
        if matches!(c, '\\' | ';' | ',' | '"' | ':') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn unescape_field(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Split on `;` that is not preceded by an escaping backslash. Escapes are kept.
fn split_fields(body: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in body.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            ';' => {
                fields.push(&body[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if start < body.len() {
        fields.push(&body[start..]);
    }
    fields
}
