use serde::{Deserialize, Serialize};
use std::process::Command;
use std::sync::Arc;
use tracing::{debug, info};

use crate::core::error::{AppError, AppResult};
use crate::wifi::uri::{Security, WifiCredentials};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiProfile {
    pub name: String,
    pub ssid: String,
    pub security: Security,
    pub password: Option<String>,
}

impl WifiProfile {
    pub fn credentials(&self) -> WifiCredentials {
        WifiCredentials::new(self.ssid.clone(), self.security, self.password.clone())
    }
}

/// Which OS tool answers Wi-Fi profile queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WifiBackend {
    #[default]
    Auto,
    Netsh,
    Nmcli,
}

#[cfg_attr(test, mockall::automock)]
pub trait CommandRunner: Send + Sync {
    /// Run `program` and return its stdout.
    fn run(&self, program: &str, args: &[String]) -> AppResult<String>;
}

pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> AppResult<String> {
        debug!("Running {} {:?}", program, args);
        let output = Command::new(program).args(args).output().map_err(|e| {
            AppError::Wifi(format!("failed to run {}: {}", program, e))
        })?;

        if !output.status.success() {
            return Err(AppError::Wifi(failure_message(
                program,
                &output.status,
                &String::from_utf8_lossy(&output.stdout),
                &String::from_utf8_lossy(&output.stderr),
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// netsh reports errors such as unknown profiles on stdout, so fall back to it
/// when stderr is empty.
fn failure_message(program: &str, status: &dyn std::fmt::Display, stdout: &str, stderr: &str) -> String {
    let detail = match stderr.trim() {
        "" => stdout.trim(),
        stderr => stderr,
    };
    format!("{} exited with {}: {}", program, status, detail)
}

pub trait WifiProfileStore: Send + Sync {
    fn backend(&self) -> WifiBackend;

    /// Saved network profile names, sorted and de-duplicated.
    fn list_profiles(&self) -> AppResult<Vec<String>>;

    fn profile(&self, name: &str) -> AppResult<WifiProfile>;
}

pub fn open_store(backend: WifiBackend) -> Arc<dyn WifiProfileStore> {
    let runner: Box<dyn CommandRunner> = Box::new(SystemRunner);
    let resolved = match backend {
        WifiBackend::Auto if cfg!(windows) => WifiBackend::Netsh,
        WifiBackend::Auto => WifiBackend::Nmcli,
        other => other,
    };
    info!("Using {:?} for Wi-Fi profiles", resolved);
    match resolved {
        WifiBackend::Netsh => Arc::new(NetshStore::new(runner)),
        _ => Arc::new(NmcliStore::new(runner)),
    }
}

/// Look up a stored profile and turn it into shareable credentials.
pub fn share_credentials(store: &dyn WifiProfileStore, name: &str) -> AppResult<WifiCredentials> {
    let profile = store.profile(name)?;
    if profile.security != Security::Nopass && profile.password.is_none() {
        return Err(AppError::PasswordUnavailable(name.to_string()));
    }
    Ok(profile.credentials())
}

fn sorted_unique(mut names: Vec<String>) -> Vec<String> {
    names.sort();
    names.dedup();
    names
}

// Windows

pub struct NetshStore {
    runner: Box<dyn CommandRunner>,
}

impl NetshStore {
    pub fn new(runner: Box<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

impl WifiProfileStore for NetshStore {
    fn backend(&self) -> WifiBackend {
        WifiBackend::Netsh
    }

    fn list_profiles(&self) -> AppResult<Vec<String>> {
        let args = ["wlan", "show", "profiles"].map(String::from);
        let stdout = self.runner.run("netsh", &args)?;
        Ok(sorted_unique(parse_netsh_profiles(&stdout)))
    }

    fn profile(&self, name: &str) -> AppResult<WifiProfile> {
        let args = vec![
            "wlan".to_string(),
            "show".to_string(),
            "profile".to_string(),
            format!("name={}", name),
            "key=clear".to_string(),
        ];
        let stdout = match self.runner.run("netsh", &args) {
            Ok(stdout) => stdout,
            // netsh exits non-zero for unknown profiles
            Err(AppError::Wifi(msg)) if msg.contains("not found") => {
                return Err(AppError::ProfileNotFound(name.to_string()))
            }
            Err(e) => return Err(e),
        };
        parse_netsh_profile(name, &stdout)
    }
}

fn netsh_value(line: &str) -> Option<&str> {
    line.split_once(':').map(|(_, value)| value.trim())
}

pub fn parse_netsh_profiles(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter(|line| line.contains("All User Profile"))
        .filter_map(netsh_value)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}

pub fn parse_netsh_profile(name: &str, stdout: &str) -> AppResult<WifiProfile> {
    let mut ssid = None;
    let mut authentication = None;
    let mut password = None;

    for line in stdout.lines() {
        let label = line.split(':').next().unwrap_or("").trim();
        match label {
            "SSID name" => ssid = netsh_value(line).map(|v| v.trim_matches('"').to_string()),
            "Authentication" if authentication.is_none() => {
                authentication = netsh_value(line).map(String::from)
            }
            "Key Content" => password = netsh_value(line).map(String::from),
            _ => {}
        }
    }

    if ssid.is_none() && authentication.is_none() && password.is_none() {
        return Err(AppError::ProfileNotFound(name.to_string()));
    }

    let security = match authentication.as_deref() {
        Some("Open") => Security::Nopass,
        Some(auth) if auth.contains("WEP") || auth == "Shared" => Security::Wep,
        Some(_) => Security::Wpa,
        None if password.is_some() => Security::Wpa,
        None => Security::Nopass,
    };

    Ok(WifiProfile {
        name: name.to_string(),
        ssid: ssid.filter(|s| !s.is_empty()).unwrap_or_else(|| name.to_string()),
        security,
        password: password.filter(|p| !p.is_empty()),
    })
}

// NetworkManager

const NMCLI_WIRELESS_TYPE: &str = "802-11-wireless";
const NMCLI_PROFILE_FIELDS: &str = "802-11-wireless.ssid,802-11-wireless-security.key-mgmt,\
802-11-wireless-security.psk,802-11-wireless-security.wep-key0";

pub struct NmcliStore {
    runner: Box<dyn CommandRunner>,
}

impl NmcliStore {
    pub fn new(runner: Box<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

impl WifiProfileStore for NmcliStore {
    fn backend(&self) -> WifiBackend {
        WifiBackend::Nmcli
    }

    fn list_profiles(&self) -> AppResult<Vec<String>> {
        let args = ["-t", "-f", "NAME,TYPE", "connection", "show"].map(String::from);
        let stdout = self.runner.run("nmcli", &args)?;
        Ok(sorted_unique(parse_nmcli_connections(&stdout)))
    }

    fn profile(&self, name: &str) -> AppResult<WifiProfile> {
        let args = vec![
            "-s".to_string(),
            "-g".to_string(),
            NMCLI_PROFILE_FIELDS.to_string(),
            "connection".to_string(),
            "show".to_string(),
            "id".to_string(),
            name.to_string(),
        ];
        let stdout = match self.runner.run("nmcli", &args) {
            Ok(stdout) => stdout,
            Err(AppError::Wifi(msg)) if msg.contains("no such connection") => {
                return Err(AppError::ProfileNotFound(name.to_string()))
            }
            Err(e) => return Err(e),
        };
        parse_nmcli_profile(name, &stdout)
    }
}

/// Split a terse-mode line on unescaped `:` and decode `\:` / `\\`.
fn split_terse(line: &str) -> Vec<String> {
    let mut fields = vec![String::new()];
    let mut chars = line.chars();
    while let Some(c) = chars.next() {
        match c {
            ':' => fields.push(String::new()),
            _ => {
                let c = if c == '\\' { chars.next().unwrap_or(c) } else { c };
                if let Some(field) = fields.last_mut() {
                    field.push(c);
                }
            }
        }
    }
    fields
}

pub fn parse_nmcli_connections(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter_map(|line| {
            let mut fields = split_terse(line);
            if fields.len() < 2 {
                return None;
            }
            let kind = fields.pop()?;
            let name = fields.join(":");
            (kind == NMCLI_WIRELESS_TYPE && !name.is_empty()).then_some(name)
        })
        .collect()
}

/// Parse `-g ssid,key-mgmt,psk,wep-key0` output, one value per line.
pub fn parse_nmcli_profile(name: &str, stdout: &str) -> AppResult<WifiProfile> {
    let values: Vec<String> = stdout
        .lines()
        .map(|line| split_terse(line.trim()).join(":"))
        .collect();
    let value = |i: usize| values.get(i).map(String::as_str).unwrap_or("");
    let ssid = value(0).to_string();
    let key_mgmt = value(1);
    let psk = value(2);
    let wep_key = value(3);

    if ssid.is_empty() && key_mgmt.is_empty() {
        return Err(AppError::ProfileNotFound(name.to_string()));
    }

    let (security, password) = match key_mgmt {
        "" | "owe" => (Security::Nopass, None),
        "none" | "ieee8021x" => (Security::Wep, Some(wep_key)),
        _ => (Security::Wpa, Some(psk)),
    };

    Ok(WifiProfile {
        name: name.to_string(),
        ssid: if ssid.is_empty() { name.to_string() } else { ssid },
        security,
        password: password.filter(|p| !p.is_empty()).map(String::from),
    })
}
