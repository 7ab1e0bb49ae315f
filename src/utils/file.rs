use chrono::{DateTime, Utc};
use humansize::{format_size, BINARY};
use mime_guess::from_path;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::info;
use uuid::Uuid;

use crate::core::error::{AppError, AppResult};
use crate::core::models::GeneratedQr;
use crate::qr::encode::{save_png, QrOptions};

const PNG_EXTENSION: &str = "png";

/// Directory that numbered QR images are written to.
#[derive(Debug, Clone)]
pub struct OutputDir {
    root: PathBuf,
    prefix: String,
    // Serialises numbering so concurrent saves never pick the same index
    lock: Arc<Mutex<()>>,
}

impl OutputDir {
    pub fn new(root: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            prefix: prefix.into(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn index_of(&self, file_name: &str) -> Option<u64> {
        file_name
            .strip_suffix(".png")?
            .strip_prefix(&self.prefix)?
            .strip_prefix('_')?
            .parse()
            .ok()
    }

    /// `<prefix>_<n>.png`, one past the highest index already on disk.
    pub fn next_path(&self) -> AppResult<PathBuf> {
        let mut highest = 0;
        if self.root.is_dir() {
            for entry in std::fs::read_dir(&self.root)? {
                let entry = entry?;
                if let Some(n) = entry.file_name().to_str().and_then(|name| self.index_of(name)) {
                    highest = highest.max(n);
                }
            }
        }
        Ok(self.root.join(format!("{}_{}.{}", self.prefix, highest + 1, PNG_EXTENSION)))
    }

    pub fn save(&self, data: &str, options: &QrOptions) -> AppResult<GeneratedQr> {
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let path = self.next_path()?;
        save_png(data, options, &path)?;
        let generated = get_file_info(&path)?;
        info!("Generated QR code {} ({})", generated.name, generated.size_human);
        Ok(generated)
    }

    /// Generated images, sorted by name.
    pub fn list(&self) -> AppResult<Vec<GeneratedQr>> {
        let mut files = Vec::new();

        if !self.root.exists() {
            return Ok(files);
        }

        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            let is_png = path
                .extension()
                .map(|ext| ext.eq_ignore_ascii_case(PNG_EXTENSION))
                .unwrap_or(false);
            if path.is_file() && is_png {
                if let Ok(file_info) = get_file_info(&path) {
                    files.push(file_info);
                }
            }
        }

        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }

    pub fn find(&self, id: &str) -> AppResult<GeneratedQr> {
        self.list()?
            .into_iter()
            .find(|f| f.id.to_string() == id)
            .ok_or_else(|| AppError::NotFound(format!("QR image {}", id)))
    }
}

/// File name for a shared network's code, with path-unsafe characters replaced.
pub fn wifi_file_name(ssid: &str) -> String {
    let safe: String = ssid
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let safe = safe.trim_matches(|c: char| c == '.' || c.is_whitespace());
    let safe = if safe.is_empty() { "wifi" } else { safe };
    format!("{}_qrcode.{}", safe, PNG_EXTENSION)
}

pub fn get_file_info(path: &Path) -> AppResult<GeneratedQr> {
    let metadata = std::fs::metadata(path)?;
    let name = path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown")
        .to_string();

    // Deterministic id from the path so links survive restarts
    let mut hasher = DefaultHasher::new();
    path.to_string_lossy().hash(&mut hasher);
    let hash = hasher.finish();
    let mut uuid_bytes = [0u8; 16];
    uuid_bytes[..8].copy_from_slice(&hash.to_be_bytes());
    let id = Uuid::from_bytes(uuid_bytes);

    let size = metadata.len();

    Ok(GeneratedQr {
        id,
        name,
        size,
        size_human: format_size(size, BINARY),
        modified: DateTime::<Utc>::from(metadata.modified()?),
        mime_type: from_path(path).first_or_octet_stream().to_string(),
        path: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;
    use rstest::rstest;
    use tempfile::TempDir;

    fn output_dir(temp_dir: &TempDir) -> OutputDir {
        OutputDir::new(temp_dir.path().join("generated_qr_images"), "QRcode")
    }

    #[test]
    fn test_first_path_starts_at_one() {
        let temp_dir = TempDir::new().unwrap();
        let dir = output_dir(&temp_dir);
        let path = dir.next_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "QRcode_1.png");
    }

    #[test]
    fn test_save_numbers_sequentially() {
        let temp_dir = TempDir::new().unwrap();
        let dir = output_dir(&temp_dir);
        let pattern = Regex::new(r"^QRcode_\d+\.png$").unwrap();

        let first = dir.save("one", &QrOptions::default()).unwrap();
        let second = dir.save("two", &QrOptions::default()).unwrap();

        assert_eq!(first.name, "QRcode_1.png");
        assert_eq!(second.name, "QRcode_2.png");
        assert!(pattern.is_match(&second.name));
        assert_eq!(first.mime_type, "image/png");
        assert!(first.size > 0);
    }

    #[test]
    fn test_numbering_continues_after_gap_and_restart() {
        let temp_dir = TempDir::new().unwrap();
        let dir = output_dir(&temp_dir);
        std::fs::create_dir_all(dir.root()).unwrap();
        std::fs::write(dir.root().join("QRcode_7.png"), b"x").unwrap();
        std::fs::write(dir.root().join("QRcode_x.png"), b"x").unwrap();
        std::fs::write(dir.root().join("Other_40.png"), b"x").unwrap();

        let reopened = output_dir(&temp_dir);
        assert_eq!(reopened.next_path().unwrap().file_name().unwrap(), "QRcode_8.png");
    }

    #[test]
    fn test_list_only_png_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let dir = output_dir(&temp_dir);
        dir.save("b", &QrOptions::default()).unwrap();
        dir.save("a", &QrOptions::default()).unwrap();
        std::fs::write(dir.root().join("notes.txt"), b"x").unwrap();
        std::fs::create_dir(dir.root().join("sub.png")).unwrap();

        let names: Vec<String> = dir.list().unwrap().into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["QRcode_1.png", "QRcode_2.png"]);
    }

    #[test]
    fn test_list_missing_directory() {
        let dir = OutputDir::new("/nonexistent/directory", "QRcode");
        assert!(dir.list().unwrap().is_empty());
    }

    #[test]
    fn test_find_by_id() {
        let temp_dir = TempDir::new().unwrap();
        let dir = output_dir(&temp_dir);
        let saved = dir.save("find me", &QrOptions::default()).unwrap();

        let found = dir.find(&saved.id.to_string()).unwrap();
        assert_eq!(found.path, saved.path);
        assert!(matches!(dir.find("nope"), Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_deterministic_id() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("QRcode_1.png");
        std::fs::write(&path, b"png").unwrap();

        assert_eq!(get_file_info(&path).unwrap().id, get_file_info(&path).unwrap().id);
    }

    #[rstest]
    #[case("HomeNet", "HomeNet_qrcode.png")]
    #[case("../etc/passwd", "_etc_passwd_qrcode.png")]
    #[case("a:b|c", "a_b_c_qrcode.png")]
    #[case("  ", "wifi_qrcode.png")]
    #[case("Café 5G", "Café 5G_qrcode.png")]
    fn test_wifi_file_name(#[case] ssid: &str, #[case] expected: &str) {
        assert_eq!(wifi_file_name(ssid), expected);
    }
}
