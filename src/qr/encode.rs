use image::{ImageOutputFormat, RgbImage};
use qrcode::render::unicode;
use qrcode::{Color, EcLevel, QrCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Cursor;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

use crate::core::error::{AppError, AppResult};

/// QR error correction level, from roughly 7% (L) to 30% (H) recoverable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ErrorCorrection {
    #[default]
    L,
    M,
    Q,
    H,
}

impl ErrorCorrection {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCorrection::L => "L",
            ErrorCorrection::M => "M",
            ErrorCorrection::Q => "Q",
            ErrorCorrection::H => "H",
        }
    }
}

impl From<ErrorCorrection> for EcLevel {
    fn from(level: ErrorCorrection) -> Self {
        match level {
            ErrorCorrection::L => EcLevel::L,
            ErrorCorrection::M => EcLevel::M,
            ErrorCorrection::Q => EcLevel::Q,
            ErrorCorrection::H => EcLevel::H,
        }
    }
}

impl FromStr for ErrorCorrection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "L" | "LOW" => Ok(ErrorCorrection::L),
            "M" | "MEDIUM" => Ok(ErrorCorrection::M),
            "Q" | "QUARTILE" => Ok(ErrorCorrection::Q),
            "H" | "HIGH" => Ok(ErrorCorrection::H),
            other => Err(AppError::InvalidInput(format!(
                "unknown error correction level '{}', expected L, M, Q or H",
                other
            ))),
        }
    }
}

impl TryFrom<String> for ErrorCorrection {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ErrorCorrection> for String {
    fn from(level: ErrorCorrection) -> Self {
        level.as_str().to_string()
    }
}

impl fmt::Display for ErrorCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An sRGB colour written as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HexColor(pub [u8; 3]);

impl HexColor {
    pub const BLACK: HexColor = HexColor([0, 0, 0]);
    pub const WHITE: HexColor = HexColor([0xff, 0xff, 0xff]);
}

impl FromStr for HexColor {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AppError::InvalidInput(format!("invalid colour '{}', expected #rrggbb", s));
        let hex = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let mut rgb = [0u8; 3];
        for (i, channel) in rgb.iter_mut().enumerate() {
            *channel = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).map_err(|_| invalid())?;
        }
        Ok(HexColor(rgb))
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{:02x}{:02x}{:02x}", r, g, b)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrOptions {
    pub error_correction: ErrorCorrection,
    /// Pixels per module.
    pub box_size: u32,
    /// Quiet zone width, in modules.
    pub border: u32,
    pub dark: HexColor,
    pub light: HexColor,
}

impl Default for QrOptions {
    fn default() -> Self {
        Self {
            error_correction: ErrorCorrection::L,
            box_size: 10,
            border: 4,
            dark: HexColor::BLACK,
            light: HexColor::WHITE,
        }
    }
}

/// Build the smallest QR symbol that holds `data` at the requested level.
pub fn encode_matrix(data: &str, level: ErrorCorrection) -> AppResult<QrCode> {
    if data.is_empty() {
        return Err(AppError::InvalidInput("nothing to encode".to_string()));
    }
    let code = QrCode::with_error_correction_level(data.as_bytes(), level.into())?;
    debug!("Encoded {} bytes as {:?} at level {}", data.len(), code.version(), level);
    Ok(code)
}

/// Largest rendered side in pixels.
pub const MAX_IMAGE_SIDE: u32 = 16_384;

pub fn render_image(data: &str, options: &QrOptions) -> AppResult<RgbImage> {
    if options.box_size == 0 {
        return Err(AppError::InvalidInput("box size must be at least 1".to_string()));
    }
    let code = encode_matrix(data, options.error_correction)?;
    let modules = code.width() as u32;
    let side = options
        .border
        .checked_mul(2)
        .and_then(|border| border.checked_add(modules))
        .and_then(|span| span.checked_mul(options.box_size))
        .filter(|&side| side <= MAX_IMAGE_SIDE)
        .ok_or_else(|| {
            AppError::InvalidInput(format!(
                "image would be wider than {} pixels; lower the box size or border",
                MAX_IMAGE_SIDE
            ))
        })?;

    let mut img = RgbImage::from_pixel(side, side, image::Rgb(options.light.0));
    let dark = image::Rgb(options.dark.0);

    for (index, color) in code.to_colors().into_iter().enumerate() {
        if color != Color::Dark {
            continue;
        }
        let mx = index as u32 % modules + options.border;
        let my = index as u32 / modules + options.border;
        for dy in 0..options.box_size {
            for dx in 0..options.box_size {
                img.put_pixel(mx * options.box_size + dx, my * options.box_size + dy, dark);
            }
        }
    }

    Ok(img)
}

pub fn render_png(data: &str, options: &QrOptions) -> AppResult<Vec<u8>> {
    let img = render_image(data, options)?;
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(img).write_to(&mut Cursor::new(&mut buf), ImageOutputFormat::Png)?;
    Ok(buf)
}

pub fn save_png(data: &str, options: &QrOptions, path: &Path) -> AppResult<()> {
    let png = render_png(data, options)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, png)?;
    debug!("Wrote QR image to {:?}", path);
    Ok(())
}

/// Render with Unicode half blocks, light-on-dark so it scans from a dark terminal.
pub fn render_terminal(data: &str) -> AppResult<String> {
    let code = encode_matrix(data, ErrorCorrection::L)?;
    let qr = code
        .render::<unicode::Dense1x2>()
        .dark_color(unicode::Dense1x2::Light)
        .light_color(unicode::Dense1x2::Dark)
        .build();
    Ok(qr)
}
