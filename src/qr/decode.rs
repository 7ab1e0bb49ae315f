use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

use crate::core::error::{AppError, AppResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedQr {
    pub content: String,
    pub version: usize,
    pub ecc_level: u16,
    /// Corner points in image pixels, clockwise from top-left.
    pub bounds: [(i32, i32); 4],
}

/// Detect and decode every QR code in the image.
pub fn decode_image(img: &DynamicImage) -> Vec<DecodedQr> {
    let luma = img.to_luma8();
    let (width, height) = luma.dimensions();
    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
        width as usize,
        height as usize,
        |x, y| luma.get_pixel(x as u32, y as u32).0[0],
    );

    let grids = prepared.detect_grids();
    debug!("Detected {} QR grid(s) in {}x{} image", grids.len(), width, height);

    grids
        .into_iter()
        .filter_map(|grid| {
            let bounds: [(i32, i32); 4] =
                std::array::from_fn(|i| (grid.bounds[i].x, grid.bounds[i].y));
            match grid.decode() {
                Ok((meta, content)) => Some(DecodedQr {
                    content,
                    version: meta.version.0,
                    ecc_level: meta.ecc_level,
                    bounds,
                }),
                Err(e) => {
                    warn!("Skipping undecodable QR grid at {:?}: {}", bounds, e);
                    None
                }
            }
        })
        .collect()
}

pub fn decode_bytes(bytes: &[u8]) -> AppResult<Vec<DecodedQr>> {
    let img = image::load_from_memory(bytes)?;
    Ok(decode_image(&img))
}

pub fn decode_file(path: &Path) -> AppResult<Vec<DecodedQr>> {
    if !path.is_file() {
        return Err(AppError::NotFound(path.display().to_string()));
    }
    let img = image::open(path)?;
    Ok(decode_image(&img))
}

pub fn first_or_error(codes: Vec<DecodedQr>) -> AppResult<DecodedQr> {
    codes.into_iter().next().ok_or(AppError::NoQrCode)
}
