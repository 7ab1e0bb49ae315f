//! QR code generation and decoding.

pub mod decode;
pub mod encode;

pub use decode::{decode_bytes, decode_file, decode_image, first_or_error, DecodedQr};
pub use encode::{render_png, render_terminal, save_png, ErrorCorrection, HexColor, QrOptions};
