//! Minimal ICO container writer.
//!
//! The ICO format accepts a PNG-compressed image as a directory entry
//! (Vista and later), so a fetched favicon PNG can be wrapped verbatim
//! without re-encoding. Only the PNG header is parsed, for dimensions.

use thiserror::Error;

/// PNG file signature.
const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// ICONDIR (6 bytes) + one ICONDIRENTRY (16 bytes).
const ICO_HEADER_LEN: usize = 22;

/// Largest dimension an ICO directory entry can describe.
const MAX_DIMENSION: u32 = 256;

/// Errors wrapping a PNG into an ICO container.
#[derive(Debug, Error)]
pub enum IcoWrapError {
    /// Input does not start with a PNG signature / IHDR chunk.
    #[error("input is not a PNG image")]
    NotPng,
    /// Image dimensions do not fit an ICO directory entry (1..=256).
    #[error("PNG dimensions {width}x{height} do not fit an ICO entry")]
    UnsupportedDimensions { width: u32, height: u32 },
}

/// Wraps `png` bytes into a single-image ICO container.
///
/// # Errors
///
/// Returns [`IcoWrapError`] when the input is not a PNG or its dimensions
/// exceed what an ICO entry can express.
#[allow(clippy::cast_possible_truncation)]
pub fn wrap_png_in_ico(png: &[u8]) -> Result<Vec<u8>, IcoWrapError> {
    let (width, height) = png_dimensions(png)?;
    if !(1..=MAX_DIMENSION).contains(&width) || !(1..=MAX_DIMENSION).contains(&height) {
        return Err(IcoWrapError::UnsupportedDimensions { width, height });
    }

    let mut ico = Vec::with_capacity(ICO_HEADER_LEN + png.len());
    // ICONDIR: reserved, type (1 = icon), image count.
    ico.extend_from_slice(&0u16.to_le_bytes());
    ico.extend_from_slice(&1u16.to_le_bytes());
    ico.extend_from_slice(&1u16.to_le_bytes());
    // ICONDIRENTRY: a dimension byte of 0 means 256.
    ico.push((width % MAX_DIMENSION) as u8);
    ico.push((height % MAX_DIMENSION) as u8);
    ico.push(0); // palette size
    ico.push(0); // reserved
    ico.extend_from_slice(&1u16.to_le_bytes()); // color planes
    ico.extend_from_slice(&32u16.to_le_bytes()); // bits per pixel
    ico.extend_from_slice(&(png.len() as u32).to_le_bytes());
    ico.extend_from_slice(&(ICO_HEADER_LEN as u32).to_le_bytes());
    ico.extend_from_slice(png);
    Ok(ico)
}

/// Reads width and height out of a PNG IHDR chunk.
fn png_dimensions(png: &[u8]) -> Result<(u32, u32), IcoWrapError> {
    if png.len() < 24 || png[..8] != PNG_SIGNATURE || &png[12..16] != b"IHDR" {
        return Err(IcoWrapError::NotPng);
    }
    let width = u32::from_be_bytes([png[16], png[17], png[18], png[19]]);
    let height = u32::from_be_bytes([png[20], png[21], png[22], png[23]]);
    Ok((width, height))
}
