//! Display color derivation for cart items
//!
//! When the model doesn't supply a color for a product, one is derived from
//! the product name so repeat additions always render the same.

use md5::{Digest, Md5};

/// Minimum per-channel brightness so derived colors stay readable on white.
const CHANNEL_FLOOR: u8 = 100;

/// Derive a deterministic display color from a product name.
///
/// The first three bytes of the name's md5 digest become R/G/B, each
/// clamped to at least `CHANNEL_FLOOR`.
pub fn derive_color(name: &str) -> String {
    let digest = Md5::digest(name.as_bytes());
    let r = digest[0].max(CHANNEL_FLOOR);
    let g = digest[1].max(CHANNEL_FLOOR);
    let b = digest[2].max(CHANNEL_FLOOR);
    format!("#{:02x}{:02x}{:02x}", r, g, b)
}

/// Pick black or white text for the given background color.
///
/// Malformed input (empty, short, non-hex) defaults to black.
pub fn contrast_text(bg_color: &str) -> &'static str {
    let hex = bg_color.trim_start_matches('#').trim();
    if hex.len() < 6 {
        return "#000000";
    }

    let Some((r, g, b)) = decode_rgb(hex) else {
        return "#000000";
    };

    let luminance = (0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64) / 255.0;
    if luminance > 0.5 {
        "#000000"
    } else {
        "#FFFFFF"
    }
}

fn decode_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()?;
    let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()?;
    let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()?;
    Some((r, g, b))
}
