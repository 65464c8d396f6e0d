// File: wearview-common/src/models/color.rs

use serde::{Deserialize, Serialize};

pub const DEFAULT_SKIN_COLOR: &str = "#cc9b76";
pub const DEFAULT_HAIR_COLOR: &str = "#000000";
pub const DEFAULT_EYE_COLOR: &str = "#000000";

/// Float RGB color as stored in avatar profiles, each channel in 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct Color3 {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color3 {
    /// Converts to a `#rrggbb` hex string, clamping each channel.
    pub fn to_hex(&self) -> String {
        let to_byte = |v: f64| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02x}{:02x}{:02x}",
            to_byte(self.r),
            to_byte(self.g),
            to_byte(self.b)
        )
    }
}

/// Profiles wrap their colors in a `{ "color": { r, g, b } }` object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct WrappedColor {
    pub color: Color3,
}

/// Normalizes user-supplied hex to `#rrggbb`, accepting the bare
/// `rrggbb` form. Returns `None` for anything else.
pub fn normalize_hex(input: &str) -> Option<String> {
    let hex = input.strip_prefix('#').unwrap_or(input);
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    Some(format!("#{}", hex.to_lowercase()))
}
