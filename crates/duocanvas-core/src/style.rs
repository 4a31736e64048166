//! Drawing defaults for the design environment.

use peniko::Color;
use peniko::color::{Srgb, parse_color};
use serde::{Deserialize, Serialize};

/// Default stroke width for new design elements.
pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;

/// Serializable RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Default for SerializableColor {
    fn default() -> Self {
        Self::new(0x1e, 0x1e, 0x1e, 255)
    }
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a CSS color string (`#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(...)`,
    /// named colors).
    pub fn parse(css: &str) -> Option<Self> {
        match parse_color(css.trim()) {
            Ok(color) => Some(color.to_alpha_color::<Srgb>().into()),
            Err(err) => {
                log::debug!("Unparseable color {:?}: {:?}", css, err);
                None
            }
        }
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}
