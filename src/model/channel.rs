//! Channel descriptions and the LUT-derived color/priority.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// An RGBA color with 8 bits per component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::opaque(255, 255, 255);

    /// Creates a fully opaque color.
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Packs the color as a signed RGBA integer (red in the top byte).
    pub fn to_rgba_i32(self) -> i32 {
        i32::from_be_bytes([self.r, self.g, self.b, self.a])
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

/// One `ChannelDescription` of an image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub channel_tag: i32,
    pub resolution: i32,
    pub min: f64,
    pub max: f64,
    pub unit: String,
    pub lut_name: String,
    pub bytes_inc: u64,

    /// Display color derived from `lut_name`.
    pub lut_color: Rgba,

    /// Ordering rank derived from `lut_name` (0 = red ... 7 = gray, 8 = unknown).
    pub priority: u8,
}

impl Channel {
    /// Creates a channel, deriving color and priority from the LUT name.
    pub fn new(
        channel_tag: i32,
        resolution: i32,
        min: f64,
        max: f64,
        unit: impl Into<String>,
        lut_name: impl Into<String>,
        bytes_inc: u64,
    ) -> Self {
        let lut_name = lut_name.into();
        Self {
            channel_tag,
            resolution,
            min,
            max,
            unit: unit.into(),
            lut_color: lut_color(&lut_name),
            priority: channel_priority(&lut_name),
            lut_name,
            bytes_inc,
        }
    }
}

fn gradient_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?i)Gradient\((\d+),(\d+),(\d+)\)").ok())
        .as_ref()
}

/// Translates a LUT name into a display color.
///
/// `Gradient(r,g,b)` LUTs yield `(b, g, r, 255)`; the components are stored
/// in reverse order. Named LUTs map case-insensitively onto primaries;
/// everything else is white.
pub fn lut_color(lut_name: &str) -> Rgba {
    let compact: String = lut_name.chars().filter(|c| !c.is_whitespace()).collect();

    if let Some(captures) = gradient_pattern().and_then(|pattern| pattern.captures(&compact)) {
        let component = |idx: usize| -> u8 {
            captures
                .get(idx)
                .and_then(|m| m.as_str().parse::<u32>().ok())
                .map(|v| v.min(255) as u8)
                .unwrap_or(0)
        };
        return Rgba::opaque(component(3), component(2), component(1));
    }

    match compact.to_lowercase().as_str() {
        "red" => Rgba::opaque(255, 0, 0),
        "green" => Rgba::opaque(0, 255, 0),
        "blue" => Rgba::opaque(0, 0, 255),
        "cyan" => Rgba::opaque(0, 255, 255),
        "magenta" => Rgba::opaque(255, 0, 255),
        "yellow" => Rgba::opaque(255, 255, 0),
        _ => Rgba::WHITE,
    }
}

/// Ranks a LUT name for channel ordering. Matching is exact.
pub fn channel_priority(lut_name: &str) -> u8 {
    match lut_name {
        "red" => 0,
        "green" => 1,
        "blue" => 2,
        "cyan" => 3,
        "magenta" => 4,
        "yellow" => 5,
        "black" => 6,
        "gray" => 7,
        _ => 8,
    }
}
