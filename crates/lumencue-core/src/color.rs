//! Fixed-point HSV <-> RGB conversion
//!
//! Value and saturation are 8-bit (0-255). Hue is scaled by [`HUEDEGREE`] so the
//! full circle spans `360 * HUEDEGREE` integer units, giving sub-degree
//! precision without floating point. All arithmetic is 64-bit with truncating
//! division; the pixel compositor depends on the exact truncation behavior.

use serde::{Deserialize, Serialize};

/// Integer hue units per degree
pub const HUEDEGREE: i64 = 512;

/// Hue units per 60 degree sector
const SECTOR: i64 = 60 * HUEDEGREE;

/// Hue units in the full circle
pub const HUE_CIRCLE: i64 = 360 * HUEDEGREE;

/// Hue returned by [`rgb_to_hsv`] for achromatic (grey) input
pub const HUE_UNDEFINED: i64 = -1;

/// An 8-bit RGB triple, one pixel of a frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
}

impl Rgb {
    /// Black
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    /// Create a new color
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert a fixed-point HSV color, clamping each channel into a byte
    pub fn from_hsv(hue: i64, saturation: i64, value: i64) -> Self {
        let (r, g, b) = hsv_to_rgb(hue, saturation, value);
        Self {
            r: clamp_channel(r),
            g: clamp_channel(g),
            b: clamp_channel(b),
        }
    }

    /// Channel-wise addition that clamps at 255 instead of wrapping
    #[inline]
    pub fn saturating_add(self, other: Rgb) -> Rgb {
        Rgb {
            r: self.r.saturating_add(other.r),
            g: self.g.saturating_add(other.g),
            b: self.b.saturating_add(other.b),
        }
    }

    /// Channels as a `[r, g, b]` array
    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

fn clamp_channel(c: i64) -> u8 {
    c.clamp(0, 255) as u8
}

/// Convert RGB to fixed-point HSV
///
/// Returns `(hue, saturation, value)`. For grey input the hue is
/// [`HUE_UNDEFINED`] and the saturation is 0.
pub fn rgb_to_hsv(r: i64, g: i64, b: i64) -> (i64, i64, i64) {
    let min = r.min(g).min(b);
    let max = r.max(g).max(b);
    let delta = max - min;

    if delta == 0 {
        return (HUE_UNDEFINED, 0, max);
    }

    let mut hue = if r == max {
        ((g - b) * SECTOR) / delta
    } else if g == max {
        ((b - r) * SECTOR) / delta + 120 * HUEDEGREE
    } else {
        ((r - g) * SECTOR) / delta + 240 * HUEDEGREE
    };
    if hue < 0 {
        hue += HUE_CIRCLE;
    }

    // The -8 bias minimizes mismatches on an RGB -> HSV -> RGB round trip.
    let saturation = (256 * delta - 8) / max;

    (hue, saturation, max)
}

/// Convert fixed-point HSV to RGB
///
/// Hue outside `[0, HUE_CIRCLE)` is reduced onto the circle first. Channels are
/// returned unclamped; use [`Rgb::from_hsv`] for byte output.
pub fn hsv_to_rgb(hue: i64, saturation: i64, value: i64) -> (i64, i64, i64) {
    if saturation == 0 {
        return (value, value, value);
    }

    let h = hue.rem_euclid(HUE_CIRCLE);
    let s = saturation;
    let v = value;
    let i = h / SECTOR;
    let p = (256 * v - s * v) / 256;

    if i & 1 != 0 {
        let q = (256 * SECTOR * v - h * s * v + SECTOR * s * v * i) / (256 * SECTOR);
        match i {
            1 => (q, v, p),
            3 => (p, q, v),
            _ => (v, p, q),
        }
    } else {
        let t = (256 * SECTOR * v + h * s * v - SECTOR * s * v * (i + 1)) / (256 * SECTOR);
        match i {
            0 => (v, t, p),
            2 => (p, v, t),
            _ => (t, p, v),
        }
    }
}
