//! Displayed/native coordinate conversions.
//!
//! Crop rectangles are edited in *displayed* space (the size the image is
//! rendered at in the viewport) and exported in *native* space (the decoded
//! raster's intrinsic size). Percentage rectangles are relative to the
//! displayed size, 0.0 to 100.0 on each axis.
//!
//! Every function here is pure. Callers check [`DisplaySize::is_valid`]
//! before converting; a zero displayed size has no meaningful scale.

use serde::{Deserialize, Serialize};

/// Rendered size of the image element in the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplaySize {
    pub width: f64,
    pub height: f64,
}

impl DisplaySize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both sides finite and strictly positive.
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Displayed and native dimensions of one loaded image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageDimensions {
    pub displayed: DisplaySize,
    pub native_width: u32,
    pub native_height: u32,
}

impl ImageDimensions {
    pub fn new(displayed: DisplaySize, native_width: u32, native_height: u32) -> Self {
        Self {
            displayed,
            native_width,
            native_height,
        }
    }

    /// Independent `(sx, sy)` factors taking displayed pixels to native pixels.
    pub fn scale_factors(&self) -> (f64, f64) {
        (
            self.native_width as f64 / self.displayed.width,
            self.native_height as f64 / self.displayed.height,
        )
    }
}

/// Crop rectangle in percent of the displayed size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PercentCrop {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PercentCrop {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Crop rectangle in pixels, either displayed or native space depending on
/// where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelCrop {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelCrop {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Zero (or negative) area. Valid mid-drag, never exportable.
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// Width over height. Meaningless for degenerate rectangles.
    pub fn aspect(&self) -> f64 {
        self.width / self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// A crop in either unit system, as delivered by the interaction layer.
///
/// Serialized with a `unit` tag of `"%"` or `"px"`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit")]
pub enum Crop {
    #[serde(rename = "%")]
    Percent(PercentCrop),
    #[serde(rename = "px")]
    Pixel(PixelCrop),
}

impl Crop {
    /// Resolve to displayed-space pixels.
    pub fn to_pixel(&self, display: DisplaySize) -> PixelCrop {
        match self {
            Crop::Percent(rect) => percent_to_pixel(rect, display),
            Crop::Pixel(rect) => *rect,
        }
    }

    /// Resolve to percent of the displayed size.
    pub fn to_percent(&self, display: DisplaySize) -> PercentCrop {
        match self {
            Crop::Percent(rect) => *rect,
            Crop::Pixel(rect) => pixel_to_percent(rect, display),
        }
    }
}

/// `x = x% / 100 * displayed_width`, and likewise for the other fields.
pub fn percent_to_pixel(rect: &PercentCrop, display: DisplaySize) -> PixelCrop {
    PixelCrop {
        x: rect.x / 100.0 * display.width,
        y: rect.y / 100.0 * display.height,
        width: rect.width / 100.0 * display.width,
        height: rect.height / 100.0 * display.height,
    }
}

/// Inverse of [`percent_to_pixel`].
pub fn pixel_to_percent(rect: &PixelCrop, display: DisplaySize) -> PercentCrop {
    PercentCrop {
        x: rect.x / display.width * 100.0,
        y: rect.y / display.height * 100.0,
        width: rect.width / display.width * 100.0,
        height: rect.height / display.height * 100.0,
    }
}

/// Scale a displayed-space rectangle into native space.
pub fn to_native(rect: &PixelCrop, dims: &ImageDimensions) -> PixelCrop {
    let (sx, sy) = dims.scale_factors();
    PixelCrop {
        x: rect.x * sx,
        y: rect.y * sy,
        width: rect.width * sx,
        height: rect.height * sy,
    }
}

/// Scale a native-space rectangle back into displayed space.
pub fn from_native(rect: &PixelCrop, dims: &ImageDimensions) -> PixelCrop {
    let (sx, sy) = dims.scale_factors();
    PixelCrop {
        x: rect.x / sx,
        y: rect.y / sy,
        width: rect.width / sx,
        height: rect.height / sy,
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
