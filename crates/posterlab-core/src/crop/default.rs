//! Centered default crop.

use super::CropError;
use crate::transform::{pixel_to_percent, DisplaySize, PercentCrop, PixelCrop};
use crate::{ASPECT_RATIO, DEFAULT_CROP_WIDTH_PERCENT};

/// Compute the default crop for an image displayed at `display`.
///
/// Starts from [`DEFAULT_CROP_WIDTH_PERCENT`] of the displayed width with the
/// height derived from [`ASPECT_RATIO`]. If that height does not fit, the
/// height is clamped to the displayed height and the width re-derived. The
/// rectangle is then centered on both axes.
///
/// # Errors
///
/// Returns `CropError::InvalidDimensions` unless both sides are finite and
/// positive.
pub fn default_crop(display: DisplaySize) -> Result<PercentCrop, CropError> {
    if !display.is_valid() {
        return Err(CropError::InvalidDimensions {
            width: display.width,
            height: display.height,
        });
    }

    let mut width = display.width * DEFAULT_CROP_WIDTH_PERCENT / 100.0;
    let mut height = width / ASPECT_RATIO;
    if height > display.height {
        height = display.height;
        width = height * ASPECT_RATIO;
    }

    let rect = PixelCrop::new(
        (display.width - width) / 2.0,
        (display.height - height) / 2.0,
        width,
        height,
    );
    Ok(pixel_to_percent(&rect, display))
}


// ============================================================================
// Property-Based Tests
// ============================================================================
