//! Coordinate transforms and region drawing.
//!
//! # Coordinate System
//!
//! - Displayed space: pixels of the image as rendered in the viewport
//! - Native space: pixels of the decoded image at its intrinsic resolution
//! - Percent crops are 0.0 to 100.0 relative to the displayed size
//! - Origin is top-left corner
//!
//! Export converts the committed displayed-space crop to native space with
//! independent X/Y scale factors, then draws that region with
//! [`draw_region`].

mod coords;
mod region;

pub use coords::{
    from_native, percent_to_pixel, pixel_to_percent, to_native, Crop, DisplaySize,
    ImageDimensions, PercentCrop, PixelCrop,
};
pub use region::draw_region;
