//! Decoding of generated images.
//!
//! This module provides functionality for:
//! - Decoding the base64 payload returned by the generation collaborator
//! - Holding decoded pixels as an RGBA [`Raster`]
//!
//! # Examples
//!
//! ```ignore
//! use posterlab_core::decode::decode_base64_image;
//!
//! let image = decode_base64_image(&payload)?;
//! println!("Decoded {}x{} image", image.width, image.height);
//! ```

mod payload;
mod types;

pub use payload::{decode_base64_image, decode_image};
pub use types::{DecodeError, Raster};
