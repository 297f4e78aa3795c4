//! Image encoding for export.
//!
//! This module provides functionality for:
//! - Encoding export surfaces to PNG (lossless, RGBA8)
//!
//! # Examples
//!
//! ```ignore
//! use posterlab_core::encode::encode_png;
//!
//! let pixels = vec![128u8; 100 * 100 * 4]; // Gray, opaque-ish image
//! let png_bytes = encode_png(&pixels, 100, 100).unwrap();
//! println!("Encoded {} bytes", png_bytes.len());
//! ```

mod png;

pub use png::{encode_png, EncodeError, PNG_MIME_TYPE};
