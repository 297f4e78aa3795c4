//! Posterlab WASM - WebAssembly bindings for Posterlab
//!
//! This crate exposes the posterlab-core editing session to the browser
//! shell.
//!
//! # Module Structure
//!
//! - `session` - The `PosterSession` wrapper (generate, crop, filter, export)
//! - `generator` - Image generation through a JS promise-returning callback
//! - `download` - Browser downloads via a temporary anchor element
//! - `filters` - Filter catalog and default crop helpers
//! - `logger` - `log` output to the browser console
//!
//! # Usage
//!
//! ```typescript
//! import init, { PosterSession, filter_catalog } from '@posterlab/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const session = new PosterSession((prompt) => callModel(prompt));
//! await session.generate('a backstage concert poster');
//! ```

use wasm_bindgen::prelude::*;

mod download;
mod filters;
mod generator;
mod logger;
mod session;

// Re-export public types
pub use download::BrowserDownload;
pub use filters::{default_crop, filter_catalog, filter_names};
pub use generator::JsGenerator;
pub use logger::{init_logging, parse_level};
pub use session::PosterSession;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    logger::install(logger::DEFAULT_LEVEL);
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
