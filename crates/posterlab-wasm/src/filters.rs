//! Filter catalog and crop helper bindings.

use posterlab_core::{catalog, Crop, DisplaySize};
use wasm_bindgen::prelude::*;

/// Filter names in display order, for building the filter bar.
#[wasm_bindgen]
pub fn filter_names() -> Vec<String> {
    catalog().iter().map(|f| f.name.to_string()).collect()
}

/// The full catalog as `[{ name, directive }, ...]`.
///
/// The directive doubles as a CSS `filter` value for the live preview.
#[wasm_bindgen]
pub fn filter_catalog() -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(catalog()).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Centered default crop for an image displayed at `width` x `height`.
#[wasm_bindgen]
pub fn default_crop(width: f64, height: f64) -> Result<JsValue, JsValue> {
    let crop = posterlab_core::default_crop(DisplaySize::new(width, height))
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    serde_wasm_bindgen::to_value(&Crop::Percent(crop)).map_err(|e| JsValue::from_str(&e.to_string()))
}
