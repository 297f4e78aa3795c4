//! Image generation backed by a JavaScript callback.
//!
//! The shell passes a function `(prompt: string) => Promise<string>` that
//! calls the remote model and resolves to base64 image data.

use js_sys::{Function, Promise};
use posterlab_core::{GenerationError, ImageGenerator};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

/// [`ImageGenerator`] calling into JavaScript.
pub struct JsGenerator {
    callback: Function,
}

impl JsGenerator {
    pub fn new(callback: Function) -> Self {
        Self { callback }
    }
}

impl ImageGenerator for JsGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let returned = self
            .callback
            .call1(&JsValue::NULL, &JsValue::from_str(prompt))
            .map_err(to_generation_error)?;
        // Plain strings are accepted as already-resolved results
        let resolved = JsFuture::from(Promise::resolve(&returned))
            .await
            .map_err(to_generation_error)?;

        resolved
            .as_string()
            .ok_or_else(|| GenerationError::new("Image generator returned no image data"))
    }
}

/// Only `Error` instances carry a message worth showing.
fn to_generation_error(value: JsValue) -> GenerationError {
    match value.dyn_ref::<js_sys::Error>() {
        Some(err) => GenerationError::new(String::from(err.message())),
        None => GenerationError::unknown(),
    }
}
