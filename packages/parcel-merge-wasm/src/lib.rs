use wasm_bindgen::prelude::*;
use serde_wasm_bindgen::to_value;

// Create a console module for logging
pub mod console;
// Merge configuration and default field tables
pub mod config;
pub mod error;
// Parcel feature model
pub mod feature;
// Per-pass field classification
pub mod field_rules;
pub mod reducers;
// Footprint union and shape metrics
pub mod geometry_union;
pub mod dissolve;
pub mod pipeline;
// GeoJSON reading/writing
pub mod geojson_io;
// Import our models
pub mod models;

#[cfg(test)]
mod test_support;

pub use config::{MergeConfig, ShapeMetricFields};
pub use error::MergeError;
pub use feature::{Feature, FeatureCollection, FieldValue};
pub use pipeline::{merge_parcel_file, MergePipeline};

use models::MergeResponse;

// Enable better panic messages in console during development
#[cfg(feature = "console_error_panic_hook")]
pub use console_error_panic_hook::set_once as set_panic_hook;

// Use the macro from our console module
#[macro_export]
macro_rules! console_log {
    ($($t:tt)*) => (crate::console::log(&format!($($t)*)))
}

use std::sync::Once;
static INIT: Once = Once::new();

// This sets up the wasm_bindgen start functionality
#[wasm_bindgen(start)]
pub fn start() {
    INIT.call_once(|| {
        // Set the panic hook for better error messages
        #[cfg(feature = "console_error_panic_hook")]
        console_error_panic_hook::set_once();

        console_log!("Parcel merge WASM module initialized");
    });
}

fn to_js_error(err: MergeError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn pipeline_from_js(config_json: Option<String>) -> Result<MergePipeline, MergeError> {
    let config = match config_json.as_deref() {
        Some(json) if !json.trim().is_empty() => MergeConfig::from_json(json)?,
        _ => MergeConfig::default(),
    };
    MergePipeline::new(config)
}

/// Merge a GeoJSON parcel layer and return the merged layer as GeoJSON text.
#[wasm_bindgen]
pub fn merge_parcel_geojson(input_json: &str, config_json: Option<String>) -> Result<String, JsValue> {
    let pipeline = pipeline_from_js(config_json).map_err(to_js_error)?;
    let collection = geojson_io::read_feature_collection(input_json).map_err(to_js_error)?;
    let merged = pipeline.merge(&collection).map_err(to_js_error)?;
    geojson_io::write_feature_collection(&merged).map_err(to_js_error)
}

/// Same as `merge_parcel_geojson` but takes raw (optionally gzipped) bytes.
#[wasm_bindgen]
pub fn merge_parcel_geojson_bytes(data: &[u8], config_json: Option<String>) -> Result<String, JsValue> {
    let pipeline = pipeline_from_js(config_json).map_err(to_js_error)?;
    let collection = geojson_io::read_feature_collection_bytes(data).map_err(to_js_error)?;
    let merged = pipeline.merge(&collection).map_err(to_js_error)?;
    geojson_io::write_feature_collection(&merged).map_err(to_js_error)
}

/// Merge and return `{ geojson, report }` so callers can audit dropped rows.
#[wasm_bindgen]
pub fn merge_parcel_geojson_with_report(
    input_json: &str,
    config_json: Option<String>,
) -> Result<JsValue, JsValue> {
    let pipeline = pipeline_from_js(config_json).map_err(to_js_error)?;
    let collection = geojson_io::read_feature_collection(input_json).map_err(to_js_error)?;
    let (merged, report) = pipeline.merge_with_report(&collection).map_err(to_js_error)?;
    let geojson = geojson_io::write_feature_collection(&merged).map_err(to_js_error)?;

    console_log!(
        "Merged {} parcel features into {}",
        report.input_features,
        report.output_features
    );
    Ok(to_value(&MergeResponse { geojson, report })?)
}

/// Default configuration as a JS object, for building custom configs.
#[wasm_bindgen]
pub fn get_default_merge_config() -> Result<JsValue, JsValue> {
    Ok(to_value(&MergeConfig::default())?)
}
