//! Browser-side checks for the exported merge functions. Run with `wasm-pack test --headless`.
#![cfg(target_arch = "wasm32")]

use parcel_merge_wasm::{merge_parcel_geojson, merge_parcel_geojson_bytes};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

const CONDO_BLOCK: &str = r#"{"type": "FeatureCollection", "features": [
    {"type": "Feature", "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]]},
     "properties": {"PARID": "100", "PIN": "S1", "FMV_TOTAL": 50000}},
    {"type": "Feature", "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,1],[0,0]]]},
     "properties": {"PARID": "100", "PIN": "S1", "FMV_TOTAL": 0}},
    {"type": "Feature", "geometry": {"type": "Polygon", "coordinates": [[[1,0],[2,0],[2,1],[1,1],[1,0]]]},
     "properties": {"PARID": "200", "PIN": "S1", "FMV_TOTAL": 30000}},
    {"type": "Feature", "geometry": {"type": "Polygon", "coordinates": [[[0,1],[1,1],[1,2],[0,2],[0,1]]]},
     "properties": {"PARID": "300", "PIN": "S1", "FMV_TOTAL": 20000}}
]}"#;

#[wasm_bindgen_test]
fn merges_condo_block() {
    let output = merge_parcel_geojson(CONDO_BLOCK, None).expect("merge");
    let value: serde_json::Value = serde_json::from_str(&output).expect("json");
    let props = &value["features"][0]["properties"];
    assert_eq!(props["PARID"], "100,200,300");
    assert_eq!(props["FMV_TOTAL"], 100000);
}

#[wasm_bindgen_test]
fn honours_custom_key_fields() {
    let input = CONDO_BLOCK.replace("\"PIN\"", "\"BLDG\"");
    let output = merge_parcel_geojson(&input, Some(r#"{"structureIdField": "BLDG"}"#.to_string()))
        .expect("merge");
    let value: serde_json::Value = serde_json::from_str(&output).expect("json");
    assert_eq!(value["features"].as_array().map(Vec::len), Some(1));
}

#[wasm_bindgen_test]
fn missing_key_field_is_reported() {
    let result = merge_parcel_geojson_bytes(
        CONDO_BLOCK.as_bytes(),
        Some(r#"{"parcelIdField": "NOPE"}"#.to_string()),
    );
    assert!(result.is_err());
}
