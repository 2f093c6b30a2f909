// This is the models module containing shared data structures
use serde::{Deserialize, Serialize};

/// Counts for one dissolve pass. `input_features - excluded_null_key` records
/// were grouped into `groups` output features.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassStats {
    pub input_features: usize,
    pub excluded_null_key: usize,
    pub groups: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeReport {
    pub input_features: usize,
    pub parcel_pass: PassStats,
    pub structure_pass: PassStats,
    pub output_features: usize,
}

/// Payload of the wasm export that returns the merged GeoJSON together with its report.
#[derive(Serialize, Deserialize)]
pub struct MergeResponse {
    pub geojson: String,
    pub report: MergeReport,
}
