use serde::{Deserialize, Serialize};

use crate::error::{MergeError, Result};

// Default field tables match the county parcel layer the tool was built for.
// Customize through MergeConfig for other datasets.

/// Fields whose highest value wins when one parcel shows up several times.
const DEFAULT_FIELDS_TO_MAX: &[&str] = &[
    "OBJECTID",
    "OBJECTID_1",
    "PARCEL_TYPE",
    "ACRE_DEEDED",
    "LAND_SQFT",
    "ACRES",
    "FMV_LAND",
    "FMV_BLDG",
    "FMV_TOTAL",
    "ASV_LAND",
    "ASV_BLDG",
    "ASV_TOTAL",
    "SHAPE.area",
    "SHAPE.len",
    "ST_NUMBER",
];

/// Fields added together when distinct parcels share one structure (stacked condos).
const DEFAULT_FIELDS_TO_SUM: &[&str] = &[
    "ACRE_DEEDED",
    "LAND_SQFT",
    "ACRES",
    "FMV_LAND",
    "FMV_BLDG",
    "FMV_TOTAL",
    "ASV_LAND",
    "ASV_BLDG",
    "ASV_TOTAL",
    "SHAPE.area",
    "SHAPE.len",
];

/// Attribute fields rewritten from the unioned geometry of merged groups.
/// Values are in planar CRS units, so only enable this for projected data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeMetricFields {
    pub area_field: Option<String>,
    pub length_field: Option<String>,
}

impl Default for ShapeMetricFields {
    fn default() -> Self {
        ShapeMetricFields {
            area_field: Some("SHAPE.area".to_string()),
            length_field: Some("SHAPE.len".to_string()),
        }
    }
}

/// Field names and aggregation tables for a merge run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MergeConfig {
    pub parcel_id_field: String,
    pub structure_id_field: String,
    pub geometry_field: String,
    pub fields_to_max: Vec<String>,
    pub fields_to_sum: Vec<String>,
    pub shape_metrics: Option<ShapeMetricFields>,
    pub parallel: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        MergeConfig {
            parcel_id_field: "PARID".to_string(),
            structure_id_field: "PIN".to_string(),
            geometry_field: "geometry".to_string(),
            fields_to_max: DEFAULT_FIELDS_TO_MAX.iter().map(|s| s.to_string()).collect(),
            fields_to_sum: DEFAULT_FIELDS_TO_SUM.iter().map(|s| s.to_string()).collect(),
            shape_metrics: None,
            parallel: true,
        }
    }
}

impl MergeConfig {
    /// Parse a JSON config; missing keys fall back to the defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: MergeConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (label, name) in [
            ("parcelIdField", &self.parcel_id_field),
            ("structureIdField", &self.structure_id_field),
            ("geometryField", &self.geometry_field),
        ] {
            if name.trim().is_empty() {
                return Err(MergeError::InvalidConfig(format!("{} must not be empty", label)));
            }
        }
        if self.parcel_id_field == self.structure_id_field {
            return Err(MergeError::InvalidConfig(format!(
                "parcel and structure id fields are both '{}'",
                self.parcel_id_field
            )));
        }
        if let Some(name) = self
            .fields_to_max
            .iter()
            .chain(self.fields_to_sum.iter())
            .find(|name| name.is_empty())
        {
            return Err(MergeError::InvalidConfig(format!(
                "aggregation tables contain an empty field name: {:?}",
                name
            )));
        }
        Ok(())
    }
}
