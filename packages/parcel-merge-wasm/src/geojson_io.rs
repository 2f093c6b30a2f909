// GeoJSON reader/writer for parcel layers. Geometry goes through geozero into
// geo-types; attribute rows are plain serde_json maps.
use flate2::read::GzDecoder;
use geo_types::{Geometry, MultiPolygon};
use geozero::geojson::GeoJson;
use geozero::{ToGeo, ToJson};
use serde_json::{json, Map, Value};
use std::io::Read;

use crate::console_log;
use crate::error::{MergeError, Result};
use crate::feature::{Feature, FeatureCollection, FieldValue};

// Function to detect if data is gzipped (checking for gzip magic number)
fn is_gzipped(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0x1F && data[1] == 0x8B
}

/// Read a GeoJSON document from raw bytes, inflating it first when gzipped.
pub fn read_feature_collection_bytes(data: &[u8]) -> Result<FeatureCollection> {
    if is_gzipped(data) {
        console_log!("Detected gzipped GeoJSON, decompressing...");
        let mut decoder = GzDecoder::new(data);
        let mut text = String::new();
        decoder.read_to_string(&mut text)?;
        return read_feature_collection(&text);
    }

    let text = std::str::from_utf8(data)
        .map_err(|e| MergeError::InvalidInput(format!("GeoJSON is not valid UTF-8: {}", e)))?;
    read_feature_collection(text)
}

/// Parse a GeoJSON `FeatureCollection` (or a bare array of features).
pub fn read_feature_collection(geojson: &str) -> Result<FeatureCollection> {
    let document: Value = serde_json::from_str(geojson)?;
    let raw_features = match &document {
        Value::Array(features) => features,
        Value::Object(obj) => match (obj.get("type").and_then(Value::as_str), obj.get("features")) {
            (Some("FeatureCollection"), Some(Value::Array(features))) => features,
            _ => {
                return Err(MergeError::InvalidInput(
                    "expected a GeoJSON FeatureCollection".to_string(),
                ))
            }
        },
        _ => {
            return Err(MergeError::InvalidInput(
                "expected a GeoJSON FeatureCollection".to_string(),
            ))
        }
    };

    let features = raw_features
        .iter()
        .enumerate()
        .map(|(index, raw)| parse_feature(index, raw))
        .collect::<Result<Vec<_>>>()?;

    console_log!("Parsed {} parcel features from GeoJSON", features.len());
    Ok(FeatureCollection::new(features))
}

fn parse_feature(index: usize, raw: &Value) -> Result<Feature> {
    let geometry = match raw.get("geometry") {
        None | Some(Value::Null) => MultiPolygon::new(Vec::new()),
        Some(geometry) => {
            let text = geometry.to_string();
            let decoded = GeoJson(&text).to_geo()?;
            into_footprint(index, decoded)?
        }
    };

    let mut feature = Feature::new(geometry);
    match raw.get("properties") {
        Some(Value::Object(properties)) => {
            for (name, value) in properties {
                feature.set(name, FieldValue::from_json(value));
            }
        }
        None | Some(Value::Null) => {}
        Some(other) => {
            return Err(MergeError::InvalidInput(format!(
                "feature {} has non-object properties: {}",
                index, other
            )))
        }
    }
    Ok(feature)
}

fn into_footprint(index: usize, geometry: Geometry<f64>) -> Result<MultiPolygon<f64>> {
    match geometry {
        Geometry::Polygon(polygon) => Ok(MultiPolygon::new(vec![polygon])),
        Geometry::MultiPolygon(multi) => Ok(multi),
        Geometry::GeometryCollection(collection) => {
            let mut polygons = Vec::new();
            for member in collection.0 {
                polygons.extend(into_footprint(index, member)?.0);
            }
            Ok(MultiPolygon::new(polygons))
        }
        other => Err(MergeError::InvalidGeometry {
            index,
            detail: format!("expected polygonal geometry, found {}", geometry_name(&other)),
        }),
    }
}

fn geometry_name(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

/// Serialize a collection to a GeoJSON `FeatureCollection`, properties in schema order.
pub fn write_feature_collection(collection: &FeatureCollection) -> Result<String> {
    let features = collection
        .features()
        .iter()
        .map(|feature| write_feature(collection.schema(), feature))
        .collect::<Result<Vec<_>>>()?;

    let document = json!({
        "type": "FeatureCollection",
        "features": features,
    });
    Ok(serde_json::to_string(&document)?)
}

fn write_feature(schema: &[String], feature: &Feature) -> Result<Value> {
    let geometry = match feature.geometry.0.len() {
        0 => Value::Null,
        // A one-part footprint is written as a plain Polygon
        1 => serde_json::from_str(&Geometry::Polygon(feature.geometry.0[0].clone()).to_json()?)?,
        _ => serde_json::from_str(&Geometry::MultiPolygon(feature.geometry.clone()).to_json()?)?,
    };

    let mut properties = Map::new();
    for field in schema {
        properties.insert(field.clone(), feature.get(field).to_json());
    }

    Ok(json!({
        "type": "Feature",
        "geometry": geometry,
        "properties": properties,
    }))
}
