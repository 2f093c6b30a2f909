use geo_types::MultiPolygon;
use rayon::prelude::*;
use std::collections::HashMap;

use crate::config::ShapeMetricFields;
use crate::console_log;
use crate::error::{MergeError, Result};
use crate::feature::{Feature, FeatureCollection, FieldValue, GroupKey};
use crate::field_rules::{FieldClass, FieldRules};
use crate::geometry_union::{footprint_area, footprint_perimeter, union_geometries};
use crate::models::PassStats;
use crate::reducers::reduce;

#[derive(Debug, Clone)]
pub struct DissolveOptions {
    /// Reduce groups on the rayon pool. Output order is the same either way.
    pub parallel: bool,
    pub shape_metrics: Option<ShapeMetricFields>,
}

impl Default for DissolveOptions {
    fn default() -> Self {
        DissolveOptions {
            parallel: true,
            shape_metrics: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DissolveOutput {
    pub collection: FeatureCollection,
    pub stats: PassStats,
}

/// Group features by the key field of `rules` and merge every group into one
/// feature: unioned geometry, key value copied, other fields reduced.
///
/// Rows with a null key are dropped and counted in `stats.excluded_null_key`.
/// Groups come out in the order their key first appears in the input.
pub fn dissolve(
    collection: &FeatureCollection,
    rules: &FieldRules,
    options: &DissolveOptions,
) -> Result<DissolveOutput> {
    let key_field = rules.key_field();

    if collection.is_empty() {
        return Ok(DissolveOutput {
            collection: FeatureCollection::with_schema(collection.schema().to_vec(), Vec::new()),
            stats: PassStats::default(),
        });
    }

    if !collection.has_field(key_field) {
        return Err(MergeError::MissingKeyField {
            field: key_field.to_string(),
        });
    }

    let (groups, excluded) = partition(collection.features(), key_field);
    if excluded > 0 {
        console_log!(
            "Dropped {} features with null '{}' before dissolving",
            excluded,
            key_field
        );
    }

    // The geometry lives outside the attribute row, so a same-named property is dropped
    let schema: Vec<String> = collection
        .schema()
        .iter()
        .filter(|field| field.as_str() != rules.geometry_field())
        .cloned()
        .collect();
    let plan: Vec<(&str, FieldClass)> = schema
        .iter()
        .map(|field| (field.as_str(), rules.classify(field)))
        .collect();
    let metrics = MetricTargets::resolve(options.shape_metrics.as_ref(), &schema);

    let merge = |members: &Vec<&Feature>| merge_group(members, key_field, &plan, &metrics);
    let features: Vec<Feature> = if options.parallel {
        groups.par_iter().map(merge).collect::<Result<Vec<_>>>()?
    } else {
        groups.iter().map(merge).collect::<Result<Vec<_>>>()?
    };

    console_log!(
        "Dissolved {} features by '{}' into {} groups",
        collection.len(),
        key_field,
        features.len()
    );

    let stats = PassStats {
        input_features: collection.len(),
        excluded_null_key: excluded,
        groups: features.len(),
    };
    Ok(DissolveOutput {
        collection: FeatureCollection::with_schema(schema, features),
        stats,
    })
}

/// Split features by key value, keeping first-appearance order of groups and
/// record order within each group.
fn partition<'a>(features: &'a [Feature], key_field: &str) -> (Vec<Vec<&'a Feature>>, usize) {
    let mut slots: HashMap<GroupKey, usize> = HashMap::new();
    let mut groups: Vec<Vec<&Feature>> = Vec::new();
    let mut excluded = 0;

    for feature in features {
        let Some(key) = feature.get(key_field).group_key() else {
            excluded += 1;
            continue;
        };
        let slot = *slots.entry(key).or_insert_with(|| {
            groups.push(Vec::new());
            groups.len() - 1
        });
        groups[slot].push(feature);
    }

    (groups, excluded)
}

fn merge_group(
    members: &[&Feature],
    key_field: &str,
    plan: &[(&str, FieldClass)],
    metrics: &MetricTargets,
) -> Result<Feature> {
    let footprints: Vec<&MultiPolygon<f64>> = members.iter().map(|f| &f.geometry).collect();
    let mut merged = Feature::new(union_geometries(&footprints));

    for (field, class) in plan {
        match class {
            FieldClass::Excluded => {
                if *field == key_field {
                    merged.set(field, members[0].get(key_field).clone());
                }
            }
            FieldClass::Aggregate(rule) => {
                let values: Vec<&FieldValue> = members.iter().map(|f| f.get(field)).collect();
                merged.set(field, reduce(*rule, field, &values)?);
            }
        }
    }

    // A lone member keeps its geometry, so its stored metrics stay as well
    if members.len() > 1 {
        if let Some(area_field) = metrics.area_field {
            let area = footprint_area(&merged.geometry);
            merged.set(area_field, FieldValue::Float(area));
        }
        if let Some(length_field) = metrics.length_field {
            let length = footprint_perimeter(&merged.geometry);
            merged.set(length_field, FieldValue::Float(length));
        }
    }

    Ok(merged)
}

/// Shape metric fields that actually exist in the schema being dissolved.
struct MetricTargets<'a> {
    area_field: Option<&'a str>,
    length_field: Option<&'a str>,
}

impl<'a> MetricTargets<'a> {
    fn resolve(fields: Option<&'a ShapeMetricFields>, schema: &[String]) -> Self {
        let present = |name: &'a Option<String>| {
            name.as_deref()
                .filter(|name| schema.iter().any(|field| field.as_str() == *name))
        };
        match fields {
            Some(fields) => MetricTargets {
                area_field: present(&fields.area_field),
                length_field: present(&fields.length_field),
            },
            None => MetricTargets {
                area_field: None,
                length_field: None,
            },
        }
    }
}
