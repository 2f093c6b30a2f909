use std::path::Path;

use crate::config::MergeConfig;
use crate::console_log;
use crate::dissolve::{dissolve, DissolveOptions, DissolveOutput};
use crate::error::Result;
use crate::feature::FeatureCollection;
use crate::field_rules::FieldRules;
use crate::geojson_io::read_feature_collection_bytes;
use crate::models::MergeReport;

/// Two-pass parcel merge: collapse duplicate records of one parcel, then
/// combine the parcels that share a structure.
#[derive(Debug, Clone)]
pub struct MergePipeline {
    parcel_rules: FieldRules,
    structure_rules: FieldRules,
    options: DissolveOptions,
}

impl MergePipeline {
    pub fn new(config: MergeConfig) -> Result<Self> {
        config.validate()?;
        Ok(MergePipeline {
            parcel_rules: FieldRules::parcel_pass(&config),
            structure_rules: FieldRules::structure_pass(&config),
            options: DissolveOptions {
                parallel: config.parallel,
                shape_metrics: config.shape_metrics,
            },
        })
    }

    /// Pass 1: one feature per parcel id, most authoritative value per Max field.
    pub fn merge_dupe_parcels(&self, collection: &FeatureCollection) -> Result<DissolveOutput> {
        console_log!(
            "Merging duplicate parcels by '{}'",
            self.parcel_rules.key_field()
        );
        dissolve(collection, &self.parcel_rules, &self.options)
    }

    /// Pass 2: one feature per shared structure, additive fields summed and
    /// the contributing parcel ids kept as a comma-separated list.
    pub fn merge_shared_pins(&self, collection: &FeatureCollection) -> Result<DissolveOutput> {
        console_log!(
            "Merging parcels that share '{}'",
            self.structure_rules.key_field()
        );
        dissolve(collection, &self.structure_rules, &self.options)
    }

    pub fn merge(&self, collection: &FeatureCollection) -> Result<FeatureCollection> {
        self.merge_with_report(collection)
            .map(|(merged, _)| merged)
    }

    pub fn merge_with_report(
        &self,
        collection: &FeatureCollection,
    ) -> Result<(FeatureCollection, MergeReport)> {
        let parcels = self.merge_dupe_parcels(collection)?;
        let structures = self.merge_shared_pins(&parcels.collection)?;

        let report = MergeReport {
            input_features: collection.len(),
            parcel_pass: parcels.stats,
            structure_pass: structures.stats,
            output_features: structures.collection.len(),
        };
        console_log!(
            "Parcel merge complete: {} features in, {} out",
            report.input_features,
            report.output_features
        );
        Ok((structures.collection, report))
    }
}

/// Load a GeoJSON parcel layer (optionally gzipped) from disk and merge it.
pub fn merge_parcel_file(path: impl AsRef<Path>, config: MergeConfig) -> Result<FeatureCollection> {
    let data = std::fs::read(path.as_ref())?;
    let collection = read_feature_collection_bytes(&data)?;
    MergePipeline::new(config)?.merge(&collection)
}
