use std::collections::HashMap;

use crate::config::MergeConfig;

/// How a group's values for one field collapse into a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationRule {
    Sum,
    Max,
    FirstValid,
    CombineToCsv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldClass {
    /// Grouping key or geometry of the pass; never reduced.
    Excluded,
    Aggregate(AggregationRule),
}

/// Per-pass classification table. Fields without an entry use FirstValid.
#[derive(Debug, Clone)]
pub struct FieldRules {
    key_field: String,
    geometry_field: String,
    rules: HashMap<String, AggregationRule>,
}

impl FieldRules {
    pub fn new(key_field: &str, geometry_field: &str) -> Self {
        FieldRules {
            key_field: key_field.to_string(),
            geometry_field: geometry_field.to_string(),
            rules: HashMap::new(),
        }
    }

    /// Assign a rule; later assignments for the same field win.
    pub fn with_rule(mut self, field: &str, rule: AggregationRule) -> Self {
        self.rules.insert(field.to_string(), rule);
        self
    }

    /// Rules for collapsing duplicate records of the same parcel.
    pub fn parcel_pass(config: &MergeConfig) -> Self {
        let mut rules = FieldRules::new(&config.parcel_id_field, &config.geometry_field);
        for field in &config.fields_to_max {
            rules.rules.insert(field.clone(), AggregationRule::Max);
        }
        rules
    }

    /// Rules for combining distinct parcels that share one structure.
    pub fn structure_pass(config: &MergeConfig) -> Self {
        let mut rules = FieldRules::new(&config.structure_id_field, &config.geometry_field);
        for field in &config.fields_to_sum {
            rules.rules.insert(field.clone(), AggregationRule::Sum);
        }
        // Track every contributing parcel id
        rules
            .rules
            .insert(config.parcel_id_field.clone(), AggregationRule::CombineToCsv);
        rules
    }

    pub fn key_field(&self) -> &str {
        &self.key_field
    }

    pub fn geometry_field(&self) -> &str {
        &self.geometry_field
    }

    pub fn classify(&self, field: &str) -> FieldClass {
        if field == self.key_field || field == self.geometry_field {
            return FieldClass::Excluded;
        }
        FieldClass::Aggregate(
            self.rules
                .get(field)
                .copied()
                .unwrap_or(AggregationRule::FirstValid),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parcel_pass_excludes_key_and_geometry() {
        let rules = FieldRules::parcel_pass(&MergeConfig::default());
        assert_eq!(rules.classify("PARID"), FieldClass::Excluded);
        assert_eq!(rules.classify("geometry"), FieldClass::Excluded);
        assert_eq!(
            rules.classify("FMV_TOTAL"),
            FieldClass::Aggregate(AggregationRule::Max)
        );
        assert_eq!(
            rules.classify("PIN"),
            FieldClass::Aggregate(AggregationRule::FirstValid)
        );
        assert_eq!(
            rules.classify("OWNER_NAME"),
            FieldClass::Aggregate(AggregationRule::FirstValid)
        );
    }

    #[test]
    fn structure_pass_tracks_parcel_ids() {
        let rules = FieldRules::structure_pass(&MergeConfig::default());
        assert_eq!(rules.classify("PIN"), FieldClass::Excluded);
        assert_eq!(
            rules.classify("PARID"),
            FieldClass::Aggregate(AggregationRule::CombineToCsv)
        );
        assert_eq!(
            rules.classify("FMV_TOTAL"),
            FieldClass::Aggregate(AggregationRule::Sum)
        );
        // Max-only fields fall back to first-valid in this pass
        assert_eq!(
            rules.classify("ST_NUMBER"),
            FieldClass::Aggregate(AggregationRule::FirstValid)
        );
    }

    #[test]
    fn key_wins_over_configured_rule() {
        let rules = FieldRules::new("ID", "geom").with_rule("ID", AggregationRule::Sum);
        assert_eq!(rules.classify("ID"), FieldClass::Excluded);
    }
}
