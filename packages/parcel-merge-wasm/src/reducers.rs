// Reducers for one field of one dissolve group. Values arrive in the
// group's original record order.
use std::cmp::Ordering;

use crate::error::{MergeError, Result};
use crate::feature::FieldValue;
use crate::field_rules::AggregationRule;

pub fn reduce(rule: AggregationRule, field: &str, values: &[&FieldValue]) -> Result<FieldValue> {
    match rule {
        AggregationRule::Sum => sum(field, values),
        AggregationRule::Max => max(field, values),
        AggregationRule::FirstValid => Ok(first_valid(values)),
        AggregationRule::CombineToCsv => Ok(combine_to_csv(values)),
    }
}

/// Numeric total of the non-null values, or null when every value is null.
pub fn sum(field: &str, values: &[&FieldValue]) -> Result<FieldValue> {
    let mut total: Option<FieldValue> = None;
    for value in values.iter().copied() {
        let next = match (total.take(), value) {
            (acc, FieldValue::Null) => acc,
            (None, FieldValue::Integer(i)) => Some(FieldValue::Integer(*i)),
            (None, FieldValue::Float(f)) => Some(FieldValue::Float(*f)),
            (Some(FieldValue::Integer(a)), FieldValue::Integer(b)) => Some(
                a.checked_add(*b)
                    .map(FieldValue::Integer)
                    .unwrap_or(FieldValue::Float(a as f64 + *b as f64)),
            ),
            (Some(FieldValue::Integer(a)), FieldValue::Float(b)) => {
                Some(FieldValue::Float(a as f64 + b))
            }
            (Some(FieldValue::Float(a)), FieldValue::Integer(b)) => {
                Some(FieldValue::Float(a + *b as f64))
            }
            (Some(FieldValue::Float(a)), FieldValue::Float(b)) => Some(FieldValue::Float(a + b)),
            (_, other) => {
                return Err(MergeError::InvalidFieldType {
                    field: field.to_string(),
                    detail: format!("cannot sum a {} value", other.type_name()),
                })
            }
        };
        total = next;
    }
    Ok(total.unwrap_or(FieldValue::Null))
}

/// Greatest non-null value by natural ordering, or null when every value is null.
pub fn max(field: &str, values: &[&FieldValue]) -> Result<FieldValue> {
    let mut best: Option<&FieldValue> = None;
    for value in values.iter().copied().filter(|v| !v.is_null()) {
        best = match best {
            None => {
                // Validate lone values too so a text field in a Max slot is caught
                compare(field, value, value)?;
                Some(value)
            }
            Some(current) => match compare(field, value, current)? {
                Ordering::Greater => Some(value),
                _ => Some(current),
            },
        };
    }
    Ok(best.cloned().unwrap_or(FieldValue::Null))
}

/// First non-null value in record order.
pub fn first_valid(values: &[&FieldValue]) -> FieldValue {
    values
        .iter()
        .find(|value| !value.is_null())
        .map(|value| (*value).clone())
        .unwrap_or(FieldValue::Null)
}

/// Every value, duplicates included, joined with commas. Nulls render empty
/// and floats always carry a fraction (`100.0`), so float ids stay distinguishable.
pub fn combine_to_csv(values: &[&FieldValue]) -> FieldValue {
    let joined = values
        .iter()
        .map(|value| value.to_string())
        .collect::<Vec<_>>()
        .join(",");
    FieldValue::Text(joined)
}

fn compare(field: &str, a: &FieldValue, b: &FieldValue) -> Result<Ordering> {
    let ordering = match (a, b) {
        (FieldValue::Integer(x), FieldValue::Integer(y)) => Some(x.cmp(y)),
        (FieldValue::Integer(x), FieldValue::Float(y)) => (*x as f64).partial_cmp(y),
        (FieldValue::Float(x), FieldValue::Integer(y)) => x.partial_cmp(&(*y as f64)),
        (FieldValue::Float(x), FieldValue::Float(y)) => x.partial_cmp(y),
        (FieldValue::Text(x), FieldValue::Text(y)) => Some(x.cmp(y)),
        (FieldValue::Bool(x), FieldValue::Bool(y)) => Some(x.cmp(y)),
        _ => {
            return Err(MergeError::InvalidFieldType {
                field: field.to_string(),
                detail: format!(
                    "cannot compare {} with {}",
                    a.type_name(),
                    b.type_name()
                ),
            })
        }
    };
    ordering.ok_or_else(|| MergeError::InvalidFieldType {
        field: field.to_string(),
        detail: "NaN has no ordering".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refs(values: &[FieldValue]) -> Vec<&FieldValue> {
        values.iter().collect()
    }

    #[test]
    fn sum_adds_and_skips_nulls() {
        let values = vec![
            FieldValue::Integer(1),
            FieldValue::Integer(2),
            FieldValue::Integer(3),
        ];
        assert_eq!(sum("F", &refs(&values)).unwrap(), FieldValue::Integer(6));

        let nulls = vec![FieldValue::Null, FieldValue::Null];
        assert_eq!(sum("F", &refs(&nulls)).unwrap(), FieldValue::Null);

        let partial = vec![FieldValue::Integer(5), FieldValue::Null];
        assert_eq!(sum("F", &refs(&partial)).unwrap(), FieldValue::Integer(5));
    }

    #[test]
    fn sum_promotes_to_float() {
        let values = vec![FieldValue::Integer(1), FieldValue::Float(0.5)];
        assert_eq!(sum("F", &refs(&values)).unwrap(), FieldValue::Float(1.5));

        let overflow = vec![FieldValue::Integer(i64::MAX), FieldValue::Integer(1)];
        assert!(matches!(
            sum("F", &refs(&overflow)).unwrap(),
            FieldValue::Float(_)
        ));
    }

    #[test]
    fn sum_rejects_text() {
        let values = vec![FieldValue::Integer(1), FieldValue::Text("x".into())];
        match sum("FMV_TOTAL", &refs(&values)) {
            Err(MergeError::InvalidFieldType { field, .. }) => assert_eq!(field, "FMV_TOTAL"),
            other => panic!("expected InvalidFieldType, got {:?}", other),
        }
    }

    #[test]
    fn max_of_equal_values_is_that_value() {
        let values = vec![FieldValue::Integer(7); 3];
        assert_eq!(max("F", &refs(&values)).unwrap(), FieldValue::Integer(7));
    }

    #[test]
    fn max_compares_numbers_across_types() {
        let values = vec![
            FieldValue::Integer(0),
            FieldValue::Null,
            FieldValue::Float(50000.5),
            FieldValue::Integer(50000),
        ];
        assert_eq!(max("F", &refs(&values)).unwrap(), FieldValue::Float(50000.5));
        assert_eq!(
            max("F", &refs(&[FieldValue::Null])).unwrap(),
            FieldValue::Null
        );
    }

    #[test]
    fn max_orders_text_and_rejects_mixes() {
        let text = vec![FieldValue::Text("R1".into()), FieldValue::Text("R3".into())];
        assert_eq!(max("F", &refs(&text)).unwrap(), FieldValue::Text("R3".into()));

        let mixed = vec![FieldValue::Integer(1), FieldValue::Text("R3".into())];
        assert!(matches!(
            max("F", &refs(&mixed)),
            Err(MergeError::InvalidFieldType { .. })
        ));

        let nan = vec![FieldValue::Float(f64::NAN)];
        assert!(max("F", &refs(&nan)).is_err());
    }

    #[test]
    fn first_valid_respects_order() {
        let values = vec![
            FieldValue::Null,
            FieldValue::Text("B".into()),
            FieldValue::Text("A".into()),
        ];
        assert_eq!(first_valid(&refs(&values)), FieldValue::Text("B".into()));
        assert_eq!(first_valid(&refs(&[FieldValue::Null])), FieldValue::Null);
        // Index 0 counts as valid
        let first = vec![FieldValue::Integer(0), FieldValue::Integer(9)];
        assert_eq!(first_valid(&refs(&first)), FieldValue::Integer(0));
    }

    #[test]
    fn csv_keeps_every_value() {
        let values = vec![
            FieldValue::Text("100".into()),
            FieldValue::Integer(200),
            FieldValue::Null,
            FieldValue::Text("100".into()),
        ];
        assert_eq!(
            combine_to_csv(&refs(&values)),
            FieldValue::Text("100,200,,100".into())
        );
        assert_eq!(combine_to_csv(&[]), FieldValue::Text(String::new()));

        let floats = vec![FieldValue::Float(100.0), FieldValue::Float(200.5)];
        assert_eq!(
            combine_to_csv(&refs(&floats)),
            FieldValue::Text("100.0,200.5".into())
        );
    }
}
