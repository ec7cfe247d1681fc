use std::collections::BTreeSet;

use itertools::Itertools;
use polars::prelude::DataFrame;

use crate::errors::OpRiskResult;
use crate::table::{
    key_values, required_column, string_values, with_group_column, GroupKey, EVENT_TYPE, UOM_ID,
};

/// Deterministic key of the group formed by combining event types.
///
/// The names are sorted, deduplicated and joined with `+`, so the same selection
/// always gives the same key regardless of order. `None` if nothing is selected.
///
/// ```
///     use oprisk_core::grouping::business_group_key;
///     use oprisk_core::table::GroupKey;
///     let key = business_group_key(&["Fraud", "Error", "Fraud"]);
///     assert_eq!(key, Some(GroupKey::from("Error+Fraud")));
/// ```
pub fn business_group_key<S: AsRef<str>>(event_types: &[S]) -> Option<GroupKey> {
    if event_types.is_empty() {
        return None;
    }
    let names: BTreeSet<&str> = event_types.iter().map(|e| e.as_ref()).collect();
    Some(GroupKey::Name(names.into_iter().join("+")))
}

/// Rows whose event type is one of `event_types`, null event types never match.
pub(super) fn matching_rows<S: AsRef<str>>(
    table: &DataFrame,
    event_types: &[S],
) -> OpRiskResult<Vec<bool>> {
    let events = string_values(required_column(table, EVENT_TYPE)?)?;
    let selected: BTreeSet<&str> = event_types.iter().map(|e| e.as_ref()).collect();
    Ok(events
        .iter()
        .map(|e| e.as_deref().is_some_and(|e| selected.contains(e)))
        .collect())
}

/// Group raw UoMs by business rules.
///
/// Every loss whose `event_type` is one of `event_types` is moved into a single
/// combined group keyed by [`business_group_key`]. All other losses keep their
/// `uom_id` as the group. With no selected event types, or no matching rows, the
/// grouping is the identity.
///
/// Requires the `uom_id` and `event_type` columns.
pub fn group_by_business_rules<S: AsRef<str>>(
    table: &DataFrame,
    event_types: &[S],
) -> OpRiskResult<DataFrame> {
    let uoms = key_values(required_column(table, UOM_ID)?)?;
    let matches = matching_rows(table, event_types)?;

    let keys = match business_group_key(event_types) {
        Some(combined) => uoms
            .into_iter()
            .zip(matches)
            .map(|(uom, hit)| if hit { Some(combined.clone()) } else { uom })
            .collect_vec(),
        None => uoms,
    };
    with_group_column(table, &keys)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;
    use crate::table::GROUPED_UOM_ID;
    use polars::prelude::*;

    fn sample_table() -> DataFrame {
        df!(
            UOM_ID => [1i64, 2, 3, 4, 5],
            EVENT_TYPE => ["Fraud", "IT Failure", "Fraud", "Damage", "IT Failure"],
            "business_line" => ["Retail", "Corporate", "Retail", "Retail", "Corporate"]
        )
        .unwrap()
    }

    fn groups(table: &DataFrame) -> Vec<Option<GroupKey>> {
        key_values(required_column(table, GROUPED_UOM_ID).unwrap()).unwrap()
    }

    fn n_unique(table: &DataFrame) -> usize {
        groups(table).into_iter().unique().count()
    }

    #[test]
    fn test_no_event_types() {
        let result = group_by_business_rules::<&str>(&sample_table(), &[]).unwrap();
        assert_eq!(n_unique(&result), 5);
        assert_eq!(
            required_column(&result, GROUPED_UOM_ID).unwrap().dtype(),
            &DataType::Int64
        );
    }

    #[test]
    fn test_single_event_type() {
        let result = group_by_business_rules(&sample_table(), &["Fraud"]).unwrap();
        assert_eq!(n_unique(&result), 4);
        let keys = groups(&result);
        assert_eq!(keys[0], Some(GroupKey::from("Fraud")));
        assert_eq!(keys[0], keys[2]);
        assert_eq!(keys[1], Some(GroupKey::from("2")));
    }

    #[test]
    fn test_multiple_event_types() {
        let result = group_by_business_rules(&sample_table(), &["IT Failure", "Fraud"]).unwrap();
        assert_eq!(n_unique(&result), 2);
        let keys = groups(&result);
        assert_eq!(keys[1], Some(GroupKey::from("Fraud+IT Failure")));
        assert_eq!(keys[3], Some(GroupKey::from("4")));
    }

    #[test]
    fn test_all_event_types() {
        let result =
            group_by_business_rules(&sample_table(), &["Fraud", "IT Failure", "Damage"]).unwrap();
        assert_eq!(n_unique(&result), 1);
    }

    #[test]
    fn test_no_matching_event_types() {
        let table = sample_table();
        let result = group_by_business_rules(&table, &["NonExistent"]).unwrap();
        assert_eq!(n_unique(&result), 5);
        assert_eq!(
            required_column(&result, GROUPED_UOM_ID).unwrap().dtype(),
            &DataType::Int64
        );
        // the input is not modified.
        assert!(required_column(&table, GROUPED_UOM_ID).is_err());
    }

    #[test]
    fn test_missing_columns() {
        let table = sample_table().drop(EVENT_TYPE).unwrap();
        assert!(matches!(
            group_by_business_rules(&table, &["Fraud"]),
            Err(Error::KeyError(_))
        ));
    }
}
