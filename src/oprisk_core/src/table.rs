//! # Loss tables
//! Column conventions and typed access to loss tables.
//!
//! Loss data is carried around as a polars [`DataFrame`], one row per loss event.
//! Functions in this crate only require the columns they actually read, any extra
//! columns are carried along untouched.

use std::collections::BTreeMap;
use std::fmt;

use itertools::Itertools;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, OpRiskResult};

/// Identifier of the raw Unit of Measure a loss belongs to.
pub const UOM_ID: &str = "uom_id";

/// Monetary amount of a loss event.
pub const LOSS_AMOUNT: &str = "loss_amount";

/// Date on which the loss occurred.
pub const LOSS_DATE: &str = "loss_date";

/// Category of the loss event, for example "Fraud".
pub const EVENT_TYPE: &str = "event_type";

/// Business line which suffered the loss.
pub const BUSINESS_LINE: &str = "business_line";

/// Identifier of the group a raw UoM has been assigned to.
pub const GROUPED_UOM_ID: &str = "grouped_uom_id";

/// Key identifying a UoM or a group of UoMs.
///
/// Keys read from integer columns become [`GroupKey::Id`], keys read from string
/// columns become [`GroupKey::Name`]. All ids sort before all names.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GroupKey {
    /// Integer identifier.
    Id(i64),

    /// Named identifier.
    Name(String),
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GroupKey::Id(id) => write!(f, "{}", id),
            GroupKey::Name(name) => write!(f, "{}", name),
        }
    }
}

impl From<i64> for GroupKey {
    fn from(value: i64) -> Self {
        GroupKey::Id(value)
    }
}

impl From<&str> for GroupKey {
    fn from(value: &str) -> Self {
        GroupKey::Name(value.to_string())
    }
}

impl From<String> for GroupKey {
    fn from(value: String) -> Self {
        GroupKey::Name(value)
    }
}

/// Fetch a column which must be present, the error names the missing column.
pub fn required_column<'a>(table: &'a DataFrame, name: &str) -> OpRiskResult<&'a Series> {
    table
        .column(name)
        .map_err(|_| Error::KeyError(format!("The '{}' column is missing.", name)))
}

/// Read a numeric column as floats, nulls are kept as `None`.
///
/// Any integer or float dtype is accepted, everything else is a type error.
pub fn numeric_values(series: &Series) -> OpRiskResult<Vec<Option<f64>>> {
    if !series.dtype().is_numeric() {
        return Err(Error::TypeError(format!(
            "The '{}' column must be numeric.",
            series.name()
        )));
    }
    let values = series.cast(&DataType::Float64)?;
    let values = values.f64()?.into_iter().collect_vec();
    Ok(values)
}

/// String view of a column, categorical columns are decoded to their labels.
fn as_strings(series: &Series) -> OpRiskResult<Option<Series>> {
    match series.dtype() {
        DataType::String => Ok(Some(series.clone())),
        DataType::Categorical(_, _) => Ok(Some(series.cast(&DataType::String)?)),
        _ => Ok(None),
    }
}

/// Read a column of identifiers, nulls are kept as `None`.
///
/// Integer columns produce [`GroupKey::Id`], string and categorical columns
/// [`GroupKey::Name`]. Integer ids which do not fit in an `i64` are a
/// [`Error::ValueError`] rather than being dropped.
pub fn key_values(series: &Series) -> OpRiskResult<Vec<Option<GroupKey>>> {
    if series.dtype().is_integer() {
        let keys = series.strict_cast(&DataType::Int64).map_err(|_| {
            Error::ValueError(format!(
                "The '{}' column holds ids outside of the i64 range.",
                series.name()
            ))
        })?;
        let keys = keys.i64()?.into_iter().map(|k| k.map(GroupKey::Id));
        return Ok(keys.collect());
    }
    match as_strings(series)? {
        Some(names) => Ok(names
            .str()?
            .into_iter()
            .map(|k| k.map(GroupKey::from))
            .collect()),
        None => Err(Error::TypeError(format!(
            "The '{}' column must hold integer or string identifiers.",
            series.name()
        ))),
    }
}

/// Read a column of strings, nulls are kept as `None`.
///
/// Categorical columns are read as their labels.
pub fn string_values(series: &Series) -> OpRiskResult<Vec<Option<String>>> {
    let Some(strings) = as_strings(series)? else {
        return Err(Error::TypeError(format!(
            "The '{}' column must hold strings.",
            series.name()
        )));
    };
    Ok(strings
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// Partition the values of `value_col` by the keys of `key_col`.
///
/// Every non-null key is present in the output, in ascending order. Null or
/// non-finite values are dropped from their group, the group itself is kept even if
/// it ends up empty.
pub fn partition_by_key(
    table: &DataFrame,
    key_col: &str,
    value_col: &str,
) -> OpRiskResult<BTreeMap<GroupKey, Vec<f64>>> {
    let keys = required_column(table, key_col)?;
    let values = required_column(table, value_col)?;
    if table.height() == 0 {
        return Ok(BTreeMap::new());
    }
    let values = numeric_values(values)?;
    let keys = key_values(keys)?;

    let mut groups: BTreeMap<GroupKey, Vec<f64>> = BTreeMap::new();
    for (key, value) in keys.into_iter().zip(values) {
        let Some(key) = key else { continue };
        let group = groups.entry(key).or_default();
        if let Some(v) = value.filter(|v| v.is_finite()) {
            group.push(v);
        }
    }
    Ok(groups)
}

/// Build a column from a list of keys, `None` becomes null.
///
/// If every key is an [`GroupKey::Id`] the column is `Int64`, otherwise all keys are
/// written as strings.
pub fn key_series(name: &str, keys: &[Option<GroupKey>]) -> Series {
    let all_ids = keys
        .iter()
        .flatten()
        .all(|k| matches!(k, GroupKey::Id(_)));
    if all_ids {
        let ids = keys
            .iter()
            .map(|k| match k {
                Some(GroupKey::Id(id)) => Some(*id),
                _ => None,
            })
            .collect_vec();
        Series::new(name.into(), ids)
    } else {
        let names = keys
            .iter()
            .map(|k| k.as_ref().map(|k| k.to_string()))
            .collect_vec();
        Series::new(name.into(), names)
    }
}

/// Copy of the table with `keys` written into the `grouped_uom_id` column.
pub(crate) fn with_group_column(
    table: &DataFrame,
    keys: &[Option<GroupKey>],
) -> OpRiskResult<DataFrame> {
    let mut out = table.clone();
    let _ = out.with_column(key_series(GROUPED_UOM_ID, keys))?;
    Ok(out)
}
