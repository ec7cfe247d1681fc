//! # Homogeneity
//! Check whether the losses inside each group look like they come from one
//! distribution.
//!
//! Every group is compared to a normal distribution whose mean and standard deviation
//! are estimated from the group itself, so the test measures how well the shape of
//! the group conforms, not whether it matches some target level or spread.

use std::collections::BTreeMap;

use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::{debug, trace};

use crate::config::HomogeneityThresholds;
use crate::errors::{Error, OpRiskResult};
use crate::stats::{mean, one_sample_ks_test, std_dev, Ecdf, KsTest};
use crate::table::{
    key_values, numeric_values, partition_by_key, required_column, GroupKey, GROUPED_UOM_ID,
    LOSS_AMOUNT, UOM_ID,
};

/// Fewest observations a group needs for the KS test to be meaningful.
pub const MIN_GROUP_SIZE: usize = 2;

/// KS test of the losses against a normal distribution fit to the same losses.
///
/// The standard deviation is the population value. If all losses are equal the
/// reference is a point mass at that value, which the losses match exactly.
pub fn normal_fit_ks_test(losses: &[f64]) -> OpRiskResult<KsTest> {
    let mu = mean(losses)?;
    let sigma = std_dev(losses)?;
    if sigma <= 0.0 {
        return Ok(KsTest {
            statistic: 0.0,
            p_value: 1.0,
            n_samples: losses.iter().filter(|x| x.is_finite()).count(),
        });
    }
    let normal = Normal::new(mu, sigma).map_err(|e| Error::ValueError(e.to_string()))?;
    one_sample_ks_test(losses, |x| normal.cdf(x))
}

/// Assess every group of a grouped loss table, keeping the full test results.
///
/// The table needs a `grouped_uom_id` column of integer or string ids and a numeric
/// `loss_amount` column. Missing columns are a [`Error::KeyError`], wrongly typed
/// columns a [`Error::TypeError`]. An empty table gives an empty result.
///
/// Every group present in the table appears in the result, groups with fewer than
/// [`MIN_GROUP_SIZE`] finite losses map to `None`.
pub fn assess_homogeneity_detailed(
    table: &DataFrame,
) -> OpRiskResult<BTreeMap<GroupKey, Option<KsTest>>> {
    let groups = partition_by_key(table, GROUPED_UOM_ID, LOSS_AMOUNT)?;
    debug!(n_groups = groups.len(), "assessing homogeneity");

    groups
        .into_iter()
        .map(|(key, losses)| {
            if losses.len() < MIN_GROUP_SIZE {
                trace!(group = %key, n_losses = losses.len(), "too few losses for KS test");
                return Ok((key, None));
            }
            let result = normal_fit_ks_test(&losses)?;
            trace!(group = %key, statistic = result.statistic, "group assessed");
            Ok((key, Some(result)))
        })
        .collect()
}

/// Assess every group of a grouped loss table, returning the KS statistic per group.
///
/// This is [`assess_homogeneity_detailed`] without the p-values.
///
/// ```
///     use oprisk_core::homogeneity::assess_homogeneity;
///     use oprisk_core::table::GroupKey;
///     use polars::prelude::*;
///
///     let table = df!(
///         "loss_amount" => [100.0, 150.0, 200.0, 300.0, 350.0, 400.0],
///         "grouped_uom_id" => [1i64, 1, 2, 2, 2, 3]
///     ).unwrap();
///     let result = assess_homogeneity(&table).unwrap();
///     assert_eq!(result.len(), 3);
///     assert!(result[&GroupKey::Id(3)].is_none());
/// ```
pub fn assess_homogeneity(table: &DataFrame) -> OpRiskResult<BTreeMap<GroupKey, Option<f64>>> {
    Ok(assess_homogeneity_detailed(table)?
        .into_iter()
        .map(|(key, result)| (key, result.map(|r| r.statistic)))
        .collect())
}

/// Reading of a homogeneity KS statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HomogeneityLevel {
    /// The group behaves like one population.
    VeryHomogeneous,

    /// Some departure, but the grouping is usable.
    Acceptable,

    /// Outliers or mixed risks, the grouping should be revisited.
    Investigate,
}

impl HomogeneityLevel {
    /// Classify a KS statistic using the thresholds.
    pub fn classify(statistic: f64, thresholds: &HomogeneityThresholds) -> Self {
        if statistic < thresholds.very_homogeneous {
            HomogeneityLevel::VeryHomogeneous
        } else if statistic < thresholds.acceptable {
            HomogeneityLevel::Acceptable
        } else {
            HomogeneityLevel::Investigate
        }
    }
}

/// ECDFs of the raw UoMs inside of each group.
///
/// Only raw UoMs with more than one finite loss are included, groups without any
/// such UoM are left out. Needs `uom_id`, `grouped_uom_id` and `loss_amount`.
pub fn group_ecdfs(
    table: &DataFrame,
) -> OpRiskResult<BTreeMap<GroupKey, BTreeMap<GroupKey, Ecdf>>> {
    let groups = required_column(table, GROUPED_UOM_ID)?;
    let uoms = required_column(table, UOM_ID)?;
    let losses = required_column(table, LOSS_AMOUNT)?;
    if table.height() == 0 {
        return Ok(BTreeMap::new());
    }
    let losses = numeric_values(losses)?;
    let groups = key_values(groups)?;
    let uoms = key_values(uoms)?;

    let mut collected: BTreeMap<GroupKey, BTreeMap<GroupKey, Vec<f64>>> = BTreeMap::new();
    for ((group, uom), loss) in groups.into_iter().zip(uoms).zip(losses) {
        if let (Some(group), Some(uom), Some(loss)) = (group, uom, loss) {
            if loss.is_finite() {
                collected
                    .entry(group)
                    .or_default()
                    .entry(uom)
                    .or_default()
                    .push(loss);
            }
        }
    }

    Ok(collected
        .into_iter()
        .filter_map(|(group, uoms)| {
            let ecdfs: BTreeMap<GroupKey, Ecdf> = uoms
                .into_iter()
                .filter(|(_, losses)| losses.len() > 1)
                .map(|(uom, losses)| (uom, Ecdf::new(&losses)))
                .collect();
            (!ecdfs.is_empty()).then_some((group, ecdfs))
        })
        .collect())
}
