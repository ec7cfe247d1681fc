//! # Grouping
//! Strategies which assign raw UoMs, or individual losses, to groups.
//!
//! Every strategy takes a loss table and returns a copy with a `grouped_uom_id`
//! column, which is what [`crate::homogeneity::assess_homogeneity`] consumes.
mod business;
mod kmeans;

pub use business::{business_group_key, group_by_business_rules};
pub use kmeans::{distinct_count, kmeans, KMeans};

use itertools::Itertools;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{Error, OpRiskResult};
use crate::table::{
    key_values, numeric_values, required_column, with_group_column, GroupKey, LOSS_AMOUNT, UOM_ID,
};

/// How raw UoMs are combined into groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupingStrategy {
    /// Every raw UoM is its own group.
    Raw,

    /// Losses of the listed event types are combined into one group.
    BusinessRules {
        /// Event types to combine.
        event_types: Vec<String>,
    },

    /// Losses are clustered by amount.
    Clustering {
        /// Number of clusters, must be positive.
        n_clusters: usize,
    },

    /// Business rules first, the remaining losses are clustered by amount.
    Combined {
        /// Event types to combine.
        event_types: Vec<String>,

        /// Largest number of clusters for the remaining losses, must be positive.
        n_clusters: usize,
    },
}

/// Apply a grouping strategy, returning a copy of the table with `grouped_uom_id`.
pub fn group(table: &DataFrame, strategy: &GroupingStrategy) -> OpRiskResult<DataFrame> {
    debug!(?strategy, n_rows = table.height(), "grouping losses");
    match strategy {
        GroupingStrategy::Raw => group_raw(table),
        GroupingStrategy::BusinessRules { event_types } => {
            group_by_business_rules(table, event_types)
        }
        GroupingStrategy::Clustering { n_clusters } => group_by_clustering(table, *n_clusters),
        GroupingStrategy::Combined {
            event_types,
            n_clusters,
        } => group_combined(table, event_types, *n_clusters),
    }
}

/// Every raw UoM is its own group, `grouped_uom_id` is a copy of `uom_id`.
pub fn group_raw(table: &DataFrame) -> OpRiskResult<DataFrame> {
    let uoms = key_values(required_column(table, UOM_ID)?)?;
    with_group_column(table, &uoms)
}

/// Finite loss amounts, a null or non-finite amount cannot be clustered.
fn clusterable_losses(table: &DataFrame) -> OpRiskResult<Vec<f64>> {
    numeric_values(required_column(table, LOSS_AMOUNT)?)?
        .into_iter()
        .map(|v| {
            v.filter(|v| v.is_finite()).ok_or_else(|| {
                Error::ValueError("Loss amounts must be finite to be clustered.".into())
            })
        })
        .collect()
}

/// Cluster individual losses by amount into `n_clusters` groups.
///
/// The group ids are the cluster labels `0..n_clusters`, ordered by ascending
/// cluster center. `n_clusters` of zero, or larger than the number of distinct
/// amounts, is a [`Error::ValueError`]; a non-numeric `loss_amount` a
/// [`Error::TypeError`]. An empty table gets an empty `grouped_uom_id` column.
pub fn group_by_clustering(table: &DataFrame, n_clusters: usize) -> OpRiskResult<DataFrame> {
    if n_clusters == 0 {
        return Err(Error::ValueError(
            "The number of clusters must be positive.".into(),
        ));
    }
    let losses = clusterable_losses(table)?;
    let clusters = kmeans(&losses, n_clusters)?;
    let keys = clusters
        .labels
        .into_iter()
        .map(|l| Some(GroupKey::Id(l as i64)))
        .collect_vec();
    with_group_column(table, &keys)
}

/// Combine business rules with clustering.
///
/// Losses of the listed event types form one group keyed by
/// [`business_group_key`]. The remaining losses are clustered by amount, using at
/// most `n_clusters` clusters and no more than their number of distinct amounts.
///
/// Requires the `event_type` and `loss_amount` columns. `n_clusters` of zero is a
/// [`Error::ValueError`].
pub fn group_combined<S: AsRef<str>>(
    table: &DataFrame,
    event_types: &[S],
    n_clusters: usize,
) -> OpRiskResult<DataFrame> {
    if n_clusters == 0 {
        return Err(Error::ValueError(
            "The number of clusters must be positive.".into(),
        ));
    }
    let matches = business::matching_rows(table, event_types)?;
    let losses = numeric_values(required_column(table, LOSS_AMOUNT)?)?;

    let remaining = losses
        .iter()
        .zip(matches.iter())
        .filter(|(_, hit)| !**hit)
        .map(|(v, _)| {
            v.filter(|v| v.is_finite()).ok_or_else(|| {
                Error::ValueError("Loss amounts must be finite to be clustered.".into())
            })
        })
        .collect::<OpRiskResult<Vec<f64>>>()?;

    let n_clusters = n_clusters.min(distinct_count(&remaining));
    let mut labels = if n_clusters > 0 {
        kmeans(&remaining, n_clusters)?.labels.into_iter()
    } else {
        Vec::new().into_iter()
    };

    let combined = business_group_key(event_types);
    let keys = matches
        .into_iter()
        .map(|hit| {
            if hit {
                combined.clone()
            } else {
                labels.next().map(|l| GroupKey::Id(l as i64))
            }
        })
        .collect_vec();
    with_group_column(table, &keys)
}
