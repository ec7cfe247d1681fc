//! # KS distance matrices
//! Pairwise two sample KS distances between a collection of named samples.

use std::collections::BTreeMap;

use itertools::Itertools;
use nalgebra::DMatrix;
use polars::prelude::DataFrame;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use serde::Serialize;
use tracing::debug;

use crate::errors::OpRiskResult;
use crate::stats::two_sample_ks_statistic;
use crate::table::{partition_by_key, GroupKey, LOSS_AMOUNT, UOM_ID};

/// Two sample KS distance between two samples.
///
/// This is [`two_sample_ks_statistic`], non-finite values are ignored and an empty
/// sample has distance 0.0 to everything.
pub fn ks_distance(sample_a: &[f64], sample_b: &[f64]) -> f64 {
    two_sample_ks_statistic(sample_a, sample_b)
}

/// Symmetric matrix of KS distances, rows and columns follow the sorted ids.
///
/// Only [`build_distance_matrix`] constructs it, so the ids stay sorted and the
/// matrix stays symmetric with a zero diagonal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceMatrix<K> {
    ids: Vec<K>,
    matrix: DMatrix<f64>,
}

impl<K: Ord> DistanceMatrix<K> {
    /// Ids in ascending order.
    pub fn ids(&self) -> &[K] {
        &self.ids
    }

    /// `matrix()[(i, j)]` is the distance between `ids()[i]` and `ids()[j]`.
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Is the matrix empty.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Row/column index of an id.
    pub fn index_of(&self, id: &K) -> Option<usize> {
        self.ids.binary_search(id).ok()
    }

    /// Distance between two ids, `None` if either is unknown.
    pub fn get(&self, a: &K, b: &K) -> Option<f64> {
        Some(self.matrix[(self.index_of(a)?, self.index_of(b)?)])
    }

    /// Split into the matrix and the ordered ids.
    pub fn into_parts(self) -> (DMatrix<f64>, Vec<K>) {
        (self.matrix, self.ids)
    }
}

/// Build the symmetric KS distance matrix between named samples.
///
/// Ids are sorted so the layout does not depend on the input order. Samples given
/// twice under the same id are concatenated. Each unordered pair is computed once
/// and mirrored, the diagonal is 0.
///
/// ```
///     use oprisk_core::distance::build_distance_matrix;
///     let dist = build_distance_matrix(vec![
///         ("b", vec![4.0, 5.0, 6.0]),
///         ("a", vec![1.0, 2.0, 3.0]),
///     ]);
///     assert_eq!(dist.ids(), ["a", "b"]);
///     assert_eq!(dist.matrix()[(0, 1)], 1.0);
///     assert_eq!(dist.matrix()[(1, 0)], 1.0);
/// ```
pub fn build_distance_matrix<K, I, S>(entities: I) -> DistanceMatrix<K>
where
    K: Ord + Clone,
    I: IntoIterator<Item = (K, S)>,
    S: AsRef<[f64]>,
{
    let mut samples: BTreeMap<K, Vec<f64>> = BTreeMap::new();
    for (id, sample) in entities {
        samples.entry(id).or_default().extend_from_slice(sample.as_ref());
    }
    let (ids, samples): (Vec<K>, Vec<Vec<f64>>) = samples.into_iter().unzip();
    let n_ids = ids.len();

    let pairs = (0..n_ids).tuple_combinations::<(usize, usize)>().collect_vec();
    debug!(n_ids, n_pairs = pairs.len(), "computing KS distance matrix");

    let distances: Vec<f64> = pairs
        .clone()
        .into_par_iter()
        .map(|(i, j)| two_sample_ks_statistic(&samples[i], &samples[j]))
        .collect();

    let mut matrix = DMatrix::zeros(n_ids, n_ids);
    for ((i, j), dist) in pairs.into_iter().zip(distances) {
        matrix[(i, j)] = dist;
        matrix[(j, i)] = dist;
    }
    DistanceMatrix { ids, matrix }
}

/// KS distance matrix between the raw UoMs of a loss table.
///
/// Uses the `uom_id` and `loss_amount` columns.
pub fn uom_distance_matrix(table: &DataFrame) -> OpRiskResult<DistanceMatrix<GroupKey>> {
    let losses = partition_by_key(table, UOM_ID, LOSS_AMOUNT)?;
    Ok(build_distance_matrix(losses))
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;

    #[test]
    fn test_matrix_symmetric() {
        let dist = build_distance_matrix(vec![
            (3, vec![1.0, 2.0, 3.0]),
            (1, vec![1.0, 2.0, 4.0]),
            (2, vec![10.0, 11.0]),
            (0, vec![]),
        ]);
        assert_eq!(dist.ids(), [0, 1, 2, 3]);
        assert_eq!(dist.len(), 4);
        for i in 0..4 {
            assert_eq!(dist.matrix()[(i, i)], 0.0);
            for j in 0..4 {
                assert_eq!(dist.matrix()[(i, j)], dist.matrix()[(j, i)]);
                assert!((0.0..=1.0).contains(&dist.matrix()[(i, j)]));
            }
        }
        assert_eq!(dist.get(&0, &2), Some(0.0));
        assert_eq!(dist.get(&1, &2), Some(1.0));
        assert!((dist.get(&1, &3).unwrap() - 1.0 / 3.0).abs() < 1e-15);
        assert_eq!(dist.get(&1, &9), None);
    }

    #[test]
    fn test_duplicate_ids_merge() {
        let dist = build_distance_matrix(vec![
            ("a", vec![1.0]),
            ("b", vec![1.0, 2.0]),
            ("a", vec![2.0]),
        ]);
        assert_eq!(dist.len(), 2);
        assert_eq!(dist.get(&"a", &"b"), Some(0.0));
    }

    #[test]
    fn test_empty() {
        let dist = build_distance_matrix(Vec::<(i64, Vec<f64>)>::new());
        assert!(dist.is_empty());
        let (matrix, ids) = dist.into_parts();
        assert_eq!(matrix.nrows(), 0);
        assert!(ids.is_empty());
    }

    #[test]
    fn test_uom_matrix() {
        let table = df!(
            UOM_ID => [2i64, 1, 2, 1, 3],
            LOSS_AMOUNT => [4.0, 1.0, 5.0, 2.0, 1.5]
        )
        .unwrap();
        let dist = uom_distance_matrix(&table).unwrap();
        assert_eq!(
            dist.ids(),
            [GroupKey::Id(1), GroupKey::Id(2), GroupKey::Id(3)]
        );
        assert_eq!(dist.get(&GroupKey::Id(1), &GroupKey::Id(2)), Some(1.0));
        assert_eq!(dist.get(&GroupKey::Id(1), &GroupKey::Id(3)), Some(0.5));
        assert_eq!(ks_distance(&[1.0, 2.0], &[1.5]), 0.5);
    }
}
