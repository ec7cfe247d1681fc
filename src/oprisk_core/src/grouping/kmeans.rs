use itertools::Itertools;
use tracing::debug;

use crate::errors::{Error, OpRiskResult};

/// Lloyd iterations are stopped after this many passes.
const MAX_ITERATIONS: usize = 300;

/// Result of clustering a list of values.
#[derive(Debug, Clone, PartialEq)]
pub struct KMeans {
    /// Cluster centers in ascending order.
    pub centroids: Vec<f64>,

    /// Cluster index of each input value, indexing into `centroids`.
    pub labels: Vec<usize>,

    /// Number of assignment passes performed.
    pub iterations: usize,
}

/// Index of the closest centroid, the lowest index wins ties.
fn nearest(value: f64, centroids: &[f64]) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (idx, c) in centroids.iter().enumerate() {
        let dist = (value - c).abs();
        if dist < best_dist {
            best = idx;
            best_dist = dist;
        }
    }
    best
}

/// Number of distinct finite values.
pub fn distinct_count(values: &[f64]) -> usize {
    let mut sorted = values
        .iter()
        .filter(|x| x.is_finite())
        .copied()
        .collect_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted.dedup();
    sorted.len()
}

/// Cluster one dimensional values into `n_clusters` groups with Lloyd's algorithm.
///
/// Initial centers are spread over the sorted distinct values at evenly spaced
/// quantiles, which makes the result deterministic. Labels are ordered by ascending
/// center.
///
/// All values must be finite and there must be at least `n_clusters` distinct
/// values. An empty input gives empty labels. Labels which have not settled after
/// 300 passes are a [`Error::Convergence`].
///
/// ```
///     use oprisk_core::grouping::kmeans;
///     let result = kmeans(&[1.0, 1.1, 9.0, 9.2, 1.2], 2).unwrap();
///     assert_eq!(result.labels, vec![0, 0, 1, 1, 0]);
/// ```
pub fn kmeans(values: &[f64], n_clusters: usize) -> OpRiskResult<KMeans> {
    kmeans_bounded(values, n_clusters, MAX_ITERATIONS)
}

/// [`kmeans`] with an explicit limit on the number of assignment passes.
///
/// Labels which are still changing after `max_iterations` passes are a
/// [`Error::Convergence`].
fn kmeans_bounded(
    values: &[f64],
    n_clusters: usize,
    max_iterations: usize,
) -> OpRiskResult<KMeans> {
    if n_clusters == 0 {
        return Err(Error::ValueError(
            "The number of clusters must be positive.".into(),
        ));
    }
    if values.iter().any(|x| !x.is_finite()) {
        return Err(Error::ValueError(
            "Values must be finite to be clustered.".into(),
        ));
    }
    if values.is_empty() {
        return Ok(KMeans {
            centroids: Vec::new(),
            labels: Vec::new(),
            iterations: 0,
        });
    }

    let mut distinct = values.to_vec();
    distinct.sort_by(|a, b| a.total_cmp(b));
    distinct.dedup();
    let n_distinct = distinct.len();
    if n_distinct < n_clusters {
        return Err(Error::ValueError(format!(
            "Cannot form {} clusters from {} distinct values.",
            n_clusters, n_distinct
        )));
    }

    let mut centroids = (0..n_clusters)
        .map(|c| distinct[(2 * c + 1) * n_distinct / (2 * n_clusters)])
        .collect_vec();
    let mut labels = values.iter().map(|v| nearest(*v, &centroids)).collect_vec();

    let mut iterations = 1;
    let mut converged = false;
    while iterations < max_iterations {
        let mut sums = vec![0.0; n_clusters];
        let mut counts = vec![0usize; n_clusters];
        for (v, l) in values.iter().zip(labels.iter()) {
            sums[*l] += v;
            counts[*l] += 1;
        }
        for (c, (sum, count)) in centroids.iter_mut().zip(sums.iter().zip(counts)) {
            // an empty cluster keeps its previous center.
            if count > 0 {
                *c = sum / count as f64;
            }
        }

        let new_labels = values.iter().map(|v| nearest(*v, &centroids)).collect_vec();
        iterations += 1;
        if new_labels == labels {
            converged = true;
            break;
        }
        labels = new_labels;
    }
    if !converged {
        return Err(Error::Convergence(format!(
            "k-means labels still changing after {} passes.",
            iterations
        )));
    }
    debug!(n_clusters, iterations, "k-means finished");

    // relabel so that cluster 0 has the smallest center.
    let order = (0..n_clusters)
        .sorted_by(|a, b| centroids[*a].total_cmp(&centroids[*b]))
        .collect_vec();
    let mut rank = vec![0; n_clusters];
    for (new, old) in order.iter().enumerate() {
        rank[*old] = new;
    }
    Ok(KMeans {
        centroids: order.iter().map(|idx| centroids[*idx]).collect(),
        labels: labels.into_iter().map(|l| rank[l]).collect(),
        iterations,
    })
}
