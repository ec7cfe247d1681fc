//! # Statistics
//! Kolmogorov-Smirnov statistics and the small helpers they are built on.
mod ecdf;
mod kolmogorov;
mod moments;

pub use ecdf::Ecdf;
pub use kolmogorov::{kolmogorov_cdf, kolmogorov_limit_sf, kolmogorov_sf};
pub use ks_test::{one_sample_ks_statistic, one_sample_ks_test, two_sample_ks_statistic, KsTest};
pub use moments::{mean, std_dev};
