//! # OpRisk Core
//! Statistical tools for grouping operational loss data into Units of Measure (UoMs).
//!
//! Banks record operational losses against fine grained raw UoMs which usually hold
//! too few events to model on their own. This crate provides the pieces needed to
//! decide how raw UoMs may be combined:
//!
//! - Pairwise Kolmogorov-Smirnov distances between the loss samples of raw UoMs.
//! - Homogeneity checks of the losses inside each proposed group.
//! - Grouping strategies based on business rules, loss clustering, or both.
//! - A synthetic loss generator for experimentation.
//!
//! Loss tables are polars [`polars::prelude::DataFrame`]s, see [`table`] for the
//! column conventions.
//!

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]

pub mod config;
pub mod distance;
pub mod errors;
pub mod generation;
pub mod grouping;
pub mod homogeneity;
pub mod stats;
pub mod table;

/// Common useful imports
pub mod prelude {
    pub use crate::config::{GenerationConfig, HomogeneityThresholds};
    pub use crate::distance::{
        build_distance_matrix, ks_distance, uom_distance_matrix, DistanceMatrix,
    };
    pub use crate::errors::{Error, OpRiskResult};
    pub use crate::generation::generate_synthetic_data;
    pub use crate::grouping::{group, GroupingStrategy};
    pub use crate::homogeneity::{assess_homogeneity, assess_homogeneity_detailed, HomogeneityLevel};
    pub use crate::stats::KsTest;
    pub use crate::table::GroupKey;
}
