//! # Configuration
//! Parameter sets for data generation and the interpretation of homogeneity results.
//!
//! All parameters are plain serde structures so they may be filled in from whatever
//! configuration source the caller uses. Defaults match the values used by the
//! exploratory dashboard.

use serde::{Deserialize, Serialize};

use crate::errors::{Error, OpRiskResult};

/// Event types drawn by default for synthetic losses.
pub const DEFAULT_EVENT_TYPES: [&str; 3] = ["Fraud", "Error", "System Failure"];

/// Business lines drawn by default for synthetic losses.
pub const DEFAULT_BUSINESS_LINES: [&str; 3] = ["Retail", "Investment", "Corporate"];

/// Parameters of the synthetic loss generator.
///
/// Each loss draws its own log-normal `mu` and `sigma` uniformly from the two ranges.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct GenerationConfig {
    /// Number of raw Units of Measure.
    pub num_uoms: usize,

    /// Number of loss events generated for each UoM.
    pub loss_events_per_uom: usize,

    /// Inclusive range of the log-normal `mu` parameter.
    pub severity_mean_range: (f64, f64),

    /// Inclusive range of the log-normal `sigma` parameter.
    pub severity_std_range: (f64, f64),

    /// Event types assigned uniformly at random.
    pub event_types: Vec<String>,

    /// Business lines assigned uniformly at random.
    pub business_lines: Vec<String>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            num_uoms: 5,
            loss_events_per_uom: 100,
            severity_mean_range: (5.0, 7.0),
            severity_std_range: (1.0, 2.0),
            event_types: DEFAULT_EVENT_TYPES.iter().map(|s| s.to_string()).collect(),
            business_lines: DEFAULT_BUSINESS_LINES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// A range is valid if it is finite, non-negative and not reversed.
fn check_range(range: (f64, f64), name: &str) -> OpRiskResult<()> {
    let (low, high) = range;
    if !low.is_finite() || !high.is_finite() || low > high || low < 0.0 || high < 0.0 {
        return Err(Error::ValueError(format!("Invalid {} range.", name)));
    }
    Ok(())
}

impl GenerationConfig {
    /// Create a configuration with the default categories.
    pub fn new(
        num_uoms: usize,
        loss_events_per_uom: usize,
        severity_mean_range: (f64, f64),
        severity_std_range: (f64, f64),
    ) -> Self {
        GenerationConfig {
            num_uoms,
            loss_events_per_uom,
            severity_mean_range,
            severity_std_range,
            ..Default::default()
        }
    }

    /// Check that all parameters are usable.
    pub fn validate(&self) -> OpRiskResult<()> {
        check_range(self.severity_mean_range, "severity mean")?;
        check_range(self.severity_std_range, "severity std")?;
        if self.event_types.is_empty() {
            return Err(Error::ValueError(
                "At least one event type is required.".into(),
            ));
        }
        if self.business_lines.is_empty() {
            return Err(Error::ValueError(
                "At least one business line is required.".into(),
            ));
        }
        Ok(())
    }
}

/// Thresholds used to read a homogeneity KS statistic.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
pub struct HomogeneityThresholds {
    /// Statistics below this are very homogeneous.
    pub very_homogeneous: f64,

    /// Statistics below this are acceptable, anything else should be investigated.
    pub acceptable: f64,
}

impl Default for HomogeneityThresholds {
    fn default() -> Self {
        HomogeneityThresholds {
            very_homogeneous: 0.1,
            acceptable: 0.2,
        }
    }
}

impl HomogeneityThresholds {
    /// Check that the thresholds are ordered and inside of `[0, 1]`.
    pub fn validate(&self) -> OpRiskResult<()> {
        let ordered = 0.0 <= self.very_homogeneous
            && self.very_homogeneous <= self.acceptable
            && self.acceptable <= 1.0;
        if !ordered {
            return Err(Error::ValueError(
                "Homogeneity thresholds must satisfy 0 <= very_homogeneous <= acceptable <= 1."
                    .into(),
            ));
        }
        Ok(())
    }
}
