//! # Synthetic losses
//! Generate synthetic operational loss events for a set of raw UoMs.

use chrono::NaiveDate;
use polars::prelude::*;
use rand::Rng;
use rand_distr::{Distribution, LogNormal};
use tracing::debug;

use crate::config::GenerationConfig;
use crate::errors::{Error, OpRiskResult};
use crate::table::{BUSINESS_LINE, EVENT_TYPE, LOSS_AMOUNT, LOSS_DATE, UOM_ID};

/// Year in which all synthetic losses occur.
const LOSS_YEAR: i32 = 2023;

/// Loss dates are drawn uniformly from this many days after the start of the year.
const DAYS_IN_PERIOD: i64 = 365;

/// Generate a table of synthetic loss events.
///
/// For each of `num_uoms` UoMs, `loss_events_per_uom` losses are drawn. Every loss
/// draws its own log-normal parameters uniformly from the configured ranges, a date
/// within [`LOSS_YEAR`], and an event type and business line uniformly from the
/// configured categories.
///
/// The table has the columns `uom_id`, `loss_amount`, `loss_date`, `event_type`
/// and `business_line`. Invalid configurations are a [`Error::ValueError`].
///
/// ```
///     use oprisk_core::config::GenerationConfig;
///     use oprisk_core::generation::generate_synthetic_data;
///     use rand::{rngs::StdRng, SeedableRng};
///
///     let mut rng = StdRng::seed_from_u64(42);
///     let config = GenerationConfig::new(3, 10, (1.0, 5.0), (0.5, 1.5));
///     let table = generate_synthetic_data(&config, &mut rng).unwrap();
///     assert_eq!(table.height(), 30);
/// ```
pub fn generate_synthetic_data<R: Rng + ?Sized>(
    config: &GenerationConfig,
    rng: &mut R,
) -> OpRiskResult<DataFrame> {
    config.validate()?;

    let start = NaiveDate::from_ymd_opt(LOSS_YEAR, 1, 1)
        .ok_or_else(|| Error::ValueError("Invalid loss period start.".into()))?;
    let start_days = start.signed_duration_since(NaiveDate::default()).num_days();

    let (mean_low, mean_high) = config.severity_mean_range;
    let (std_low, std_high) = config.severity_std_range;

    let n_rows = config.num_uoms * config.loss_events_per_uom;
    let mut uom_ids: Vec<i64> = Vec::with_capacity(n_rows);
    let mut amounts: Vec<f64> = Vec::with_capacity(n_rows);
    let mut days: Vec<i32> = Vec::with_capacity(n_rows);
    let mut event_types: Vec<&str> = Vec::with_capacity(n_rows);
    let mut business_lines: Vec<&str> = Vec::with_capacity(n_rows);

    for uom_id in 0..config.num_uoms {
        for _ in 0..config.loss_events_per_uom {
            let mu = rng.gen_range(mean_low..=mean_high);
            let sigma = rng.gen_range(std_low..=std_high);
            let severity =
                LogNormal::new(mu, sigma).map_err(|e| Error::ValueError(e.to_string()))?;

            uom_ids.push(uom_id as i64);
            amounts.push(severity.sample(rng));
            days.push((start_days + rng.gen_range(0..DAYS_IN_PERIOD)) as i32);
            event_types.push(&config.event_types[rng.gen_range(0..config.event_types.len())]);
            business_lines
                .push(&config.business_lines[rng.gen_range(0..config.business_lines.len())]);
        }
    }
    debug!(
        n_uoms = config.num_uoms,
        n_rows = amounts.len(),
        "generated synthetic losses"
    );

    let dates = Series::new(LOSS_DATE.into(), days).cast(&DataType::Date)?;
    let table = DataFrame::new(vec![
        Series::new(UOM_ID.into(), uom_ids),
        Series::new(LOSS_AMOUNT.into(), amounts),
        dates,
        Series::new(EVENT_TYPE.into(), event_types),
        Series::new(BUSINESS_LINE.into(), business_lines),
    ])?;
    Ok(table)
}
