use crate::errors::{Error, OpRiskResult};

/// Finite values of the data.
fn finite(data: &[f64]) -> impl Iterator<Item = f64> + '_ {
    data.iter().copied().filter(|x| x.is_finite())
}

/// Compute the arithmetic mean of the data.
///
/// This ignores non-finite values such as inf and nan.
pub fn mean(data: &[f64]) -> OpRiskResult<f64> {
    let (count, sum) = finite(data).fold((0usize, 0.0), |(c, s), x| (c + 1, s + x));
    if count == 0 {
        return Err(Error::ValueError(
            "Data must have at least 1 finite value.".into(),
        ));
    }
    Ok(sum / count as f64)
}

/// Compute the population standard deviation of the data, normalized by `n`.
///
/// This ignores non-finite values such as inf and nan.
pub fn std_dev(data: &[f64]) -> OpRiskResult<f64> {
    let mu = mean(data)?;
    let (count, sum_sq) = finite(data).fold((0usize, 0.0), |(c, s), x| {
        (c + 1, s + (x - mu) * (x - mu))
    });
    Ok((sum_sq / count as f64).sqrt())
}

#[cfg(test)]
mod tests {
    use super::{mean, std_dev};

    #[test]
    fn test_mean_std() {
        let data = vec![2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0, f64::NAN];
        assert_eq!(mean(&data).unwrap(), 5.0);
        assert_eq!(std_dev(&data).unwrap(), 2.0);
    }

    #[test]
    fn test_mean_std_bad() {
        let data = vec![f64::NAN, f64::NEG_INFINITY];
        assert!(mean(&data).is_err());
        assert!(std_dev(&data).is_err());
        assert!(mean(&[]).is_err());
    }
}
