//! Distribution of the one sample Kolmogorov-Smirnov statistic.
//!
//! For small samples the exact distribution is evaluated with the matrix method of
//! Marsaglia, Tsang and Wang (2003), "Evaluating Kolmogorov's Distribution",
//! Journal of Statistical Software 8(18).
//!
//! Larger samples use the limiting Kolmogorov distribution with Stephens' small
//! sample correction.

use nalgebra::DMatrix;

/// Largest sample size evaluated with the exact matrix method.
const EXACT_LIMIT: usize = 1000;

/// Matrix entries are rescaled by this much to avoid overflow.
const SCALE: f64 = 1e140;
const SCALE_EXP: i32 = 140;

/// Raise `mat` to the `n`th power, tracking a base 10 exponent alongside it.
///
/// `watch` is the diagonal index which is monitored for overflow.
fn scaled_power(mat: &DMatrix<f64>, n: usize, watch: usize) -> (DMatrix<f64>, i32) {
    if n == 1 {
        return (mat.clone(), 0);
    }
    let (half, half_exp) = scaled_power(mat, n / 2, watch);
    let mut out = &half * &half;
    let mut exp = 2 * half_exp;
    if n % 2 == 1 {
        out = mat * out;
    }
    if out[(watch, watch)] > SCALE {
        out /= SCALE;
        exp += SCALE_EXP;
    }
    (out, exp)
}

/// Exact `P(D_n < d)` using the matrix method.
fn exact_cdf(n: usize, d: f64) -> f64 {
    let nd = n as f64 * d;
    let k = nd.floor() as usize + 1;
    let m = 2 * k - 1;
    let h = k as f64 - nd;

    let mut mat = DMatrix::from_fn(m, m, |i, j| if i + 1 >= j { 1.0 } else { 0.0 });
    for i in 0..m {
        mat[(i, 0)] -= h.powi(i as i32 + 1);
        mat[(m - 1, i)] -= h.powi((m - i) as i32);
    }
    if 2.0 * h - 1.0 > 0.0 {
        mat[(m - 1, 0)] += (2.0 * h - 1.0).powi(m as i32);
    }
    for i in 0..m {
        for j in 0..=i {
            // i - j + 1 factorial
            let fact: f64 = (1..=(i - j + 1)).map(|g| g as f64).product();
            mat[(i, j)] /= fact;
        }
    }

    let (power, mut exp) = scaled_power(&mat, n, k - 1);
    let mut s = power[(k - 1, k - 1)];
    for i in 1..=n {
        s = s * i as f64 / n as f64;
        if s < 1.0 / SCALE {
            s *= SCALE;
            exp -= SCALE_EXP;
        }
    }
    s * 10f64.powi(exp)
}

/// Survival function of the limiting Kolmogorov distribution, `P(K > lambda)`.
pub fn kolmogorov_limit_sf(lambda: f64) -> f64 {
    if lambda <= 0.0 {
        return 1.0;
    }
    let mut sum = 0.0;
    let mut sign = 1.0;
    for k in 1..=100 {
        let k = k as f64;
        let term = sign * (-2.0 * k * k * lambda * lambda).exp();
        sum += term;
        if term.abs() < 1e-16 {
            break;
        }
        sign = -sign;
    }
    (2.0 * sum).clamp(0.0, 1.0)
}

/// Probability that the two-sided one sample KS statistic of `n` values is less than
/// `d` when the sample was drawn from the reference distribution.
///
/// ```
///     use oprisk_core::stats::kolmogorov_cdf;
///     let p = kolmogorov_cdf(10, 0.274);
///     assert!((p - 0.6284796154565043).abs() < 1e-12);
/// ```
pub fn kolmogorov_cdf(n: usize, d: f64) -> f64 {
    if n == 0 || d.is_nan() {
        return f64::NAN;
    }
    if d <= 0.0 {
        return 0.0;
    }
    if d >= 1.0 {
        return 1.0;
    }
    let n_f = n as f64;
    let s = d * d * n_f;
    if s > 7.24 || (s > 3.76 && n > 99) {
        // the exact values agree with this to at least 5 digits here.
        return 1.0 - 2.0 * (-(2.000071 + 0.331 / n_f.sqrt() + 1.409 / n_f) * s).exp();
    }
    if n > EXACT_LIMIT {
        let sqrt_n = n_f.sqrt();
        return 1.0 - kolmogorov_limit_sf((sqrt_n + 0.12 + 0.11 / sqrt_n) * d);
    }
    exact_cdf(n, d).clamp(0.0, 1.0)
}

/// Probability that the two-sided one sample KS statistic of `n` values is at least
/// `d`, this is the p-value of the KS test.
pub fn kolmogorov_sf(n: usize, d: f64) -> f64 {
    1.0 - kolmogorov_cdf(n, d)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_values() {
        assert!((kolmogorov_cdf(10, 0.274) - 0.6284796154565043).abs() < 1e-12);
        assert!((kolmogorov_sf(3, 0.3) - 0.8862222222222222).abs() < 1e-12);

        // a single value is always at least 0.5 away.
        assert_eq!(kolmogorov_cdf(1, 0.2), 0.0);
        assert_eq!(kolmogorov_cdf(1, 0.5), 0.0);
        assert!((kolmogorov_cdf(2, 0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_bounds() {
        assert_eq!(kolmogorov_cdf(5, 0.0), 0.0);
        assert_eq!(kolmogorov_cdf(5, 1.0), 1.0);
        assert_eq!(kolmogorov_sf(5, 1.0), 0.0);
        assert!(kolmogorov_cdf(0, 0.5).is_nan());
    }

    #[test]
    fn test_monotonic() {
        for n in [2, 7, 40, 150, 2000] {
            let mut last = 0.0;
            for step in 1..100 {
                let p = kolmogorov_cdf(n, step as f64 / 100.0);
                assert!(p >= last - 1e-9, "n={} step={}", n, step);
                assert!((0.0..=1.0).contains(&p));
                last = p;
            }
        }
    }

    #[test]
    fn test_limit() {
        assert_eq!(kolmogorov_limit_sf(0.0), 1.0);
        // critical value of the 5% two-sided test.
        assert!((kolmogorov_limit_sf(1.3581) - 0.05).abs() < 1e-4);
        assert!(kolmogorov_limit_sf(10.0) < 1e-16);
    }
}
