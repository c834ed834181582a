//! Pure reductions over the usable (non-NaN) values of a key group.
//!
//! None of these ever divide by zero: empty input yields `NaN` (or the
//! identity element for `sum`/`product`/`count`).

/// A reduction applied to a group's values.
pub type Reducer = fn(&[f64]) -> f64;

pub fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

/// Arithmetic mean; `NaN` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    sum(values) / values.len() as f64
}

pub fn product(values: &[f64]) -> f64 {
    values.iter().product()
}

pub fn min(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

pub fn max(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// Middle value for odd counts, mean of the two middle values for even counts.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        mean(&sorted[n / 2 - 1..=n / 2])
    }
}

/// Number of contributing values (not their sum).
pub fn count(values: &[f64]) -> f64 {
    values.len() as f64
}

/// `sum(v * w) / sum(w)`; `NaN` when the total weight is zero.
pub fn weighted_mean(pairs: &[(f64, f64)]) -> f64 {
    let total: f64 = pairs.iter().map(|(_, w)| w).sum();
    if total == 0.0 {
        return f64::NAN;
    }
    pairs.iter().map(|(v, w)| v * w).sum::<f64>() / total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_empty_is_nan() {
        assert!(mean(&[]).is_nan());
        assert!((mean(&[10.0, 20.0]) - 15.0).abs() < 1e-12);
    }

    #[test]
    fn median_odd_and_even() {
        assert!((median(&[1.0, 2.0, 3.0, 4.0]) - 2.5).abs() < 1e-12);
        assert!((median(&[5.0, 1.0, 3.0]) - 3.0).abs() < 1e-12);
        assert!((median(&[7.0]) - 7.0).abs() < 1e-12);
    }

    #[test]
    fn min_max_product_count() {
        let v = [3.0, -2.0, 4.0];
        assert_eq!(min(&v), -2.0);
        assert_eq!(max(&v), 4.0);
        assert!((product(&v) + 24.0).abs() < 1e-12);
        assert_eq!(count(&v), 3.0);
        assert!(min(&[]).is_nan());
        assert!(max(&[]).is_nan());
    }

    #[test]
    fn weighted_mean_uses_weights() {
        let w = weighted_mean(&[(80.0, 10.0), (90.0, 5.0)]);
        assert!((w - 1250.0 / 15.0).abs() < 1e-12, "got {w}");
    }

    #[test]
    fn weighted_mean_zero_weight_is_nan() {
        assert!(weighted_mean(&[(80.0, 0.0), (90.0, 0.0)]).is_nan());
        assert!(weighted_mean(&[]).is_nan());
    }
}
