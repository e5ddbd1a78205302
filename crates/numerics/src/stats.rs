//! NaN-aware reductions and vector helpers.

use contracts::ContractError;
use nalgebra::DVector;

/// Mean of the non-NaN samples, `None` when there are none
pub fn nan_mean(x: &[f64]) -> Option<f64> {
    let (sum, count) = x
        .iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Largest absolute non-NaN sample, `None` when there are none
pub fn nan_max_abs(x: &[f64]) -> Option<f64> {
    x.iter()
        .filter(|v| !v.is_nan())
        .map(|v| v.abs())
        .fold(None, |m: Option<f64>, v| Some(m.map_or(v, |m| m.max(v))))
}

/// Copy of `x` with its NaN-aware mean removed. NaN samples stay NaN.
pub fn subtract_mean(x: &[f64]) -> Vec<f64> {
    match nan_mean(x) {
        Some(mean) => x.iter().map(|v| v - mean).collect(),
        None => x.to_vec(),
    }
}

/// Copy of `x` scaled so that its largest magnitude is 1.
///
/// An all-zero or all-NaN input is returned unchanged.
pub fn normalize(x: &[f64]) -> Vec<f64> {
    match nan_max_abs(x) {
        Some(peak) if peak > 0.0 && peak.is_finite() => x.iter().map(|v| v / peak).collect(),
        _ => x.to_vec(),
    }
}

/// Euclidean norm of `a - b`
pub fn euclidean_distance(a: &[f64], b: &[f64]) -> Result<f64, ContractError> {
    if a.len() != b.len() {
        return Err(ContractError::InvalidLength {
            reference: a.len(),
            shifted: b.len(),
        });
    }
    let diff = DVector::from_column_slice(a) - DVector::from_column_slice(b);
    Ok(diff.norm())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nan_mean_skips_missing() {
        assert_eq!(nan_mean(&[1.0, f64::NAN, 3.0]), Some(2.0));
        assert_eq!(nan_mean(&[f64::NAN]), None);
        assert_eq!(nan_mean(&[]), None);
    }

    #[test]
    fn test_subtract_mean_keeps_nan() {
        let centered = subtract_mean(&[1.0, f64::NAN, 3.0]);
        assert_eq!(centered[0], -1.0);
        assert!(centered[1].is_nan());
        assert_eq!(centered[2], 1.0);
    }

    #[test]
    fn test_normalize_by_largest_magnitude() {
        assert_eq!(normalize(&[1.0, -4.0, 2.0]), vec![0.25, -1.0, 0.5]);
        assert_eq!(normalize(&[0.0, 0.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn test_euclidean_distance() {
        assert_eq!(euclidean_distance(&[0.0, 3.0], &[4.0, 0.0]).unwrap(), 5.0);
        assert_eq!(euclidean_distance(&[], &[]).unwrap(), 0.0);
        assert!(euclidean_distance(&[1.0], &[1.0, 2.0]).is_err());
    }
}
