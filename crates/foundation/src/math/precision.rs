//! Total ordering for hit distances and other float sort keys.

use core::cmp::Ordering;

/// Fold `-0.0` into `0.0` and every NaN into one NaN so equal-looking keys
/// compare equal under `total_cmp`.
pub fn canonical_f64(v: f64) -> f64 {
    match v {
        v if v == 0.0 => 0.0,
        v if v.is_nan() => f64::NAN,
        v => v,
    }
}

/// `total_cmp` on canonicalized values. NaN sorts after every finite value.
pub fn stable_total_cmp_f64(a: f64, b: f64) -> Ordering {
    canonical_f64(a).total_cmp(&canonical_f64(b))
}
