//! Numeric helpers shared by the analyzers and metrics.

/// Clamps `value` into `[0, 1]`, mapping NaN to 0.
pub(crate) fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Linear ramp from 0 at `lo` to 1 at `hi`, clamped.
pub(crate) fn ramp(value: f64, lo: f64, hi: f64) -> f64 {
    if hi <= lo {
        return if value >= hi { 1.0 } else { 0.0 };
    }
    clamp01((value - lo) / (hi - lo))
}

/// Range under which a map counts as flat. Inputs live in `[0, 1]` gray
/// units, so this sits well below one 8-bit level and above resampling noise.
const FLAT_RANGE: f32 = 1e-6;

/// Min-max normalizes `values` in place to `[0, 1]`.
///
/// A flat input (range at most [`FLAT_RANGE`]) becomes all zeros.
pub(crate) fn normalize_in_place(values: &mut [f32]) {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for &v in values.iter() {
        min = min.min(v);
        max = max.max(v);
    }
    let range = max - min;
    if !range.is_finite() || range <= FLAT_RANGE {
        values.iter_mut().for_each(|v| *v = 0.0);
        return;
    }
    let inv = 1.0 / range;
    for v in values.iter_mut() {
        *v = ((*v - min) * inv).clamp(0.0, 1.0);
    }
}

/// Distance from `value` to the nearest multiple of `step`.
pub(crate) fn distance_to_multiple(value: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return f64::INFINITY;
    }
    let rem = value.rem_euclid(step);
    rem.min(step - rem)
}

#[cfg(test)]
mod tests {
    use super::{clamp01, distance_to_multiple, normalize_in_place, ramp};

    #[test]
    fn clamp01_handles_nan_and_bounds() {
        assert_eq!(clamp01(f64::NAN), 0.0);
        assert_eq!(clamp01(-3.0), 0.0);
        assert_eq!(clamp01(2.0), 1.0);
        assert_eq!(clamp01(0.25), 0.25);
    }

    #[test]
    fn ramp_is_linear_between_bounds() {
        assert!((ramp(5.0, 0.0, 10.0) - 0.5).abs() < 1e-12);
        assert_eq!(ramp(-1.0, 0.0, 10.0), 0.0);
        assert_eq!(ramp(11.0, 0.0, 10.0), 1.0);
    }

    #[test]
    fn normalize_maps_flat_input_to_zero() {
        let mut flat = vec![0.3f32; 6];
        normalize_in_place(&mut flat);
        assert!(flat.iter().all(|&v| v == 0.0));

        let mut noisy = vec![0.5f32, 0.5 + 1e-7, 0.5 - 1e-7];
        normalize_in_place(&mut noisy);
        assert!(noisy.iter().all(|&v| v == 0.0));

        let mut ramped = vec![2.0f32, 4.0, 6.0];
        normalize_in_place(&mut ramped);
        assert_eq!(ramped, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn distance_to_multiple_wraps_both_ways() {
        assert!((distance_to_multiple(8.0, 8.5) - 0.5).abs() < 1e-12);
        assert!((distance_to_multiple(9.0, 8.5) - 0.5).abs() < 1e-12);
        assert!(distance_to_multiple(17.0, 8.5).abs() < 1e-12);
    }
}
