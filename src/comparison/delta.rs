use crate::telemetry::TelemetryTable;

/// Width of the centered moving average applied to the raw delta curve.
pub const DELTA_SMOOTHING_WINDOW: usize = 7;

/// Number of evenly spaced samples on the common axis used by
/// [`cumulative_delta`].
pub const CUMULATIVE_DELTA_SAMPLES: usize = 1400;

/// Result of aligning two laps on distance: the faster lap's telemetry with
/// the raw and smoothed delta columns, and which input was the reference.
#[derive(Clone, Debug)]
pub struct DeltaComparison {
    /// Telemetry of the reference (faster) lap
    pub reference: TelemetryTable,
    /// Signed compared-minus-reference time at each reference distance sample
    pub raw_delta_s: Vec<f64>,
    /// The raw delta after centered moving-average smoothing
    pub delta_s: Vec<f64>,
    /// 0 when the first input is the reference, 1 when the second is
    pub faster_index: usize,
}

/// Align two laps on distance and compute the time delta between them.
///
/// The lap with the strictly smaller lap time becomes the reference (ties go
/// to the first input). The compared lap's elapsed-time-vs-distance relation
/// is linearly interpolated onto the reference distance axis, clamping to the
/// boundary values outside the compared lap's observed range, and
/// `delta[i] = interpolated_compared_time[i] - reference_time[i]`.
///
/// Both tables must be non-empty; this is a caller precondition, not a
/// recovered error.
pub fn compute_delta(
    tel_1: &TelemetryTable,
    tel_2: &TelemetryTable,
    lap_time_1: f64,
    lap_time_2: f64,
) -> DeltaComparison {
    let (ref_tel, cmp_tel, faster_index) = if lap_time_1 <= lap_time_2 {
        (tel_1, tel_2, 0)
    } else {
        (tel_2, tel_1, 1)
    };

    let cmp_distance: Vec<f64> = cmp_tel.rows().iter().map(|r| r.distance_m).collect();
    let cmp_time: Vec<f64> = cmp_tel.rows().iter().map(|r| r.time_s).collect();

    let raw_delta_s: Vec<f64> = ref_tel
        .rows()
        .iter()
        .map(|row| interp_clamped(&cmp_distance, &cmp_time, row.distance_m) - row.time_s)
        .collect();
    let delta_s = centered_moving_average(&raw_delta_s, DELTA_SMOOTHING_WINDOW);

    DeltaComparison {
        reference: ref_tel.clone(),
        raw_delta_s,
        delta_s,
        faster_index,
    }
}

/// Delta of the second lap against the first over a shared, evenly spaced
/// distance axis from zero to the shorter of the two laps.
#[derive(Clone, Debug)]
pub struct CumulativeDelta {
    pub distance_m: Vec<f64>,
    /// Second-lap time minus first-lap time at each axis sample
    pub delta_s: Vec<f64>,
}

/// Resample both laps onto a common [`CUMULATIVE_DELTA_SAMPLES`]-point
/// distance axis and compute second-minus-first time deltas on it.
///
/// Returns `None` when either table lacks usable distance data, so the
/// caller can render a "not enough data" state instead of failing.
pub fn cumulative_delta(
    tel_1: &TelemetryTable,
    tel_2: &TelemetryTable,
) -> Option<CumulativeDelta> {
    let max_distance = f64::min(tel_1.max_distance()?, tel_2.max_distance()?);
    if !max_distance.is_finite() || max_distance <= 0.0 {
        return None;
    }

    let distance_1: Vec<f64> = tel_1.rows().iter().map(|r| r.distance_m).collect();
    let time_1: Vec<f64> = tel_1.rows().iter().map(|r| r.time_s).collect();
    let distance_2: Vec<f64> = tel_2.rows().iter().map(|r| r.distance_m).collect();
    let time_2: Vec<f64> = tel_2.rows().iter().map(|r| r.time_s).collect();

    let step = max_distance / (CUMULATIVE_DELTA_SAMPLES - 1) as f64;
    let mut distance_m = Vec::with_capacity(CUMULATIVE_DELTA_SAMPLES);
    let mut delta_s = Vec::with_capacity(CUMULATIVE_DELTA_SAMPLES);
    for i in 0..CUMULATIVE_DELTA_SAMPLES {
        let d = step * i as f64;
        let t1 = interp_clamped(&distance_1, &time_1, d);
        let t2 = interp_clamped(&distance_2, &time_2, d);
        distance_m.push(d);
        delta_s.push(t2 - t1);
    }

    Some(CumulativeDelta {
        distance_m,
        delta_s,
    })
}

/// Linear interpolation of `ys` over ascending `xs` at `x`, clamping to the
/// first/last value outside the observed range. `xs` must be non-empty and
/// sorted ascending.
fn interp_clamped(xs: &[f64], ys: &[f64], x: f64) -> f64 {
    if x <= xs[0] {
        return ys[0];
    }
    if x >= xs[xs.len() - 1] {
        return ys[ys.len() - 1];
    }
    // First index with xs[hi] > x; the bounds checks above keep hi interior.
    let hi = xs.partition_point(|&v| v <= x);
    let lo = hi - 1;
    let dx = xs[hi] - xs[lo];
    if dx <= 0.0 {
        return ys[hi];
    }
    ys[lo] + (ys[hi] - ys[lo]) * (x - xs[lo]) / dx
}

/// Centered moving average of `values`. Positions with fewer than `window`
/// neighbors average over the samples actually available, so the output has
/// the same length as the input.
pub(crate) fn centered_moving_average(values: &[f64], window: usize) -> Vec<f64> {
    if window <= 1 {
        return values.to_vec();
    }
    let half = window / 2;
    (0..values.len())
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = usize::min(i + half + 1, values.len());
            let slice = &values[lo..hi];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::{TelemetryRow, table_from_rows};

    fn row(time_s: f64, distance_m: f64) -> TelemetryRow {
        TelemetryRow {
            time_s,
            distance_m,
            speed_kmh: 250.0,
            throttle_pct: 100.0,
            brake_pct: 0.0,
            gear: 7,
            engine_rpm: 11000.0,
            pos_x: 0.0,
            pos_y: 0.0,
        }
    }

    /// Table covering `total_distance` meters in `total_time` seconds with
    /// `n` evenly spaced samples.
    fn even_table(n: usize, total_distance: f64, total_time: f64) -> TelemetryTable {
        let rows = (0..n)
            .map(|i| {
                let frac = i as f64 / (n - 1) as f64;
                row(total_time * frac, total_distance * frac)
            })
            .collect();
        table_from_rows(rows)
    }

    #[test]
    fn test_identical_laps_give_zero_delta() {
        let tel = even_table(100, 5000.0, 90.0);
        let result = compute_delta(&tel, &tel, 90.0, 90.0);

        assert_eq!(result.faster_index, 0, "ties go to the first input");
        assert_eq!(result.raw_delta_s.len(), 100);
        for &d in &result.raw_delta_s {
            assert!(d.abs() < 1e-9, "raw delta should be zero, got {d}");
        }
        for &d in &result.delta_s {
            assert!(d.abs() < 1e-9, "smoothed delta should be zero, got {d}");
        }
    }

    #[test]
    fn test_slower_lap_shows_positive_delta() {
        // Same track length, second lap two seconds slower overall.
        let fast = even_table(100, 5000.0, 90.0);
        let slow = even_table(100, 5000.0, 92.0);
        let result = compute_delta(&fast, &slow, 90.0, 92.0);

        assert_eq!(result.faster_index, 0);
        // At the final distance sample the gap is the full two seconds.
        let last = *result.raw_delta_s.last().unwrap();
        assert!((last - 2.0).abs() < 1e-9);
        // Delta grows monotonically for a uniformly slower lap.
        for pair in result.raw_delta_s.windows(2) {
            assert!(pair[1] >= pair[0] - 1e-9);
        }
    }

    #[test]
    fn test_swapping_inputs_flips_sign_and_index() {
        let fast = even_table(80, 4800.0, 88.0);
        let slow = even_table(80, 4800.0, 91.0);

        let forward = compute_delta(&fast, &slow, 88.0, 91.0);
        let swapped = compute_delta(&slow, &fast, 91.0, 88.0);

        assert_eq!(forward.faster_index, 0);
        assert_eq!(swapped.faster_index, 1);
        // Same reference lap either way, so the curves must agree.
        for (a, b) in forward.raw_delta_s.iter().zip(&swapped.raw_delta_s) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_interpolation_clamps_outside_range() {
        let xs = [10.0, 20.0, 30.0];
        let ys = [1.0, 2.0, 3.0];
        assert_eq!(interp_clamped(&xs, &ys, 0.0), 1.0);
        assert_eq!(interp_clamped(&xs, &ys, 35.0), 3.0);
        assert!((interp_clamped(&xs, &ys, 15.0) - 1.5).abs() < 1e-12);
        assert!((interp_clamped(&xs, &ys, 20.0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_interpolation_handles_repeated_distance() {
        // A stationary car produces repeated distance values.
        let xs = [0.0, 10.0, 10.0, 20.0];
        let ys = [0.0, 1.0, 2.0, 3.0];
        let mid = interp_clamped(&xs, &ys, 15.0);
        assert!((mid - 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_centered_moving_average_partial_windows() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let smoothed = centered_moving_average(&values, 3);
        assert_eq!(smoothed.len(), values.len());
        // First position averages only itself and its right neighbor.
        assert!((smoothed[0] - 1.5).abs() < 1e-12);
        assert!((smoothed[2] - 3.0).abs() < 1e-12);
        assert!((smoothed[4] - 4.5).abs() < 1e-12);
    }

    #[test]
    fn test_centered_moving_average_window_larger_than_input() {
        let values = [2.0, 4.0];
        let smoothed = centered_moving_average(&values, DELTA_SMOOTHING_WINDOW);
        assert_eq!(smoothed.len(), 2);
        assert!((smoothed[0] - 3.0).abs() < 1e-12);
        assert!((smoothed[1] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_cumulative_delta_common_axis() {
        let tel_1 = even_table(100, 5000.0, 90.0);
        let tel_2 = even_table(100, 4000.0, 92.0);
        let result = cumulative_delta(&tel_1, &tel_2).unwrap();

        assert_eq!(result.distance_m.len(), CUMULATIVE_DELTA_SAMPLES);
        assert_eq!(result.distance_m[0], 0.0);
        // Axis stops at the shorter lap.
        let last = *result.distance_m.last().unwrap();
        assert!((last - 4000.0).abs() < 1e-6);
        // The second lap is slower everywhere past the start.
        let mid = result.delta_s[CUMULATIVE_DELTA_SAMPLES / 2];
        assert!(mid > 0.0);
    }

    #[test]
    fn test_cumulative_delta_sign_flips_on_swap() {
        let fast = even_table(100, 5000.0, 90.0);
        let slow = even_table(100, 5000.0, 93.0);

        let forward = cumulative_delta(&fast, &slow).unwrap();
        let swapped = cumulative_delta(&slow, &fast).unwrap();
        for (a, b) in forward.delta_s.iter().zip(&swapped.delta_s) {
            assert!((a + b).abs() < 1e-9);
        }
    }

    #[test]
    fn test_cumulative_delta_unavailable_without_distance() {
        let empty = TelemetryTable::default();
        let tel = even_table(10, 1000.0, 30.0);
        assert!(cumulative_delta(&empty, &tel).is_none());

        let zero_length = table_from_rows(vec![row(0.0, 0.0), row(1.0, 0.0)]);
        assert!(cumulative_delta(&zero_length, &tel).is_none());
    }
}
