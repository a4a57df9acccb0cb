use serde::{Deserialize, Serialize};
use uom::si::f64::Velocity;
use uom::si::velocity::{kilometer_per_hour, meter_per_second};

use crate::errors::PitwallError;
use crate::session::Lap;

/// Brake channel value when the pedal is engaged, after normalization.
pub const BRAKE_ENGAGED_PCT: f64 = 100.0;

/// One raw time-sampled measurement within a lap, as recorded in a session
/// export. Samples are ordered by elapsed time.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    /// Seconds elapsed since the start of the lap
    pub time_s: f64,
    /// Speed in km/h
    pub speed_kmh: f64,
    /// Throttle application, 0 to 100
    pub throttle_pct: f64,
    /// Whether the brake pedal is engaged
    pub brake_on: bool,
    /// Selected gear
    pub gear: u8,
    /// Engine RPM
    pub engine_rpm: f64,
    /// Track position
    pub pos_x: f64,
    pub pos_y: f64,
}

/// One row of a normalized telemetry table: the raw channels plus the
/// cumulative distance axis and the brake channel rescaled to 0-100.
#[derive(Clone, Debug, PartialEq)]
pub struct TelemetryRow {
    pub time_s: f64,
    /// Meters traveled since the start of the lap
    pub distance_m: f64,
    pub speed_kmh: f64,
    pub throttle_pct: f64,
    /// 100 when the brake is engaged, 0 otherwise
    pub brake_pct: f64,
    pub gear: u8,
    pub engine_rpm: f64,
    pub pos_x: f64,
    pub pos_y: f64,
}

/// The cleaned, distance-indexed telemetry of a single lap.
///
/// The distance axis is monotonically non-decreasing; rows keep the sample
/// order of the raw telemetry. Each table is owned by the computation that
/// produced it and is never mutated in place by consumers.
#[derive(Clone, Debug, Default)]
pub struct TelemetryTable {
    rows: Vec<TelemetryRow>,
}

impl TelemetryTable {
    pub fn rows(&self) -> &[TelemetryRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Total distance covered by the lap, when the table has any rows.
    pub fn max_distance(&self) -> Option<f64> {
        self.rows.last().map(|row| row.distance_m)
    }

    /// Highest speed seen over the lap.
    pub fn max_speed(&self) -> Option<f64> {
        self.rows
            .iter()
            .map(|row| row.speed_kmh)
            .reduce(f64::max)
    }

    /// Mean of the speed channel over the lap.
    pub fn mean_speed(&self) -> Option<f64> {
        if self.rows.is_empty() {
            return None;
        }
        let total: f64 = self.rows.iter().map(|row| row.speed_kmh).sum();
        Some(total / self.rows.len() as f64)
    }

    /// Track outline of the lap as (x, y) pairs, for map display.
    pub fn track_coords(&self) -> Vec<(f64, f64)> {
        self.rows.iter().map(|row| (row.pos_x, row.pos_y)).collect()
    }
}

/// Convert a lap's raw telemetry samples into a [`TelemetryTable`].
///
/// Cumulative distance is integrated from the speed channel over elapsed
/// time, and the brake indicator is rescaled to a 0-100 percentage. The lap
/// itself is left untouched; the returned table is freshly built.
///
/// Errors with [`PitwallError::NoLapTelemetry`] when the lap carries no
/// samples.
pub fn prepare_telemetry(lap: &Lap) -> Result<TelemetryTable, PitwallError> {
    if lap.telemetry.is_empty() {
        return Err(PitwallError::NoLapTelemetry {
            driver: lap.driver.clone(),
            lap_number: lap.lap_number,
        });
    }

    let mut rows = Vec::with_capacity(lap.telemetry.len());
    let mut distance_m = 0.0;
    let mut prev_time_s = lap.telemetry[0].time_s;
    for sample in &lap.telemetry {
        // Out-of-order timestamps and reversing speeds must not make the
        // distance axis regress.
        let dt = (sample.time_s - prev_time_s).max(0.0);
        let speed_mps = Velocity::new::<kilometer_per_hour>(sample.speed_kmh.max(0.0))
            .get::<meter_per_second>();
        distance_m += speed_mps * dt;
        prev_time_s = sample.time_s;

        rows.push(TelemetryRow {
            time_s: sample.time_s,
            distance_m,
            speed_kmh: sample.speed_kmh,
            throttle_pct: sample.throttle_pct,
            brake_pct: if sample.brake_on {
                BRAKE_ENGAGED_PCT
            } else {
                0.0
            },
            gear: sample.gear,
            engine_rpm: sample.engine_rpm,
            pos_x: sample.pos_x,
            pos_y: sample.pos_y,
        });
    }

    Ok(TelemetryTable { rows })
}

#[cfg(test)]
pub(crate) fn table_from_rows(rows: Vec<TelemetryRow>) -> TelemetryTable {
    TelemetryTable { rows }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(time_s: f64, speed_kmh: f64, brake_on: bool) -> TelemetrySample {
        TelemetrySample {
            time_s,
            speed_kmh,
            throttle_pct: 80.0,
            brake_on,
            gear: 5,
            engine_rpm: 10500.0,
            pos_x: 120.0,
            pos_y: -45.0,
        }
    }

    fn lap_with_samples(samples: Vec<TelemetrySample>) -> Lap {
        Lap {
            driver: "44".to_string(),
            lap_number: 7,
            lap_time_s: Some(92.0),
            telemetry: samples,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_lap_telemetry_errors() {
        let lap = lap_with_samples(Vec::new());
        let result = prepare_telemetry(&lap);
        assert!(matches!(
            result,
            Err(PitwallError::NoLapTelemetry { lap_number: 7, .. })
        ));
    }

    #[test]
    fn test_distance_integration() {
        // 180 km/h = 50 m/s, sampled every second
        let lap = lap_with_samples(vec![
            sample(0.0, 180.0, false),
            sample(1.0, 180.0, false),
            sample(2.0, 180.0, false),
        ]);
        let table = prepare_telemetry(&lap).unwrap();
        let distances: Vec<f64> = table.rows().iter().map(|r| r.distance_m).collect();
        assert_eq!(distances.len(), 3);
        assert!((distances[0] - 0.0).abs() < 1e-9);
        assert!((distances[1] - 50.0).abs() < 1e-9);
        assert!((distances[2] - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_distance_is_monotonic_with_bad_samples() {
        // A timestamp glitch and a negative speed reading must not walk the
        // distance axis backwards.
        let lap = lap_with_samples(vec![
            sample(0.0, 200.0, false),
            sample(1.0, 200.0, false),
            sample(0.5, 200.0, false),
            sample(1.5, -10.0, false),
            sample(2.5, 150.0, false),
        ]);
        let table = prepare_telemetry(&lap).unwrap();
        let rows = table.rows();
        for pair in rows.windows(2) {
            assert!(pair[1].distance_m >= pair[0].distance_m);
        }
    }

    #[test]
    fn test_brake_rescaled_to_percentage() {
        let lap = lap_with_samples(vec![sample(0.0, 100.0, true), sample(1.0, 100.0, false)]);
        let table = prepare_telemetry(&lap).unwrap();
        assert_eq!(table.rows()[0].brake_pct, 100.0);
        assert_eq!(table.rows()[1].brake_pct, 0.0);
    }

    #[test]
    fn test_input_lap_not_mutated() {
        let lap = lap_with_samples(vec![sample(0.0, 100.0, true), sample(1.0, 110.0, false)]);
        let samples_before = lap.telemetry.clone();
        let _ = prepare_telemetry(&lap).unwrap();
        assert_eq!(lap.telemetry.len(), samples_before.len());
        assert_eq!(lap.telemetry[0].time_s, samples_before[0].time_s);
        assert_eq!(lap.telemetry[0].brake_on, samples_before[0].brake_on);
    }

    #[test]
    fn test_speed_statistics() {
        let lap = lap_with_samples(vec![
            sample(0.0, 100.0, false),
            sample(1.0, 200.0, false),
            sample(2.0, 300.0, false),
        ]);
        let table = prepare_telemetry(&lap).unwrap();
        assert_eq!(table.max_speed(), Some(300.0));
        assert_eq!(table.mean_speed(), Some(200.0));
    }

    #[test]
    fn test_track_coords() {
        let lap = lap_with_samples(vec![sample(0.0, 100.0, false)]);
        let table = prepare_telemetry(&lap).unwrap();
        assert_eq!(table.track_coords(), vec![(120.0, -45.0)]);
    }

    #[test]
    fn test_empty_table_statistics() {
        let table = TelemetryTable::default();
        assert_eq!(table.max_speed(), None);
        assert_eq!(table.mean_speed(), None);
        assert_eq!(table.max_distance(), None);
    }
}
