use itertools::Itertools;
use log::debug;

use crate::comparison::evolution::format_lap_time;
use crate::session::{Lap, Session};

/// Pick each driver's fastest lap with a defined lap time.
///
/// Drivers with no laps, or no timed lap, are silently omitted. The returned
/// pairs keep the order of the input driver list; ties on lap time go to the
/// earliest lap.
pub fn fastest_laps<'s>(session: &'s Session, drivers: &[&str]) -> Vec<(String, &'s Lap)> {
    let mut result = Vec::new();
    for &driver in drivers {
        let timed_laps: Vec<&Lap> = session
            .laps_for(driver)
            .into_iter()
            .filter(|lap| lap.lap_time_s.is_some())
            .collect();
        let Some(position) = timed_laps
            .iter()
            .position_min_by(|a, b| lap_time(a).total_cmp(&lap_time(b)))
        else {
            debug!("no timed lap for driver {driver}, skipping");
            continue;
        };
        result.push((driver.to_string(), timed_laps[position]));
    }
    result
}

fn lap_time(lap: &Lap) -> f64 {
    // Callers only reach this for laps pre-filtered to have a time.
    lap.lap_time_s.unwrap_or(f64::INFINITY)
}

/// One row of the fastest-lap summary table: formatted lap and sector times,
/// with "-" standing in for missing values.
#[derive(Clone, Debug, PartialEq)]
pub struct FastestLapRow {
    pub driver: String,
    pub lap_time: String,
    pub sector1: String,
    pub sector2: String,
    pub sector3: String,
}

/// Build the per-driver fastest-lap table shown next to the telemetry
/// comparison. Drivers without a fastest lap are skipped.
pub fn fastest_lap_rows(session: &Session, drivers: &[&str]) -> Vec<FastestLapRow> {
    fastest_laps(session, drivers)
        .into_iter()
        .map(|(driver, lap)| FastestLapRow {
            driver,
            lap_time: format_optional_time(lap.lap_time_s),
            sector1: format_optional_time(lap.sector1_s),
            sector2: format_optional_time(lap.sector2_s),
            sector3: format_optional_time(lap.sector3_s),
        })
        .collect()
}

fn format_optional_time(seconds: Option<f64>) -> String {
    match seconds {
        Some(value) => format_lap_time(value),
        None => "-".to_string(),
    }
}
