use simple_moving_average::{SMA, SumTreeSMA};

use crate::session::Lap;

/// Width of the trailing lap-time average drawn on the evolution trend.
pub const EVOLUTION_ROLLING_WINDOW: usize = 3;

/// One lap of the lap-time evolution view.
#[derive(Clone, Debug, PartialEq)]
pub struct EvolutionRow {
    pub lap_number: u32,
    pub lap_time_s: Option<f64>,
    /// Lap time as "m:ss.mmm", absent when the lap has no time
    pub lap_time_formatted: Option<String>,
    /// Validity per the lap invariant (timed, no in/out, not deleted)
    pub is_valid: bool,
    pub compound: Option<String>,
    /// Trailing [`EVOLUTION_ROLLING_WINDOW`]-lap mean over the valid laps so
    /// far; absent on invalid laps
    pub rolling_avg_s: Option<f64>,
}

/// Format seconds as "m:ss.mmm", e.g. 91.234 becomes "1:31.234".
pub fn format_lap_time(seconds: f64) -> String {
    let minutes = (seconds / 60.0).floor() as u32;
    let remainder = seconds - minutes as f64 * 60.0;
    format!("{minutes}:{remainder:06.3}")
}

/// Prepare a driver's laps for trend display.
///
/// Rows come back in input order, one per lap, carrying the lap time in
/// seconds, its formatted form, the validity flag, the tyre compound, and a
/// rolling average over the valid laps. The second value is the index of the
/// first row with the minimum lap time across ALL rows passed in, valid or
/// not — callers wanting the fastest valid lap must pre-filter.
pub fn lap_time_evolution(laps: &[&Lap]) -> (Vec<EvolutionRow>, Option<usize>) {
    let mut rolling = SumTreeSMA::<f64, f64, EVOLUTION_ROLLING_WINDOW>::new();
    let rows: Vec<EvolutionRow> = laps
        .iter()
        .map(|lap| {
            let rolling_avg_s = match (lap.is_valid(), lap.lap_time_s) {
                (true, Some(time)) => {
                    rolling.add_sample(time);
                    Some(rolling.get_average())
                }
                _ => None,
            };
            EvolutionRow {
                lap_number: lap.lap_number,
                lap_time_s: lap.lap_time_s,
                lap_time_formatted: lap.lap_time_s.map(format_lap_time),
                is_valid: lap.is_valid(),
                compound: lap.compound.clone(),
                rolling_avg_s,
            }
        })
        .collect();

    let mut fastest_index: Option<usize> = None;
    for (i, row) in rows.iter().enumerate() {
        let Some(time) = row.lap_time_s else { continue };
        match fastest_index {
            Some(best) => {
                let best_time: f64 = rows[best].lap_time_s.unwrap_or(f64::INFINITY);
                if time < best_time {
                    fastest_index = Some(i);
                }
            }
            None => fastest_index = Some(i),
        }
    }

    (rows, fastest_index)
}
