use log::debug;

use crate::session::{Lap, Session};
use crate::telemetry::{TelemetryTable, prepare_telemetry};

/// Optional restrictions applied by [`prepare_session_laps`]. Callers enable
/// any subset; the defaults match the dashboard's usual view of a session.
#[derive(Clone, Debug)]
pub struct LapFilters {
    /// Drop laps failing the validity invariant (no time, in/out, deleted)
    pub valid_only: bool,
    /// Keep only laps of this session segment, e.g. "Q2". No-op when the
    /// loaded data carries no segment attribute.
    pub segment: Option<String>,
    /// Keep only the laps of the stint with the most laps
    pub longest_stint: bool,
}

impl Default for LapFilters {
    fn default() -> Self {
        Self {
            valid_only: true,
            segment: None,
            longest_stint: false,
        }
    }
}

/// All laps recorded for a driver, in lap order.
pub fn driver_laps<'s>(session: &'s Session, driver: &str) -> Vec<&'s Lap> {
    session.laps_for(driver)
}

/// Drop in-laps, out-laps, deleted laps, and laps without a time.
pub fn filter_valid_laps<'s>(laps: &[&'s Lap]) -> Vec<&'s Lap> {
    laps.iter().copied().filter(|lap| lap.is_valid()).collect()
}

/// Restrict to one session segment (Q1/Q2/Q3). When no lap carries a
/// segment attribute the filter is a no-op, so non-qualifying sessions pass
/// through unchanged.
pub fn filter_session_segment<'s>(laps: &[&'s Lap], segment: &str) -> Vec<&'s Lap> {
    if laps.iter().all(|lap| lap.session_segment.is_none()) {
        return laps.to_vec();
    }
    laps.iter()
        .copied()
        .filter(|lap| lap.session_segment.as_deref() == Some(segment))
        .collect()
}

/// Keep the laps of the stint with the most laps. Ties resolve to the
/// first-encountered stint; laps without a stint attribute pass through
/// unchanged only when no lap has one.
pub fn longest_stint<'s>(laps: &[&'s Lap]) -> Vec<&'s Lap> {
    if laps.iter().all(|lap| lap.stint.is_none()) {
        return laps.to_vec();
    }

    // Stint numbers in first-encounter order, so ties pick the earliest.
    let mut counts: Vec<(u32, usize)> = Vec::new();
    for lap in laps {
        let Some(stint) = lap.stint else { continue };
        match counts.iter_mut().find(|(s, _)| *s == stint) {
            Some((_, count)) => *count += 1,
            None => counts.push((stint, 1)),
        }
    }

    let mut best = counts[0];
    for &candidate in &counts[1..] {
        if candidate.1 > best.1 {
            best = candidate;
        }
    }

    laps.iter()
        .copied()
        .filter(|lap| lap.stint == Some(best.0))
        .collect()
}

/// Prepare a driver's laps for display: fetch them and apply the requested
/// filters in order (validity, segment, longest stint).
pub fn prepare_session_laps<'s>(
    session: &'s Session,
    driver: &str,
    filters: &LapFilters,
) -> Vec<&'s Lap> {
    let mut laps = driver_laps(session, driver);
    if filters.valid_only {
        laps = filter_valid_laps(&laps);
    }
    if let Some(segment) = &filters.segment {
        laps = filter_session_segment(&laps, segment);
    }
    if filters.longest_stint && !laps.is_empty() {
        laps = longest_stint(&laps);
    }
    laps
}

/// Outcome of a bounds-safe lap lookup: either the requested lap, or the
/// first lap of the set when the requested number is absent. Keeping the two
/// apart lets callers tell a real match from the leniency fallback.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LapSelection<'a> {
    Exact(&'a Lap),
    Fallback(&'a Lap),
}

impl<'a> LapSelection<'a> {
    pub fn lap(&self) -> &'a Lap {
        match self {
            LapSelection::Exact(lap) | LapSelection::Fallback(lap) => lap,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, LapSelection::Fallback(_))
    }
}

/// Look up a lap by number without failing: an absent lap number falls back
/// to the first lap of the set. Returns `None` only for an empty set.
pub fn safe_lap_selection<'a>(laps: &[&'a Lap], lap_number: u32) -> Option<LapSelection<'a>> {
    match laps.iter().find(|lap| lap.lap_number == lap_number) {
        Some(lap) => Some(LapSelection::Exact(lap)),
        None => laps.first().map(|lap| LapSelection::Fallback(lap)),
    }
}

/// Normalized telemetry for every lap in a filtered set, for overlay
/// display. Laps without telemetry are skipped rather than failing the
/// whole overlay.
pub fn overlay_telemetry(laps: &[&Lap]) -> Vec<TelemetryTable> {
    laps.iter()
        .filter_map(|lap| match prepare_telemetry(lap) {
            Ok(table) => Some(table),
            Err(_) => {
                debug!(
                    "skipping lap {} of driver {} in overlay, no telemetry",
                    lap.lap_number, lap.driver
                );
                None
            }
        })
        .collect()
}
