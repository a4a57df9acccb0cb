use crate::session::Lap;
use crate::telemetry::TelemetryTable;

/// One driver's side of a head-to-head comparison: their fastest lap and its
/// normalized telemetry. Entry order carries meaning — ties go to the
/// first-listed driver.
#[derive(Clone, Copy, Debug)]
pub struct DriverLapEntry<'a> {
    pub driver: &'a str,
    pub lap: &'a Lap,
    pub telemetry: &'a TelemetryTable,
}

/// A scalar comparison metric: the absolute difference and the driver on the
/// better side of it.
#[derive(Clone, Debug, PartialEq)]
pub struct KpiMetric {
    pub delta: f64,
    pub leader: String,
}

/// The sector with the largest absolute time difference between the two
/// drivers. The signed value is driver-2 minus driver-1, so a non-negative
/// swing means the first driver won the sector.
#[derive(Clone, Debug, PartialEq)]
pub struct SectorSwing {
    /// Sector number, 1 to 3
    pub sector: usize,
    pub delta_s: f64,
    pub winner: String,
}

/// Headline metrics for a two-driver comparison. Every field is `None` when
/// the comparison is not available (anything other than exactly two
/// drivers), letting the caller render an "unavailable" state instead of
/// failing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ComparisonSummary {
    pub lap_time_gap: Option<KpiMetric>,
    pub top_speed: Option<KpiMetric>,
    pub avg_speed: Option<KpiMetric>,
    pub sector_swing: Option<SectorSwing>,
}

impl ComparisonSummary {
    /// The sentinel reported when the selection cannot be compared.
    pub fn unavailable() -> Self {
        Self::default()
    }
}

/// Derive the KPI card metrics from two drivers' fastest laps and telemetry.
///
/// With anything other than exactly two entries, all metrics report the
/// unavailable sentinel — a deliberate degradation policy, not an error.
pub fn comparison_summary(entries: &[DriverLapEntry]) -> ComparisonSummary {
    let [first, second] = entries else {
        return ComparisonSummary::unavailable();
    };

    ComparisonSummary {
        lap_time_gap: lap_time_gap(first, second),
        top_speed: speed_metric(first, second, |tel| tel.max_speed()),
        avg_speed: speed_metric(first, second, |tel| tel.mean_speed()),
        sector_swing: Some(largest_sector_swing(first, second)),
    }
}

fn lap_time_gap(first: &DriverLapEntry, second: &DriverLapEntry) -> Option<KpiMetric> {
    let time_1 = first.lap.lap_time_s?;
    let time_2 = second.lap.lap_time_s?;
    let leader = if time_1 <= time_2 {
        first.driver
    } else {
        second.driver
    };
    Some(KpiMetric {
        delta: (time_1 - time_2).abs(),
        leader: leader.to_string(),
    })
}

fn speed_metric(
    first: &DriverLapEntry,
    second: &DriverLapEntry,
    channel: impl Fn(&TelemetryTable) -> Option<f64>,
) -> Option<KpiMetric> {
    let speed_1 = channel(first.telemetry)?;
    let speed_2 = channel(second.telemetry)?;
    let leader = if speed_1 >= speed_2 {
        first.driver
    } else {
        second.driver
    };
    Some(KpiMetric {
        delta: (speed_1 - speed_2).abs(),
        leader: leader.to_string(),
    })
}

fn largest_sector_swing(first: &DriverLapEntry, second: &DriverLapEntry) -> SectorSwing {
    let sectors_1 = first.lap.sector_times();
    let sectors_2 = second.lap.sector_times();

    // Missing sector times count as zero.
    let mut swing_sector = 0;
    let mut swing = sectors_2[0].unwrap_or(0.0) - sectors_1[0].unwrap_or(0.0);
    for sector in 1..3 {
        let diff = sectors_2[sector].unwrap_or(0.0) - sectors_1[sector].unwrap_or(0.0);
        if diff.abs() > swing.abs() {
            swing_sector = sector;
            swing = diff;
        }
    }

    let winner = if swing >= 0.0 {
        first.driver
    } else {
        second.driver
    };
    SectorSwing {
        sector: swing_sector + 1,
        delta_s: swing,
        winner: winner.to_string(),
    }
}

/// Signed per-sector differences, driver-2 minus driver-1. A sector missing
/// on either side yields `None` for that sector, unlike the KPI swing which
/// substitutes zero.
pub fn sector_deltas(lap_1: &Lap, lap_2: &Lap) -> [Option<f64>; 3] {
    let sectors_1 = lap_1.sector_times();
    let sectors_2 = lap_2.sector_times();
    [0, 1, 2].map(|i| match (sectors_1[i], sectors_2[i]) {
        (Some(s1), Some(s2)) => Some(s2 - s1),
        _ => None,
    })
}
