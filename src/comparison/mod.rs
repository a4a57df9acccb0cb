pub(crate) mod delta;
pub(crate) mod evolution;
pub(crate) mod fastest;
pub(crate) mod session_laps;
pub(crate) mod styles;
pub(crate) mod summary;

pub use delta::{
    CUMULATIVE_DELTA_SAMPLES, CumulativeDelta, DELTA_SMOOTHING_WINDOW, DeltaComparison,
    compute_delta, cumulative_delta,
};
pub use evolution::{EVOLUTION_ROLLING_WINDOW, EvolutionRow, format_lap_time, lap_time_evolution};
pub use fastest::{FastestLapRow, fastest_lap_rows, fastest_laps};
pub use session_laps::{
    LapFilters, LapSelection, driver_laps, filter_session_segment, filter_valid_laps,
    longest_stint, overlay_telemetry, prepare_session_laps, safe_lap_selection,
};
pub use styles::{DriverStyle, extract_driver_styles};
pub use summary::{
    ComparisonSummary, DriverLapEntry, KpiMetric, SectorSwing, comparison_summary, sector_deltas,
};
