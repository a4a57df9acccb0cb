// Library interface for pitwall
// This allows integration tests to access internal modules

pub mod comparison;
pub mod errors;
pub mod session;
pub mod telemetry;

// Re-export commonly used types
pub use comparison::{
    ComparisonSummary, DeltaComparison, DriverLapEntry, EvolutionRow, LapFilters, LapSelection,
};
pub use errors::PitwallError;
pub use session::{
    CachedSessionLoader, DriverInfo, EventInfo, EventSelector, Lap, Session, SessionCache,
    SessionKey, SessionLoader, SessionType,
};
pub use telemetry::{TelemetrySample, TelemetryTable, prepare_telemetry};
