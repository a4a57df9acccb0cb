// Error types for pitwall

use snafu::Snafu;
use std::io;

#[derive(Debug, Snafu)]
pub enum PitwallError {
    // Errors while locating and reading session exports
    #[snafu(display("Could not read session export directory: {path}"))]
    SessionRootError { path: String, source: io::Error },
    #[snafu(display("Error reading session export file"))]
    SessionFileError { source: io::Error },
    #[snafu(display("Session export is missing its event header: {path}"))]
    MissingEventHeader { path: String },
    #[snafu(display("No session export matches {year} {event} {session_type}"))]
    SessionNotFound {
        year: u16,
        event: String,
        session_type: String,
    },

    // Telemetry preparation errors
    #[snafu(display("No telemetry recorded for driver {driver} on lap {lap_number}"))]
    NoLapTelemetry { driver: String, lap_number: u32 },

    // Session cache errors
    #[snafu(display("Could not find a cache directory for session storage"))]
    NoCacheDir,
    #[snafu(display("Error reading or writing the session cache"))]
    CacheIOError { source: io::Error },
    #[snafu(display("Error encoding session for the cache"))]
    CacheEncodeError { source: serde_json::Error },
    #[snafu(display("Error decoding cached session: {path}"))]
    CacheDecodeError {
        path: String,
        source: serde_json::Error,
    },
}
