pub(crate) mod cache;
pub(crate) mod loader;

use std::fmt;
use std::str::FromStr;

pub use cache::{CachedSessionLoader, SessionCache};
pub use loader::{JsonlSessionLoader, SessionLoader, load_session_file};
use serde::{Deserialize, Serialize};

use crate::telemetry::TelemetrySample;

/// The session types a race weekend can carry, in FastF1-style short codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionType {
    Practice1,
    Practice2,
    Practice3,
    SprintQualifying,
    SprintShootout,
    Sprint,
    Qualifying,
    Race,
}

/// Readable session names as they appear in event schedules, matched by
/// containment in declaration order so that "Sprint Qualifying" wins over
/// "Sprint".
const SESSION_NAMES: [(&str, SessionType); 8] = [
    ("Practice 1", SessionType::Practice1),
    ("Practice 2", SessionType::Practice2),
    ("Practice 3", SessionType::Practice3),
    ("Sprint Qualifying", SessionType::SprintQualifying),
    ("Sprint Shootout", SessionType::SprintShootout),
    ("Sprint", SessionType::Sprint),
    ("Qualifying", SessionType::Qualifying),
    ("Race", SessionType::Race),
];

impl SessionType {
    /// Short code used in session export files and on the command line.
    pub fn code(&self) -> &'static str {
        match self {
            SessionType::Practice1 => "FP1",
            SessionType::Practice2 => "FP2",
            SessionType::Practice3 => "FP3",
            SessionType::SprintQualifying => "SQ",
            SessionType::SprintShootout => "SS",
            SessionType::Sprint => "S",
            SessionType::Qualifying => "Q",
            SessionType::Race => "R",
        }
    }

    /// Parse either a short code ("FP2", "Q") or a schedule name
    /// ("Practice 2", "Sprint Qualifying").
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        for session_type in [
            SessionType::Practice1,
            SessionType::Practice2,
            SessionType::Practice3,
            SessionType::SprintQualifying,
            SessionType::SprintShootout,
            SessionType::Sprint,
            SessionType::Qualifying,
            SessionType::Race,
        ] {
            if trimmed.eq_ignore_ascii_case(session_type.code()) {
                return Some(session_type);
            }
        }
        SESSION_NAMES
            .iter()
            .find(|(name, _)| trimmed.contains(name))
            .map(|(_, session_type)| *session_type)
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for SessionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SessionType::parse(s).ok_or_else(|| format!("unknown session type: {s}"))
    }
}

/// How a caller names the event of a weekend: by its round number in the
/// calendar, or by (part of) its name. Resolved explicitly by the session
/// loader; there is no runtime type sniffing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventSelector {
    Round(u32),
    Name(String),
}

impl EventSelector {
    pub fn matches(&self, event: &EventInfo) -> bool {
        match self {
            EventSelector::Round(round) => event.round == *round,
            EventSelector::Name(name) => event
                .event_name
                .to_lowercase()
                .contains(&name.to_lowercase()),
        }
    }
}

impl fmt::Display for EventSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventSelector::Round(round) => write!(f, "round {round}"),
            EventSelector::Name(name) => write!(f, "{name}"),
        }
    }
}

impl FromStr for EventSelector {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.parse::<u32>() {
            Ok(round) => EventSelector::Round(round),
            Err(_) => EventSelector::Name(s.to_string()),
        })
    }
}

/// Identifies one session of one race weekend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionKey {
    pub year: u16,
    pub event: EventSelector,
    pub session_type: SessionType,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EventInfo {
    pub year: u16,
    /// Position of the weekend in the season calendar
    pub round: u32,
    /// Official event name, e.g. "Italian Grand Prix"
    pub event_name: String,
    pub circuit_name: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DriverInfo {
    /// Racing number as it identifies the driver in lap data, e.g. "44"
    pub number: String,
    /// Three-letter abbreviation, e.g. "HAM"
    pub abbreviation: String,
    pub full_name: String,
    pub team_name: String,
    /// Team color as a hex string, with or without the leading '#'
    pub team_color: String,
}

impl DriverInfo {
    /// Team color normalized to a leading '#'.
    pub fn color(&self) -> String {
        if self.team_color.starts_with('#') {
            self.team_color.clone()
        } else {
            format!("#{}", self.team_color)
        }
    }

    pub fn label(&self) -> String {
        format!("{} ({})", self.abbreviation, self.number)
    }
}

/// One row per completed or attempted lap.
///
/// A lap with no recorded time, a pit-in or pit-out timestamp, or the
/// deleted flag set is invalid and excluded from timing analysis by default.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Lap {
    /// Racing number of the driver who drove the lap
    pub driver: String,
    pub lap_number: u32,
    /// Lap time in seconds, absent when the lap was not completed cleanly
    pub lap_time_s: Option<f64>,
    pub sector1_s: Option<f64>,
    pub sector2_s: Option<f64>,
    pub sector3_s: Option<f64>,
    /// Tyre compound name, e.g. "SOFT"
    pub compound: Option<String>,
    /// Stint the lap belongs to
    pub stint: Option<u32>,
    /// Session segment for split sessions, e.g. "Q1"
    pub session_segment: Option<String>,
    /// Session time of pit entry; presence marks an in-lap
    pub pit_in_time_s: Option<f64>,
    /// Session time of pit exit; presence marks an out-lap
    pub pit_out_time_s: Option<f64>,
    /// Whether race control deleted the lap time
    pub deleted: bool,
    /// Time-ordered telemetry samples recorded during the lap
    pub telemetry: Vec<TelemetrySample>,
}

impl Lap {
    /// Whether the lap counts for pure-pace analysis: it has a lap time, is
    /// neither an in-lap nor an out-lap, and was not deleted.
    pub fn is_valid(&self) -> bool {
        self.lap_time_s.is_some()
            && self.pit_in_time_s.is_none()
            && self.pit_out_time_s.is_none()
            && !self.deleted
    }

    pub fn sector_times(&self) -> [Option<f64>; 3] {
        [self.sector1_s, self.sector2_s, self.sector3_s]
    }
}

/// A fully loaded session: event metadata, participating drivers, and the
/// complete lap table with embedded telemetry. Consumers treat it as
/// read-only; every derived table is computed fresh from it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    pub event: EventInfo,
    pub session_type: SessionType,
    pub drivers: Vec<DriverInfo>,
    pub laps: Vec<Lap>,
}

impl Session {
    /// Driver metadata lookup by racing number.
    pub fn driver(&self, number: &str) -> Option<&DriverInfo> {
        self.drivers.iter().find(|d| d.number == number)
    }

    /// Participating driver numbers, in entry-list order.
    pub fn driver_numbers(&self) -> Vec<&str> {
        self.drivers.iter().map(|d| d.number.as_str()).collect()
    }

    /// All laps recorded for one driver, in lap order.
    pub fn laps_for(&self, driver: &str) -> Vec<&Lap> {
        self.laps.iter().filter(|l| l.driver == driver).collect()
    }
}

/// Header line of a session export file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionHeader {
    pub event: EventInfo,
    pub session_type: SessionType,
}

/// One line of a session export file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum SessionRecord {
    Header(SessionHeader),
    Driver(DriverInfo),
    Lap(Lap),
}
