use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::warn;
use pitwall::comparison::{
    DriverLapEntry, LapFilters, comparison_summary, compute_delta, fastest_lap_rows, fastest_laps,
    format_lap_time, lap_time_evolution, prepare_session_laps, safe_lap_selection,
};
use pitwall::errors::PitwallError;
use pitwall::session::{
    CachedSessionLoader, EventSelector, JsonlSessionLoader, Lap, SessionCache, SessionKey,
    SessionLoader, SessionType,
};
use pitwall::telemetry::{TelemetryTable, prepare_telemetry};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compare drivers' fastest laps within one session
    Compare {
        /// Directory holding session export files
        #[arg(short, long)]
        data: PathBuf,

        #[arg(short, long)]
        year: u16,

        /// Event round number or (part of) the event name
        #[arg(short, long)]
        event: EventSelector,

        /// Session type, e.g. FP2, Q, R
        #[arg(short, long)]
        session: SessionType,

        /// Driver numbers to compare
        drivers: Vec<String>,

        /// Session cache directory, defaults to the user cache dir
        #[arg(long)]
        cache: Option<PathBuf>,
    },
    /// Inspect one driver's laps across a session
    Laps {
        /// Directory holding session export files
        #[arg(short, long)]
        data: PathBuf,

        #[arg(short, long)]
        year: u16,

        /// Event round number or (part of) the event name
        #[arg(short, long)]
        event: EventSelector,

        /// Session type, e.g. FP2, Q, R
        #[arg(short, long)]
        session: SessionType,

        /// Driver number
        driver: String,

        /// Keep only laps that count for pure pace
        #[arg(long)]
        valid_only: bool,

        /// Restrict to a qualifying segment (Q1, Q2, Q3)
        #[arg(long)]
        segment: Option<String>,

        /// Restrict to the stint with the most laps
        #[arg(long)]
        longest_stint: bool,

        /// Lap number to detail; absent numbers fall back to the first lap
        #[arg(long)]
        lap: Option<u32>,

        /// Session cache directory, defaults to the user cache dir
        #[arg(long)]
        cache: Option<PathBuf>,
    },
}

fn build_loader(
    data: PathBuf,
    cache: Option<PathBuf>,
) -> Result<CachedSessionLoader<JsonlSessionLoader>, PitwallError> {
    let cache_dir = match cache {
        Some(dir) => dir,
        None => SessionCache::default_cache_dir()?,
    };
    Ok(CachedSessionLoader::new(
        SessionCache::new(cache_dir)?,
        JsonlSessionLoader::new(data),
    ))
}

fn compare(
    loader: &impl SessionLoader,
    key: &SessionKey,
    drivers: &[String],
) -> Result<(), PitwallError> {
    let session = loader.load(key)?;
    let driver_refs: Vec<&str> = drivers.iter().map(String::as_str).collect();

    println!(
        "{} {} — {}",
        session.event.year, session.event.event_name, session.session_type
    );

    let rows = fastest_lap_rows(&session, &driver_refs);
    if rows.is_empty() {
        println!("No timed laps for the selected drivers");
        return Ok(());
    }
    println!(
        "{:<8} {:>10} {:>10} {:>10} {:>10}",
        "Driver", "Lap", "S1", "S2", "S3"
    );
    for row in &rows {
        println!(
            "{:<8} {:>10} {:>10} {:>10} {:>10}",
            row.driver, row.lap_time, row.sector1, row.sector2, row.sector3
        );
    }

    // Telemetry-backed comparison only makes sense head-to-head.
    let selected = fastest_laps(&session, &driver_refs);
    let mut prepared: Vec<(String, &Lap, TelemetryTable)> = Vec::new();
    for (driver, lap) in selected {
        match prepare_telemetry(lap) {
            Ok(table) => prepared.push((driver, lap, table)),
            Err(e) => warn!("{e}"),
        }
    }
    if prepared.len() != 2 {
        println!("Select exactly two drivers with telemetry for the delta comparison");
        return Ok(());
    }

    let entries: Vec<DriverLapEntry> = prepared
        .iter()
        .map(|(driver, lap, telemetry)| DriverLapEntry {
            driver,
            lap,
            telemetry,
        })
        .collect();
    let summary = comparison_summary(&entries);
    if let Some(gap) = &summary.lap_time_gap {
        println!("Lap time gap:  {:.3}s, {} ahead", gap.delta, gap.leader);
    }
    if let Some(top) = &summary.top_speed {
        println!("Top speed:     {:.1} km/h, {} higher", top.delta, top.leader);
    }
    if let Some(avg) = &summary.avg_speed {
        println!("Avg speed:     {:.1} km/h, {} higher", avg.delta, avg.leader);
    }
    if let Some(swing) = &summary.sector_swing {
        println!(
            "Sector swing:  sector {} by {:+.3}s, {} ahead",
            swing.sector, swing.delta_s, swing.winner
        );
    }

    let (Some(time_1), Some(time_2)) = (entries[0].lap.lap_time_s, entries[1].lap.lap_time_s)
    else {
        return Ok(());
    };
    let delta = compute_delta(entries[0].telemetry, entries[1].telemetry, time_1, time_2);
    println!("Reference lap: {}", entries[delta.faster_index].driver);
    if let Some(max_loss) = delta.delta_s.iter().cloned().reduce(f64::max) {
        println!("Largest deficit on lap: {max_loss:+.3}s");
    }
    Ok(())
}

fn laps(
    loader: &impl SessionLoader,
    key: &SessionKey,
    driver: &str,
    filters: &LapFilters,
    lap_number: Option<u32>,
) -> Result<(), PitwallError> {
    let session = loader.load(key)?;
    let laps = prepare_session_laps(&session, driver, filters);
    if laps.is_empty() {
        println!("No laps match the requested filters");
        return Ok(());
    }

    let (rows, fastest_index) = lap_time_evolution(&laps);
    println!(
        "{:<5} {:>10} {:>10} {:>8} {:>9}",
        "Lap", "Time", "Avg(3)", "Tyre", "Valid"
    );
    for (i, row) in rows.iter().enumerate() {
        let marker = if Some(i) == fastest_index { "*" } else { " " };
        println!(
            "{:<5} {:>10} {:>10} {:>8} {:>9}",
            format!("{}{}", row.lap_number, marker),
            row.lap_time_formatted.as_deref().unwrap_or("-"),
            row.rolling_avg_s
                .map(format_lap_time)
                .unwrap_or_else(|| "-".to_string()),
            row.compound.as_deref().unwrap_or("-"),
            if row.is_valid { "yes" } else { "no" },
        );
    }

    let Some(requested) = lap_number else {
        return Ok(());
    };
    let Some(selection) = safe_lap_selection(&laps, requested) else {
        return Ok(());
    };
    let lap = selection.lap();
    if selection.is_fallback() {
        println!(
            "Lap {requested} is not in the filtered set, showing lap {}",
            lap.lap_number
        );
    }
    let telemetry = prepare_telemetry(lap)?;
    println!(
        "Lap {}: {} samples over {:.0} m, top speed {:.1} km/h",
        lap.lap_number,
        telemetry.len(),
        telemetry.max_distance().unwrap_or(0.0),
        telemetry.max_speed().unwrap_or(0.0),
    );
    Ok(())
}

fn main() {
    #[cfg(debug_assertions)]
    colog::init();

    let cli = Args::parse();
    match cli.command {
        Commands::Compare {
            data,
            year,
            event,
            session,
            drivers,
            cache,
        } => {
            let loader = build_loader(data, cache).expect("could not set up the session cache");
            let key = SessionKey {
                year,
                event,
                session_type: session,
            };
            compare(&loader, &key, &drivers).expect("error while comparing laps");
        }
        Commands::Laps {
            data,
            year,
            event,
            session,
            driver,
            valid_only,
            segment,
            longest_stint,
            lap,
            cache,
        } => {
            let loader = build_loader(data, cache).expect("could not set up the session cache");
            let key = SessionKey {
                year,
                event,
                session_type: session,
            };
            let filters = LapFilters {
                valid_only,
                segment,
                longest_stint,
            };
            laps(&loader, &key, &driver, &filters, lap).expect("error while inspecting laps");
        }
    };
}
