use log::debug;

use crate::session::Session;

/// Display styling for one driver's traces: team color and a short label.
#[derive(Clone, Debug, PartialEq)]
pub struct DriverStyle {
    /// Hex color with leading '#'
    pub color: String,
    /// "ABB (number)" label for legends
    pub label: String,
}

/// Map each selected driver to their display style, in selection order.
/// Drivers missing from the session's entry list are skipped.
pub fn extract_driver_styles(session: &Session, drivers: &[&str]) -> Vec<(String, DriverStyle)> {
    drivers
        .iter()
        .filter_map(|&driver| match session.driver(driver) {
            Some(info) => Some((
                driver.to_string(),
                DriverStyle {
                    color: info.color(),
                    label: info.label(),
                },
            )),
            None => {
                debug!("driver {driver} not in session entry list, no style");
                None
            }
        })
        .collect()
}
