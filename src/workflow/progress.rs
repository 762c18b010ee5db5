//! Cosmetic status text shown while an analysis is in flight
//!
//! The schedule runs on a fixed local timer and is deliberately decoupled
//! from real request progress; it never drives control flow.

use std::time::Duration;

/// Status text shown before a scan starts
pub const IDLE_STATUS: &str = "Initializing...";

/// Status text for the preprocessing step
pub const COMPRESSING_STATUS: &str = "Compressing Image...";

/// Absolute offsets from the start of the analysis step
pub const ANALYSIS_SCHEDULE: &[(Duration, &str)] = &[
    (Duration::from_millis(0), "Encrypting & Uploading..."),
    (Duration::from_millis(1500), "Analyzing Vehicle Geometry..."),
    (Duration::from_millis(3500), "Detecting Damage Patterns..."),
    (Duration::from_millis(5500), "Calculating Regional Repair Costs..."),
    (Duration::from_millis(7500), "Finalizing Assessment..."),
];

/// The scheduled status text for a given elapsed analysis time
pub fn status_at(elapsed: Duration) -> &'static str {
    ANALYSIS_SCHEDULE
        .iter()
        .rev()
        .find(|(offset, _)| *offset <= elapsed)
        .map(|(_, text)| *text)
        .unwrap_or(ANALYSIS_SCHEDULE[0].1)
}
