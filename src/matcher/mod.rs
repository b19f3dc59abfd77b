//! Nearest-aggregate matching.
//!
//! Correlates a live DHT22 reading with the historical window that looks most
//! like it: the window's average temperature must sit within `tolerance` of
//! the live temperature, and among those the closest average humidity wins.

pub mod decision;

use std::cmp::Ordering;

use serde::Serialize;

use crate::db::AggregateWindow;

pub use decision::{classify_reading, Decision, RiskLevel, Tone};

/// Picks the window closest to the live reading.
///
/// Returns `None` when no window's average temperature is within `tolerance`;
/// that is an ordinary outcome, not an error. Exact humidity ties go to the
/// earliest `window_start`, then to input order.
pub fn select_nearest(
    live_temperature: f64,
    live_humidity: f64,
    tolerance: f64,
    windows: &[AggregateWindow],
) -> Option<&AggregateWindow> {
    windows
        .iter()
        .filter(|window| within_tolerance(window, live_temperature, tolerance))
        .fold(None, |best: Option<&AggregateWindow>, candidate| match best {
            None => Some(candidate),
            Some(current) => {
                if prefer(candidate, current, live_humidity) == Ordering::Less {
                    Some(candidate)
                } else {
                    Some(current)
                }
            }
        })
}

fn within_tolerance(window: &AggregateWindow, live_temperature: f64, tolerance: f64) -> bool {
    // Non-finite averages never qualify; a NaN tolerance compares false.
    window.avg_temperature.is_finite()
        && window.avg_humidity.is_finite()
        && (window.avg_temperature - live_temperature).abs() <= tolerance
}

fn humidity_distance(window: &AggregateWindow, live_humidity: f64) -> f64 {
    (window.avg_humidity - live_humidity).abs()
}

/// `Less` means `candidate` should replace `current`.
fn prefer(candidate: &AggregateWindow, current: &AggregateWindow, live_humidity: f64) -> Ordering {
    let candidate_diff = humidity_distance(candidate, live_humidity);
    let current_diff = humidity_distance(current, live_humidity);
    candidate_diff
        .total_cmp(&current_diff)
        .then_with(|| candidate.window_start.cmp(&current.window_start))
}

/// A selected window together with how far it sits from the live reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchOutcome {
    pub window: AggregateWindow,
    pub temperature_diff: f64,
    pub humidity_diff: f64,
}

impl MatchOutcome {
    pub fn new(window: &AggregateWindow, live_temperature: f64, live_humidity: f64) -> Self {
        Self {
            temperature_diff: (window.avg_temperature - live_temperature).abs(),
            humidity_diff: humidity_distance(window, live_humidity),
            window: window.clone(),
        }
    }
}

/// [`select_nearest`] packaged with the distances shown on the analysis page.
pub fn match_reading(
    live_temperature: f64,
    live_humidity: f64,
    tolerance: f64,
    windows: &[AggregateWindow],
) -> Option<MatchOutcome> {
    select_nearest(live_temperature, live_humidity, tolerance, windows)
        .map(|window| MatchOutcome::new(window, live_temperature, live_humidity))
}
