use std::future::Future;

use anyhow::Result;
use serde::Serialize;

use crate::{
    db::{AggregateWindow, Database, RawReading},
    matcher::{classify_reading, match_reading, Decision, MatchOutcome},
    settings::{AnalysisSource, DashboardSettings},
};

use super::View;

const ENABLE_LOGS: bool = true;

use crate::log_warn;

/// What the analysis page shows for one refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisData {
    pub live: Option<RawReading>,
    pub source: AnalysisSource,
    pub tolerance: f64,
    /// Stored window chosen for the live reading; its fields are shown verbatim.
    pub matched: Option<MatchOutcome>,
    /// Badge derived from the matched window's condition label.
    pub derived: Option<Decision>,
    /// Reading-level estimate shown when nothing matched.
    pub fallback: Option<Decision>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ViewData {
    Static,
    Realtime {
        readings: Vec<RawReading>,
    },
    Analysis(AnalysisData),
    #[serde(rename_all = "camelCase")]
    History {
        windows: Vec<AggregateWindow>,
        band: Option<(f64, f64)>,
    },
}

/// Runs the reads `view` needs. Query failures are logged and turn into
/// empty or absent data so a refresh never fails as a whole.
pub async fn fetch_view_data(view: View, db: &Database, settings: &DashboardSettings) -> ViewData {
    match view {
        View::Realtime => ViewData::Realtime {
            readings: or_empty(
                "recent readings",
                db.recent_readings(settings.realtime_limit()),
            )
            .await,
        },
        View::Analysis => ViewData::Analysis(fetch_analysis(db, settings).await),
        View::History => fetch_history(db, settings).await,
        View::Overview | View::Pipeline | View::Value | View::About => ViewData::Static,
    }
}

async fn fetch_analysis(db: &Database, settings: &DashboardSettings) -> AnalysisData {
    let mut data = AnalysisData {
        live: None,
        source: settings.analysis_source,
        tolerance: settings.tolerance,
        matched: None,
        derived: None,
        fallback: None,
    };

    let Some(live) = or_absent("latest reading", db.latest_reading()).await else {
        return data;
    };

    data.matched = match settings.analysis_source {
        AnalysisSource::LatestWindow => or_absent("latest window", db.latest_window())
            .await
            .map(|window| MatchOutcome::new(&window, live.temperature, live.humidity)),
        AnalysisSource::ClientFilter => {
            let windows = or_empty("aggregate windows", db.all_windows()).await;
            match_reading(live.temperature, live.humidity, settings.tolerance, &windows)
        }
        AnalysisSource::RangeQuery => {
            let (min, max) = settings.temperature_band(live.temperature);
            let windows = or_empty(
                "aggregate windows in range",
                db.windows_in_temperature_range(min, max),
            )
            .await;
            match_reading(live.temperature, live.humidity, settings.tolerance, &windows)
        }
    };

    if settings.derived_decision {
        match &data.matched {
            Some(outcome) => data.derived = Some(Decision::from_condition(&outcome.window.condition)),
            None => data.fallback = Some(classify_reading(live.temperature, live.humidity)),
        }
    }

    data.live = Some(live);
    data
}

async fn fetch_history(db: &Database, settings: &DashboardSettings) -> ViewData {
    let band = if settings.history_filtered {
        or_absent("latest reading", db.latest_reading())
            .await
            .map(|live| settings.temperature_band(live.temperature))
    } else {
        None
    };

    ViewData::History {
        windows: or_empty("window history", db.window_history(band)).await,
        band,
    }
}

async fn or_absent<T>(what: &str, fut: impl Future<Output = Result<Option<T>>>) -> Option<T> {
    match fut.await {
        Ok(value) => value,
        Err(err) => {
            log_warn!("failed to load {what}: {err:#}");
            None
        }
    }
}

async fn or_empty<T>(what: &str, fut: impl Future<Output = Result<Vec<T>>>) -> Vec<T> {
    match fut.await {
        Ok(values) => values,
        Err(err) => {
            log_warn!("failed to load {what}: {err:#}");
            Vec::new()
        }
    }
}
