use std::{fmt, str::FromStr};

use anyhow::{anyhow, Error};
use serde::{Deserialize, Serialize};

/// Pages of the dashboard. The active one is routing state owned by the
/// refresh controller and passed explicitly into fetch and render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum View {
    #[default]
    Overview,
    Realtime,
    Analysis,
    History,
    Pipeline,
    Value,
    About,
}

impl View {
    /// Sidebar order.
    pub const ALL: [View; 7] = [
        View::Overview,
        View::Realtime,
        View::Analysis,
        View::History,
        View::Pipeline,
        View::Value,
        View::About,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            View::Overview => "overview",
            View::Realtime => "realtime",
            View::Analysis => "analysis",
            View::History => "history",
            View::Pipeline => "pipeline",
            View::Value => "value",
            View::About => "about",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            View::Overview => "Overview",
            View::Realtime => "Realtime Monitoring",
            View::Analysis => "Analisis Kondisi",
            View::History => "Riwayat Data ETL",
            View::Pipeline => "Big Data Pipeline",
            View::Value => "Value & Insight",
            View::About => "About Us",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            View::Overview => "🏠",
            View::Realtime => "📡",
            View::Analysis => "🧠",
            View::History => "📊",
            View::Pipeline => "🔄",
            View::Value => "🎯",
            View::About => "👥",
        }
    }

    /// Views backed by database reads; the rest are static text.
    pub fn is_live(&self) -> bool {
        matches!(self, View::Realtime | View::Analysis | View::History)
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for View {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        View::ALL
            .into_iter()
            .find(|view| view.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| anyhow!("unknown view '{value}'"))
    }
}
