//! Display-side decision mapping.
//!
//! The ETL already stores condition, risk and recommendation on every
//! window. These helpers only derive a badge and a suggested action for the
//! UI; they never replace what is stored.

use serde::{Deserialize, Serialize};

pub const CONDITION_COMFORTABLE: &str = "Nyaman";
pub const CONDITION_WARM: &str = "Gerah";
pub const CONDITION_UNSTABLE: &str = "Tidak Stabil";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RiskLevel {
    Low,
    Medium,
}

impl RiskLevel {
    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Rendah",
            RiskLevel::Medium => "Sedang",
        }
    }
}

/// Colour class used by the stylesheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Tone {
    Green,
    Yellow,
}

impl Tone {
    pub fn css_class(&self) -> &'static str {
        match self {
            Tone::Green => "green",
            Tone::Yellow => "yellow",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub condition: String,
    pub risk: RiskLevel,
    pub action: &'static str,
    pub tone: Tone,
}

impl Decision {
    /// Maps a stored condition label to a risk badge and suggested action.
    pub fn from_condition(condition: &str) -> Self {
        let (risk, action, tone) = match condition {
            CONDITION_COMFORTABLE => (RiskLevel::Low, "Tidak perlu tindakan", Tone::Green),
            CONDITION_WARM => (
                RiskLevel::Medium,
                "Pertimbangkan pendinginan ruangan",
                Tone::Yellow,
            ),
            _ => (RiskLevel::Medium, "Pantau kondisi", Tone::Yellow),
        };

        Self {
            condition: condition.to_string(),
            risk,
            action,
            tone,
        }
    }
}

/// Rough classification of a single live reading, shown when no
/// historical window is close enough to borrow a label from.
pub fn classify_reading(temperature: f64, humidity: f64) -> Decision {
    let condition = if (22.0..=26.0).contains(&temperature) && (40.0..=70.0).contains(&humidity) {
        CONDITION_COMFORTABLE
    } else if temperature > 26.0 {
        CONDITION_WARM
    } else {
        CONDITION_UNSTABLE
    };
    Decision::from_condition(condition)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comfortable_needs_no_action() {
        let decision = Decision::from_condition("Nyaman");
        assert_eq!(decision.risk, RiskLevel::Low);
        assert_eq!(decision.action, "Tidak perlu tindakan");
        assert_eq!(decision.tone, Tone::Green);
    }

    #[test]
    fn warm_suggests_cooling() {
        let decision = Decision::from_condition("Gerah");
        assert_eq!(decision.risk, RiskLevel::Medium);
        assert_eq!(decision.action, "Pertimbangkan pendinginan ruangan");
    }

    #[test]
    fn unknown_label_falls_back_to_monitoring() {
        let decision = Decision::from_condition("Lembab");
        assert_eq!(decision.condition, "Lembab");
        assert_eq!(decision.risk, RiskLevel::Medium);
        assert_eq!(decision.action, "Pantau kondisi");
        assert_eq!(decision.tone, Tone::Yellow);
    }

    #[test]
    fn reading_classification_bands() {
        assert_eq!(classify_reading(22.0, 40.0).condition, "Nyaman");
        assert_eq!(classify_reading(26.0, 70.0).condition, "Nyaman");
        assert_eq!(classify_reading(26.1, 55.0).condition, "Gerah");
        assert_eq!(classify_reading(24.0, 80.0).condition, "Tidak Stabil");
        assert_eq!(classify_reading(18.0, 55.0).condition, "Tidak Stabil");
    }

    #[test]
    fn risk_labels_match_stored_vocabulary() {
        assert_eq!(RiskLevel::Low.label(), "Rendah");
        assert_eq!(RiskLevel::Medium.label(), "Sedang");
    }
}
