use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

pub const ENV_DATABASE_PATH: &str = "IOT_DASHBOARD_DB";

const MAX_REALTIME_LIMIT: usize = 500;

/// Where the analysis page gets its candidate windows from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnalysisSource {
    /// Show the most recent window as-is, without matching.
    LatestWindow,
    /// Load every window and filter by tolerance in memory.
    ClientFilter,
    /// Ask the database for the tolerance band only, then pick the nearest.
    RangeQuery,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardSettings {
    /// Max |avg_temperature - live temperature| for a window to be a candidate.
    pub tolerance: f64,
    pub refresh_interval_secs: u64,
    /// Number of raw readings on the realtime page.
    pub realtime_limit: usize,
    pub analysis_source: AnalysisSource,
    /// Show the label-derived risk and action next to the stored fields.
    pub derived_decision: bool,
    /// Restrict the history table to the tolerance band around the live reading.
    pub history_filtered: bool,
    pub database_path: Option<PathBuf>,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            tolerance: 0.5,
            refresh_interval_secs: 3,
            realtime_limit: 40,
            analysis_source: AnalysisSource::RangeQuery,
            derived_decision: false,
            history_filtered: false,
            database_path: None,
        }
    }
}

impl DashboardSettings {
    pub fn validate(&self) -> Result<()> {
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            bail!("tolerance must be a non-negative number, got {}", self.tolerance);
        }
        if self.refresh_interval_secs == 0 {
            bail!("refresh interval must be at least one second");
        }
        Ok(())
    }

    pub fn realtime_limit(&self) -> usize {
        self.realtime_limit.clamp(1, MAX_REALTIME_LIMIT)
    }

    /// Inclusive average-temperature band matched against `live_temperature`.
    pub fn temperature_band(&self, live_temperature: f64) -> (f64, f64) {
        (
            live_temperature - self.tolerance,
            live_temperature + self.tolerance,
        )
    }

    /// Database file: env override, then the saved path, then `default_path`.
    pub fn resolve_database_path(&self, default_path: PathBuf) -> PathBuf {
        std::env::var_os(ENV_DATABASE_PATH)
            .map(PathBuf::from)
            .filter(|path| !path.as_os_str().is_empty())
            .or_else(|| self.database_path.clone())
            .unwrap_or(default_path)
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<DashboardSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            let parsed: DashboardSettings = serde_json::from_str(&contents).unwrap_or_default();
            if parsed.validate().is_ok() {
                parsed
            } else {
                DashboardSettings::default()
            }
        } else {
            DashboardSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn get(&self) -> DashboardSettings {
        self.read().clone()
    }

    pub fn update(&self, settings: DashboardSettings) -> Result<()> {
        settings.validate()?;
        {
            let mut guard = self.write();
            self.persist(&settings)?;
            *guard = settings;
        }
        Ok(())
    }

    fn persist(&self, data: &DashboardSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }

    fn read(&self) -> RwLockReadGuard<'_, DashboardSettings> {
        match self.data.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, DashboardSettings> {
        match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();
        let settings = store.get();
        assert_eq!(settings, DashboardSettings::default());
        assert_eq!(settings.tolerance, 0.5);
        assert_eq!(settings.refresh_interval_secs, 3);
        assert_eq!(settings.analysis_source, AnalysisSource::RangeQuery);
    }

    #[test]
    fn update_persists_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let store = SettingsStore::new(path.clone()).unwrap();

        let mut settings = store.get();
        settings.tolerance = 1.0;
        settings.analysis_source = AnalysisSource::ClientFilter;
        store.update(settings.clone()).unwrap();

        let reloaded = SettingsStore::new(path).unwrap();
        assert_eq!(reloaded.get(), settings);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "tolerance": 1.0, "analysisSource": "latestWindow" }"#).unwrap();

        let settings = SettingsStore::new(path).unwrap().get();
        assert_eq!(settings.tolerance, 1.0);
        assert_eq!(settings.analysis_source, AnalysisSource::LatestWindow);
        assert_eq!(settings.realtime_limit, 40);
    }

    #[test]
    fn corrupt_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(SettingsStore::new(path).unwrap().get(), DashboardSettings::default());
    }

    #[test]
    fn invalid_tolerance_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json")).unwrap();

        let mut settings = store.get();
        settings.tolerance = -0.5;
        assert!(store.update(settings.clone()).is_err());
        settings.tolerance = f64::NAN;
        assert!(store.update(settings).is_err());
        assert_eq!(store.get().tolerance, 0.5);
    }

    #[test]
    fn realtime_limit_is_clamped() {
        let mut settings = DashboardSettings::default();
        settings.realtime_limit = 0;
        assert_eq!(settings.realtime_limit(), 1);
        settings.realtime_limit = 10_000;
        assert_eq!(settings.realtime_limit(), MAX_REALTIME_LIMIT);
    }

    #[test]
    fn temperature_band_is_symmetric() {
        let settings = DashboardSettings {
            tolerance: 1.0,
            ..DashboardSettings::default()
        };
        assert_eq!(settings.temperature_band(25.0), (24.0, 26.0));
    }
}
