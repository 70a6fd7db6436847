//! Application-level configuration loading: zones, seeded courts and the standings scheme.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::state::statistics::OutcomePoints;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "SHUTTLE_COURT_CONFIG_PATH";

/// Group of teams that play each other.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Zone {
    /// Identifier used on teams (e.g. `zone-a`).
    pub id: String,
    /// Display name.
    pub name: String,
}

/// Court created when the store holds none.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CourtSeed {
    /// Slug identifier (e.g. `court-1`).
    pub id: String,
    /// Display name.
    pub name: String,
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    zones: Vec<Zone>,
    courts: Vec<CourtSeed>,
    outcome_points: OutcomePoints,
    approval_required: bool,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        zones = app_config.zones.len(),
                        courts = app_config.courts.len(),
                        "loaded tournament configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Zones teams can register in.
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Identifiers of [`AppConfig::zones`].
    pub fn zone_ids(&self) -> Vec<String> {
        self.zones.iter().map(|zone| zone.id.clone()).collect()
    }

    /// Whether `zone` is one of the configured zones.
    pub fn has_zone(&self, zone: &str) -> bool {
        self.zones.iter().any(|candidate| candidate.id == zone)
    }

    /// Courts seeded into an empty store.
    pub fn courts(&self) -> &[CourtSeed] {
        &self.courts
    }

    /// Standings reward per match result.
    pub fn outcome_points(&self) -> OutcomePoints {
        self.outcome_points
    }

    /// Default approval gate for newly created matches.
    pub fn approval_required(&self) -> bool {
        self.approval_required
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            zones: ["a", "b", "c", "d"]
                .into_iter()
                .map(|suffix| Zone {
                    id: format!("zone-{suffix}"),
                    name: format!("Zone {}", suffix.to_uppercase()),
                })
                .collect(),
            courts: (1..=3)
                .map(|n| CourtSeed {
                    id: format!("court-{n}"),
                    name: format!("Court {n}"),
                })
                .collect(),
            outcome_points: OutcomePoints::default(),
            approval_required: false,
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
/// Missing keys keep their built-in value.
struct RawConfig {
    zones: Option<Vec<Zone>>,
    courts: Option<Vec<CourtSeed>>,
    outcome_points: Option<OutcomePoints>,
    approval_required: Option<bool>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = Self::default();
        Self {
            zones: value.zones.unwrap_or(defaults.zones),
            courts: value.courts.unwrap_or(defaults.courts),
            outcome_points: value.outcome_points.unwrap_or(defaults.outcome_points),
            approval_required: value
                .approval_required
                .unwrap_or(defaults.approval_required),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let raw: RawConfig = serde_json::from_str(
            r#"{ "outcome_points": { "win": 2, "loss": 0 }, "approval_required": true }"#,
        )
        .unwrap();
        let config = AppConfig::from(raw);

        assert_eq!(config.outcome_points(), OutcomePoints { win: 2, loss: 0 });
        assert!(config.approval_required());
        assert_eq!(config.zone_ids(), ["zone-a", "zone-b", "zone-c", "zone-d"]);
        assert_eq!(config.courts().len(), 3);
    }

    #[test]
    fn zones_are_matched_by_id() {
        let config = AppConfig::default();
        assert!(config.has_zone("zone-c"));
        assert!(!config.has_zone("Zone C"));
    }
}
