//! Engine configuration: outcome-model dials, league bands and file loading.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::constants::{
    DEFAULT_CHAMPIONSHIP_SPOTS, DEFAULT_FORM_IMPACT, DEFAULT_HOME_ADVANTAGE,
    DEFAULT_PLAYOFF_SPOTS, DEFAULT_RANDOMNESS, DEFAULT_RELEGATION_SPOTS, DEFAULT_STRENGTH_FACTOR,
};
use crate::error::{Result, SimError};

/// Outcome-model dials.
///
/// Every dial is expected in `[0, 1]`. The engine does not validate this;
/// values outside the range give best-effort results.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationConfig {
    /// How strongly rating differences bias outcomes
    pub strength_factor: f64,

    /// Home bonus, scaled to at most 10 points on the normalized strength scale
    pub home_advantage: f64,

    /// Reserved for recency weighting; carried through but unused by the model
    pub form_impact: f64,

    /// Noise amplitude; also lowers reported confidence
    pub randomness: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            strength_factor: DEFAULT_STRENGTH_FACTOR,
            home_advantage: DEFAULT_HOME_ADVANTAGE,
            form_impact: DEFAULT_FORM_IMPACT,
            randomness: DEFAULT_RANDOMNESS,
        }
    }
}

impl SimulationConfig {
    /// Confidence reported on every simulated match.
    pub fn confidence(&self) -> f64 {
        1.0 - self.randomness
    }
}

/// Caller-supplied subset of the dials. Missing dials default independently.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialSimulationConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength_factor: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_advantage: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_impact: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub randomness: Option<f64>,
}

impl PartialSimulationConfig {
    /// Fill every missing dial from `fallback`.
    pub fn or(self, fallback: &PartialSimulationConfig) -> PartialSimulationConfig {
        PartialSimulationConfig {
            strength_factor: self.strength_factor.or(fallback.strength_factor),
            home_advantage: self.home_advantage.or(fallback.home_advantage),
            form_impact: self.form_impact.or(fallback.form_impact),
            randomness: self.randomness.or(fallback.randomness),
        }
    }

    pub fn resolve(&self) -> SimulationConfig {
        let defaults = SimulationConfig::default();
        SimulationConfig {
            strength_factor: self.strength_factor.unwrap_or(defaults.strength_factor),
            home_advantage: self.home_advantage.unwrap_or(defaults.home_advantage),
            form_impact: self.form_impact.unwrap_or(defaults.form_impact),
            randomness: self.randomness.unwrap_or(defaults.randomness),
        }
    }
}

impl From<SimulationConfig> for PartialSimulationConfig {
    fn from(config: SimulationConfig) -> Self {
        PartialSimulationConfig {
            strength_factor: Some(config.strength_factor),
            home_advantage: Some(config.home_advantage),
            form_impact: Some(config.form_impact),
            randomness: Some(config.randomness),
        }
    }
}

/// League table bands used by the Monte Carlo summaries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueBands {
    /// Positions `1..=playoff_spots` qualify for the playoffs
    #[serde(default = "default_playoff_spots")]
    pub playoff_spots: usize,

    /// Positions `1..=championship_spots` count as a title
    #[serde(default = "default_championship_spots")]
    pub championship_spots: usize,

    /// The last `relegation_spots` positions are relegated
    #[serde(default = "default_relegation_spots")]
    pub relegation_spots: usize,
}

fn default_playoff_spots() -> usize {
    DEFAULT_PLAYOFF_SPOTS
}

fn default_championship_spots() -> usize {
    DEFAULT_CHAMPIONSHIP_SPOTS
}

fn default_relegation_spots() -> usize {
    DEFAULT_RELEGATION_SPOTS
}

impl Default for LeagueBands {
    fn default() -> Self {
        LeagueBands {
            playoff_spots: default_playoff_spots(),
            championship_spots: default_championship_spots(),
            relegation_spots: default_relegation_spots(),
        }
    }
}

impl LeagueBands {
    pub fn is_playoff(&self, position: usize) -> bool {
        position >= 1 && position <= self.playoff_spots
    }

    pub fn is_champion(&self, position: usize) -> bool {
        position >= 1 && position <= self.championship_spots
    }

    pub fn is_relegated(&self, position: usize, team_count: usize) -> bool {
        self.relegation_spots > 0 && position > team_count.saturating_sub(self.relegation_spots)
    }
}

/// Host-level configuration file.
///
/// ```json
/// { "simulation": { "randomness": 0.2 }, "bands": { "playoffSpots": 8 } }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    #[serde(default)]
    pub simulation: PartialSimulationConfig,

    #[serde(default)]
    pub bands: LeagueBands,
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| SimError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }
}
