use chrono::{SecondsFormat, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;
use tracing::debug;

use crate::config::{PartialSimulationConfig, SimulationConfig};
use crate::fixture::{Match, SimulatedMatch};
use crate::match_sim::{apply_override, simulate_match};
use crate::overrides::ScoreOverrides;
use crate::standings::{aggregate_standings, aggregate_standings_onto, SimulatedStanding, Standing};
use crate::team::Team;

/// Everything needed for one season projection.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationInput {
    pub teams: Vec<Team>,

    /// Fixtures to resolve. Finished fixtures pass through and still count.
    pub matches: Vec<Match>,

    #[serde(default)]
    pub current_standings: Vec<Standing>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<PartialSimulationConfig>,

    /// Fixed scores for selected unplayed fixtures
    #[serde(default, skip_serializing_if = "ScoreOverrides::is_empty")]
    pub overrides: ScoreOverrides,

    /// Seed for a reproducible run; entropy when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Start each team from its current totals instead of zero
    #[serde(default)]
    pub carry_current_totals: bool,
}

impl SimulationInput {
    pub fn new(teams: Vec<Team>, matches: Vec<Match>, current_standings: Vec<Standing>) -> Self {
        SimulationInput {
            teams,
            matches,
            current_standings,
            ..Default::default()
        }
    }

    pub fn with_config(mut self, config: impl Into<PartialSimulationConfig>) -> Self {
        self.config = Some(config.into());
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// The dials this input runs with, defaults filled in.
    pub fn resolved_config(&self) -> SimulationConfig {
        self.config.unwrap_or_default().resolve()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationMeta {
    /// Wall-clock milliseconds
    #[serde(rename = "duration")]
    pub duration_ms: u64,

    /// Fixtures whose result came from the engine
    pub match_count: usize,

    pub config: SimulationConfig,

    /// RFC 3339 UTC timestamp
    pub timestamp: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    /// Same order as the input fixtures
    pub simulated_matches: Vec<SimulatedMatch>,

    /// Best to worst
    pub final_standings: Vec<SimulatedStanding>,

    pub meta: SimulationMeta,
}

/// Run one season projection with the input's seed (entropy when unset).
pub fn run_simulation(input: &SimulationInput) -> SimulationResult {
    let mut rng = match input.seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    };
    run_simulation_with_rng(input, &mut rng)
}

/// Run one season projection drawing from the given random source.
///
/// Every non-finished fixture is resolved (override first, otherwise the
/// outcome model), then the full fixture list is folded into a table.
pub fn run_simulation_with_rng<R: Rng + ?Sized>(input: &SimulationInput, rng: &mut R) -> SimulationResult {
    let started = Instant::now();
    let config = input.resolved_config();

    let mut teams: HashMap<&str, &Team> = HashMap::with_capacity(input.teams.len());
    for team in &input.teams {
        teams.entry(team.id.as_str()).or_insert(team);
    }

    let simulated_matches: Vec<SimulatedMatch> = input
        .matches
        .iter()
        .map(|fixture| match input.overrides.get(&fixture.id) {
            Some(score) => apply_override(fixture, score),
            None => simulate_match(
                fixture,
                teams.get(fixture.home_team_id.as_str()).copied(),
                teams.get(fixture.away_team_id.as_str()).copied(),
                &config,
                rng,
            ),
        })
        .collect();

    let fixtures = simulated_matches.iter().map(|m| &m.fixture);
    let final_standings = if input.carry_current_totals {
        aggregate_standings_onto(&input.teams, fixtures, &input.current_standings)
    } else {
        aggregate_standings(&input.teams, fixtures, &input.current_standings)
    };

    let match_count = simulated_matches.iter().filter(|m| m.is_simulated).count();
    let duration_ms = started.elapsed().as_millis() as u64;

    debug!(
        teams = input.teams.len(),
        matches = input.matches.len(),
        simulated = match_count,
        duration_ms,
        "season simulated"
    );

    SimulationResult {
        simulated_matches,
        final_standings,
        meta: SimulationMeta {
            duration_ms,
            match_count,
            config,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        },
    }
}
