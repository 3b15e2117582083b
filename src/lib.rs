//! Season Sim Core - volleyball league season projection engine.
//!
//! Resolves unplayed fixtures from team strength ratings, rebuilds the
//! league table under best-of-5 point rules and aggregates many simulated
//! seasons into positional probabilities. Pure computation: no I/O beyond
//! optional config/override file loading, no global state. Python bindings
//! are available behind the `python` feature.

pub mod config;
pub mod constants;
pub mod error;
pub mod fixture;
pub mod match_sim;
pub mod monte_carlo;
pub mod overrides;
pub mod season;
pub mod standings;
pub mod team;
pub mod win_prob;
pub mod worker;

#[cfg(feature = "python")]
mod python;

pub use config::{EngineConfig, LeagueBands, PartialSimulationConfig, SimulationConfig};
pub use error::{Result, SimError};
pub use fixture::{Match, MatchStatus, SimulatedMatch};
pub use match_sim::{apply_override, simulate_match};
pub use monte_carlo::{
    run_monte_carlo, CancellationToken, MonteCarloOptions, MonteCarloResult, PositionDistribution,
    ProgressFn, TeamProbability,
};
pub use overrides::ScoreOverrides;
pub use season::{run_simulation, run_simulation_with_rng, SimulationInput, SimulationMeta, SimulationResult};
pub use standings::{
    aggregate_standings, aggregate_standings_onto, calculate_points, compare_records, SimulatedStanding,
    Standing, TeamRecord,
};
pub use team::Team;
pub use win_prob::{base_win_prob, calculate_win_prob, draw_set_score, normalize_strength, SetScore};
pub use worker::{ProgressUpdate, SimulationWorker, WorkerMessage, WorkerResponse};
