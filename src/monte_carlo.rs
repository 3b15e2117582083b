//! Monte Carlo aggregation over many simulated seasons.
//!
//! Each iteration owns its generator, seeded from a master ChaCha8 stream,
//! so the iterations run independently on the rayon pool and the result
//! for a given seed does not depend on scheduling.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::config::LeagueBands;
use crate::error::{Result, SimError};
use crate::season::{run_simulation_with_rng, SimulationInput};

/// Cooperative cancellation flag shared between a host and a running aggregation.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clear the flag so the token can guard another job.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Called with (completed_iterations, total_iterations).
pub type ProgressFn = Arc<dyn Fn(usize, usize) + Send + Sync>;

#[derive(Clone, Default)]
pub struct MonteCarloOptions {
    pub bands: LeagueBands,

    /// Master seed; falls back to the input's seed, then entropy
    pub seed: Option<u64>,

    /// Checked before every iteration
    pub cancel: Option<CancellationToken>,

    pub progress: Option<ProgressFn>,
}

impl fmt::Debug for MonteCarloOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonteCarloOptions")
            .field("bands", &self.bands)
            .field("seed", &self.seed)
            .field("cancel", &self.cancel)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl MonteCarloOptions {
    pub fn new(bands: LeagueBands) -> Self {
        MonteCarloOptions {
            bands,
            ..Default::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn with_progress(mut self, progress: impl Fn(usize, usize) + Send + Sync + 'static) -> Self {
        self.progress = Some(Arc::new(progress));
        self
    }
}

/// Where one team finished across all iterations.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionDistribution {
    pub team_id: String,
    pub team_name: String,

    /// Final position -> percentage of iterations (0-100), one entry per position
    pub positions: BTreeMap<u32, f64>,

    pub average_position: f64,

    /// Population standard deviation of the final position
    pub standard_deviation: f64,

    pub best_position: u32,
    pub worst_position: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamProbability {
    pub team_id: String,
    pub team_name: String,

    /// Percentage of iterations (0-100)
    pub probability: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonteCarloResult {
    pub iterations: usize,

    /// In team input order
    pub position_distributions: Vec<PositionDistribution>,

    /// Sorted by descending probability
    pub playoff_probabilities: Vec<TeamProbability>,
    pub championship_probabilities: Vec<TeamProbability>,
    pub relegation_probabilities: Vec<TeamProbability>,
}

impl MonteCarloResult {
    pub fn distribution(&self, team_id: &str) -> Option<&PositionDistribution> {
        self.position_distributions.iter().find(|d| d.team_id == team_id)
    }

    pub fn championship_probability(&self, team_id: &str) -> f64 {
        lookup(&self.championship_probabilities, team_id)
    }

    pub fn playoff_probability(&self, team_id: &str) -> f64 {
        lookup(&self.playoff_probabilities, team_id)
    }

    pub fn relegation_probability(&self, team_id: &str) -> f64 {
        lookup(&self.relegation_probabilities, team_id)
    }
}

fn lookup(list: &[TeamProbability], team_id: &str) -> f64 {
    list.iter()
        .find(|p| p.team_id == team_id)
        .map(|p| p.probability)
        .unwrap_or(0.0)
}

/// Simulate the season `iterations` times and summarize final positions.
///
/// # Arguments
/// * `input` - Season input, shared read-only by every iteration
/// * `iterations` - Number of seasons to simulate (at least 1)
/// * `options` - Bands, seed, cancellation and progress reporting
///
/// # Errors
/// `NoIterations` for zero iterations, `Cancelled` if the token trips
/// before the last iteration starts. Partial results are discarded.
pub fn run_monte_carlo(
    input: &SimulationInput,
    iterations: usize,
    options: &MonteCarloOptions,
) -> Result<MonteCarloResult> {
    if iterations == 0 {
        return Err(SimError::NoIterations);
    }

    let started = Instant::now();
    let team_count = input.teams.len();

    let mut index: HashMap<&str, usize> = HashMap::with_capacity(team_count);
    for (i, team) in input.teams.iter().enumerate() {
        index.entry(team.id.as_str()).or_insert(i);
    }

    let mut master = match options.seed.or(input.seed) {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    };
    let seeds: Vec<u64> = (0..iterations).map(|_| master.gen::<u64>()).collect();

    let completed = AtomicUsize::new(0);

    // finishes[iteration][team] = final position (1-based, 0 if absent)
    let finishes: Vec<Vec<u32>> = seeds
        .par_iter()
        .map(|&seed| {
            if options.cancel.as_ref().is_some_and(|c| c.is_cancelled()) {
                return Err(SimError::Cancelled);
            }

            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let season = run_simulation_with_rng(input, &mut rng);

            let mut positions = vec![0u32; team_count];
            for row in &season.final_standings {
                if let Some(&i) = index.get(row.standing.team_id.as_str()) {
                    positions[i] = row.standing.position;
                }
            }

            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            if let Some(progress) = &options.progress {
                progress(done, iterations);
            }

            Ok(positions)
        })
        .collect::<Result<Vec<_>>>()?;

    let result = summarize(input, &finishes, &options.bands);

    info!(
        iterations,
        teams = team_count,
        duration_ms = started.elapsed().as_millis() as u64,
        "Monte Carlo aggregation complete"
    );

    Ok(result)
}

fn summarize(input: &SimulationInput, finishes: &[Vec<u32>], bands: &LeagueBands) -> MonteCarloResult {
    let iterations = finishes.len();
    let team_count = input.teams.len();
    let pct = |count: usize| count as f64 / iterations as f64 * 100.0;

    let mut position_distributions = Vec::with_capacity(team_count);
    let mut playoff = Vec::with_capacity(team_count);
    let mut championship = Vec::with_capacity(team_count);
    let mut relegation = Vec::with_capacity(team_count);

    for (i, team) in input.teams.iter().enumerate() {
        let finished: Vec<u32> = finishes.iter().map(|f| f[i]).filter(|&p| p > 0).collect();

        let mut counts = vec![0usize; team_count];
        for &p in &finished {
            counts[p as usize - 1] += 1;
        }

        let samples: Vec<f64> = finished.iter().map(|&p| f64::from(p)).collect();
        let (average_position, standard_deviation) = if samples.is_empty() {
            (0.0, 0.0)
        } else {
            (samples.iter().mean(), samples.iter().population_std_dev())
        };

        position_distributions.push(PositionDistribution {
            team_id: team.id.clone(),
            team_name: team.name.clone(),
            positions: counts
                .iter()
                .enumerate()
                .map(|(p, &c)| ((p + 1) as u32, pct(c)))
                .collect(),
            average_position,
            standard_deviation,
            best_position: finished.iter().copied().min().unwrap_or(0),
            worst_position: finished.iter().copied().max().unwrap_or(0),
        });

        let probability = |hit: &dyn Fn(usize) -> bool| TeamProbability {
            team_id: team.id.clone(),
            team_name: team.name.clone(),
            probability: pct(finished.iter().filter(|&&p| hit(p as usize)).count()),
        };
        playoff.push(probability(&|p| bands.is_playoff(p)));
        championship.push(probability(&|p| bands.is_champion(p)));
        relegation.push(probability(&|p| bands.is_relegated(p, team_count)));
    }

    for list in [&mut playoff, &mut championship, &mut relegation] {
        list.sort_by(|a, b| b.probability.total_cmp(&a.probability));
    }

    MonteCarloResult {
        iterations,
        position_distributions,
        playoff_probabilities: playoff,
        championship_probabilities: championship,
        relegation_probabilities: relegation,
    }
}
