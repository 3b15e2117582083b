//! Python bindings. Every entry point takes and returns plain JSON so
//! results cross the interpreter boundary as data.

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::config::EngineConfig;
use crate::error::SimError;
use crate::monte_carlo::{run_monte_carlo, MonteCarloOptions};
use crate::season::{run_simulation, SimulationInput};
use crate::win_prob::{base_win_prob, normalize_strength};

fn to_py_err(err: SimError) -> PyErr {
    match err {
        SimError::Cancelled | SimError::WorkerSpawn(_) | SimError::WorkerDisconnected => {
            PyRuntimeError::new_err(err.to_string())
        }
        _ => PyValueError::new_err(err.to_string()),
    }
}

fn parse_input(input_json: &str) -> PyResult<SimulationInput> {
    serde_json::from_str(input_json).map_err(|e| to_py_err(e.into()))
}

fn parse_config(config_json: Option<&str>) -> PyResult<EngineConfig> {
    match config_json {
        Some(json) => EngineConfig::from_json_str(json).map_err(to_py_err),
        None => Ok(EngineConfig::default()),
    }
}

/// Simulate the remaining season once.
///
/// Takes a `SimulationInput` JSON document and returns a `SimulationResult`
/// JSON document.
#[pyfunction]
fn simulate_season(py: Python<'_>, input_json: &str) -> PyResult<String> {
    let input = parse_input(input_json)?;
    let result = py.allow_threads(|| run_simulation(&input));
    serde_json::to_string(&result).map_err(|e| to_py_err(e.into()))
}

/// Run a Monte Carlo aggregation.
///
/// `config_json` is an optional `EngineConfig` document; its dials sit
/// beneath any dial the input sets and its bands define the summaries.
#[pyfunction]
#[pyo3(signature = (input_json, iterations, config_json = None, seed = None))]
fn monte_carlo(
    py: Python<'_>,
    input_json: &str,
    iterations: usize,
    config_json: Option<&str>,
    seed: Option<u64>,
) -> PyResult<String> {
    let mut input = parse_input(input_json)?;
    let config = parse_config(config_json)?;
    input.config = Some(input.config.unwrap_or_default().or(&config.simulation));

    let mut options = MonteCarloOptions::new(config.bands);
    options.seed = seed;

    let result = py
        .allow_threads(|| run_monte_carlo(&input, iterations, &options))
        .map_err(to_py_err)?;
    serde_json::to_string(&result).map_err(|e| to_py_err(e.into()))
}

/// Noise-free home win probability for two raw ratings.
#[pyfunction]
#[pyo3(signature = (home_rating, away_rating, config_json = None))]
fn win_probability(home_rating: Option<f64>, away_rating: Option<f64>, config_json: Option<&str>) -> PyResult<f64> {
    let config = parse_config(config_json)?.simulation.resolve();
    Ok(base_win_prob(
        normalize_strength(home_rating),
        normalize_strength(away_rating),
        &config,
    ))
}

/// Python module definition
#[pymodule]
fn season_sim_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Honors RUST_LOG; a subscriber installed by the host takes precedence
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    m.add_function(wrap_pyfunction!(simulate_season, m)?)?;
    m.add_function(wrap_pyfunction!(monte_carlo, m)?)?;
    m.add_function(wrap_pyfunction!(win_probability, m)?)?;

    m.add("DEFAULT_STRENGTH_FACTOR", crate::constants::DEFAULT_STRENGTH_FACTOR)?;
    m.add("DEFAULT_HOME_ADVANTAGE", crate::constants::DEFAULT_HOME_ADVANTAGE)?;
    m.add("DEFAULT_FORM_IMPACT", crate::constants::DEFAULT_FORM_IMPACT)?;
    m.add("DEFAULT_RANDOMNESS", crate::constants::DEFAULT_RANDOMNESS)?;

    Ok(())
}
