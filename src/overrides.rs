use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Result, SimError};
use crate::win_prob::SetScore;

/// Caller-fixed results for specific unplayed fixtures, keyed by match id.
///
/// Used for "what if" scenarios: an overridden fixture takes the given
/// score instead of a drawn one. Real results are never overridden.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoreOverrides {
    overrides: HashMap<String, SetScore>,
}

impl ScoreOverrides {
    pub fn new() -> Self {
        ScoreOverrides {
            overrides: HashMap::new(),
        }
    }

    /// Read overrides from a CSV file.
    /// Format: match_id,score (e.g. `m-17,3-1`)
    pub fn read_from_file(&mut self, filepath: impl AsRef<Path>) -> Result<()> {
        let path = filepath.as_ref();
        let io_err = |source| SimError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(io_err)?;
        let reader = BufReader::new(file);

        for line in reader.lines() {
            let line = line.map_err(io_err)?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let parts: Vec<&str> = line.split(',').collect();
            if parts.len() != 2 {
                continue;
            }

            let score: SetScore = parts[1].trim().parse()?;
            self.add_override(parts[0].trim(), score);
        }

        Ok(())
    }

    /// Add or replace the override for a fixture.
    pub fn add_override(&mut self, match_id: &str, score: SetScore) {
        self.overrides.insert(match_id.to_string(), score);
    }

    pub fn remove_override(&mut self, match_id: &str) {
        self.overrides.remove(match_id);
    }

    pub fn get(&self, match_id: &str) -> Option<SetScore> {
        self.overrides.get(match_id).copied()
    }

    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}
