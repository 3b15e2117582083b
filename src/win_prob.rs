use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config::SimulationConfig;
use crate::constants::{
    HOME_BONUS_SCALE, LOGISTIC_SCALE, MAX_WIN_PROB, MIN_WIN_PROB, NEUTRAL_STRENGTH, NOISE_SCALE,
    SETS_TO_WIN, STRENGTH_CEILING, STRENGTH_FLOOR, VALID_SET_SCORES,
};
use crate::error::SimError;

/// A best-of-5 match result. Only the six legal results can be built.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SetScore {
    home: u8,
    away: u8,
}

impl SetScore {
    /// Returns `None` unless exactly one side has 3 sets and the other 0-2.
    pub fn new(home: u8, away: u8) -> Option<Self> {
        VALID_SET_SCORES
            .contains(&(home, away))
            .then_some(SetScore { home, away })
    }

    pub fn home(&self) -> u8 {
        self.home
    }

    pub fn away(&self) -> u8 {
        self.away
    }

    pub fn home_won(&self) -> bool {
        self.home == SETS_TO_WIN
    }

    pub fn as_tuple(&self) -> (u8, u8) {
        (self.home, self.away)
    }
}

impl fmt::Display for SetScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.home, self.away)
    }
}

impl FromStr for SetScore {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SimError::InvalidScore(s.to_string());
        let (home, away) = s.trim().split_once('-').ok_or_else(invalid)?;
        let home: u8 = home.trim().parse().map_err(|_| invalid())?;
        let away: u8 = away.trim().parse().map_err(|_| invalid())?;
        SetScore::new(home, away).ok_or_else(invalid)
    }
}

impl TryFrom<String> for SetScore {
    type Error = SimError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SetScore> for String {
    fn from(score: SetScore) -> Self {
        score.to_string()
    }
}

/// Rescale a raw rating onto 0-100 using the 800..1200 reference window.
///
/// Ratings outside the window clamp to the nearest bound. Missing, zero or
/// non-finite ratings are treated as exactly average; hosts send `0` for a
/// team that has not been rated yet.
pub fn normalize_strength(rating: Option<f64>) -> f64 {
    match rating {
        Some(r) if r.is_finite() && r != 0.0 => {
            (((r - STRENGTH_FLOOR) / (STRENGTH_CEILING - STRENGTH_FLOOR)) * 100.0).clamp(0.0, 100.0)
        }
        _ => NEUTRAL_STRENGTH,
    }
}

/// Noise-free probability of the home side winning.
///
/// Logistic of the strength gap after the home bonus, clamped to
/// `[MIN_WIN_PROB, MAX_WIN_PROB]`.
pub fn base_win_prob(home_strength: f64, away_strength: f64, config: &SimulationConfig) -> f64 {
    clamp_prob(logistic(home_strength, away_strength, config))
}

/// Calculate the probability of the home side winning a match.
///
/// Strengths are on the normalized 0-100 scale. Symmetric uniform noise
/// with amplitude proportional to `config.randomness` is added before
/// clamping, so the result is fully determined by strengths when
/// `randomness` is zero.
///
/// # Returns
/// Home win probability in `[MIN_WIN_PROB, MAX_WIN_PROB]`
pub fn calculate_win_prob<R: Rng + ?Sized>(
    home_strength: f64,
    away_strength: f64,
    config: &SimulationConfig,
    rng: &mut R,
) -> f64 {
    let probability = logistic(home_strength, away_strength, config);
    let noise = (rng.gen::<f64>() - 0.5) * config.randomness * NOISE_SCALE;
    clamp_prob(probability + noise)
}

/// Draw a set score for a match with the given home win probability.
///
/// The winner is a single weighted coin flip. The loser's set count is then
/// drawn with lopsided results growing more likely as the probability moves
/// away from a toss-up.
pub fn draw_set_score<R: Rng + ?Sized>(win_prob: f64, rng: &mut R) -> SetScore {
    let home_wins = rng.gen::<f64>() < win_prob;
    let dominance = (win_prob - 0.5).abs() * 2.0;

    let roll = rng.gen::<f64>();
    let loser_sets = if roll < 0.3 + dominance * 0.3 {
        0
    } else if roll < 0.6 + dominance * 0.2 {
        1
    } else {
        2
    };

    if home_wins {
        SetScore { home: SETS_TO_WIN, away: loser_sets }
    } else {
        SetScore { home: loser_sets, away: SETS_TO_WIN }
    }
}

fn logistic(home_strength: f64, away_strength: f64, config: &SimulationConfig) -> f64 {
    let adjusted_home = home_strength + config.home_advantage * HOME_BONUS_SCALE;
    let strength_diff = (adjusted_home - away_strength) * config.strength_factor;
    1.0 / (1.0 + (-strength_diff / LOGISTIC_SCALE).exp())
}

fn clamp_prob(p: f64) -> f64 {
    p.clamp(MIN_WIN_PROB, MAX_WIN_PROB)
}
