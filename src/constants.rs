/// Raw rating mapped to 0 on the normalized strength scale
pub const STRENGTH_FLOOR: f64 = 800.0;

/// Raw rating mapped to 100 on the normalized strength scale
pub const STRENGTH_CEILING: f64 = 1200.0;

/// Normalized strength assigned to unrated teams
pub const NEUTRAL_STRENGTH: f64 = 50.0;

/// Normalized points granted to the home side at `home_advantage = 1.0`
pub const HOME_BONUS_SCALE: f64 = 10.0;

/// Divisor applied to the weighted strength gap before the logistic
pub const LOGISTIC_SCALE: f64 = 20.0;

/// Peak-to-peak noise amplitude at `randomness = 1.0`
pub const NOISE_SCALE: f64 = 0.4;

/// Lower clamp for a home win probability
pub const MIN_WIN_PROB: f64 = 0.05;

/// Upper clamp for a home win probability
pub const MAX_WIN_PROB: f64 = 0.95;

pub const DEFAULT_STRENGTH_FACTOR: f64 = 0.7;
pub const DEFAULT_HOME_ADVANTAGE: f64 = 0.1;
pub const DEFAULT_FORM_IMPACT: f64 = 0.2;
pub const DEFAULT_RANDOMNESS: f64 = 0.3;

/// Sets needed to take a best-of-5 match
pub const SETS_TO_WIN: u8 = 3;

/// Every legal best-of-5 result as (home sets, away sets)
pub const VALID_SET_SCORES: [(u8, u8); 6] = [(3, 0), (3, 1), (3, 2), (2, 3), (1, 3), (0, 3)];

/// Default league bands
pub const DEFAULT_PLAYOFF_SPOTS: usize = 4;
pub const DEFAULT_CHAMPIONSHIP_SPOTS: usize = 1;
pub const DEFAULT_RELEGATION_SPOTS: usize = 2;
