use rand::Rng;

use crate::config::SimulationConfig;
use crate::fixture::{Match, MatchStatus, SimulatedMatch};
use crate::team::Team;
use crate::win_prob::{calculate_win_prob, draw_set_score, SetScore};

/// Simulate a single fixture.
///
/// Finished fixtures and fixtures whose teams could not be resolved are
/// returned unchanged with `is_simulated = false`. Otherwise a score is
/// drawn from the outcome model and the fixture comes back finished.
///
/// # Arguments
/// * `fixture` - Fixture to resolve (never mutated)
/// * `home` - Resolved home team, `None` if the id was unknown
/// * `away` - Resolved away team, `None` if the id was unknown
/// * `config` - Outcome-model dials
/// * `rng` - Random source
pub fn simulate_match<R: Rng + ?Sized>(
    fixture: &Match,
    home: Option<&Team>,
    away: Option<&Team>,
    config: &SimulationConfig,
    rng: &mut R,
) -> SimulatedMatch {
    if fixture.status == MatchStatus::Finished {
        return SimulatedMatch::passthrough(fixture);
    }

    let (home, away) = match (home, away) {
        (Some(home), Some(away)) => (home, away),
        _ => return SimulatedMatch::passthrough(fixture),
    };

    let win_prob = calculate_win_prob(
        home.normalized_strength(),
        away.normalized_strength(),
        config,
        rng,
    );
    let score = draw_set_score(win_prob, rng);

    SimulatedMatch {
        fixture: fixture.clone().with_result(score),
        is_simulated: true,
        home_win_probability: Some(win_prob),
        confidence: Some(config.confidence()),
    }
}

/// Force a caller-chosen result onto an unplayed fixture.
///
/// Real results win: a finished fixture passes through untouched.
pub fn apply_override(fixture: &Match, score: SetScore) -> SimulatedMatch {
    if fixture.is_finished() {
        return SimulatedMatch::passthrough(fixture);
    }

    SimulatedMatch {
        fixture: fixture.clone().with_result(score),
        is_simulated: true,
        home_win_probability: Some(if score.home_won() { 1.0 } else { 0.0 }),
        confidence: Some(1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::VALID_SET_SCORES;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn make_teams() -> (Team, Team) {
        (Team::new("A", "Alpha", 1100.0), Team::new("B", "Beta", 900.0))
    }

    #[test]
    fn test_simulate_unplayed() {
        let (home, away) = make_teams();
        let fixture = Match::scheduled("m1", &home, &away);
        let config = SimulationConfig::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let sim = simulate_match(&fixture, Some(&home), Some(&away), &config, &mut rng);

        assert!(sim.is_simulated);
        assert_eq!(sim.fixture.status, MatchStatus::Finished);
        let score = sim.score().expect("simulated match should carry a legal score");
        assert!(VALID_SET_SCORES.contains(&score.as_tuple()));
        assert!(sim.home_win_probability.is_some());
        assert!((sim.confidence.unwrap() - 0.7).abs() < 1e-12);

        // Input untouched
        assert_eq!(fixture.status, MatchStatus::Scheduled);
        assert_eq!(fixture.home_score, None);
    }

    #[test]
    fn test_finished_passes_through() {
        let (home, away) = make_teams();
        let fixture = Match::finished("m1", &home, &away, SetScore::new(2, 3).unwrap());
        let config = SimulationConfig {
            randomness: 1.0,
            ..Default::default()
        };

        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let sim = simulate_match(&fixture, Some(&home), Some(&away), &config, &mut rng);
            assert!(!sim.is_simulated);
            assert_eq!(sim.fixture, fixture);
            assert_eq!(sim.home_win_probability, None);
        }
    }

    #[test]
    fn test_unknown_team_skipped() {
        let (home, away) = make_teams();
        let fixture = Match::scheduled("m1", &home, &away);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let sim = simulate_match(&fixture, Some(&home), None, &SimulationConfig::default(), &mut rng);

        assert!(!sim.is_simulated);
        assert_eq!(sim.fixture, fixture);
    }

    #[test]
    fn test_same_seed_same_result() {
        let (home, away) = make_teams();
        let fixture = Match::scheduled("m1", &home, &away);
        let config = SimulationConfig::default();

        let a = simulate_match(&fixture, Some(&home), Some(&away), &config, &mut ChaCha8Rng::seed_from_u64(9));
        let b = simulate_match(&fixture, Some(&home), Some(&away), &config, &mut ChaCha8Rng::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn test_apply_override() {
        let (home, away) = make_teams();
        let fixture = Match::scheduled("m1", &home, &away);

        let sim = apply_override(&fixture, SetScore::new(1, 3).unwrap());
        assert!(sim.is_simulated);
        assert_eq!(sim.fixture.counted_scores(), Some((1, 3)));
        assert_eq!(sim.home_win_probability, Some(0.0));
        assert_eq!(sim.confidence, Some(1.0));

        let played = Match::finished("m2", &home, &away, SetScore::new(3, 0).unwrap());
        let kept = apply_override(&played, SetScore::new(0, 3).unwrap());
        assert!(!kept.is_simulated);
        assert_eq!(kept.fixture.counted_scores(), Some((3, 0)));
    }
}
