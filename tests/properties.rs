use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use season_sim_core::constants::VALID_SET_SCORES;
use season_sim_core::{
    aggregate_standings, calculate_win_prob, run_monte_carlo, run_simulation, simulate_match, Match,
    MonteCarloOptions, PartialSimulationConfig, SetScore, SimulationConfig, SimulationInput, Team,
};

fn config_strategy() -> impl Strategy<Value = SimulationConfig> {
    (0.0..=1.0f64, 0.0..=1.0f64, 0.0..=1.0f64, 0.0..=1.0f64).prop_map(
        |(strength_factor, home_advantage, form_impact, randomness)| SimulationConfig {
            strength_factor,
            home_advantage,
            form_impact,
            randomness,
        },
    )
}

fn score_strategy() -> impl Strategy<Value = SetScore> {
    prop::sample::select(VALID_SET_SCORES.to_vec()).prop_map(|(h, a)| SetScore::new(h, a).unwrap())
}

fn round_robin(ratings: &[f64]) -> (Vec<Team>, Vec<Match>) {
    let teams: Vec<Team> = ratings
        .iter()
        .enumerate()
        .map(|(i, &r)| Team::new(format!("T{}", i), format!("Team {}", i), r))
        .collect();
    let mut matches = Vec::new();
    for home in &teams {
        for away in &teams {
            if home.id != away.id {
                matches.push(Match::scheduled(format!("{}v{}", home.id, away.id), home, away));
            }
        }
    }
    (teams, matches)
}

proptest! {
    #[test]
    fn simulated_scores_are_always_legal(
        home_rating in 600.0..1400.0f64,
        away_rating in 600.0..1400.0f64,
        config in config_strategy(),
        seed in any::<u64>(),
    ) {
        let home = Team::new("H", "Home", home_rating);
        let away = Team::new("A", "Away", away_rating);
        let fixture = Match::scheduled("m", &home, &away);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let sim = simulate_match(&fixture, Some(&home), Some(&away), &config, &mut rng);

        let scores = sim.fixture.counted_scores().expect("simulated match must be finished");
        prop_assert!(VALID_SET_SCORES.contains(&scores));
        let p = sim.home_win_probability.unwrap();
        prop_assert!((0.05..=0.95).contains(&p));
    }

    #[test]
    fn finished_matches_never_change(score in score_strategy(), config in config_strategy(), seed in any::<u64>()) {
        let home = Team::new("H", "Home", 1000.0);
        let away = Team::new("A", "Away", 1000.0);
        let fixture = Match::finished("m", &home, &away, score);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let sim = simulate_match(&fixture, Some(&home), Some(&away), &config, &mut rng);

        prop_assert!(!sim.is_simulated);
        prop_assert_eq!(sim.fixture, fixture);
    }

    #[test]
    fn zero_randomness_is_deterministic(
        home in 0.0..=100.0f64,
        away in 0.0..=100.0f64,
        seed_a in any::<u64>(),
        seed_b in any::<u64>(),
    ) {
        let config = SimulationConfig { randomness: 0.0, ..Default::default() };
        let p1 = calculate_win_prob(home, away, &config, &mut ChaCha8Rng::seed_from_u64(seed_a));
        let p2 = calculate_win_prob(home, away, &config, &mut ChaCha8Rng::seed_from_u64(seed_b));
        prop_assert_eq!(p1, p2);
    }

    #[test]
    fn sets_are_conserved(scores in prop::collection::vec(score_strategy(), 12)) {
        let (teams, fixtures) = round_robin(&[1000.0, 1000.0, 1000.0, 1000.0]);
        let played: Vec<Match> = fixtures
            .into_iter()
            .zip(scores)
            .map(|(m, s)| m.with_result(s))
            .collect();

        let table = aggregate_standings(&teams, &played, &[]);

        let won: u32 = table.iter().map(|s| s.standing.sets_won).sum();
        let lost: u32 = table.iter().map(|s| s.standing.sets_lost).sum();
        prop_assert_eq!(won, lost);
        for row in &table {
            prop_assert_eq!(row.standing.played, 6);
            prop_assert_eq!(row.standing.won + row.standing.lost, 6);
        }
        for pair in table.windows(2) {
            prop_assert!(pair[0].standing.points >= pair[1].standing.points);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn position_distributions_are_normalized(
        ratings in prop::collection::vec(800.0..1200.0f64, 2..6),
        iterations in 1usize..60,
        seed in any::<u64>(),
    ) {
        let (teams, matches) = round_robin(&ratings);
        let input = SimulationInput::new(teams, matches, Vec::new());
        let result = run_monte_carlo(&input, iterations, &MonteCarloOptions::default().with_seed(seed)).unwrap();

        for dist in &result.position_distributions {
            let total: f64 = dist.positions.values().sum();
            prop_assert!((total - 100.0).abs() < 1e-6);
        }
    }
}

#[test]
fn end_to_end_strength_dominates_without_noise() {
    let strong = Team::new("A", "Strong", 1200.0);
    let weak = Team::new("B", "Weak", 800.0);
    let input = SimulationInput::new(
        vec![strong.clone(), weak.clone()],
        vec![Match::scheduled("final", &strong, &weak)],
        Vec::new(),
    )
    .with_config(PartialSimulationConfig {
        strength_factor: Some(1.0),
        home_advantage: Some(0.0),
        randomness: Some(0.0),
        ..Default::default()
    })
    .with_seed(31);

    let single = run_simulation(&input);
    let p = single.simulated_matches[0].home_win_probability.unwrap();
    assert!(p > 0.8, "home win probability {}", p);
    assert_eq!(single.simulated_matches[0].confidence, Some(1.0));

    let result = run_monte_carlo(&input, 1000, &MonteCarloOptions::default()).unwrap();
    assert!(result.championship_probability("A") > 80.0);
    assert!(result.championship_probability("B") < 20.0);
}
