use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use season_sim_core::{
    aggregate_standings, calculate_win_prob, run_monte_carlo, run_simulation, Match, MonteCarloOptions,
    SimulationConfig, SimulationInput, Team,
};

fn create_league(size: usize) -> SimulationInput {
    let teams: Vec<Team> = (0..size)
        .map(|i| {
            let rating = 800.0 + 400.0 * i as f64 / (size - 1) as f64;
            Team::new(format!("T{}", i), format!("Team{}", i), rating)
        })
        .collect();

    let mut matches = Vec::new();
    for home in &teams {
        for away in &teams {
            if home.id != away.id {
                matches.push(Match::scheduled(format!("{}-{}", home.id, away.id), home, away));
            }
        }
    }

    SimulationInput::new(teams, matches, Vec::new()).with_seed(42)
}

fn bench_calculate_win_prob(c: &mut Criterion) {
    let config = SimulationConfig::default();
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    c.bench_function("calculate_win_prob", |b| {
        b.iter(|| calculate_win_prob(black_box(63.0), black_box(48.0), &config, &mut rng))
    });
}

fn bench_season(c: &mut Criterion) {
    // 14 teams, double round robin: 182 fixtures
    let input = create_league(14);

    c.bench_function("season_14_team_single_run", |b| {
        b.iter(|| run_simulation(black_box(&input)))
    });

    let played = run_simulation(&input);
    let fixtures: Vec<Match> = played.simulated_matches.into_iter().map(|m| m.fixture).collect();
    c.bench_function("aggregate_standings_14_teams", |b| {
        b.iter(|| aggregate_standings(black_box(&input.teams), black_box(&fixtures), &[]))
    });
}

fn bench_monte_carlo(c: &mut Criterion) {
    let input = create_league(14);
    let options = MonteCarloOptions::default().with_seed(42);

    c.bench_function("monte_carlo_1000_seasons", |b| {
        b.iter(|| run_monte_carlo(black_box(&input), 1000, &options))
    });
}

criterion_group!(benches, bench_calculate_win_prob, bench_season, bench_monte_carlo);
criterion_main!(benches);
