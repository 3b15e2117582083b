//! League table aggregation.
//!
//! Folds finished fixtures into per-team records, applies the volleyball
//! point award and orders the table by points, then set ratio, then sets won.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::warn;

use crate::constants::SETS_TO_WIN;
use crate::fixture::Match;
use crate::team::Team;
use crate::win_prob::SetScore;

/// A team's row in the current (pre-simulation) table.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Standing {
    #[serde(default)]
    pub id: String,

    pub team_id: String,

    #[serde(default)]
    pub team_name: String,

    #[serde(default)]
    pub league_id: String,

    #[serde(default)]
    pub position: u32,

    #[serde(default)]
    pub played: u32,

    #[serde(default)]
    pub won: u32,

    #[serde(default)]
    pub lost: u32,

    #[serde(default)]
    pub sets_won: u32,

    #[serde(default)]
    pub sets_lost: u32,

    #[serde(default)]
    pub points: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

/// A table row produced by the aggregator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatedStanding {
    #[serde(flatten)]
    pub standing: Standing,

    /// Previous position minus new position; positive means the team climbed
    pub position_change: i32,

    pub previous_position: u32,
}

/// Running totals for one team.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TeamRecord {
    pub played: u32,
    pub won: u32,
    pub lost: u32,
    pub sets_won: u32,
    pub sets_lost: u32,
    pub points: u32,
}

impl TeamRecord {
    /// Seed a record from an existing table row.
    pub fn from_standing(standing: &Standing) -> Self {
        TeamRecord {
            played: standing.played,
            won: standing.won,
            lost: standing.lost,
            sets_won: standing.sets_won,
            sets_lost: standing.sets_lost,
            points: standing.points,
        }
    }

    fn record(&mut self, sets_for: u8, sets_against: u8, points: u32) {
        self.played += 1;
        self.sets_won += u32::from(sets_for);
        self.sets_lost += u32::from(sets_against);
        self.points += points;
        if sets_for > sets_against {
            self.won += 1;
        } else {
            self.lost += 1;
        }
    }

    /// Sets won over sets lost; sets won itself when no set has been lost.
    pub fn set_ratio(&self) -> f64 {
        if self.sets_lost > 0 {
            f64::from(self.sets_won) / f64::from(self.sets_lost)
        } else {
            f64::from(self.sets_won)
        }
    }
}

/// Table points for a result.
///
/// A 3-0 or 3-1 win is worth 3 points to the winner and nothing to the
/// loser; a 3-2 win splits 2 and 1.
///
/// # Returns
/// (home_points, away_points)
pub fn calculate_points(home_score: u8, away_score: u8) -> (u32, u32) {
    if home_score == SETS_TO_WIN {
        if away_score <= 1 {
            (3, 0)
        } else {
            (2, 1)
        }
    } else if home_score <= 1 {
        (0, 3)
    } else {
        (1, 2)
    }
}

/// Table ordering: points, then set ratio, then raw sets won. Higher ranks first.
///
/// No further tie-break is applied; fully tied teams keep their input order.
pub fn compare_records(a: &TeamRecord, b: &TeamRecord) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| b.set_ratio().partial_cmp(&a.set_ratio()).unwrap_or(Ordering::Equal))
        .then_with(|| b.sets_won.cmp(&a.sets_won))
}

/// Build the table from scratch out of the given fixtures.
///
/// Every team starts from zero; only finished fixtures with both scores
/// count, and fixtures naming unknown teams are skipped. `previous` is only
/// used for position deltas and row identity.
pub fn aggregate_standings<'a, I>(teams: &[Team], matches: I, previous: &[Standing]) -> Vec<SimulatedStanding>
where
    I: IntoIterator<Item = &'a Match>,
{
    fold_table(teams, matches, previous, false)
}

/// Like [`aggregate_standings`], but each team starts from its totals in
/// `previous` instead of zero.
pub fn aggregate_standings_onto<'a, I>(
    teams: &[Team],
    matches: I,
    previous: &[Standing],
) -> Vec<SimulatedStanding>
where
    I: IntoIterator<Item = &'a Match>,
{
    fold_table(teams, matches, previous, true)
}

fn fold_table<'a, I>(teams: &[Team], matches: I, previous: &[Standing], carry_totals: bool) -> Vec<SimulatedStanding>
where
    I: IntoIterator<Item = &'a Match>,
{
    let mut prior: HashMap<&str, &Standing> = HashMap::with_capacity(previous.len());
    for standing in previous {
        prior.entry(standing.team_id.as_str()).or_insert(standing);
    }

    let mut index: HashMap<&str, usize> = HashMap::with_capacity(teams.len());
    for (i, team) in teams.iter().enumerate() {
        index.entry(team.id.as_str()).or_insert(i);
    }

    let mut records: Vec<TeamRecord> = teams
        .iter()
        .map(|team| match prior.get(team.id.as_str()) {
            Some(standing) if carry_totals => TeamRecord::from_standing(standing),
            _ => TeamRecord::default(),
        })
        .collect();

    for fixture in matches {
        let Some((home_score, away_score)) = fixture.counted_scores() else {
            continue;
        };
        if SetScore::new(home_score, away_score).is_none() {
            warn!(
                match_id = %fixture.id,
                home_score,
                away_score,
                "skipping match with impossible set score"
            );
            continue;
        }
        let (Some(&h), Some(&a)) = (
            index.get(fixture.home_team_id.as_str()),
            index.get(fixture.away_team_id.as_str()),
        ) else {
            warn!(
                match_id = %fixture.id,
                home = %fixture.home_team_id,
                away = %fixture.away_team_id,
                "skipping match with unknown team"
            );
            continue;
        };

        let (home_points, away_points) = calculate_points(home_score, away_score);
        records[h].record(home_score, away_score, home_points);
        records[a].record(away_score, home_score, away_points);
    }

    let mut order: Vec<usize> = (0..teams.len()).collect();
    order.sort_by(|&x, &y| compare_records(&records[x], &records[y]));

    order
        .into_iter()
        .enumerate()
        .map(|(rank, i)| {
            let team = &teams[i];
            let record = &records[i];
            let position = (rank + 1) as u32;
            let before = prior.get(team.id.as_str()).copied();
            let previous_position = before
                .map(|s| s.position)
                .filter(|&p| p > 0)
                .unwrap_or(position);

            SimulatedStanding {
                standing: Standing {
                    id: before
                        .map(|s| s.id.clone())
                        .filter(|id| !id.is_empty())
                        .unwrap_or_else(|| format!("sim-{}", team.id)),
                    team_id: team.id.clone(),
                    team_name: team.name.clone(),
                    league_id: before
                        .map(|s| s.league_id.clone())
                        .filter(|id| !id.is_empty())
                        .unwrap_or_else(|| team.league_id.clone()),
                    position,
                    played: record.played,
                    won: record.won,
                    lost: record.lost,
                    sets_won: record.sets_won,
                    sets_lost: record.sets_lost,
                    points: record.points,
                    group_id: before
                        .and_then(|s| s.group_id.clone())
                        .or_else(|| team.group_id.clone()),
                },
                position_change: previous_position as i32 - position as i32,
                previous_position,
            }
        })
        .collect()
}
