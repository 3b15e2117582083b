use serde::{Deserialize, Serialize};

use crate::team::Team;
use crate::win_prob::SetScore;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Live,
    Finished,
}

/// A league fixture.
///
/// Scores are only meaningful when `status` is `Finished`; the table never
/// reads them otherwise.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: String,

    #[serde(default)]
    pub league_id: String,

    pub home_team_id: String,
    pub away_team_id: String,

    #[serde(default)]
    pub home_team_name: String,

    #[serde(default)]
    pub away_team_name: String,

    #[serde(default)]
    pub home_score: Option<u8>,

    #[serde(default)]
    pub away_score: Option<u8>,

    #[serde(default)]
    pub status: MatchStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub week: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,
}

impl Match {
    /// Create an unplayed fixture between two teams.
    pub fn scheduled(id: impl Into<String>, home: &Team, away: &Team) -> Self {
        Match {
            id: id.into(),
            league_id: home.league_id.clone(),
            home_team_id: home.id.clone(),
            away_team_id: away.id.clone(),
            home_team_name: home.name.clone(),
            away_team_name: away.name.clone(),
            home_score: None,
            away_score: None,
            status: MatchStatus::Scheduled,
            match_date: None,
            week: None,
            round: None,
            group_id: home.group_id.clone(),
        }
    }

    /// Create a played fixture with a final score.
    pub fn finished(id: impl Into<String>, home: &Team, away: &Team, score: SetScore) -> Self {
        Match::scheduled(id, home, away).with_result(score)
    }

    pub fn with_week(mut self, week: u32) -> Self {
        self.week = Some(week);
        self
    }

    /// Copy of this fixture marked finished with the given score.
    pub fn with_result(mut self, score: SetScore) -> Self {
        self.home_score = Some(score.home());
        self.away_score = Some(score.away());
        self.status = MatchStatus::Finished;
        self
    }

    pub fn is_finished(&self) -> bool {
        self.status == MatchStatus::Finished
    }

    /// Stored scores, only when the match is finished and both are present.
    pub fn counted_scores(&self) -> Option<(u8, u8)> {
        match (self.status, self.home_score, self.away_score) {
            (MatchStatus::Finished, Some(home), Some(away)) => Some((home, away)),
            _ => None,
        }
    }
}

/// A fixture after passing through the match simulator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatedMatch {
    #[serde(flatten)]
    pub fixture: Match,

    /// True when the score was produced by the engine rather than played
    pub is_simulated: bool,

    /// Probability used to draw the result, present only when simulated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_win_probability: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl SimulatedMatch {
    /// Wrap a fixture unchanged, flagged as not simulated.
    pub fn passthrough(fixture: &Match) -> Self {
        SimulatedMatch {
            fixture: fixture.clone(),
            is_simulated: false,
            home_win_probability: None,
            confidence: None,
        }
    }

    /// The fixture's score as a `SetScore`, if finished with a legal result.
    pub fn score(&self) -> Option<SetScore> {
        self.fixture
            .counted_scores()
            .and_then(|(home, away)| SetScore::new(home, away))
    }
}
