use serde::{Deserialize, Serialize};

use crate::win_prob::normalize_strength;

/// A league team as supplied by the data layer.
///
/// Teams are read-only input to a run; the engine never mutates them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short_name: Option<String>,

    #[serde(default)]
    pub league_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,

    /// Raw strength rating, conventionally 800-1200. `None` and `0` both mean
    /// unrated and model the team as exactly average.
    #[serde(default)]
    pub strength_rating: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

impl Team {
    /// Create a rated team with no league or group membership.
    pub fn new(id: impl Into<String>, name: impl Into<String>, strength_rating: f64) -> Self {
        Team {
            id: id.into(),
            name: name.into(),
            short_name: None,
            league_id: String::new(),
            group_id: None,
            strength_rating: Some(strength_rating),
            logo_url: None,
        }
    }

    /// Create a team without a strength rating.
    pub fn unrated(id: impl Into<String>, name: impl Into<String>) -> Self {
        Team {
            strength_rating: None,
            ..Team::new(id, name, 0.0)
        }
    }

    pub fn with_league(mut self, league_id: impl Into<String>) -> Self {
        self.league_id = league_id.into();
        self
    }

    pub fn with_group(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    /// Strength on the bounded 0-100 scale used by the outcome model.
    pub fn normalized_strength(&self) -> f64 {
        normalize_strength(self.strength_rating)
    }

    /// Short name when present, otherwise the full name.
    pub fn display_name(&self) -> &str {
        self.short_name.as_deref().unwrap_or(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrated_team_is_average() {
        let team = Team::unrated("t1", "Unrated");
        assert_eq!(team.strength_rating, None);
        assert!((team.normalized_strength() - 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_placeholder_rating_is_average() {
        let team: Team = serde_json::from_str(r#"{"id":"t2","name":"New","leagueId":"L1","strengthRating":0}"#).unwrap();
        assert_eq!(team.strength_rating, Some(0.0));
        assert!((team.normalized_strength() - 50.0).abs() < 1e-12);
    }

    #[test]
    fn test_display_name_prefers_short_name() {
        let mut team = Team::new("t1", "Istanbul Volleyball Club", 1000.0);
        assert_eq!(team.display_name(), "Istanbul Volleyball Club");

        team.short_name = Some("IVC".to_string());
        assert_eq!(team.display_name(), "IVC");
    }

    #[test]
    fn test_deserialize_camel_case() {
        let team: Team = serde_json::from_str(
            r#"{"id":"a","name":"Alpha","leagueId":"L1","groupId":"G","strengthRating":1100}"#,
        )
        .unwrap();

        assert_eq!(team.league_id, "L1");
        assert_eq!(team.group_id.as_deref(), Some("G"));
        assert_eq!(team.strength_rating, Some(1100.0));
        assert!((team.normalized_strength() - 75.0).abs() < 1e-12);
    }
}
