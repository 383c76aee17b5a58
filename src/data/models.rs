use serde::{Deserialize, Serialize};
use std::fmt;

use super::DataError;

/// Competition division. Ids of the two divisions never overlap and the two
/// are never compared against each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Men,
    Women,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Men, Category::Women];

    /// Men's teams use ids 1000–1999; anything else is routed to Women (3000–3999).
    pub fn from_team_id(team_id: i32) -> Self {
        if (1000..2000).contains(&team_id) {
            Category::Men
        } else {
            Category::Women
        }
    }

    /// Prefix used by the competition's data files (`MTeams.csv`, `WTeams.csv`, ...).
    pub fn file_prefix(self) -> &'static str {
        match self {
            Category::Men => "M",
            Category::Women => "W",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Men => write!(f, "men"),
            Category::Women => write!(f, "women"),
        }
    }
}

/// One completed game, regular season or tournament.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameResult {
    pub season: i32,
    pub winner_id: i32,
    pub loser_id: i32,
    pub winner_score: i32,
    pub loser_score: i32,
}

/// A matchup to forecast. `team_low < team_high` is guaranteed by whoever
/// assigned the ids; it is not re-checked here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchupRequest {
    /// `"season_teamLow_teamHigh"`, e.g. `"2025_1101_1102"`
    pub id: String,
    pub season: i32,
    pub team_low: i32,
    pub team_high: i32,
}

impl MatchupRequest {
    /// Parse a `SSSS_XXXX_YYYY` identifier.
    pub fn parse(id: &str) -> Result<Self, DataError> {
        let bad = || DataError::BadIdentifier(id.to_string());

        let mut parts = id.trim().split('_');
        let (Some(season), Some(low), Some(high), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(bad());
        };
        // plain digits only; i32 parsing alone would let "+1101" through
        if [season, low, high]
            .iter()
            .any(|part| part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()))
        {
            return Err(bad());
        }

        Ok(MatchupRequest {
            id: id.trim().to_string(),
            season: season.parse().map_err(|_| bad())?,
            team_low: low.parse().map_err(|_| bad())?,
            team_high: high.parse().map_err(|_| bad())?,
        })
    }

    /// Build the identifier for a game between two teams, lower id first.
    pub fn identifier(season: i32, team_a: i32, team_b: i32) -> String {
        let (low, high) = if team_a < team_b {
            (team_a, team_b)
        } else {
            (team_b, team_a)
        };
        format!("{}_{}_{}", season, low, high)
    }
}

/// A submission row: P(lower id team wins).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Pred")]
    pub probability: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_identifier() {
        let req = MatchupRequest::parse("2025_1101_1437").unwrap();
        assert_eq!(req.id, "2025_1101_1437");
        assert_eq!(req.season, 2025);
        assert_eq!(req.team_low, 1101);
        assert_eq!(req.team_high, 1437);
    }

    #[test]
    fn rejects_malformed_identifiers() {
        for bad in [
            "",
            "2025_1101",
            "2025_1101_1102_1",
            "2025_abc_1102",
            "2025-1101-1102",
            "2025_+1101_1102",
            "2025_-1101_1102",
            "2025__1102",
        ] {
            assert!(
                matches!(MatchupRequest::parse(bad), Err(DataError::BadIdentifier(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn identifier_orders_lower_id_first() {
        assert_eq!(MatchupRequest::identifier(2024, 1300, 1200), "2024_1200_1300");
        assert_eq!(MatchupRequest::identifier(2024, 3101, 3400), "2024_3101_3400");
    }

    #[test]
    fn category_routing_by_id_range() {
        assert_eq!(Category::from_team_id(1000), Category::Men);
        assert_eq!(Category::from_team_id(1999), Category::Men);
        assert_eq!(Category::from_team_id(3101), Category::Women);
        assert_eq!(Category::Men.file_prefix(), "M");
        assert_eq!(Category::Women.file_prefix(), "W");
    }
}
