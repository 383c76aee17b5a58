//! Matchup probabilities from season strength.
//!
//! P(team_low wins) = sigmoid(score(low) - score(high)) where
//! `score = win_pct + 0.002 * point_diff_per_game`, taken from the first
//! candidate season in which both teams have a strength row.

use std::slice;

use super::aggregate::{StrengthTables, TeamSeasonStrength};
use crate::data::{Category, MatchupRequest, Prediction};

/// Returned when no candidate season has both teams.
pub const DEFAULT_PROBABILITY: f64 = 0.5;
/// Weight of per-game point differential relative to win percentage.
pub const POINT_DIFF_WEIGHT: f64 = 0.002;
/// Win percentage assumed for a team with no recorded games.
const NO_GAMES_WIN_PCT: f64 = 0.5;
const LOGIT_CLAMP: f64 = 10.0;
const MIN_PROBABILITY: f64 = 0.01;
const MAX_PROBABILITY: f64 = 0.99;

/// Which seasons to try, in order, for a matchup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeasonFallback {
    /// Only the matchup's own season.
    Exact,
    /// A fixed list of proxy seasons, most recent first.
    Recent(Vec<i32>),
}

impl SeasonFallback {
    pub fn candidates<'a>(&'a self, season: &'a i32) -> &'a [i32] {
        match self {
            SeasonFallback::Exact => slice::from_ref(season),
            SeasonFallback::Recent(seasons) => seasons.as_slice(),
        }
    }
}

/// Probability plus the season it came from (`None` = default used).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchupOutcome {
    pub probability: f64,
    pub season_used: Option<i32>,
}

/// Scalar team quality for one season; higher is better.
pub fn strength_score(row: &TeamSeasonStrength) -> f64 {
    let win_pct = if row.games > 0 {
        row.win_pct
    } else {
        NO_GAMES_WIN_PCT
    };
    win_pct + POINT_DIFF_WEIGHT * row.point_diff_per_game
}

/// Logistic of the clamped logit, kept inside [0.01, 0.99].
pub fn win_probability(logit: f64) -> f64 {
    let z = logit.clamp(-LOGIT_CLAMP, LOGIT_CLAMP);
    let p = 1.0 / (1.0 + (-z).exp());
    p.clamp(MIN_PROBABILITY, MAX_PROBABILITY)
}

/// P(team_low beats team_high). The category table is chosen from team_low's id.
pub fn predict_matchup(
    team_low: i32,
    team_high: i32,
    tables: &StrengthTables,
    seasons: &[i32],
) -> MatchupOutcome {
    let Some(table) = tables.get(Category::from_team_id(team_low)) else {
        return MatchupOutcome {
            probability: DEFAULT_PROBABILITY,
            season_used: None,
        };
    };

    for &season in seasons {
        let (Some(low), Some(high)) = (table.get(season, team_low), table.get(season, team_high))
        else {
            continue;
        };
        let logit = strength_score(low) - strength_score(high);
        return MatchupOutcome {
            probability: win_probability(logit),
            season_used: Some(season),
        };
    }

    MatchupOutcome {
        probability: DEFAULT_PROBABILITY,
        season_used: None,
    }
}

pub fn predict_one(
    team_low: i32,
    team_high: i32,
    tables: &StrengthTables,
    seasons: &[i32],
) -> f64 {
    predict_matchup(team_low, team_high, tables, seasons).probability
}

/// Predictions for every request, in request order, plus the number of
/// matchups that got the default probability.
pub fn predict_submission(
    requests: &[MatchupRequest],
    tables: &StrengthTables,
    fallback: &SeasonFallback,
) -> (Vec<Prediction>, usize) {
    let mut defaulted = 0usize;
    let predictions = requests
        .iter()
        .map(|req| {
            let outcome = predict_matchup(
                req.team_low,
                req.team_high,
                tables,
                fallback.candidates(&req.season),
            );
            if outcome.season_used.is_none() {
                defaulted += 1;
            }
            Prediction {
                id: req.id.clone(),
                probability: outcome.probability,
            }
        })
        .collect();
    (predictions, defaulted)
}
