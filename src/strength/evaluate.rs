//! Scoring of submitted probabilities against tournament games that were played.
//!
//! Each game is keyed as `season_low_high` with outcome 1.0 when the lower id
//! won, matching what a submission row predicts.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::data::{GameResult, MatchupRequest, Prediction};

const EPS: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvaluationMetrics {
    pub games: usize,
    pub brier: f64,
    pub logloss: f64,
}

fn logloss(p: f64, y: f64) -> f64 {
    let p = p.clamp(EPS, 1.0 - EPS);
    -(y * p.ln() + (1.0 - y) * (1.0 - p).ln())
}

/// `(identifier, outcome)` for each tournament game in `seasons`.
pub fn tournament_outcomes(results: &[GameResult], seasons: &[i32]) -> Vec<(String, f64)> {
    let seasons: HashSet<i32> = seasons.iter().copied().collect();
    results
        .iter()
        .filter(|g| seasons.contains(&g.season))
        .map(|g| {
            let id = MatchupRequest::identifier(g.season, g.winner_id, g.loser_id);
            let y = if g.winner_id < g.loser_id { 1.0 } else { 0.0 };
            (id, y)
        })
        .collect()
}

/// Brier score and log loss over the games that have a prediction.
/// `None` when no game matched.
pub fn evaluate(
    predictions: &[Prediction],
    outcomes: &[(String, f64)],
) -> Option<EvaluationMetrics> {
    let by_id: HashMap<&str, f64> = predictions
        .iter()
        .map(|p| (p.id.as_str(), p.probability))
        .collect();

    let mut games = 0usize;
    let mut brier = 0.0;
    let mut ll = 0.0;
    for (id, y) in outcomes {
        let Some(&p) = by_id.get(id.as_str()) else {
            continue;
        };
        games += 1;
        brier += (p - y).powi(2);
        ll += logloss(p, *y);
    }

    if games == 0 {
        return None;
    }
    let n = games as f64;
    Some(EvaluationMetrics {
        games,
        brier: brier / n,
        logloss: ll / n,
    })
}
