pub mod aggregate;
pub mod evaluate;
pub mod predict;

pub use aggregate::{team_season_stats, StrengthTable, StrengthTables, TeamSeasonStrength};
pub use evaluate::{evaluate, tournament_outcomes, EvaluationMetrics};
pub use predict::{predict_matchup, predict_one, predict_submission, SeasonFallback};
