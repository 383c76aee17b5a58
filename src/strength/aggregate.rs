//! Per-team, per-season strength from compact game results.
//!
//! Each season is aggregated on its own in a single pass: every game credits
//! a win (and its points) to the winner and a loss to the loser. Seasons are
//! then stacked, never merged.

use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::data::{Category, GameResult};

/// Season summary for one team.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSeasonStrength {
    pub team_id: i32,
    pub season: i32,
    pub wins: u32,
    pub losses: u32,
    pub games: u32,
    /// wins / games; 0.0 when no games were recorded
    pub win_pct: f64,
    pub points_for: i64,
    pub points_against: i64,
    pub points_for_per_game: f64,
    pub points_against_per_game: f64,
    pub point_diff_per_game: f64,
}

#[derive(Debug, Default, Clone, Copy)]
struct Accumulator {
    wins: u32,
    losses: u32,
    points_for: i64,
    points_against: i64,
}

/// Strength rows for every team that played in `season`, ordered by team id.
/// A season with no games yields an empty vec.
pub fn team_season_stats(results: &[GameResult], season: i32) -> Vec<TeamSeasonStrength> {
    let mut teams: BTreeMap<i32, Accumulator> = BTreeMap::new();

    for game in results.iter().filter(|g| g.season == season) {
        let winner = teams.entry(game.winner_id).or_default();
        winner.wins += 1;
        winner.points_for += i64::from(game.winner_score);
        winner.points_against += i64::from(game.loser_score);

        let loser = teams.entry(game.loser_id).or_default();
        loser.losses += 1;
        loser.points_for += i64::from(game.loser_score);
        loser.points_against += i64::from(game.winner_score);
    }

    teams
        .into_iter()
        .map(|(team_id, acc)| {
            let games = acc.wins + acc.losses;
            // zero games gives zero rates, not an error
            let divisor = f64::from(games.max(1));
            let points_for_per_game = acc.points_for as f64 / divisor;
            let points_against_per_game = acc.points_against as f64 / divisor;
            TeamSeasonStrength {
                team_id,
                season,
                wins: acc.wins,
                losses: acc.losses,
                games,
                win_pct: f64::from(acc.wins) / divisor,
                points_for: acc.points_for,
                points_against: acc.points_against,
                points_for_per_game,
                points_against_per_game,
                point_diff_per_game: points_for_per_game - points_against_per_game,
            }
        })
        .collect()
}

/// Stacked strength rows for one category, with a (season, team) index.
#[derive(Debug, Clone, Default)]
pub struct StrengthTable {
    rows: Vec<TeamSeasonStrength>,
    index: HashMap<(i32, i32), usize>,
}

impl StrengthTable {
    /// One aggregation per season, concatenated in the order given.
    pub fn build(results: &[GameResult], seasons: &[i32]) -> Self {
        let mut table = StrengthTable::default();
        for &season in seasons {
            let rows = team_season_stats(results, season);
            debug!("Season {}: {} team-seasons", season, rows.len());
            table.extend(rows);
        }
        table
    }

    pub fn from_rows(rows: Vec<TeamSeasonStrength>) -> Self {
        let mut table = StrengthTable::default();
        table.extend(rows);
        table
    }

    fn extend(&mut self, rows: Vec<TeamSeasonStrength>) {
        for row in rows {
            // a season listed twice keeps its first rows for lookups
            self.index
                .entry((row.season, row.team_id))
                .or_insert(self.rows.len());
            self.rows.push(row);
        }
    }

    pub fn get(&self, season: i32, team_id: i32) -> Option<&TeamSeasonStrength> {
        self.index
            .get(&(season, team_id))
            .map(|&i| &self.rows[i])
    }

    pub fn rows(&self) -> &[TeamSeasonStrength] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// One strength table per category. Lookups route by category and tables are
/// never merged.
#[derive(Debug, Clone, Default)]
pub struct StrengthTables {
    tables: HashMap<Category, StrengthTable>,
}

impl StrengthTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category: Category, table: StrengthTable) {
        self.tables.insert(category, table);
    }

    pub fn get(&self, category: Category) -> Option<&StrengthTable> {
        self.tables.get(&category)
    }

    /// Row count per category, in `Category::ALL` order.
    pub fn counts(&self) -> BTreeMap<Category, usize> {
        Category::ALL
            .iter()
            .map(|&c| (c, self.get(c).map_or(0, StrengthTable::len)))
            .collect()
    }
}
