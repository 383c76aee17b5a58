use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

pub mod models;
pub use models::{Category, GameResult, MatchupRequest, Prediction};

use crate::config::Mode;

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("malformed matchup identifier {0:?} (expected SEASON_TEAMLOW_TEAMHIGH)")]
    BadIdentifier(String),
}

// ── Raw CSV rows ─────────────────────────────────────────────────────────────

/// Compact results row. DayNum, WLoc and NumOT are present in the files but unused.
#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawCompactResult {
    Season: i32,
    WTeamID: i32,
    WScore: i32,
    LTeamID: i32,
    LScore: i32,
}

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawRequest {
    ID: String,
}

/// Reads competition CSVs from a data directory.
#[derive(Debug, Clone)]
pub struct DataSource {
    data_dir: PathBuf,
}

impl DataSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        DataSource {
            data_dir: data_dir.into(),
        }
    }

    /// Regular season followed by tournament results for one category.
    pub fn load_results(&self, category: Category) -> Result<Vec<GameResult>, DataError> {
        let prefix = category.file_prefix();
        let mut results =
            self.load_results_file(&format!("{}RegularSeasonCompactResults.csv", prefix))?;
        results.extend(self.load_tourney_results(category)?);
        debug!("Loaded {} {} game results", results.len(), category);
        Ok(results)
    }

    /// Tournament results only.
    pub fn load_tourney_results(&self, category: Category) -> Result<Vec<GameResult>, DataError> {
        self.load_results_file(&format!(
            "{}NCAATourneyCompactResults.csv",
            category.file_prefix()
        ))
    }

    /// The ordered matchup list for a request set.
    pub fn load_requests(&self, mode: Mode) -> Result<Vec<MatchupRequest>, DataError> {
        let path = self.data_dir.join(mode.sample_file());
        read_requests(open(&path)?, &path.display().to_string())
    }

    fn load_results_file(&self, name: &str) -> Result<Vec<GameResult>, DataError> {
        let path = self.data_dir.join(name);
        read_results(open(&path)?).map_err(|source| DataError::Csv {
            path: path.display().to_string(),
            source,
        })
    }
}

fn open(path: &Path) -> Result<File, DataError> {
    File::open(path).map_err(|source| DataError::Io {
        path: path.display().to_string(),
        source,
    })
}

pub fn read_results<R: Read>(rdr: R) -> Result<Vec<GameResult>, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut results = Vec::new();
    for row in reader.deserialize::<RawCompactResult>() {
        let raw = row?;
        results.push(GameResult {
            season: raw.Season,
            winner_id: raw.WTeamID,
            loser_id: raw.LTeamID,
            winner_score: raw.WScore,
            loser_score: raw.LScore,
        });
    }
    Ok(results)
}

/// `origin` names the input in error messages.
pub fn read_requests<R: Read>(rdr: R, origin: &str) -> Result<Vec<MatchupRequest>, DataError> {
    let mut reader = csv::Reader::from_reader(rdr);
    let mut requests = Vec::new();
    for row in reader.deserialize::<RawRequest>() {
        let raw = row.map_err(|source| DataError::Csv {
            path: origin.to_string(),
            source,
        })?;
        requests.push(MatchupRequest::parse(&raw.ID)?);
    }
    Ok(requests)
}
