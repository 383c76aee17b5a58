use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::strength::SeasonFallback;

/// Season whose matchups the future request set asks for.
pub const TARGET_SEASON: i32 = 2026;

/// Seasons covered by the current-leaderboard request set.
pub const STAGE1_SEASONS: [i32; 4] = [2022, 2023, 2024, 2025];
pub const STAGE1_REQUIRED_ROWS: usize = 519_144;

pub const STAGE2_REQUIRED_ROWS: usize = 132_134;
/// Proxy seasons for the target season, most recent first.
pub const RECENT_SEASONS: [i32; 3] = [2025, 2024, 2023];

/// Which request set to predict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Stage 1: 2022–2025 matchups, scored on the current leaderboard
    Current,
    /// Stage 2: 2026 matchups, scored once the tournaments are played
    Future,
}

impl Mode {
    pub fn sample_file(self) -> &'static str {
        match self {
            Mode::Current => "SampleSubmissionStage1.csv",
            Mode::Future => "SampleSubmissionStage2.csv",
        }
    }

    pub fn required_rows(self) -> usize {
        match self {
            Mode::Current => STAGE1_REQUIRED_ROWS,
            Mode::Future => STAGE2_REQUIRED_ROWS,
        }
    }

    /// Seasons to build strength tables for.
    pub fn strength_seasons(self) -> Vec<i32> {
        match self {
            Mode::Current => STAGE1_SEASONS.to_vec(),
            Mode::Future => RECENT_SEASONS.to_vec(),
        }
    }

    /// Matchups of a known season use that season only; the future season
    /// falls back through recent seasons.
    pub fn season_fallback(self) -> SeasonFallback {
        match self {
            Mode::Current => SeasonFallback::Exact,
            Mode::Future => SeasonFallback::Recent(RECENT_SEASONS.to_vec()),
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Mode::Current => "current leaderboard (2022–2025)",
            Mode::Future => "2026 only, scores 0.0 until the tournaments are played",
        }
    }
}

/// Baseline matchup forecaster for the tournament prediction competition
#[derive(Parser, Debug, Clone)]
#[command(name = "mania-baseline", version, about)]
pub struct Config {
    /// Request set to predict
    #[arg(long, env = "MODE", value_enum, default_value = "current")]
    pub mode: Mode,

    /// Directory holding the competition CSV files
    #[arg(long, env = "DATA_DIR", default_value = "datasets")]
    pub data_dir: PathBuf,

    /// Directory the submission and run summary are written to
    #[arg(long, env = "OUTPUT_DIR", default_value = "output")]
    pub output_dir: PathBuf,

    /// Override the fixed row count expected for the selected mode
    #[arg(long, env = "EXPECTED_ROWS")]
    pub expected_rows: Option<usize>,

    /// Score predictions against actual tournament games (current mode only)
    #[arg(long, env = "EVALUATE", default_value = "false")]
    pub evaluate: bool,
}

/// Everything a run needs, resolved from `Config`.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub mode: Mode,
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub strength_seasons: Vec<i32>,
    pub fallback: SeasonFallback,
    pub required_rows: usize,
    pub evaluate: bool,
}

impl RunSettings {
    pub fn submission_path(&self) -> PathBuf {
        self.output_dir.join("submission.csv")
    }

    pub fn summary_path(&self) -> PathBuf {
        self.output_dir.join("run_summary.json")
    }
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.data_dir.is_dir() {
            anyhow::bail!(
                "data directory {} does not exist. Use --data-dir or DATA_DIR.",
                self.data_dir.display()
            );
        }
        if self.expected_rows == Some(0) {
            anyhow::bail!("expected_rows must be positive");
        }
        Ok(())
    }

    pub fn settings(&self) -> RunSettings {
        RunSettings {
            mode: self.mode,
            data_dir: self.data_dir.clone(),
            output_dir: self.output_dir.clone(),
            strength_seasons: self.mode.strength_seasons(),
            fallback: self.mode.season_fallback(),
            required_rows: self
                .expected_rows
                .unwrap_or_else(|| self.mode.required_rows()),
            evaluate: self.evaluate && self.mode == Mode::Current,
        }
    }
}
