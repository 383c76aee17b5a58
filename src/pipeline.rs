//! One full run: load, aggregate, predict, validate, write.
//!
//! The submission is validated in memory before the output directory is
//! touched, so a rejected run leaves nothing behind.

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::{Mode, RunSettings, TARGET_SEASON};
use crate::data::{Category, DataSource};
use crate::strength::{
    evaluate, predict_submission, tournament_outcomes, StrengthTable, StrengthTables,
};
use crate::submission::{validate_submission, write_predictions, write_summary, RunSummary};

pub fn run(settings: &RunSettings) -> Result<()> {
    info!("Mode: {}", settings.mode.describe());
    let source = DataSource::new(&settings.data_dir);

    info!(
        "Step 1/4 — Loading matchups from {}",
        settings.data_dir.join(settings.mode.sample_file()).display()
    );
    let requests = source
        .load_requests(settings.mode)
        .context("Failed to load matchup requests")?;
    info!(
        "Loaded {} matchups (required: {})",
        requests.len(),
        settings.required_rows
    );

    info!(
        "Step 2/4 — Building team strength for seasons {:?}",
        settings.strength_seasons
    );
    let mut tables = StrengthTables::new();
    let mut tourney_results = Vec::new();
    for category in Category::ALL {
        let results = source
            .load_results(category)
            .with_context(|| format!("Failed to load {} results", category))?;
        let table = StrengthTable::build(&results, &settings.strength_seasons);
        info!("{}: {} team-seasons", category, table.len());
        tables.insert(category, table);

        if settings.evaluate {
            tourney_results.extend(
                source
                    .load_tourney_results(category)
                    .with_context(|| format!("Failed to load {} tournament results", category))?,
            );
        }
    }

    info!("Step 3/4 — Predicting P(lower TeamId wins) for each matchup");
    let (predictions, defaulted) = predict_submission(&requests, &tables, &settings.fallback);
    if defaulted > 0 {
        warn!(
            "{} of {} matchups had no shared season and got the default probability",
            defaulted,
            predictions.len()
        );
    }

    let evaluation = if settings.evaluate {
        let outcomes = tournament_outcomes(&tourney_results, &settings.strength_seasons);
        let metrics = evaluate(&predictions, &outcomes);
        match &metrics {
            Some(m) => info!(
                "Tournament games scored: {} | Brier {:.4} | log loss {:.4}",
                m.games, m.brier, m.logloss
            ),
            None => warn!("No tournament games matched any prediction"),
        }
        metrics
    } else {
        None
    };

    info!("Step 4/4 — Validating and writing submission");
    validate_submission(&predictions, settings.required_rows)?;
    std::fs::create_dir_all(&settings.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            settings.output_dir.display()
        )
    })?;
    let out_path = settings.submission_path();
    write_predictions(&out_path, &predictions)?;
    info!(
        "Valid: {} rows, ID + Pred, Pred in [0,1]. Saved {}",
        predictions.len(),
        out_path.display()
    );

    let summary_path = settings.summary_path();
    write_summary(
        &summary_path,
        &RunSummary {
            mode: settings.mode,
            rows: predictions.len(),
            strength_seasons: settings.strength_seasons.clone(),
            team_seasons: tables.counts(),
            defaulted,
            evaluation,
        },
    )
    .with_context(|| {
        format!(
            "Submission saved, but the run summary could not be written to {}",
            summary_path.display()
        )
    })?;

    if settings.mode == Mode::Future {
        info!(
            "This file scores 0.000 until the {} tournaments are played and rescored",
            TARGET_SEASON
        );
    }
    info!("Done.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::submission::SubmissionError;
    use std::fs;
    use std::path::Path;

    const RESULTS_HEADER: &str = "Season,DayNum,WTeamID,WScore,LTeamID,LScore,WLoc,NumOT\n";

    fn write_fixture(dir: &Path) {
        fs::write(
            dir.join("MRegularSeasonCompactResults.csv"),
            format!(
                "{RESULTS_HEADER}2024,10,1101,80,1102,70,H,0\n\
                 2024,11,1101,75,1103,70,H,0\n"
            ),
        )
        .unwrap();
        fs::write(
            dir.join("MNCAATourneyCompactResults.csv"),
            format!("{RESULTS_HEADER}2024,136,1101,70,1102,60,N,0\n"),
        )
        .unwrap();
        fs::write(
            dir.join("WRegularSeasonCompactResults.csv"),
            format!("{RESULTS_HEADER}2024,10,3101,60,3102,50,H,0\n"),
        )
        .unwrap();
        fs::write(dir.join("WNCAATourneyCompactResults.csv"), RESULTS_HEADER).unwrap();
        fs::write(
            dir.join("SampleSubmissionStage1.csv"),
            "ID,Pred\n2024_1101_1102,0.5\n2024_3101_3102,0.5\n",
        )
        .unwrap();
    }

    fn settings(data_dir: &Path, output_dir: &Path, required_rows: usize) -> RunSettings {
        RunSettings {
            mode: Mode::Current,
            data_dir: data_dir.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            strength_seasons: vec![2024],
            fallback: Mode::Current.season_fallback(),
            required_rows,
            evaluate: true,
        }
    }

    #[test]
    fn row_count_mismatch_rejects_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path());
        let out = dir.path().join("output");

        let err = run(&settings(dir.path(), &out, 519_144)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SubmissionError>(),
            Some(SubmissionError::RowCount {
                expected: 519_144,
                actual: 2
            })
        ));
        assert!(err
            .downcast_ref::<SubmissionError>()
            .is_some_and(SubmissionError::is_rejection));
        assert!(!out.join("submission.csv").exists());
        assert!(!out.exists());
    }

    #[test]
    fn matching_row_count_writes_submission_and_summary() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path());
        let out = dir.path().join("output");

        run(&settings(dir.path(), &out, 2)).unwrap();

        let text = fs::read_to_string(out.join("submission.csv")).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "ID,Pred");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("2024_1101_1102,"));
        assert!(lines[2].starts_with("2024_3101_3102,"));

        let summary: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(out.join("run_summary.json")).unwrap())
                .unwrap();
        assert_eq!(summary["rows"], 2);
        assert_eq!(summary["defaulted"], 0);
        assert_eq!(summary["evaluation"]["games"], 1);
    }

    #[test]
    fn missing_tournament_file_names_the_category() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path());
        fs::remove_file(dir.path().join("WNCAATourneyCompactResults.csv")).unwrap();

        let err = run(&settings(dir.path(), &dir.path().join("output"), 2)).unwrap_err();
        assert!(err.to_string().contains("women"));
    }
}
