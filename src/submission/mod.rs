use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::Mode;
use crate::data::{Category, Prediction};
use crate::strength::EvaluationMetrics;

/// Exact header of a submission file.
pub const SUBMISSION_COLUMNS: [&str; 2] = ["ID", "Pred"];

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("expected {expected} rows, got {actual}. Fix before submitting.")]
    RowCount { expected: usize, actual: usize },

    #[error("columns must be exactly ID, Pred (got {0:?})")]
    Columns(Vec<String>),

    #[error("all Pred values must be between 0 and 1 ({id} has {value})")]
    ProbabilityOutOfRange { id: String, value: f64 },

    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },
}

impl SubmissionError {
    /// True for the validation failures that mean the submission itself is wrong.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            SubmissionError::RowCount { .. }
                | SubmissionError::Columns(_)
                | SubmissionError::ProbabilityOutOfRange { .. }
        )
    }
}

/// Row count and probability bounds of an in-memory submission.
pub fn validate_submission(
    predictions: &[Prediction],
    required_rows: usize,
) -> Result<(), SubmissionError> {
    if predictions.len() != required_rows {
        return Err(SubmissionError::RowCount {
            expected: required_rows,
            actual: predictions.len(),
        });
    }
    if let Some(bad) = predictions
        .iter()
        .find(|p| !(0.0..=1.0).contains(&p.probability))
    {
        return Err(SubmissionError::ProbabilityOutOfRange {
            id: bad.id.clone(),
            value: bad.probability,
        });
    }
    Ok(())
}

/// Write `ID,Pred` rows to `path`.
///
/// Rows go to a sibling `.tmp` file that is re-read and checked (header and
/// row count) before being renamed over `path`. On any failure the temporary
/// file is removed and `path` is left untouched.
pub fn write_predictions(path: &Path, predictions: &[Prediction]) -> Result<(), SubmissionError> {
    let tmp = tmp_path(path);
    let result = write_csv(&tmp, predictions)
        .and_then(|()| verify_artifact(&tmp, predictions.len()))
        .and_then(|()| fs::rename(&tmp, path).map_err(|source| io_err(path, source)));
    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

fn write_csv(path: &Path, predictions: &[Prediction]) -> Result<(), SubmissionError> {
    let csv_err = |source| SubmissionError::Csv {
        path: path.display().to_string(),
        source,
    };
    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    if predictions.is_empty() {
        // serialize() only emits the header alongside the first row
        writer.write_record(SUBMISSION_COLUMNS).map_err(csv_err)?;
    }
    for p in predictions {
        writer.serialize(p).map_err(csv_err)?;
    }
    writer.flush().map_err(|source| io_err(path, source))
}

/// Check the header and row count of a written submission file.
pub fn verify_artifact(path: &Path, expected_rows: usize) -> Result<(), SubmissionError> {
    let csv_err = |source| SubmissionError::Csv {
        path: path.display().to_string(),
        source,
    };
    let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;
    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_err)?
        .iter()
        .map(str::to_string)
        .collect();
    if headers != SUBMISSION_COLUMNS {
        return Err(SubmissionError::Columns(headers));
    }

    let mut rows = 0usize;
    for record in reader.records() {
        record.map_err(csv_err)?;
        rows += 1;
    }
    if rows != expected_rows {
        return Err(SubmissionError::RowCount {
            expected: expected_rows,
            actual: rows,
        });
    }
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn io_err(path: &Path, source: std::io::Error) -> SubmissionError {
    SubmissionError::Io {
        path: path.display().to_string(),
        source,
    }
}

// ── Run summary ─────────────────────────────────────────────────────────────

/// Machine-readable record of a run, written next to the submission.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub mode: Mode,
    pub rows: usize,
    pub strength_seasons: Vec<i32>,
    pub team_seasons: BTreeMap<Category, usize>,
    /// Matchups that got the default probability
    pub defaulted: usize,
    pub evaluation: Option<EvaluationMetrics>,
}

pub fn write_summary(path: &Path, summary: &RunSummary) -> Result<(), SubmissionError> {
    let file = File::create(path).map_err(|source| io_err(path, source))?;
    serde_json::to_writer_pretty(file, summary)
        .map_err(|e| io_err(path, std::io::Error::from(e)))?;
    info!("Run summary written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn preds(values: &[f64]) -> Vec<Prediction> {
        values
            .iter()
            .enumerate()
            .map(|(i, &p)| Prediction {
                id: format!("2025_{}_{}", 1101 + i, 1300 + i),
                probability: p,
            })
            .collect()
    }

    #[test]
    fn valid_submission_passes() {
        assert!(validate_submission(&preds(&[0.01, 0.5, 0.99]), 3).is_ok());
    }

    #[test]
    fn row_count_mismatch_is_reported() {
        let err = validate_submission(&preds(&[0.5, 0.5]), 3).unwrap_err();
        assert!(matches!(
            err,
            SubmissionError::RowCount {
                expected: 3,
                actual: 2
            }
        ));
        assert!(err.to_string().contains("expected 3 rows, got 2"));
    }

    #[test]
    fn only_validation_failures_are_rejections() {
        let rows = SubmissionError::RowCount {
            expected: 1,
            actual: 2,
        };
        assert!(rows.is_rejection());
        assert!(SubmissionError::Columns(vec!["ID".into()]).is_rejection());
        let io = SubmissionError::Io {
            path: "run_summary.json".into(),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };
        assert!(!io.is_rejection());
    }

    #[test]
    fn out_of_range_probability_is_reported() {
        for bad in [1.5, -0.1, f64::NAN] {
            let err = validate_submission(&preds(&[0.5, bad]), 2).unwrap_err();
            match err {
                SubmissionError::ProbabilityOutOfRange { id, .. } => {
                    assert_eq!(id, "2025_1102_1301")
                }
                other => panic!("unexpected error {other:?}"),
            }
        }
    }

    #[test]
    fn writes_id_pred_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("submission.csv");
        write_predictions(&path, &preds(&[0.25, 0.75])).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("ID,Pred"));
        assert_eq!(lines.next(), Some("2025_1101_1300,0.25"));
        assert_eq!(lines.next(), Some("2025_1102_1301,0.75"));
        assert_eq!(lines.next(), None);
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn empty_submission_still_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("submission.csv");
        write_predictions(&path, &[]).unwrap();
        assert!(verify_artifact(&path, 0).is_ok());
    }

    #[test]
    fn verify_rejects_wrong_columns_and_counts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.csv");
        fs::write(&path, "ID,Prob\n2025_1101_1102,0.5\n").unwrap();
        assert!(matches!(
            verify_artifact(&path, 1),
            Err(SubmissionError::Columns(_))
        ));

        fs::write(&path, "ID,Pred\n2025_1101_1102,0.5\n").unwrap();
        assert!(verify_artifact(&path, 1).is_ok());
        assert!(matches!(
            verify_artifact(&path, 2),
            Err(SubmissionError::RowCount { .. })
        ));
    }

    #[test]
    fn failed_write_leaves_existing_artifact_alone() {
        let dir = tempfile::tempdir().unwrap();
        let missing_dir = dir.path().join("nope").join("submission.csv");
        assert!(write_predictions(&missing_dir, &preds(&[0.5])).is_err());
        assert!(!missing_dir.exists());
    }

    #[test]
    fn summary_is_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run_summary.json");
        let summary = RunSummary {
            mode: Mode::Future,
            rows: 2,
            strength_seasons: vec![2025, 2024, 2023],
            team_seasons: BTreeMap::from([(Category::Men, 10), (Category::Women, 8)]),
            defaulted: 1,
            evaluation: None,
        };
        write_summary(&path, &summary).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["mode"], "future");
        assert_eq!(value["team_seasons"]["Men"], 10);
        assert!(value["evaluation"].is_null());
    }
}
