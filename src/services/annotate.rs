//! Survey response annotation service.
//!
//! Walks every free-text cell of the table (rows x blocks x valences),
//! scores it against the candidate labels, and merges one score column
//! per (block, valence, label) triple into the table after the traversal
//! completes. Separated from UI concerns - emits events for progress
//! tracking.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::classifier::{Classifier, LabelScore};
use crate::config::StudyConfig;
use crate::table::Table;

/// Events emitted during annotation processing.
/// Fields are populated when events are created, even if consumers don't read all of them.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub enum AnnotationEvent {
    /// Annotation started
    Started { total_cells: usize },
    /// One text cell was classified
    CellCompleted { row: usize, column: String },
    /// Annotation complete
    Complete { cells: usize, columns: usize },
}

/// Result of an annotation run.
#[derive(Debug)]
pub struct AnnotationResult {
    /// Text cells classified.
    pub cells: usize,
    /// Score columns merged into the table.
    pub columns: usize,
}

/// Service for annotating free-text survey responses with classifier scores.
pub struct AnnotationService<C> {
    classifier: C,
    study: StudyConfig,
}

impl<C: Classifier> AnnotationService<C> {
    /// Create a new annotation service.
    pub fn new(classifier: C, study: StudyConfig) -> Self {
        Self { classifier, study }
    }

    /// Annotate every text cell of the table, then merge the score
    /// columns in.
    ///
    /// `limit` caps how many rows are classified (0 = all). Rows past
    /// the cap keep the table's row count but get empty score cells.
    ///
    /// Any classifier or table error aborts the run with the table left
    /// untouched: score columns only land after the full traversal
    /// succeeds.
    pub async fn annotate(
        &self,
        table: &mut Table,
        limit: usize,
        event_tx: mpsc::Sender<AnnotationEvent>,
    ) -> anyhow::Result<AnnotationResult> {
        let row_cap = if limit == 0 {
            table.len()
        } else {
            limit.min(table.len())
        };

        let total_cells = self.study.cells_per_run(row_cap);
        let _ = event_tx
            .send(AnnotationEvent::Started { total_cells })
            .await;

        // Fresh buffers per output column, merged once at the end.
        let mut column_names = Vec::new();
        for block in 0..self.study.n_blocks {
            for valence in &self.study.valences {
                for label in &self.study.labels {
                    column_names.push(self.study.score_column(block, valence, label));
                }
            }
        }
        let mut columns: Vec<Vec<String>> =
            vec![Vec::with_capacity(table.len()); column_names.len()];

        let mut cells = 0usize;
        for row in 0..row_cap {
            let mut column_idx = 0usize;
            for block in 0..self.study.n_blocks {
                for valence in &self.study.valences {
                    let text_column = self.study.text_column(block, valence);
                    let text = table.value(row, &text_column)?.to_string();

                    debug!(row, column = %text_column, "classifying: {text}");
                    let results = self.classifier.classify(&text, &self.study.labels).await?;
                    let scores = pair_by_label(&results, &self.study.labels)?;
                    debug!(row, column = %text_column, "scores: {scores:?}");

                    for label in &self.study.labels {
                        columns[column_idx].push(format_score(scores[label.as_str()]));
                        column_idx += 1;
                    }

                    cells += 1;
                    let _ = event_tx
                        .send(AnnotationEvent::CellCompleted {
                            row,
                            column: text_column,
                        })
                        .await;
                }
            }
        }

        for (name, mut values) in column_names.iter().zip(columns) {
            // Rows beyond the cap stay in the table with empty score cells
            values.resize(table.len(), String::new());
            table.push_column(name, values)?;
        }

        let _ = event_tx
            .send(AnnotationEvent::Complete {
                cells,
                columns: column_names.len(),
            })
            .await;

        Ok(AnnotationResult {
            cells,
            columns: column_names.len(),
        })
    }
}

/// Pair classifier results with the requested labels by identity.
///
/// The wire contract returns parallel label/score sequences with no
/// ordering promise, so positional indexing is unsafe. A missing
/// requested label is an error; an extra returned label is ignored.
fn pair_by_label<'a>(
    results: &'a [LabelScore],
    requested: &'a [String],
) -> anyhow::Result<HashMap<&'a str, f64>> {
    let mut scores = HashMap::with_capacity(requested.len());
    for result in results {
        if !requested.iter().any(|l| l == &result.label) {
            debug!("Ignoring unrequested label in response: {}", result.label);
            continue;
        }
        if !result.score.is_finite() {
            anyhow::bail!("non-finite score for label {:?}", result.label);
        }
        if !(0.0..=1.0).contains(&result.score) {
            warn!(
                "Score for label {:?} outside [0,1]: {}",
                result.label, result.score
            );
        }
        if scores.insert(result.label.as_str(), result.score).is_some() {
            anyhow::bail!("duplicate score for label {:?}", result.label);
        }
    }

    for label in requested {
        if !scores.contains_key(label.as_str()) {
            anyhow::bail!("classifier response missing label {label:?}");
        }
    }
    Ok(scores)
}

/// Format a score for the CSV output.
fn format_score(score: f64) -> String {
    // Display gives the shortest round-trip form (0.8 stays "0.8")
    score.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::classifier::ClassifierError;
    use crate::config::StudyConfig;

    /// Deterministic classifier returning canned scores keyed by label.
    /// Results come back in reverse request order to exercise identity
    /// pairing.
    struct MockClassifier {
        scores: HashMap<String, f64>,
    }

    impl MockClassifier {
        fn new(pairs: &[(&str, f64)]) -> Self {
            Self {
                scores: pairs.iter().map(|(l, s)| (l.to_string(), *s)).collect(),
            }
        }
    }

    #[async_trait]
    impl Classifier for MockClassifier {
        async fn classify(
            &self,
            text: &str,
            labels: &[String],
        ) -> Result<Vec<LabelScore>, ClassifierError> {
            if text.trim().is_empty() {
                return Err(ClassifierError::EmptyInput);
            }
            Ok(labels
                .iter()
                .rev()
                .map(|label| LabelScore {
                    label: label.clone(),
                    score: self.scores.get(label.as_str()).copied().unwrap_or(0.0),
                })
                .collect())
        }
    }

    fn one_block_study() -> StudyConfig {
        StudyConfig {
            n_blocks: 1,
            valences: vec!["pos".to_string()],
            ..StudyConfig::default()
        }
    }

    fn one_row_table() -> Table {
        let data = "id,descrip_block1_pos\n7,I felt anxious about my own performance\n";
        Table::from_reader(data.as_bytes()).unwrap()
    }

    async fn run(
        service: &AnnotationService<MockClassifier>,
        table: &mut Table,
    ) -> AnnotationResult {
        let (tx, mut rx) = mpsc::channel(64);
        let result = service.annotate(table, 0, tx).await.unwrap();
        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert!(matches!(
            events.first(),
            Some(AnnotationEvent::Started { .. })
        ));
        assert!(matches!(
            events.last(),
            Some(AnnotationEvent::Complete { .. })
        ));
        result
    }

    #[tokio::test]
    async fn test_single_row_scenario() {
        let classifier = MockClassifier::new(&[
            ("myself", 0.8),
            ("other people", 0.05),
            ("in general", 0.1),
            ("specific situations", 0.05),
        ]);
        let service = AnnotationService::new(classifier, one_block_study());
        let mut table = one_row_table();

        let result = run(&service, &mut table).await;
        assert_eq!(result.cells, 1);
        assert_eq!(result.columns, 4);

        assert_eq!(
            table
                .value(0, "scenario1_pos_classifier1_myself_score")
                .unwrap(),
            "0.8"
        );
        assert_eq!(
            table
                .value(0, "scenario1_pos_classifier1_other people_score")
                .unwrap(),
            "0.05"
        );
        assert_eq!(
            table
                .value(0, "scenario1_pos_classifier1_in general_score")
                .unwrap(),
            "0.1"
        );
        assert_eq!(
            table
                .value(0, "scenario1_pos_classifier1_specific situations_score")
                .unwrap(),
            "0.05"
        );
        // Original text cell unchanged
        assert_eq!(
            table.value(0, "descrip_block1_pos").unwrap(),
            "I felt anxious about my own performance"
        );
    }

    #[tokio::test]
    async fn test_row_count_and_inputs_preserved() {
        let classifier = MockClassifier::new(&[
            ("myself", 0.5),
            ("other people", 0.5),
            ("in general", 0.5),
            ("specific situations", 0.5),
        ]);
        let study = StudyConfig {
            n_blocks: 2,
            ..one_block_study()
        };
        let service = AnnotationService::new(classifier, study);

        let data = "id,descrip_block1_pos,descrip_block2_pos\n\
                    1,good day,bad day\n\
                    2,fine,okay\n\
                    3,went well,went poorly\n";
        let mut table = Table::from_reader(data.as_bytes()).unwrap();
        let headers_before = table.headers().to_vec();

        let result = run(&service, &mut table).await;
        assert_eq!(result.cells, 6);
        assert_eq!(result.columns, 8);
        assert_eq!(table.len(), 3);
        assert_eq!(
            &table.headers()[..headers_before.len()],
            &headers_before[..]
        );
        assert_eq!(table.value(2, "descrip_block2_pos").unwrap(), "went poorly");
    }

    #[tokio::test]
    async fn test_limit_caps_rows_classified() {
        let classifier = MockClassifier::new(&[
            ("myself", 0.6),
            ("other people", 0.2),
            ("in general", 0.1),
            ("specific situations", 0.1),
        ]);
        let service = AnnotationService::new(classifier, one_block_study());

        let data = "id,descrip_block1_pos\n1,a good day\n2,a bad day\n";
        let mut table = Table::from_reader(data.as_bytes()).unwrap();

        let (tx, _rx) = mpsc::channel(64);
        let result = service.annotate(&mut table, 1, tx).await.unwrap();

        // Only the first row's cell is classified
        assert_eq!(result.cells, 1);
        assert_eq!(
            table
                .value(0, "scenario1_pos_classifier1_myself_score")
                .unwrap(),
            "0.6"
        );
        // Row count is preserved; rows past the cap get empty score cells
        assert_eq!(table.len(), 2);
        assert_eq!(
            table
                .value(1, "scenario1_pos_classifier1_myself_score")
                .unwrap(),
            ""
        );
        assert_eq!(table.value(1, "descrip_block1_pos").unwrap(), "a bad day");
    }

    #[tokio::test]
    async fn test_rerun_is_deterministic() {
        let make_service = || {
            AnnotationService::new(
                MockClassifier::new(&[
                    ("myself", 0.25),
                    ("other people", 0.75),
                    ("in general", 0.0),
                    ("specific situations", 1.0),
                ]),
                one_block_study(),
            )
        };

        let mut first = one_row_table();
        let mut second = one_row_table();
        run(&make_service(), &mut first).await;
        run(&make_service(), &mut second).await;

        for label in &StudyConfig::default().labels {
            let column = format!("scenario1_pos_classifier1_{label}_score");
            assert_eq!(
                first.value(0, &column).unwrap(),
                second.value(0, &column).unwrap()
            );
        }
    }

    #[tokio::test]
    async fn test_empty_text_fails_fast() {
        let classifier = MockClassifier::new(&[("myself", 0.5)]);
        let service = AnnotationService::new(classifier, one_block_study());

        let data = "id,descrip_block1_pos\n1,\n";
        let mut table = Table::from_reader(data.as_bytes()).unwrap();
        let (tx, _rx) = mpsc::channel(64);
        let err = service.annotate(&mut table, 0, tx).await.unwrap_err();
        assert!(err.to_string().contains("Empty input"));
        // No partial columns merged
        assert_eq!(table.headers().len(), 2);
    }

    #[tokio::test]
    async fn test_missing_input_column_fails_fast() {
        let classifier = MockClassifier::new(&[("myself", 0.5)]);
        let study = StudyConfig {
            n_blocks: 2,
            ..one_block_study()
        };
        let service = AnnotationService::new(classifier, study);

        let mut table = one_row_table();
        let (tx, _rx) = mpsc::channel(64);
        let err = service.annotate(&mut table, 0, tx).await.unwrap_err();
        assert!(err.to_string().contains("descrip_block2_pos"));
    }

    #[test]
    fn test_pair_by_label_missing_label() {
        let requested = vec!["myself".to_string(), "other people".to_string()];
        let results = vec![LabelScore {
            label: "myself".to_string(),
            score: 0.9,
        }];
        let err = pair_by_label(&results, &requested).unwrap_err();
        assert!(err.to_string().contains("other people"));
    }

    #[test]
    fn test_pair_by_label_ignores_extra_label() {
        let requested = vec!["myself".to_string()];
        let results = vec![
            LabelScore {
                label: "myself".to_string(),
                score: 0.9,
            },
            LabelScore {
                label: "the weather".to_string(),
                score: 0.4,
            },
        ];
        let scores = pair_by_label(&results, &requested).unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores["myself"], 0.9);
    }

    #[test]
    fn test_pair_by_label_non_finite_score() {
        let requested = vec!["myself".to_string()];
        let results = vec![LabelScore {
            label: "myself".to_string(),
            score: f64::NAN,
        }];
        assert!(pair_by_label(&results, &requested).is_err());
    }
}
