//! The annotate command: the full batch classification run.

use std::path::{Path, PathBuf};

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;

use crate::classifier::HttpClassifier;
use crate::config::Config;
use crate::services::{AnnotationEvent, AnnotationService};
use crate::table::Table;

/// Annotate a task version's free-text descriptions with classifier scores.
#[allow(clippy::too_many_arguments)]
pub async fn cmd_annotate(
    config_path: Option<&Path>,
    task_ver: Option<String>,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    endpoint: Option<String>,
    model: Option<String>,
    limit: usize,
) -> anyhow::Result<()> {
    let mut config = Config::load(config_path)?;
    if let Some(tv) = task_ver {
        config.study.task_ver = tv;
    }
    if let Some(ep) = endpoint {
        config.classifier.endpoint = ep;
    }
    if let Some(m) = model {
        config.classifier.model = m;
    }

    let input_path = input.unwrap_or_else(|| config.study.input_path());
    let output_path = output.unwrap_or_else(|| config.study.output_path());

    let classifier = HttpClassifier::new(config.classifier.clone())?;
    if !classifier.is_available().await {
        println!(
            "{} Classifier not available at {}",
            style("✗").red(),
            config.classifier.endpoint
        );
        println!("  Check the endpoint, model name, and API token");
        anyhow::bail!("classifier unavailable");
    }
    println!(
        "{} Connected to classifier at {} (model: {})",
        style("✓").green(),
        config.classifier.endpoint,
        config.classifier.model
    );

    let mut table = Table::from_path(&input_path)?;
    println!(
        "{} Loaded {} rows from {}",
        style("→").cyan(),
        table.len(),
        input_path.display()
    );

    let service = AnnotationService::new(classifier, config.study.clone());

    // Event channel for progress tracking
    let (event_tx, mut event_rx) = mpsc::channel::<AnnotationEvent>(100);

    // Spawn event handler for UI
    let event_handler = tokio::spawn(async move {
        let mut pb: Option<ProgressBar> = None;
        while let Some(event) = event_rx.recv().await {
            match event {
                AnnotationEvent::Started { total_cells } => {
                    let progress = ProgressBar::new(total_cells as u64);
                    progress.set_style(
                        ProgressStyle::default_bar()
                            .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {wide_msg}")
                            .unwrap()
                            .progress_chars("█▓░"),
                    );
                    progress.set_message("Classifying...");
                    pb = Some(progress);
                }
                AnnotationEvent::CellCompleted { row, column } => {
                    if let Some(ref progress) = pb {
                        progress.set_message(format!("row {row} {column}"));
                        progress.inc(1);
                    }
                }
                AnnotationEvent::Complete { .. } => {
                    if let Some(progress) = pb.take() {
                        progress.finish_and_clear();
                    }
                }
            }
        }
    });

    let result = service.annotate(&mut table, limit, event_tx).await;
    let _ = event_handler.await;
    let result = result?;

    table.write_with_index(&output_path)?;

    println!(
        "{} Classified {} cells, added {} score columns",
        style("✓").green(),
        result.cells,
        result.columns
    );
    println!(
        "  {} Wrote {} rows to {}",
        style("→").dim(),
        table.len(),
        output_path.display()
    );

    Ok(())
}
