//! The check command: preflight for a batch run.

use std::path::Path;

use console::style;

use crate::classifier::HttpClassifier;
use crate::config::Config;

/// Print the resolved configuration and probe the classifier endpoint.
pub async fn cmd_check(
    config_path: Option<&Path>,
    endpoint: Option<String>,
    model: Option<String>,
) -> anyhow::Result<()> {
    let mut config = Config::load(config_path)?;
    if let Some(ep) = endpoint {
        config.classifier.endpoint = ep;
    }
    if let Some(m) = model {
        config.classifier.model = m;
    }

    println!("Task version:  {}", config.study.task_ver);
    println!("Blocks:        {}", config.study.n_blocks);
    println!("Valences:      {}", config.study.valences.join(", "));
    println!("Labels:        {}", config.study.labels.join(", "));
    println!("Input:         {}", config.study.input_path().display());
    println!("Output:        {}", config.study.output_path().display());
    println!("Endpoint:      {}", config.classifier.endpoint);
    println!("Model:         {}", config.classifier.model);

    let input_exists = config.study.input_path().exists();
    println!(
        "{} Input file {}",
        if input_exists {
            style("✓").green()
        } else {
            style("✗").red()
        },
        if input_exists { "found" } else { "not found" }
    );

    let classifier = HttpClassifier::new(config.classifier.clone())?;
    if classifier.is_available().await {
        println!("{} Classifier reachable", style("✓").green());
    } else {
        println!("{} Classifier not reachable", style("✗").red());
    }

    Ok(())
}
