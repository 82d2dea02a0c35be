//! Configuration for a survclass run.
//!
//! The study parameters default to the causal-attribution task the tool
//! was written for; a `survclass.toml` next to the data can override any
//! of them, and a handful of CLI flags override the file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::classifier::ClassifierConfig;

/// Study design parameters: which columns exist and what to score them
/// against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyConfig {
    /// Task version string; names the input and output files
    #[serde(default = "default_task_ver")]
    pub task_ver: String,
    /// Number of scenario blocks per participant
    #[serde(default = "default_n_blocks")]
    pub n_blocks: usize,
    /// Valence suffixes of the free-text columns
    #[serde(default = "default_valences")]
    pub valences: Vec<String>,
    /// Candidate labels submitted with every text
    #[serde(default = "default_labels")]
    pub labels: Vec<String>,
    /// Directory holding the input and output files
    #[serde(default = "default_analysis_dir")]
    pub analysis_dir: PathBuf,
}

fn default_task_ver() -> String {
    "causal-attr-pe2-3".to_string()
}

fn default_n_blocks() -> usize {
    3
}

fn default_valences() -> Vec<String> {
    vec!["neg".to_string(), "pos".to_string()]
}

fn default_labels() -> Vec<String> {
    vec![
        "myself".to_string(),
        "other people".to_string(),
        "in general".to_string(),
        "specific situations".to_string(),
    ]
}

fn default_analysis_dir() -> PathBuf {
    PathBuf::from("analysis")
}

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            task_ver: default_task_ver(),
            n_blocks: default_n_blocks(),
            valences: default_valences(),
            labels: default_labels(),
            analysis_dir: default_analysis_dir(),
        }
    }
}

impl StudyConfig {
    /// Path of the free-text descriptions CSV for this task version.
    pub fn input_path(&self) -> PathBuf {
        self.analysis_dir
            .join(format!("{}-free-text-descriptions.csv", self.task_ver))
    }

    /// Path the annotated CSV is written to.
    pub fn output_path(&self) -> PathBuf {
        self.analysis_dir.join(format!(
            "{}-free-text-descriptions-classified4-nme.csv",
            self.task_ver
        ))
    }

    /// Name of the free-text column for a block (0-based) and valence.
    pub fn text_column(&self, block: usize, valence: &str) -> String {
        format!("descrip_block{}_{}", block + 1, valence)
    }

    /// Name of the score column for a block (0-based), valence, and label.
    pub fn score_column(&self, block: usize, valence: &str, label: &str) -> String {
        format!(
            "scenario{}_{}_classifier1_{}_score",
            block + 1,
            valence,
            label
        )
    }

    /// Number of classifier calls a full run makes over a table of `rows`.
    pub fn cells_per_run(&self, rows: usize) -> usize {
        rows * self.n_blocks * self.valences.len()
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub study: StudyConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

impl Config {
    /// Load configuration from a TOML file, or defaults if `path` is None
    /// and no `survclass.toml` exists in the working directory.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let resolved = match path {
            Some(p) => Some(p.to_path_buf()),
            None => {
                let candidate = PathBuf::from("survclass.toml");
                candidate.exists().then_some(candidate)
            }
        };

        let mut config = match resolved {
            Some(p) => {
                let raw = fs::read_to_string(&p)
                    .map_err(|e| anyhow::anyhow!("reading {}: {e}", p.display()))?;
                toml::from_str(&raw)
                    .map_err(|e| anyhow::anyhow!("parsing {}: {e}", p.display()))?
            }
            None => Self::default(),
        };

        config.classifier = config.classifier.with_env_api_key();
        Ok(config)
    }
}
