use std::{
    fs,
    path::{Path, PathBuf},
};

use eyre::{Context, Result, bail, ensure};
use serde::{Deserialize, Serialize};

use crate::{
    chart::ChartConfig,
    parse::{ParseOptions, ParseStrategy, ShortRecordPolicy},
    plot::Plot,
};

pub const DEFAULT_INPUT: &str = "execution_times.txt";

pub fn default_categories() -> Vec<String> {
    ["Matrix", "Merge", "Primes"].map(str::to_owned).to_vec()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    pub name: String,
    pub input_path: PathBuf,
    pub output_dir: PathBuf,
    pub categories: Vec<String>,
    /// Tick labels shown instead of the category names
    pub display_labels: Option<Vec<String>>,
    pub bar_width: f64,
    pub strategy: ParseStrategy,
    pub skip_header: bool,
    pub short_records: ShortRecordPolicy,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub plots: Option<Vec<Box<dyn Plot>>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            name: "execution-times".to_owned(),
            input_path: PathBuf::from(DEFAULT_INPUT),
            output_dir: PathBuf::from("results"),
            categories: default_categories(),
            display_labels: None,
            bar_width: 0.2,
            strategy: ParseStrategy::default(),
            skip_header: true,
            short_records: ShortRecordPolicy::default(),
            title: "Execution Time Comparison".to_owned(),
            x_label: "Computation Type".to_owned(),
            y_label: "Execution Time (ms)".to_owned(),
            plots: None,
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yml::from_str(yaml).context("Parse config yaml")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let yaml = fs::read_to_string(path)
            .with_context(|| format!("Read config {}", path.display()))?;
        Self::from_yaml(&yaml).with_context(|| format!("Load config {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(!self.categories.is_empty(), "At least one category is required");
        if !(self.bar_width.is_finite() && self.bar_width > 0.0) {
            bail!("Bar width must be positive, got {}", self.bar_width);
        }
        if let Some(labels) = &self.display_labels {
            ensure!(
                labels.len() == self.categories.len(),
                "Got {} display labels for {} categories",
                labels.len(),
                self.categories.len()
            );
        }
        Ok(())
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            strategy: self.strategy,
            categories: self.categories.clone(),
            skip_header: self.skip_header,
            short_records: self.short_records,
        }
    }

    pub fn chart_config(&self) -> ChartConfig {
        ChartConfig {
            categories: self.categories.clone(),
            display_labels: self.display_labels.clone(),
            bar_width: self.bar_width,
            title: self.title.clone(),
            x_label: self.x_label.clone(),
            y_label: self.y_label.clone(),
        }
    }
}
