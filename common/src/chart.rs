//! Layout of a grouped bar chart, kept apart from any drawing backend.
//!
//! Category `j` owns the slot at `x = j`. Within a slot the bar of method `i`
//! sits at `j + i * bar_width`, and the tick label is placed one bar width into the slot.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{config::default_categories, times::ExecutionTimes};

pub const EMPTY_DIAGNOSTIC: &str = "No valid execution times found. Check file format.";

/// Headroom above the tallest bar
const Y_HEADROOM: f64 = 1.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    pub categories: Vec<String>,
    pub display_labels: Option<Vec<String>>,
    pub bar_width: f64,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            display_labels: None,
            bar_width: 0.2,
            title: "Execution Time Comparison".to_owned(),
            x_label: "Computation Type".to_owned(),
            y_label: "Execution Time (ms)".to_owned(),
        }
    }
}

impl ChartConfig {
    pub fn tick_labels(&self) -> &[String] {
        self.display_labels
            .as_deref()
            .unwrap_or(self.categories.as_slice())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bar {
    /// Centre of the bar
    pub x: f64,
    pub width: f64,
    pub height: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tick {
    pub x: f64,
    pub label: String,
}

/// Bars of one method, one per category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub label: String,
    pub bars: Vec<Bar>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartModel {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub ticks: Vec<Tick>,
    pub series: Vec<Series>,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
}

/// Lays out `data` as a grouped bar chart.
///
/// Returns [`None`] when there is nothing to draw. Methods whose value count
/// differs from the category count are padded with zeros (or truncated) and
/// a warning is logged for each.
pub fn build_chart(data: &ExecutionTimes, config: &ChartConfig) -> Option<ChartModel> {
    if data.is_empty() {
        warn!("{EMPTY_DIAGNOSTIC}");
        return None;
    }

    let num_categories = config.categories.len();
    let (data, mismatches) = data.normalize(num_categories);
    for mismatch in &mismatches {
        warn!("{mismatch}");
    }

    let width = config.bar_width;
    let num_methods = data.len();

    let series = data
        .iter()
        .enumerate()
        .map(|(i, (method, values))| {
            let bars: Vec<Bar> = values
                .iter()
                .enumerate()
                .map(|(j, &height)| Bar {
                    x: j as f64 + i as f64 * width,
                    width,
                    height,
                })
                .collect();
            debug!(
                "Method: {method} x={:?} times={values:?}",
                bars.iter().map(|b| b.x).collect::<Vec<_>>()
            );
            Series {
                label: method.to_owned(),
                bars,
            }
        })
        .collect::<Vec<_>>();

    let ticks = config
        .tick_labels()
        .iter()
        .enumerate()
        .map(|(j, label)| Tick {
            x: j as f64 + width,
            label: label.clone(),
        })
        .collect();

    let (lowest, highest) = data
        .iter()
        .flat_map(|(_, values)| values.iter().copied())
        .fold((0, 0), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let y_range = (
        lowest as f64 * Y_HEADROOM,
        (highest as f64 * Y_HEADROOM).max(1.0),
    );
    // Ticks sit one bar width in, so keep room for them with a single method
    let x_range = (
        -width,
        num_categories.saturating_sub(1) as f64 + num_methods.max(2) as f64 * width,
    );

    Some(ChartModel {
        title: config.title.clone(),
        x_label: config.x_label.clone(),
        y_label: config.y_label.clone(),
        ticks,
        series,
        x_range,
        y_range,
    })
}
