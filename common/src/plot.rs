use core::fmt::Debug;
use std::path::{Path, PathBuf};

use downcast_rs::{Downcast, impl_downcast};
use dyn_clone::{DynClone, clone_trait_object};
use eyre::{Context, Result};
use tracing::debug;

use crate::{
    chart::{ChartModel, build_chart},
    config::Config,
    times::ExecutionTimes,
    util::ensure_dirs,
};

/// Everything a [`Plot`] needs to produce its output
#[derive(Debug)]
pub struct PlotContext<'a> {
    /// Name of the experiment, from the config
    pub name: &'a str,
    /// Parsed times, not yet normalized
    pub times: &'a ExecutionTimes,
    pub categories: &'a [String],
    pub chart: &'a ChartModel,
    /// Directory the outputs are written to, ie. results/
    pub plot_path: &'a Path,
}

#[typetag::serde(tag = "type")]
pub trait Plot: Debug + DynClone + Downcast + Send + Sync {
    /// Name of the plot, for identification
    fn name(&self) -> &'static str;
    /// Writes the plot below [`PlotContext::plot_path`]
    ///
    /// Returns the files that were written.
    fn plot(&self, ctx: &PlotContext<'_>) -> Result<Vec<PathBuf>>;
}
clone_trait_object!(Plot);
impl_downcast!(Plot);

/// Lays out the chart once and hands it to every plot.
///
/// Nothing is written when `times` is empty.
pub fn plot(
    plots: &[Box<dyn Plot>],
    config: &Config,
    times: &ExecutionTimes,
    plot_path: &Path,
) -> Result<Vec<PathBuf>> {
    let Some(chart) = build_chart(times, &config.chart_config()) else {
        return Ok(Vec::new());
    };
    if plots.is_empty() {
        debug!("No plots");
        return Ok(Vec::new());
    }
    ensure_dirs(&[plot_path.to_owned()])?;

    let ctx = PlotContext {
        name: &config.name,
        times,
        categories: &config.categories,
        chart: &chart,
        plot_path,
    };

    let mut written = Vec::new();
    for plot in plots {
        debug!("Running plot {}", plot.name());
        let files = plot
            .plot(&ctx)
            .with_context(|| format!("Plot {}", plot.name()))?;
        written.extend(files);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{chart::EMPTY_DIAGNOSTIC, util::capture_logs};

    #[test]
    fn empty_times_are_reported_without_plots() {
        let dir = tempfile::tempdir().unwrap();
        let plot_path = dir.path().join("results");
        let (written, logs) = capture_logs(|| {
            plot(&[], &Config::default(), &ExecutionTimes::new(), &plot_path)
        });

        assert!(written.unwrap().is_empty());
        assert!(logs.contains(EMPTY_DIAGNOSTIC));
        assert!(!plot_path.exists());
    }
}
