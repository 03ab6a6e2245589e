use std::path::PathBuf;

use common::plot::{Plot, PlotContext};
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The normalized execution times as CSV, one row per method
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct TimesTable {
    /// `<name>.csv` when unset
    pub filename: Option<String>,
}

#[typetag::serde]
impl Plot for TimesTable {
    fn name(&self) -> &'static str {
        "times-table"
    }

    fn plot(&self, ctx: &PlotContext<'_>) -> Result<Vec<PathBuf>> {
        let filepath = match &self.filename {
            Some(filename) => ctx.plot_path.join(filename),
            None => ctx.plot_path.join(format!("{}.csv", ctx.name)),
        };
        // Mismatches were already reported while laying out the chart
        let (times, _) = ctx.times.normalize(ctx.categories.len());

        let mut writer = csv::Writer::from_path(&filepath)
            .with_context(|| format!("Create {}", filepath.display()))?;
        writer.write_record(
            std::iter::once("method").chain(ctx.categories.iter().map(String::as_str)),
        )?;
        for (method, values) in times.iter() {
            writer.write_record(
                std::iter::once(method.to_owned()).chain(values.iter().map(i64::to_string)),
            )?;
        }
        writer.flush()?;

        debug!("Wrote {} rows to {}", times.len(), filepath.display());
        Ok(vec![filepath])
    }
}
