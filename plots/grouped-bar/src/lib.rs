use std::{
    fs,
    path::{Path, PathBuf},
};

use common::{
    chart::ChartModel,
    plot::{Plot, PlotContext},
    util::{file_name, write_plot_data},
};
use eyre::{ContextCompat, Result, bail};
use plotters::{
    coord::Shift,
    prelude::*,
    style::text_anchor::{HPos, Pos, VPos},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

const FONT: &str = "sans-serif";

/// Grouped bar chart of the execution times, one bar per method in every category
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct GroupedBar {
    /// Output file below the plot directory, `<name>.svg` when unset.
    /// The extension selects the backend.
    pub filename: Option<String>,
    pub width: u32,
    pub height: u32,
}

impl Default for GroupedBar {
    fn default() -> Self {
        Self {
            filename: None,
            width: 1024,
            height: 768,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartFormat {
    Svg,
    Png,
}

impl ChartFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .with_context(|| format!("No chart format in {path:?}"))?;
        match ext.to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            other => bail!("Unsupported chart format {other}"),
        }
    }
}

#[typetag::serde]
impl Plot for GroupedBar {
    fn name(&self) -> &'static str {
        "grouped-bar"
    }

    fn plot(&self, ctx: &PlotContext<'_>) -> Result<Vec<PathBuf>> {
        let filepath = match &self.filename {
            Some(filename) => ctx.plot_path.join(filename),
            None => ctx.plot_path.join(format!("{}.svg", ctx.name)),
        };
        let format = ChartFormat::from_path(&filepath)?;
        if let Some(parent) = filepath.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }

        let data_path = write_plot_data(ctx.plot_path, file_name(&filepath)?, ctx.chart)?;

        let size = (self.width, self.height);
        match format {
            ChartFormat::Svg => draw(SVGBackend::new(&filepath, size).into_drawing_area(), ctx.chart)?,
            ChartFormat::Png => {
                draw(BitMapBackend::new(&filepath, size).into_drawing_area(), ctx.chart)?
            }
        }
        debug!("Wrote {}", filepath.display());
        Ok(vec![filepath, data_path])
    }
}

/// Draws `chart` onto `root` and flushes the backend
pub fn draw<DB: DrawingBackend>(root: DrawingArea<DB, Shift>, chart: &ChartModel) -> Result<()>
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;

    let (x_min, x_max) = chart.x_range;
    let (y_min, y_max) = chart.y_range;
    let mut ctx = ChartBuilder::on(&root)
        .caption(&chart.title, (FONT, 28).into_font())
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)?;

    ctx.configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|_| String::new())
        .y_label_formatter(&|y| format!("{y:.0}"))
        .x_desc(&chart.x_label)
        .y_desc(&chart.y_label)
        .axis_desc_style((FONT, 18).into_font())
        .draw()?;

    for (idx, series) in chart.series.iter().enumerate() {
        let color = Palette99::pick(idx).mix(0.9);
        ctx.draw_series(series.bars.iter().map(|bar| {
            let half = bar.width / 2.0;
            Rectangle::new(
                [(bar.x - half, 0.0), (bar.x + half, bar.height as f64)],
                color.filled(),
            )
        }))?
        .label(&series.label)
        .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    // Category labels sit under arbitrary x positions, so they are drawn by hand
    let tick_style = TextStyle::from((FONT, 16).into_font()).pos(Pos::new(HPos::Center, VPos::Top));
    for tick in &chart.ticks {
        let (x, y) = ctx.backend_coord(&(tick.x, y_min));
        root.draw(&Text::new(tick.label.as_str(), (x, y + 8), tick_style.clone()))?;
    }

    ctx.configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{
        chart::{ChartConfig, build_chart},
        times::ExecutionTimes,
    };

    #[test]
    fn format_follows_extension() {
        assert_eq!(ChartFormat::from_path(Path::new("a/b.svg")).unwrap(), ChartFormat::Svg);
        assert_eq!(ChartFormat::from_path(Path::new("b.PNG")).unwrap(), ChartFormat::Png);
        assert!(ChartFormat::from_path(Path::new("b.gif")).is_err());
        assert!(ChartFormat::from_path(Path::new("chart")).is_err());
    }

    #[test]
    fn unsupported_format_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let times: ExecutionTimes = [("Threads".to_owned(), vec![40, 90, 31])]
            .into_iter()
            .collect();
        let chart = build_chart(&times, &ChartConfig::default()).unwrap();
        let categories = ChartConfig::default().categories;
        let ctx = PlotContext {
            name: "execution-times",
            times: &times,
            categories: &categories,
            chart: &chart,
            plot_path: dir.path(),
        };

        let plot = GroupedBar {
            filename: Some("chart.gif".to_owned()),
            ..Default::default()
        };
        let err = plot.plot(&ctx).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported chart format gif");
        assert!(!dir.path().join("plot_data").exists());
    }

    #[test]
    fn settings_from_json() {
        let plot: GroupedBar = serde_json::from_str(r#"{"filename": "times.png"}"#).unwrap();
        assert_eq!(plot.filename.as_deref(), Some("times.png"));
        assert_eq!((plot.width, plot.height), (1024, 768));
    }
}
