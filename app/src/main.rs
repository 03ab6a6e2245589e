use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use common::{config::Config, parse, plot::plot};
use eyre::{Result, bail};
use tracing::{debug, error};
use tracing_subscriber::{
    EnvFilter,
    fmt::{layer, time::ChronoLocal},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const DEFAULT_CONFIG: &str = "config.yaml";
/// Crates that log under their own target
const MODULES: &[&str] = &["common", "grouped_bar", "times_table"];

#[derive(Parser)]
#[command(version, about = "Compare execution times as grouped bar charts")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    #[arg(short, long)]
    log: Vec<String>,
}

#[derive(Args)]
struct Source {
    #[arg(short, long, default_value = DEFAULT_CONFIG)]
    config_file: PathBuf,
    /// Execution times log, overrides `input_path` from the config
    #[arg(short, long)]
    input: Option<PathBuf>,
}

impl Default for Source {
    fn default() -> Self {
        Self {
            config_file: PathBuf::from(DEFAULT_CONFIG),
            input: None,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Parse the execution times and generate the configured plots (default)
    Plot {
        #[command(flatten)]
        source: Source,
        /// Plot directory, overrides `output_dir` from the config
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
    /// Print the parsed execution times as JSON
    Print {
        #[command(flatten)]
        source: Source,
    },
}

fn main() -> Result<()> {
    let log_level = std::env::var("RUST_LOG").unwrap_or("warn".to_owned());
    let args = Cli::parse();
    let file_appender = tracing_appender::rolling::never(".", "log.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let mut env_filter = EnvFilter::new(format!("exec_times={log_level}"));

    if !args.log.is_empty() {
        for log in &args.log {
            env_filter = env_filter.add_directive(log.parse()?);
        }
    }

    for module in MODULES {
        if !args.log.iter().any(|x| x.starts_with(module)) {
            env_filter = env_filter.add_directive(format!("{module}={log_level}").parse()?);
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            layer()
                .with_timer(ChronoLocal::new("%v %k:%M:%S %z".to_owned()))
                .compact(),
        )
        .with(layer().with_writer(non_blocking))
        .init();

    default_plots::init_plots();

    let command = args.command.unwrap_or(Commands::Plot {
        source: Source::default(),
        output_dir: None,
    });
    let result = match command {
        Commands::Plot { source, output_dir } => plot_times(&source, output_dir),
        Commands::Print { source } => print_times(&source),
    };
    if let Err(err) = &result {
        error!("{err:#?}");
    }
    result
}

/// A missing `config.yaml` falls back to the built-in defaults, any other missing file is an error
fn load_config(source: &Source) -> Result<Config> {
    let mut config = if source.config_file.exists() {
        Config::load(&source.config_file)?
    } else if source.config_file == Path::new(DEFAULT_CONFIG) {
        debug!("No {DEFAULT_CONFIG}, using defaults");
        Config::default()
    } else {
        bail!("Config file not found: {}", source.config_file.display());
    };

    if let Some(input) = &source.input {
        config.input_path = input.clone();
    }
    Ok(config)
}

fn plot_times(source: &Source, output_dir: Option<PathBuf>) -> Result<()> {
    let mut config = load_config(source)?;
    if let Some(output_dir) = output_dir {
        config.output_dir = output_dir;
    }

    let times = parse(&config.input_path, &config.parse_options())?;
    let plots = config
        .plots
        .clone()
        .unwrap_or_else(default_plots::default_plots);
    for file in plot(&plots, &config, &times, &config.output_dir)? {
        println!("{}", file.display());
    }
    Ok(())
}

fn print_times(source: &Source) -> Result<()> {
    let config = load_config(source)?;
    let times = parse(&config.input_path, &config.parse_options())?;
    println!("{}", serde_json::to_string_pretty(&times)?);
    Ok(())
}
