use std::fs::File;
use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use regmatrix::{Granularity, RunConfig};

/// Build a feature matrix from registry files
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Tab-separated (or .json) run configuration
    #[arg(short, long)]
    config: PathBuf,

    /// Write the log to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// One row per individual and follow-up year, overriding ByYear
    #[arg(long)]
    by_year: bool,

    /// Emit onset-age companion columns, overriding OutputAge
    #[arg(long)]
    output_age: bool,
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("cannot create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_ref())?;

    let mut config = RunConfig::from_file(&cli.config)
        .with_context(|| format!("invalid configuration {}", cli.config.display()))?;
    if cli.by_year {
        config = config.with_granularity(Granularity::Yearly);
    }
    if cli.output_age {
        config = config.with_output_age(true);
    }

    let today = chrono::Local::now().date_naive();
    let show_progress = cli.log_file.is_none() && std::io::stderr().is_terminal();
    let summary = regmatrix::run(&config, today, show_progress).context("feature extraction failed")?;
    log::info!(
        "Finished: {} rows, {} columns, {} registries read",
        summary.rows,
        summary.columns,
        summary.extractors
    );
    Ok(())
}
