use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use infothermo::output::{format_summary, write_run_outputs};
use infothermo::{Dataset, ExperimentConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Simulate the information-thermodynamics aging model and validate its predictions"
)]
struct Cli {
    /// JSON experiment configuration; missing fields use defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Root directory for timestamped run directories
    #[arg(long, default_value = "output-infothermo")]
    outdir: PathBuf,

    /// Seed of the synthetic noise stream
    #[arg(long)]
    seed: Option<u64>,

    /// Noise level as a fraction of each signal's standard deviation
    #[arg(long)]
    noise_level: Option<f64>,

    /// Maximum Granger lag
    #[arg(long)]
    max_lag: Option<usize>,

    /// Generate the baseline scenario only
    #[arg(long)]
    no_intervention: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    json: bool,

    /// Validate an existing CSV dataset instead of generating one
    #[arg(long)]
    data: Option<PathBuf>,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json);

    let mut config = match &cli.config {
        Some(path) => ExperimentConfig::load(path)
            .with_context(|| format!("failed to load config: {}", path.display()))?,
        None => ExperimentConfig::default(),
    };
    if let Some(v) = cli.seed {
        config.synthesis.seed = v;
    }
    if let Some(v) = cli.noise_level {
        config.synthesis.noise_level = v;
    }
    if let Some(v) = cli.max_lag {
        config.validation.max_lag = v;
    }
    if cli.no_intervention {
        config.synthesis.include_intervention = false;
    }
    config.validate().context("invalid configuration")?;

    let dataset = match &cli.data {
        Some(path) => {
            info!(path = %path.display(), "loading dataset");
            Dataset::load(path)
                .with_context(|| format!("failed to load dataset: {}", path.display()))?
        }
        None => config
            .build_synthesizer()?
            .generate_dataset(config.synthesis.include_intervention)
            .context("failed to generate synthetic dataset")?,
    };

    let report = config
        .build_suite()?
        .run_full_validation(&dataset)
        .context("validation failed")?;
    let outputs = write_run_outputs(&cli.outdir, &dataset, &report)
        .with_context(|| format!("failed to write outputs under {}", cli.outdir.display()))?;

    println!(
        "Validation complete. Records: {} | Scenarios: {}",
        dataset.len(),
        dataset
            .scenarios()
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("Run directory: {}", outputs.output_dir.display());
    println!("Data: {}", outputs.data_path.display());
    println!("Report: {}", outputs.report_path.display());
    println!();
    print!("{}", format_summary(&report));

    Ok(())
}
