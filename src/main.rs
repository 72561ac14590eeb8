//! linkrank CLI
//!
//! Ranks a directory of HTML pages with both PageRank estimators.
//!
//! ```bash
//! linkrank corpus0
//! linkrank corpus0 --samples 100000 --seed 7 --format json
//! RUST_LOG=linkrank=debug linkrank corpus0 --parallel --chains 4
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use linkrank::{corpus, NonConvergence, RankConfig, RankReport};

#[derive(Parser)]
#[command(name = "linkrank")]
#[command(about = "PageRank for a directory of HTML pages", long_about = None)]
struct Cli {
    /// Directory containing the corpus (*.html files)
    corpus: PathBuf,

    /// JSON config file; flags below override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Damping factor, in (0, 1)
    #[arg(long)]
    damping: Option<f64>,

    /// Number of samples for the sampling estimator
    #[arg(long)]
    samples: Option<usize>,

    /// Per-page convergence tolerance for the iterative solver
    #[arg(long)]
    tolerance: Option<f64>,

    /// Iteration ceiling for the iterative solver
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Seed for reproducible sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Independent sampling chains, merged by visit count
    #[arg(long)]
    chains: Option<usize>,

    /// Run solver sweeps on all cores
    #[arg(long)]
    parallel: bool,

    /// Report the last vector instead of failing when the solver does not converge
    #[arg(long)]
    best_effort: bool,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

impl Cli {
    fn config(&self) -> Result<RankConfig> {
        let mut config = match &self.config {
            Some(path) => RankConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => RankConfig::default(),
        };

        if let Some(damping) = self.damping {
            config.damping = damping;
        }
        if let Some(samples) = self.samples {
            config.sample_count = samples;
        }
        if let Some(tolerance) = self.tolerance {
            config.tolerance = tolerance;
        }
        if let Some(max_iterations) = self.max_iterations {
            config.max_iterations = max_iterations;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(chains) = self.chains {
            config.chains = chains;
        }
        if self.parallel {
            config.parallel = true;
        }
        if self.best_effort {
            config.non_convergence = NonConvergence::BestEffort;
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.config()?;

    let graph = corpus::crawl(&cli.corpus)
        .with_context(|| format!("Failed to read corpus {}", cli.corpus.display()))?;
    let report = RankReport::compute(&graph, &config).context("Ranking failed")?;

    match cli.format {
        OutputFormat::Text => print!("{report}"),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }

    Ok(())
}
