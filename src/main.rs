use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use gedchart::chart::build_chart;
use gedchart::config::ChartConfig;
use gedchart::gedcom;

/// Convert a GEDCOM file into a text-based descendant chart.
///
/// The chart is written to stdout; diagnostics go to stderr.
#[derive(Parser)]
#[command(name = "gedchart", version, about, long_about = None)]
struct Cli {
    /// GEDCOM file to read
    gedfile: Option<PathBuf>,

    /// Root family or individual (Fxxx or Ixxx); prunes away unrelated people
    #[arg(short, long, value_name = "ID")]
    root: Option<String>,

    /// Show children in every related family if root is set
    #[arg(short, long)]
    children: bool,

    /// Show only blood relatives of root
    #[arg(short, long)]
    blood: bool,

    /// Print middle names in full instead of as initials
    #[arg(long)]
    no_initials: bool,

    /// Do not close family blocks with a separator line
    #[arg(long)]
    no_separator: bool,

    /// JSON file with default chart options
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Layer the command-line flags over a loaded configuration.
    fn apply(&self, mut config: ChartConfig) -> ChartConfig {
        if self.root.is_some() {
            config.root.clone_from(&self.root);
        }
        config.children |= self.children;
        config.blood |= self.blood;
        if self.no_initials {
            config.initials = false;
        }
        if self.no_separator {
            config.family_separator = false;
        }
        config
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    // 1. Options: config file, then flags. Usage errors stop here.
    let base = match &cli.config {
        Some(path) => ChartConfig::load(path)?,
        None => ChartConfig::default(),
    };
    let config = cli.apply(base);
    config.validate()?;

    let gedfile = cli
        .gedfile
        .as_deref()
        .context("Please specify the name of a GEDCOM file.")?;

    // 2. Read records
    let events = gedcom::read_file(gedfile)?;
    tracing::info!("Read {} record events from {}", events.len(), gedfile.display());

    // 3. Select and render; a missing root aborts before any output.
    let lines = build_chart(events, &config)?;

    // 4. Write
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for line in &lines {
        writeln!(out, "{line}")?;
    }
    out.flush()?;

    Ok(())
}
