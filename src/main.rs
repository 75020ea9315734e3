use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::debug;

use tablet_input::app::{handle_fatal_error, init_logging};
use tablet_input::config::{ConfigKeys, JobConfig, JobFile};
use tablet_input::InputFormat;

/// Encode and inspect tablet input job configurations
#[derive(Parser)]
#[command(name = "tablet-input")]
#[command(about = "Encode and inspect tablet input job configurations", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Prefix of the reserved configuration keys
    #[arg(long, global = true, default_value = ConfigKeys::DEFAULT_PREFIX)]
    prefix: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a YAML job file into a flat JSON job configuration
    Encode {
        /// Path to the YAML job file
        job: PathBuf,

        /// Write the configuration here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Decode a flat JSON job configuration and print its input settings
    Describe {
        /// Path to the JSON job configuration
        config: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        handle_fatal_error(e, cli.verbose);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let format = InputFormat::new(&cli.prefix);
    debug!(prefix = %cli.prefix, "Using configuration prefix");

    match &cli.command {
        Commands::Encode { job, output } => encode(&format, job, output.as_deref()),
        Commands::Describe { config } => describe(&format, config),
    }
}

fn encode(format: &InputFormat, job: &Path, output: Option<&Path>) -> Result<()> {
    let job = JobFile::load(job)?;
    let mut config = JobConfig::new();
    job.apply(format, &mut config)?;
    let json = config.to_json()?;

    match output {
        Some(path) => std::fs::write(path, json + "\n")
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => println!("{}", json),
    }
    Ok(())
}

fn describe(format: &InputFormat, path: &Path) -> Result<()> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config = JobConfig::from_json(&json)?;

    let table = format.table(&config)?;
    let authorizations: Vec<String> = format
        .authorizations(&config)?
        .labels()
        .map(str::to_string)
        .collect();
    let max_versions = match format.version_limit(&config)? {
        Some(n) => n.to_string(),
        None => "unset".to_string(),
    };
    let stack = format.iterator_stack(&config)?;

    println!("table: {}", table);
    println!("authorizations: [{}]", authorizations.join(", "));
    println!("max versions: {}", max_versions);
    println!("iterators: {}", stack.len());
    for setting in &stack {
        println!(
            "  [{}] {} ({})",
            setting.priority(),
            setting.name(),
            setting.class_name()
        );
        for (key, value) in setting.options() {
            println!("      {:?} = {:?}", key, value);
        }
    }
    Ok(())
}
