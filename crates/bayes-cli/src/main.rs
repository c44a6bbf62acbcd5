use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};

use bayes_cli::config::{ClassifierConfig, LoggingConfig, TokenizerConfig};
use bayes_cli::corpus::{classify_file, sort_folder, train_from_config};
use bayes_cli::logging::init_logging;
use bayes_cli::query::{Assignment, evaluate, parse_assignment};
use bayes_cli::report::FileReport;
use bayes_core::belief::{OddsConfig, PosteriorSnapshot};

/// Bayesian classification over folders of text documents.
#[derive(Debug, Parser)]
#[command(name = "bayes", author, version, about = "Naive Bayes document classifier")]
struct Cli {
    /// Override the tracing level (trace, debug, info, warn, error).
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Train from the configured class folders and classify each file.
    ClassifyFile {
        /// Path to the YAML configuration file.
        #[arg(short, long, value_name = "FILE", default_value = "bayes.yaml")]
        config: PathBuf,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Exit after validating the configuration (nothing is classified).
        #[arg(long)]
        validate_only: bool,

        #[arg(value_name = "FILE")]
        files: Vec<PathBuf>,
    },
    /// Move every file in FOLDER into the subfolder whose documents it most resembles.
    SortFolder {
        folder: PathBuf,

        /// Report placements without moving anything.
        #[arg(long)]
        dry_run: bool,

        /// Lowercase words before counting.
        #[arg(long)]
        lowercase: bool,
    },
    /// Update a prior with likelihoods and print the posterior.
    Query {
        /// Prior weight for one class, as LABEL=WEIGHT. Order sets the class order.
        #[arg(long = "prior", value_name = "LABEL=WEIGHT", required = true, value_parser = parse_assignment)]
        priors: Vec<Assignment>,

        /// Likelihood for one class, as LABEL=VALUE.
        #[arg(long = "likelihood", value_name = "LABEL=VALUE", value_parser = parse_assignment)]
        likelihoods: Vec<Assignment>,

        /// Print the posterior as JSON instead of the one-line summary.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::ClassifyFile {
            config,
            format,
            validate_only,
            files,
        } => {
            let mut config = ClassifierConfig::from_path(&config)?;
            if let Some(level) = cli.log_level {
                config.logging.tracing_level = level;
            }
            let logging_guard = init_logging(&config.logging)?;
            if let Some(guard) = logging_guard.as_ref() {
                eprintln!("Structured log: {}", guard.log_path.display());
            }

            if validate_only {
                println!(
                    "Configuration valid: {} class{}.",
                    config.classes.len(),
                    if config.classes.len() == 1 { "" } else { "es" }
                );
                return Ok(());
            }

            let classifier = train_from_config(&config).context("training classifier")?;
            for file in &files {
                let posterior = classify_file(file, &classifier, &config.tokenizer)
                    .with_context(|| format!("classifying {}", file.display()))?;
                let report = FileReport::new(file, &posterior, config.cutoff);
                match format {
                    OutputFormat::Text => println!("{}", report.to_text()),
                    OutputFormat::Json => println!("{}", report.to_json()?),
                }
            }
        }
        Command::SortFolder {
            folder,
            dry_run,
            lowercase,
        } => {
            let _logging_guard = init_logging(&cli_logging(cli.log_level))?;
            let tokenizer = TokenizerConfig {
                lowercase,
                ..TokenizerConfig::default()
            };
            let placements = sort_folder(&folder, &tokenizer, &OddsConfig::from_env(), dry_run)
                .with_context(|| format!("sorting {}", folder.display()))?;
            for placement in &placements {
                let verb = match (placement.moved, dry_run) {
                    (true, _) => "moved",
                    (false, true) => "would move",
                    (false, false) => "kept",
                };
                println!(
                    "{verb} {} -> {}",
                    placement.file.display(),
                    placement.destination.display()
                );
            }
        }
        Command::Query {
            priors,
            likelihoods,
            json,
        } => {
            let _logging_guard = init_logging(&cli_logging(cli.log_level))?;
            let posterior = evaluate(&priors, &likelihoods)?;
            if json {
                println!("{}", PosteriorSnapshot::to_json(&posterior)?);
            } else {
                println!("{posterior}");
            }
        }
    }

    Ok(())
}

fn cli_logging(level: Option<String>) -> LoggingConfig {
    let mut logging = LoggingConfig::default();
    if let Some(level) = level {
        logging.tracing_level = level;
    }
    logging
}
