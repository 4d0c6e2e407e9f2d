use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info, warn};

use listing_cleaner::app::ports::ListingInputPort;
use listing_cleaner::app::CleanListingsUseCase;
use listing_cleaner::config::CleanerConfig;
use listing_cleaner::domain::{FieldKind, MoneyKind};
use listing_cleaner::infra::{JsonFileInputAdapter, JsonLinesOutputAdapter};
use listing_cleaner::logging;
use listing_cleaner::observability;
use listing_cleaner::pipeline::processing::dedup::KeepPolicy;
use listing_cleaner::pipeline::processing::normalize::MoneyNormalizer;
use listing_cleaner::pipeline::processing::quality_gate::noise::FieldValidator;

#[derive(Parser)]
#[command(name = "listing_cleaner")]
#[command(about = "Normalize, filter and deduplicate scraped business-for-sale listings")]
#[command(version = "0.1.0")]
struct Cli {
    /// TOML configuration file (defaults to $LISTING_CLEANER_CONFIG, then built-ins)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Clean a batch of scraped listings
    Clean {
        /// JSON array or JSON-lines file of raw listings
        #[arg(long)]
        input: PathBuf,
        /// JSON-lines output file (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Which duplicate survives: first or last
        #[arg(long)]
        keep: Option<KeepPolicy>,
        /// Write the coverage report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
        /// Print Prometheus metrics after the run
        #[arg(long)]
        print_metrics: bool,
    },
    /// Parse one money string: price, revenue or profit
    Normalize { kind: MoneyKind, raw: String },
    /// Check whether a field value is extraction noise
    Noise { field_kind: FieldKind, value: String },
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let _guard = logging::init_logging();

    let cli = Cli::parse();
    let config = CleanerConfig::resolve(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Clean {
            input,
            output,
            keep,
            report,
            print_metrics,
        } => {
            if print_metrics {
                if let Err(e) = observability::init() {
                    warn!("Metrics disabled: {}", e);
                }
            }

            let mut use_case = CleanListingsUseCase::from_config(&config)?;
            if let Some(keep) = keep {
                use_case = use_case.with_keep(keep);
            }

            let records = JsonFileInputAdapter::new(&input).read_listings()?;
            let mut sink = match &output {
                Some(path) => JsonLinesOutputAdapter::to_file(path)?,
                None => JsonLinesOutputAdapter::to_stdout(),
            };

            let outcome = match use_case.execute(records, &mut sink) {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("Cleaning run failed: {:#}", e);
                    return Err(e);
                }
            };

            if let Some(path) = report {
                let json = serde_json::to_string_pretty(&outcome.report)?;
                std::fs::write(&path, json)
                    .with_context(|| format!("Failed to write report {}", path.display()))?;
                info!("Coverage report written to {}", path.display());
            }

            if print_metrics {
                if let Some(text) = observability::render() {
                    if output.is_some() {
                        println!("{}", text);
                    } else {
                        eprintln!("{}", text);
                    }
                }
            }
        }
        Commands::Normalize { kind, raw } => {
            let normalizer = MoneyNormalizer::new(config.ranges, &config.patterns)?;
            let value = normalizer.normalize(&raw, kind);
            println!("{}", serde_json::to_string(&value)?);
        }
        Commands::Noise { field_kind, value } => {
            let validator = FieldValidator::new(&config.noise)?;
            println!("{}", validator.is_noise(field_kind, &value));
        }
    }

    Ok(())
}
