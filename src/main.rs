use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mention_composer::config::MentionConfig;
use mention_composer::mentions::Candidate;
use mention_composer::replay::{demo_directory, parse_script, replay};

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    env!("MENTION_COMPOSER_VERSION_SUFFIX")
);

#[derive(Parser)]
#[command(name = "mention-composer")]
#[command(author, version = VERSION, about = "Mention autocomplete engine for chat composers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a key script against an empty composer and print the result
    Replay {
        /// Key script, e.g. "hi @al<enter>"
        script: Option<String>,

        /// Read the key script from a file instead
        #[arg(short, long, conflicts_with = "script")]
        file: Option<PathBuf>,

        /// JSON file with the candidate directory (default: built-in demo list)
        #[arg(long)]
        candidates: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show the config file location and the effective configuration
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn load_config(path: Option<&Path>) -> Result<(PathBuf, MentionConfig)> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => MentionConfig::config_path()?,
    };
    let config = MentionConfig::load_from(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    Ok((path, config))
}

fn load_candidates(path: &Path) -> Result<Vec<Candidate>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read candidates from {}", path.display()))?;
    let candidates: Vec<Candidate> = serde_json::from_str(&content)
        .with_context(|| format!("Invalid candidates file {}", path.display()))?;
    Ok(candidates)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "mention_composer=debug"
    } else {
        "mention_composer=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Replay {
            script,
            file,
            candidates,
            format,
        } => {
            let (_, config) = load_config(cli.config.as_deref())?;
            let script = match (script, file) {
                (Some(script), _) => script,
                (None, Some(file)) => {
                    let content = std::fs::read_to_string(&file)
                        .with_context(|| format!("Failed to read script {}", file.display()))?;
                    // Only the file's own final newline is dropped
                    match content.strip_suffix('\n') {
                        Some(script) => script.to_string(),
                        None => content,
                    }
                }
                (None, None) => anyhow::bail!("Provide a key script or --file"),
            };
            let directory = match candidates {
                Some(path) => load_candidates(&path)?,
                None => demo_directory(),
            };

            let steps = parse_script(&script)?;
            tracing::info!(steps = steps.len(), candidates = directory.len(), "Replaying script");
            let max_visible = config.dropdown.max_visible;
            let report = replay(&steps, directory, config)?;

            match format {
                OutputFormat::Text => print!("{}", report.to_text(max_visible)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            }
        }
        Commands::Config => {
            let (path, config) = load_config(cli.config.as_deref())?;
            println!("# {}", path.display());
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}
