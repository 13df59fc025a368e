use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use nc_clipping::{handle_command, init_logging, ClippingArgs, ClippingManager};
use nc_core::Settings;
use nc_dedup::GroupingStrategy;
use nc_rules::RuleSet;
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[command(author, version, about = "Daily news clipping for the fund industry", long_about = None)]
pub struct Cli {
    /// Settings file (JSON); missing keys keep their defaults
    #[arg(long, env = "NC_SETTINGS")]
    settings: Option<PathBuf>,
    /// Keyword table exported as CSV
    #[arg(long, env = "NC_RULES")]
    rules: Option<PathBuf>,
    /// Summarizer to use
    #[arg(long, env = "NC_MODEL", default_value = "extractive")]
    model: String,
    /// Group duplicates transitively instead of against the first article seen
    #[arg(long)]
    transitive: bool,
    /// Override the duplicate title similarity threshold
    #[arg(long)]
    duplicate_threshold: Option<f64>,
    /// Override how many articles each section keeps
    #[arg(long)]
    max_per_section: Option<usize>,
    #[arg(short, long)]
    verbose: bool,
    #[command(flatten)]
    clipping: ClippingArgs,
}

fn load_settings(cli: &Cli) -> anyhow::Result<Settings> {
    let mut settings = match &cli.settings {
        Some(path) => Settings::from_file(path)
            .with_context(|| format!("reading settings from {}", path.display()))?,
        None => Settings::default(),
    };
    if let Some(threshold) = cli.duplicate_threshold {
        settings.duplicate_threshold = threshold;
    }
    if let Some(max) = cli.max_per_section {
        settings.max_articles_per_section = max;
    }
    Ok(settings)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(if cli.verbose { Level::DEBUG } else { Level::INFO });

    let settings = load_settings(&cli)?;

    let rules = match &cli.rules {
        Some(path) => RuleSet::load(path)?,
        None => RuleSet::defaults(),
    };
    info!("🔑 {} keyword rules ready", rules.len());

    let inference_config = nc_inference::Config {
        model_name: Some(cli.model.clone()),
        editorial_max_sentences: settings.editorial_max_sentences,
        ..nc_inference::Config::default()
    };
    let summarizer = nc_inference::create_summarizer(&inference_config)?;
    info!("🧠 Summarizer initialized (using {})", summarizer.name());

    let grouping = if cli.transitive {
        GroupingStrategy::Transitive
    } else {
        GroupingStrategy::Seed
    };
    let manager = ClippingManager::new(Arc::new(rules), summarizer, settings).with_grouping(grouping);

    handle_command(cli.clipping, &manager).await?;
    Ok(())
}
