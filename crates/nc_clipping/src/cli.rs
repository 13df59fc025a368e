use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use nc_core::{Article, Error, Result};

use crate::manager::ClippingManager;

#[derive(Args, Debug, Clone)]
pub struct ClippingArgs {
    #[command(subcommand)]
    pub command: ClippingCommands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ClippingCommands {
    /// Inspect the keyword rules
    Rules {
        #[command(subcommand)]
        command: RulesCommands,
    },
    /// Classify the articles of a JSON file
    Classify {
        /// JSON array of articles
        input: PathBuf,
    },
    /// Group duplicate articles and print the groups
    Dedup {
        input: PathBuf,
    },
    /// Fact-check generated text against the articles of a JSON file
    Verify {
        input: PathBuf,
        /// Text to check
        #[arg(long)]
        text: String,
        /// Check as an editorial over all articles instead of a summary of the first one
        #[arg(long)]
        editorial: bool,
    },
    /// Run the whole pipeline and print the newsletter as JSON
    Run {
        input: PathBuf,
        /// Write the report here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum RulesCommands {
    /// List the compiled rules
    List,
    /// Print one search query per rule
    Queries,
}

/// Reads a JSON array of articles. Missing optional fields take their defaults.
pub fn read_articles(path: impl AsRef<Path>) -> Result<Vec<Article>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

pub async fn handle_command(args: ClippingArgs, manager: &ClippingManager) -> Result<()> {
    match args.command {
        ClippingCommands::Rules { command } => match command {
            RulesCommands::List => {
                for rule in manager.rules().iter() {
                    println!(
                        "{} / {}: {}",
                        rule.section,
                        rule.theme,
                        rule.include_terms.join(" | ")
                    );
                }
            }
            RulesCommands::Queries => {
                for (rule, query) in manager.rules().search_queries()? {
                    println!("🔎 [{}] {}", rule.theme, query);
                }
            }
        },
        ClippingCommands::Classify { input } => {
            for item in manager.classify(read_articles(input)?) {
                println!(
                    "{:<12} {:.2}  {}",
                    item.section().code(),
                    item.result.confidence,
                    item.article.title
                );
            }
        }
        ClippingCommands::Dedup { input } => {
            for group in manager.find_duplicates(read_articles(input)?) {
                let canonical = group.canonical();
                println!("📰 {} ({})", canonical.title, canonical.source);
                for duplicate in group.duplicates() {
                    println!("   ↳ {} ({})", duplicate.title, duplicate.source);
                }
            }
        }
        ClippingCommands::Verify { input, text, editorial } => {
            let articles = read_articles(input)?;
            let checker = manager.fact_checker();
            let result = if editorial {
                checker.verify_editorial_summary(&text, &articles)
            } else {
                let source = articles
                    .first()
                    .ok_or_else(|| Error::Inference("no source article to check against".to_string()))?;
                checker.verify_article_summary(&text, source)
            };
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        ClippingCommands::Run { input, output } => {
            let report = manager.run(read_articles(input)?).await?;
            let json = serde_json::to_string_pretty(&report)?;
            match output {
                Some(path) => std::fs::write(path, json)?,
                None => println!("{}", json),
            }
        }
    }
    Ok(())
}
