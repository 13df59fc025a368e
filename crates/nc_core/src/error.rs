use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Rules error: {0}")]
    Rules(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

/// Problems with the keyword rule table that callers have to decide on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required rule columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("no keyword rules available for a search-driven workflow")]
    NoRules,
}
