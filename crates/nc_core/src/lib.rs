pub mod config;
pub mod error;
pub mod models;
pub mod text;
pub mod types;

pub use config::Settings;
pub use error::{ConfigError, Error};
pub use models::Summarizer;
pub use types::{Article, ClassificationResult, FactCheckResult, Section};

pub type Result<T> = std::result::Result<T, Error>;

pub mod prelude {
    pub use super::types::{Article, ClassificationResult, FactCheckResult, Section};
    pub use super::{ConfigError, Error, Result, Settings, Summarizer};
}
