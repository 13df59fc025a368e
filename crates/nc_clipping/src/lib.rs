pub mod cli;
pub mod logging;
pub mod manager;

pub use cli::{handle_command, read_articles, ClippingArgs, ClippingCommands, RulesCommands};
pub use logging::{init_logging, Logger};
pub use manager::{ClippingManager, ClippingReport, NewsletterItem, EDITORIAL_DISCLAIMER};

pub mod prelude {
    pub use super::{ClippingManager, ClippingReport, NewsletterItem};
    pub use nc_core::{Article, Error, Result, Section, Settings};
}
