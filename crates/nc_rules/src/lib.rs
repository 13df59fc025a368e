pub mod rule;
pub mod ruleset;
pub mod table;

pub use rule::{build_query, parse_terms, KeywordRule, MediaWhitelist};
pub use ruleset::RuleSet;
pub use table::RuleTable;

pub mod prelude {
    pub use super::{KeywordRule, MediaWhitelist, RuleSet, RuleTable};
    pub use nc_core::{ConfigError, Error, Result};
}
