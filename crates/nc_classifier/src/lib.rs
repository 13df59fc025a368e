pub mod classifier;
pub mod patterns;
pub mod prioritizer;

pub use classifier::Classifier;
pub use prioritizer::{group_by_section, prioritize, select_for_newsletter, ClassifiedArticle};

pub mod prelude {
    pub use super::{prioritize, ClassifiedArticle, Classifier};
    pub use nc_core::{Article, ClassificationResult, Section};
}
