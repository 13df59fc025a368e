pub mod detector;
pub mod group;
pub mod priority;

pub use detector::{DuplicateDetector, GroupingStrategy};
pub use group::DuplicateGroup;
pub use priority::source_priority;

pub mod prelude {
    pub use super::{DuplicateDetector, DuplicateGroup, GroupingStrategy};
    pub use nc_core::Article;
}
