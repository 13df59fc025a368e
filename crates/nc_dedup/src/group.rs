use nc_core::Article;
use uuid::Uuid;

/// Near-duplicate articles found in one deduplication pass.
#[derive(Debug, Clone)]
pub struct DuplicateGroup {
    /// The article that opened the group
    pub seed: Uuid,
    pub members: Vec<Article>,
    canonical: usize,
}

impl DuplicateGroup {
    pub(crate) fn new(members: Vec<Article>, canonical: usize) -> Self {
        let seed = members.first().map(|a| a.id).unwrap_or_else(Uuid::nil);
        Self {
            seed,
            members,
            canonical,
        }
    }

    pub fn canonical(&self) -> &Article {
        &self.members[self.canonical]
    }

    pub fn into_canonical(mut self) -> Article {
        self.members.swap_remove(self.canonical)
    }

    /// Members other than the canonical one.
    pub fn duplicates(&self) -> impl Iterator<Item = &Article> {
        let canonical = self.canonical;
        self.members
            .iter()
            .enumerate()
            .filter(move |(i, _)| *i != canonical)
            .map(|(_, a)| a)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn has_duplicates(&self) -> bool {
        self.members.len() > 1
    }
}
