use std::collections::HashMap;

use nc_core::text::{canonicalize_url, content_hash, similarity_ratio};
use nc_core::Article;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::group::DuplicateGroup;
use crate::priority::source_priority;

pub const DEFAULT_TITLE_THRESHOLD: f64 = 0.85;

/// How pairwise duplicate decisions become groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupingStrategy {
    /// Single pass, every candidate compared against the group's seed only.
    /// Cheap and order dependent.
    #[default]
    Seed,
    /// Connected components of the pairwise relation (union-find).
    Transitive,
}

#[derive(Debug, Clone)]
pub struct DuplicateDetector {
    title_threshold: f64,
    strategy: GroupingStrategy,
}

impl Default for DuplicateDetector {
    fn default() -> Self {
        Self::new(DEFAULT_TITLE_THRESHOLD)
    }
}

/// Per-article data computed once per pass.
struct Fingerprint {
    url: String,
    canonical_url: Option<String>,
    content_hash: Option<String>,
}

impl Fingerprint {
    fn of(article: &Article) -> Self {
        let canonical_url = article
            .canonical_url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .map(canonicalize_url);
        let content_hash = article
            .content
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .map(content_hash);
        Self {
            url: canonicalize_url(&article.url),
            canonical_url,
            content_hash,
        }
    }

    fn same_link(&self, other: &Fingerprint) -> bool {
        (!self.url.is_empty() && self.url == other.url)
            || matches!((&self.canonical_url, &other.canonical_url), (Some(a), Some(b)) if a == b)
    }
}

impl DuplicateDetector {
    pub fn new(title_threshold: f64) -> Self {
        Self {
            title_threshold,
            strategy: GroupingStrategy::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: GroupingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn strategy(&self) -> GroupingStrategy {
        self.strategy
    }

    /// Same URL, same canonical URL, near-identical title, or identical normalised content.
    pub fn is_duplicate(&self, a: &Article, b: &Article) -> bool {
        self.matches(a, b, &Fingerprint::of(a), &Fingerprint::of(b))
    }

    fn matches(&self, a: &Article, b: &Article, fa: &Fingerprint, fb: &Fingerprint) -> bool {
        if fa.same_link(fb) {
            return true;
        }
        if !a.title.trim().is_empty()
            && !b.title.trim().is_empty()
            && similarity_ratio(&a.title, &b.title) > self.title_threshold
        {
            return true;
        }
        matches!((&fa.content_hash, &fb.content_hash), (Some(x), Some(y)) if x == y)
    }

    /// Partitions `articles` into duplicate groups, each with an elected canonical
    /// member. Every non-canonical member gets `duplicate_of` pointing at the
    /// canonical article; the canonical one has none.
    pub fn find_duplicates(&self, articles: Vec<Article>) -> Vec<DuplicateGroup> {
        let fingerprints: Vec<Fingerprint> = articles.iter().map(Fingerprint::of).collect();
        let index_groups = match self.strategy {
            GroupingStrategy::Seed => self.seed_groups(&articles, &fingerprints),
            GroupingStrategy::Transitive => self.transitive_groups(&articles, &fingerprints),
        };

        let total = articles.len();
        let mut slots: Vec<Option<Article>> = articles.into_iter().map(Some).collect();
        let groups: Vec<DuplicateGroup> = index_groups
            .into_iter()
            .map(|indices| {
                let members = indices.into_iter().filter_map(|i| slots[i].take()).collect();
                elect_canonical(members)
            })
            .collect();

        info!(
            "🔍 {} articles collapsed into {} groups ({:?} grouping)",
            total,
            groups.len(),
            self.strategy
        );
        groups
    }

    /// Keeps only the canonical article of each group.
    pub fn deduplicate(&self, articles: Vec<Article>) -> Vec<Article> {
        self.find_duplicates(articles)
            .into_iter()
            .map(DuplicateGroup::into_canonical)
            .collect()
    }

    fn seed_groups(&self, articles: &[Article], fingerprints: &[Fingerprint]) -> Vec<Vec<usize>> {
        let links = LinkIndex::new(fingerprints);
        let mut assigned = vec![false; articles.len()];
        let mut groups = Vec::new();

        for seed in 0..articles.len() {
            if assigned[seed] {
                continue;
            }
            assigned[seed] = true;
            let mut group = vec![seed];
            links.pull_same_link(seed, &mut assigned, &mut group);

            for candidate in seed + 1..articles.len() {
                if assigned[candidate] {
                    continue;
                }
                if self.matches(&articles[seed], &articles[candidate], &fingerprints[seed], &fingerprints[candidate]) {
                    debug!("'{}' duplicates '{}'", articles[candidate].title, articles[seed].title);
                    assigned[candidate] = true;
                    group.push(candidate);
                    // Articles sharing a link with a member always travel with it.
                    links.pull_same_link(candidate, &mut assigned, &mut group);
                }
            }

            group.sort_unstable();
            groups.push(group);
        }

        groups
    }

    fn transitive_groups(&self, articles: &[Article], fingerprints: &[Fingerprint]) -> Vec<Vec<usize>> {
        let mut sets = DisjointSet::new(articles.len());
        for i in 0..articles.len() {
            for j in i + 1..articles.len() {
                if sets.find(i) != sets.find(j)
                    && self.matches(&articles[i], &articles[j], &fingerprints[i], &fingerprints[j])
                {
                    sets.union(i, j);
                }
            }
        }

        let mut order: Vec<usize> = Vec::new();
        let mut by_root: HashMap<usize, Vec<usize>> = HashMap::new();
        for i in 0..articles.len() {
            let root = sets.find(i);
            by_root
                .entry(root)
                .or_insert_with(|| {
                    order.push(root);
                    Vec::new()
                })
                .push(i);
        }
        order
            .into_iter()
            .filter_map(|root| by_root.remove(&root))
            .collect()
    }
}

/// Highest source priority wins; the first member wins ties.
fn elect_canonical(mut members: Vec<Article>) -> DuplicateGroup {
    let mut canonical = 0;
    let mut best = 0;
    for (i, article) in members.iter().enumerate() {
        let score = source_priority(&article.source);
        if i == 0 || score > best {
            canonical = i;
            best = score;
        }
    }

    let canonical_id = members[canonical].id;
    for (i, article) in members.iter_mut().enumerate() {
        article.duplicate_of = if i == canonical { None } else { Some(canonical_id) };
    }

    DuplicateGroup::new(members, canonical)
}

/// Articles reachable through identical URLs or canonical URLs.
struct LinkIndex {
    by_url: HashMap<String, Vec<usize>>,
    by_canonical: HashMap<String, Vec<usize>>,
    fingerprints_url: Vec<String>,
    fingerprints_canonical: Vec<Option<String>>,
}

impl LinkIndex {
    fn new(fingerprints: &[Fingerprint]) -> Self {
        let mut by_url: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_canonical: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, f) in fingerprints.iter().enumerate() {
            if !f.url.is_empty() {
                by_url.entry(f.url.clone()).or_default().push(i);
            }
            if let Some(c) = &f.canonical_url {
                by_canonical.entry(c.clone()).or_default().push(i);
            }
        }
        Self {
            by_url,
            by_canonical,
            fingerprints_url: fingerprints.iter().map(|f| f.url.clone()).collect(),
            fingerprints_canonical: fingerprints.iter().map(|f| f.canonical_url.clone()).collect(),
        }
    }

    fn pull_same_link(&self, start: usize, assigned: &mut [bool], group: &mut Vec<usize>) {
        let mut pending = vec![start];
        while let Some(i) = pending.pop() {
            let same_url = self.by_url.get(&self.fingerprints_url[i]);
            let same_canonical = self.fingerprints_canonical[i]
                .as_ref()
                .and_then(|c| self.by_canonical.get(c));
            for &j in same_url.into_iter().chain(same_canonical).flatten() {
                if !assigned[j] {
                    assigned[j] = true;
                    group.push(j);
                    pending.push(j);
                }
            }
        }
    }
}

struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
        }
    }

    fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            let (low, high) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[high] = low;
        }
    }
}
