//! Small text helpers shared by deduplication, classification and fact checking.

use sha2::{Digest, Sha256};
use url::Url;

/// Lower-cases and collapses every whitespace run into a single space.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

/// SHA-256 of the whitespace-normalised, lower-cased text.
pub fn content_hash(text: &str) -> String {
    let digest = Sha256::digest(normalize_whitespace(text).as_bytes());
    format!("{:x}", digest)
}

/// Keeps only alphanumeric characters, lower-cased. "Diario Financiero" and
/// "diario-financiero" both become "diariofinanciero".
pub fn normalize_media_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Drops fragment, trailing slash and host case so equivalent links compare equal.
/// Strings that do not parse as URLs are only trimmed.
pub fn canonicalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    match Url::parse(trimmed) {
        Ok(mut url) => {
            url.set_fragment(None);
            let mut out = url.to_string();
            while out.ends_with('/') && url.path() != "/" {
                out.pop();
            }
            if url.path() == "/" && url.query().is_none() {
                out = out.trim_end_matches('/').to_string();
            }
            out
        }
        Err(_) => trimmed.to_string(),
    }
}

/// Case-insensitive gestalt (Ratcliff/Obershelp) similarity: twice the number of
/// characters in matching blocks over the total length of both strings.
/// Two empty strings are identical.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_characters(&a, &b) as f64 / total as f64
}

fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, k) = longest_match(a, b, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            pending.push((i + k, ahi, j + k, bhi));
        }
    }

    matched
}

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]`, earliest in `a` on ties.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let width = bhi - blo + 1;
    let mut best = (alo, blo, 0);
    let mut prev = vec![0usize; width];
    let mut cur = vec![0usize; width];

    for i in alo..ahi {
        for j in blo..bhi {
            let slot = j - blo + 1;
            if a[i] == b[j] {
                let k = prev[slot - 1] + 1;
                cur[slot] = k;
                if k > best.2 {
                    best = (i + 1 - k, j + 1 - k, k);
                }
            } else {
                cur[slot] = 0;
            }
        }
        std::mem::swap(&mut prev, &mut cur);
    }

    best
}
