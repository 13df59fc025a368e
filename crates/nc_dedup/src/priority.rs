use nc_core::text::normalize_media_name;

/// Premium outlets, best first. Names are compared after normalisation.
const SOURCE_PRIORITIES: &[(&[&str], u32)] = &[
    (&["diariofinanciero", "dfcl"], 10),
    (&["elmercurio"], 9),
    (&["latercera"], 8),
    (&["emol"], 7),
    (&["fundssociety"], 6),
];

/// Rank of an outlet when electing the canonical article. Unlisted outlets score 0.
pub fn source_priority(source: &str) -> u32 {
    let source = normalize_media_name(source);
    if source.is_empty() {
        return 0;
    }
    if source == "df" {
        return 10;
    }
    SOURCE_PRIORITIES
        .iter()
        .find(|(aliases, _)| aliases.iter().any(|alias| source.contains(alias)))
        .map(|(_, score)| *score)
        .unwrap_or(0)
}
